//! SDK manager
//!
//! Composition root tying the registry, settings persistence, reconciliation
//! and descriptor generation together. The host constructs one manager and
//! forwards its own notifications (kits loaded, devices changed, settings
//! save requested) to it, passing its kit and device managers along.

use crate::config::ManagerConfig;
use crate::devices::{build_device_records, write_descriptors, DescriptorReport, DeviceRegistry};
use crate::events::{SdkManagerEvent, SubscriptionId};
use crate::kits::{self, Kit, KitRegistry};
use crate::reconcile::{purge_managed_kits, KitReconciler, ReconciliationReport};
use crate::sdk::{SdkRecord, SdkRegistry, VirtualMachineBackend, VmError};
use crate::settings::{SettingsError, SettingsStore};

/// Manages the configured build engines
#[derive(Debug)]
pub struct SdkManager {
    config: ManagerConfig,
    store: SettingsStore,
    sdks: SdkRegistry,
    reconciler: KitReconciler,
}

impl SdkManager {
    /// Create a manager. Nothing is read until [`initialize`](Self::initialize).
    pub fn new(config: ManagerConfig) -> Self {
        let store = SettingsStore::from_config(&config);
        Self {
            config,
            store,
            sdks: SdkRegistry::new(),
            reconciler: KitReconciler::new(),
        }
    }

    /// Configuration the manager was built with
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Where the SDK list is persisted
    pub fn settings_store(&self) -> &SettingsStore {
        &self.store
    }

    /// True once startup reconciliation has run
    pub fn is_initialized(&self) -> bool {
        self.reconciler.is_initialized()
    }

    /// Startup, once the host has loaded its kits and devices.
    ///
    /// Restores the stored SDKs, purging managed kits first if the SDK was
    /// reinstalled elsewhere, reconciles kits, rewrites the device
    /// descriptors and publishes [`SdkManagerEvent::Initialized`]. Returns
    /// `None` if the manager was already initialized.
    pub fn initialize(
        &mut self,
        kits: &mut dyn KitRegistry,
        devices: &dyn DeviceRegistry,
    ) -> Option<ReconciliationReport> {
        if self.reconciler.is_initialized() {
            return None;
        }

        self.restore_sdks(kits);
        let report = self.reconciler.initialize(&self.sdks, kits)?;
        self.update_devices(devices);
        self.sdks.emit(SdkManagerEvent::Initialized);
        Some(report)
    }

    fn restore_sdks(&mut self, kits: &mut dyn KitRegistry) {
        let outcome = self.store.restore();

        if outcome.reinstall {
            let purged = purge_managed_kits(kits);
            tracing::info!("SDK reinstalled, {}", purged);
        }

        for record in outcome.records {
            if let Some(rejected) = self.sdks.add(record) {
                tracing::warn!("Ignoring duplicate SDK '{}'", rejected.vm_name);
            }
        }
    }

    /// Persist the registry (the host's save-settings request)
    pub fn store_sdks(&self) -> Result<usize, SettingsError> {
        self.store.save(&self.sdks)
    }

    /// Device set changed: re-check kits once initialized, then rewrite the
    /// descriptors
    pub fn devices_changed(
        &mut self,
        kits: &mut dyn KitRegistry,
        devices: &dyn DeviceRegistry,
    ) -> DescriptorReport {
        if self.reconciler.is_initialized() {
            self.reconciler.reconcile(&self.sdks, kits);
        }
        self.update_devices(devices)
    }

    /// Rewrite `devices.xml` for every SDK
    pub fn update_devices(&self, devices: &dyn DeviceRegistry) -> DescriptorReport {
        let records = build_device_records(&devices.devices());
        write_descriptors(&self.sdks, &records)
    }

    /// Build an unregistered record from a running virtual machine
    pub fn create_sdk(
        &self,
        backend: &dyn VirtualMachineBackend,
        vm_name: &str,
    ) -> Result<SdkRecord, VmError> {
        SdkRegistry::create_from_live_vm(backend, vm_name)
    }

    /// Register a record. A rejected record is handed back.
    pub fn add_sdk(&mut self, record: SdkRecord) -> Option<SdkRecord> {
        self.sdks.add(record)
    }

    /// Deregister a record and hand it back
    pub fn remove_sdk(&mut self, vm_name: &str) -> Option<SdkRecord> {
        self.sdks.remove(vm_name)
    }

    /// Look up a registered SDK
    pub fn sdk(&self, vm_name: &str) -> Option<&SdkRecord> {
        self.sdks.get(vm_name)
    }

    /// The registered SDKs
    pub fn sdks(&self) -> &SdkRegistry {
        &self.sdks
    }

    /// Mutable registry access, for the notifying setters
    pub fn sdks_mut(&mut self) -> &mut SdkRegistry {
        &mut self.sdks
    }

    /// Observe [`SdkManagerEvent`]s
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&SdkManagerEvent) + Send + Sync + 'static,
    {
        self.sdks.subscribe(callback)
    }

    /// Stop observing. Returns false for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.sdks.unsubscribe(id)
    }

    /// See [`kits::is_mer_kit`]
    pub fn is_mer_kit(&self, kit: &Kit, kits: &dyn KitRegistry) -> bool {
        kits::is_mer_kit(kit, &self.sdks, kits)
    }

    /// See [`kits::target_name_for_kit`]
    pub fn target_name_for_kit(&self, kit: &Kit, kits: &dyn KitRegistry) -> Option<String> {
        kits::target_name_for_kit(kit, &self.sdks, kits)
    }

    /// See [`kits::kits_for_target`]
    pub fn kits_for_target(&self, target_name: &str, kits: &dyn KitRegistry) -> Vec<Kit> {
        kits::kits_for_target(target_name, &self.sdks, kits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::InMemoryDeviceRegistry;
    use crate::kits::InMemoryKitRegistry;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[test]
    fn test_initialize_once_with_events() {
        let dir = TempDir::new().unwrap();
        let config = ManagerConfig::with_roots(dir.path().join("user"), dir.path().join("global"));
        let mut manager = SdkManager::new(config);

        let events = Arc::new(Mutex::new(Vec::new()));
        let e = events.clone();
        manager.subscribe(move |ev| e.lock().unwrap().push(*ev));

        let mut kits = InMemoryKitRegistry::new();
        let devices = InMemoryDeviceRegistry::new();
        assert!(manager.initialize(&mut kits, &devices).is_some());
        assert!(manager.initialize(&mut kits, &devices).is_none());
        assert!(manager.is_initialized());

        assert_eq!(*events.lock().unwrap(), vec![SdkManagerEvent::Initialized]);
    }
}
