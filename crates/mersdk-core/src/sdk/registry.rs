//! SDK registry
//!
//! Owns every registered [`SdkRecord`], keyed by virtual machine name. Records
//! move in through [`SdkRegistry::add`] and move back out through
//! [`SdkRegistry::remove`]; nothing else can take one out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::record::SdkRecord;
use super::vm::{VirtualMachineBackend, VmError};
use crate::events::{EventHub, SdkManagerEvent, SubscriptionId};

/// Registry of configured build engines
#[derive(Debug, Default)]
pub struct SdkRegistry {
    sdks: BTreeMap<String, SdkRecord>,
    events: EventHub,
}

impl SdkRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record.
    ///
    /// The first registration of a name wins. A duplicate (or unnamed) record
    /// is handed back untouched and no event is published.
    pub fn add(&mut self, record: SdkRecord) -> Option<SdkRecord> {
        if record.vm_name.is_empty() {
            tracing::warn!("Refusing to register an SDK without a virtual machine name");
            return Some(record);
        }
        if self.sdks.contains_key(&record.vm_name) {
            tracing::debug!("SDK '{}' already registered", record.vm_name);
            return Some(record);
        }

        tracing::debug!("Registering SDK '{}'", record.vm_name);
        self.sdks.insert(record.vm_name.clone(), record);
        self.events.emit(SdkManagerEvent::SdksUpdated);
        None
    }

    /// Deregister a record and hand it back to the caller
    pub fn remove(&mut self, vm_name: &str) -> Option<SdkRecord> {
        let record = self.sdks.remove(vm_name)?;
        tracing::debug!("Removed SDK '{}'", vm_name);
        self.events.emit(SdkManagerEvent::SdksUpdated);
        Some(record)
    }

    /// Look up a record by virtual machine name
    pub fn get(&self, vm_name: &str) -> Option<&SdkRecord> {
        self.sdks.get(vm_name)
    }

    /// Iterate records in name order
    pub fn iter(&self) -> impl Iterator<Item = &SdkRecord> {
        self.sdks.values()
    }

    /// Snapshot of all records in name order
    pub fn all(&self) -> Vec<SdkRecord> {
        self.sdks.values().cloned().collect()
    }

    /// Registered virtual machine names
    pub fn names(&self) -> Vec<String> {
        self.sdks.keys().cloned().collect()
    }

    /// Number of registered records
    pub fn len(&self) -> usize {
        self.sdks.len()
    }

    /// True if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.sdks.is_empty()
    }

    /// Check membership of a record (by virtual machine name)
    pub fn contains(&self, record: &SdkRecord) -> bool {
        self.contains_name(&record.vm_name)
    }

    /// Check membership by virtual machine name
    pub fn contains_name(&self, vm_name: &str) -> bool {
        self.sdks.contains_key(vm_name)
    }

    /// Replace the installed target list of a registered SDK.
    /// Returns false if the SDK is not registered.
    pub fn set_targets(&mut self, vm_name: &str, targets: Vec<String>) -> bool {
        self.update(vm_name, |record| {
            if record.targets == targets {
                return false;
            }
            record.targets = targets;
            true
        })
    }

    /// Change the private key of a registered SDK.
    /// Returns false if the SDK is not registered.
    pub fn set_private_key_file(&mut self, vm_name: &str, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        self.update(vm_name, |record| {
            if record.private_key_file == path {
                return false;
            }
            record.private_key_file = path;
            true
        })
    }

    /// Switch headless mode of a registered SDK.
    /// Returns false if the SDK is not registered.
    pub fn set_headless(&mut self, vm_name: &str, headless: bool) -> bool {
        self.update(vm_name, |record| {
            if record.headless == headless {
                return false;
            }
            record.headless = headless;
            true
        })
    }

    fn update<F>(&mut self, vm_name: &str, change: F) -> bool
    where
        F: FnOnce(&mut SdkRecord) -> bool,
    {
        let Some(record) = self.sdks.get_mut(vm_name) else {
            return false;
        };
        if change(record) {
            self.events.emit(SdkManagerEvent::SdksUpdated);
        }
        true
    }

    /// Subscribe to registry and manager events
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&SdkManagerEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(callback)
    }

    /// Drop a subscription
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&self, event: SdkManagerEvent) {
        self.events.emit(event);
    }

    /// Build a new, unregistered record from a running virtual machine.
    ///
    /// Host and user take their defaults. The private key points at the
    /// engine key inside the shared configuration folder, or at `~/.ssh` when
    /// the machine shares no configuration folder.
    pub fn create_from_live_vm(
        backend: &dyn VirtualMachineBackend,
        vm_name: &str,
    ) -> Result<SdkRecord, VmError> {
        let info = backend.fetch_info(vm_name)?;

        let private_key_file = if info.shared_config.as_os_str().is_empty() {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join(".ssh")
        } else {
            engine_key_path(&info.shared_config)
        };

        Ok(SdkRecord {
            ssh_port: info.ssh_port,
            www_port: info.www_port,
            private_key_file,
            shared_home_path: info.shared_home,
            shared_targets_path: info.shared_targets,
            shared_config_path: info.shared_config,
            shared_src_path: info.shared_src,
            shared_ssh_path: info.shared_ssh,
            ..SdkRecord::new(vm_name)
        })
    }
}

fn engine_key_path(shared_config: &Path) -> PathBuf {
    shared_config
        .join("ssh")
        .join("private_keys")
        .join("engine")
        .join("mersdk")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::VirtualMachineInfo;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(registry: &mut SdkRegistry) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        registry.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_first_registration_wins() {
        let mut registry = SdkRegistry::new();
        let count = counting(&mut registry);

        let mut first = SdkRecord::new("MerSDK");
        first.ssh_port = 2222;
        let mut second = SdkRecord::new("MerSDK");
        second.ssh_port = 3333;

        assert!(registry.add(first.clone()).is_none());
        assert_eq!(registry.add(second.clone()), Some(second));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("MerSDK"), Some(&first));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unnamed_record_rejected() {
        let mut registry = SdkRegistry::new();
        assert!(registry.add(SdkRecord::default()).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_hands_back_record() {
        let mut registry = SdkRegistry::new();
        let count = counting(&mut registry);

        assert!(registry.remove("MerSDK").is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        registry.add(SdkRecord::new("MerSDK"));
        let record = registry.remove("MerSDK").unwrap();
        assert_eq!(record.vm_name, "MerSDK");
        assert!(!registry.contains(&record));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_setters_notify_on_change_only() {
        let mut registry = SdkRegistry::new();
        registry.add(SdkRecord::new("MerSDK"));
        let count = counting(&mut registry);

        assert!(registry.set_headless("MerSDK", true));
        assert!(registry.set_headless("MerSDK", true));
        assert!(registry.set_targets("MerSDK", vec!["SailfishOS-i486".into()]));
        assert!(registry.set_private_key_file("MerSDK", "/tmp/key"));
        assert!(!registry.set_headless("Other", true));

        assert_eq!(count.load(Ordering::SeqCst), 3);
        let record = registry.get("MerSDK").unwrap();
        assert!(record.headless);
        assert_eq!(record.targets, vec!["SailfishOS-i486".to_string()]);
    }

    struct FakeBackend;

    impl VirtualMachineBackend for FakeBackend {
        fn fetch_info(&self, vm_name: &str) -> Result<VirtualMachineInfo, VmError> {
            if vm_name != "MerSDK" {
                return Err(VmError::NotFound(vm_name.to_string()));
            }
            Ok(VirtualMachineInfo {
                ssh_port: 2222,
                www_port: 8080,
                shared_home: "/home/user".into(),
                shared_targets: "/sdk/targets".into(),
                shared_config: "/sdk/vmshare".into(),
                shared_src: "/home/user/src".into(),
                shared_ssh: "/sdk/ssh".into(),
            })
        }
    }

    #[test]
    fn test_create_from_live_vm() {
        let record = SdkRegistry::create_from_live_vm(&FakeBackend, "MerSDK").unwrap();
        assert_eq!(record.host, "localhost");
        assert_eq!(record.user_name, "mersdk");
        assert_eq!(record.ssh_port, 2222);
        assert_eq!(
            record.private_key_file,
            PathBuf::from("/sdk/vmshare/ssh/private_keys/engine/mersdk")
        );
        assert!(record.is_valid());

        let err = SdkRegistry::create_from_live_vm(&FakeBackend, "Missing").unwrap_err();
        assert!(matches!(err, VmError::NotFound(_)));
    }
}
