//! Kit reconciliation
//!
//! Cross-references the host's auto-detected Mer toolchains, Qt versions and
//! kits with the registered SDKs and removes whatever no longer matches. A
//! coherent kit set is a fixed point: reconciling it again changes nothing.

use std::fmt;

use crate::kits::queries::{has_mer_device_type, is_mer_kit, mer_qt_versions, mer_toolchains};
use crate::kits::{Kit, KitId, KitRegistry, QtVersionId, ToolChainId};
use crate::sdk::{SdkRecord, SdkRegistry};

/// What a reconciliation pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Toolchains without a matching SDK target
    pub removed_toolchains: Vec<ToolChainId>,
    /// Qt versions without a matching SDK target
    pub removed_qt_versions: Vec<QtVersionId>,
    /// Incoherent kits
    pub removed_kits: Vec<KitId>,
    /// Coherent kits that were re-validated
    pub validated_kits: Vec<KitId>,
}

impl ReconciliationReport {
    /// True if anything was deregistered
    pub fn has_changes(&self) -> bool {
        !self.removed_toolchains.is_empty()
            || !self.removed_qt_versions.is_empty()
            || !self.removed_kits.is_empty()
    }

    /// One-line description for logs
    pub fn summary(&self) -> String {
        format!(
            "removed {} toolchains, {} Qt versions, {} kits; validated {} kits",
            self.removed_toolchains.len(),
            self.removed_qt_versions.len(),
            self.removed_kits.len(),
            self.validated_kits.len()
        )
    }
}

impl fmt::Display for ReconciliationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Runs reconciliation and remembers whether startup reconciliation happened
#[derive(Debug, Default)]
pub struct KitReconciler {
    initialized: bool,
}

impl KitReconciler {
    /// A reconciler that has not run startup reconciliation yet
    pub fn new() -> Self {
        Self::default()
    }

    /// True once [`initialize`](Self::initialize) has run
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Startup reconciliation. Only the first call does anything; later
    /// calls return `None`.
    pub fn initialize(
        &mut self,
        sdks: &SdkRegistry,
        kits: &mut dyn KitRegistry,
    ) -> Option<ReconciliationReport> {
        if self.initialized {
            return None;
        }
        let report = self.reconcile(sdks, kits);
        self.initialized = true;
        Some(report)
    }

    /// Remove orphaned toolchains and Qt versions, then remove incoherent
    /// kits and re-validate the rest.
    pub fn reconcile(&self, sdks: &SdkRegistry, kits: &mut dyn KitRegistry) -> ReconciliationReport {
        let mut report = ReconciliationReport::default();

        // Decided before toolchains go away, so kits losing theirs are still
        // checked below
        let managed: Vec<Kit> = kits
            .kits()
            .into_iter()
            .filter(|k| is_managed_kit(k, sdks, &*kits))
            .collect();

        for toolchain in mer_toolchains(&*kits) {
            let Some((vm_name, target_name)) = toolchain.mer_target() else {
                continue;
            };
            if sdks.get(vm_name).is_some_and(|s| s.has_target(target_name)) {
                continue;
            }
            tracing::warn!(
                "Toolchain '{}' has no matching target '{}' in '{}', removing",
                toolchain.display_name,
                target_name,
                vm_name
            );
            if kits.deregister_toolchain(&toolchain.id) {
                report.removed_toolchains.push(toolchain.id.clone());
            }
        }

        for version in mer_qt_versions(&*kits) {
            let Some((vm_name, target_name)) = version.mer_target() else {
                continue;
            };
            if sdks.get(vm_name).is_some_and(|s| s.has_target(target_name)) {
                continue;
            }
            tracing::warn!(
                "Qt version '{}' has no matching target '{}' in '{}', removing",
                version.display_name,
                target_name,
                vm_name
            );
            if kits.remove_qt_version(&version.id) {
                report.removed_qt_versions.push(version.id.clone());
            }
        }

        for kit in managed {
            if is_kit_coherent(&kit, sdks, &*kits) {
                kits.validate_kit(&kit.id);
                report.validated_kits.push(kit.id);
            } else {
                tracing::warn!("Broken Mer kit '{}' found, removing", kit.display_name);
                if kits.deregister_kit(&kit.id) {
                    report.removed_kits.push(kit.id);
                }
            }
        }

        if report.has_changes() {
            tracing::info!("Kit reconciliation: {}", report);
        } else {
            tracing::debug!("Kit reconciliation: {}", report);
        }
        report
    }
}

/// Kits the manager is responsible for: auto-detected Mer kits whose SDK is
/// registered
fn is_managed_kit(kit: &Kit, sdks: &SdkRegistry, kits: &dyn KitRegistry) -> bool {
    kit.auto_detected && is_mer_kit(kit, sdks, kits)
}

/// Whether a kit's SDK, toolchain and Qt version describe the same target
/// of the same build engine
pub fn is_kit_coherent(kit: &Kit, sdks: &SdkRegistry, kits: &dyn KitRegistry) -> bool {
    let Some(sdk) = kit.sdk.as_deref().and_then(|name| sdks.get(name)) else {
        return false;
    };
    let Some(toolchain) = kit.toolchain.as_ref().and_then(|id| kits.toolchain(id)) else {
        return false;
    };
    let Some(version) = kit.qt_version.as_ref().and_then(|id| kits.qt_version(id)) else {
        return false;
    };
    if !has_mer_device_type(kit) {
        return false;
    }

    let (Some((tc_vm, tc_target)), Some((qt_vm, qt_target))) =
        (toolchain.mer_target(), version.mer_target())
    else {
        return false;
    };

    tc_vm == sdk.vm_name && qt_vm == sdk.vm_name && tc_target == qt_target
}

/// Full SDK validity: shared folders set, and every installed target has a
/// coherent kit built from a matching toolchain and Qt version
pub fn is_sdk_complete(record: &SdkRecord, sdks: &SdkRegistry, kits: &dyn KitRegistry) -> bool {
    if !record.is_valid() {
        return false;
    }
    let all_kits = kits.kits();
    record.targets.iter().all(|target| {
        all_kits.iter().any(|kit| {
            kit.sdk.as_deref() == Some(record.vm_name.as_str())
                && is_kit_coherent(kit, sdks, kits)
                && kit
                    .toolchain
                    .as_ref()
                    .and_then(|id| kits.toolchain(id))
                    .and_then(|t| t.mer_target().map(|(_, tn)| tn == target.as_str()))
                    .unwrap_or(false)
        })
    })
}

/// Tear down every auto-detected kit built on a Mer toolchain, together with
/// its toolchain and Qt version.
///
/// Run after the SDK was reinstalled to another directory, since those kits
/// point into the old location.
pub fn purge_managed_kits(kits: &mut dyn KitRegistry) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();

    for kit in kits.kits() {
        if !kit.auto_detected {
            continue;
        }
        let Some(toolchain) = kit.toolchain.as_ref().and_then(|id| kits.toolchain(id)) else {
            continue;
        };
        if !toolchain.is_mer() {
            continue;
        }

        tracing::debug!("Removing Mer kit '{}' due to reinstall", kit.display_name);
        if kits.deregister_kit(&kit.id) {
            report.removed_kits.push(kit.id.clone());
        }
        if kits.deregister_toolchain(&toolchain.id) {
            report.removed_toolchains.push(toolchain.id.clone());
        }
        if let Some(version) = &kit.qt_version {
            if kits.remove_qt_version(version) {
                report.removed_qt_versions.push(version.clone());
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::{DeviceType, InMemoryKitRegistry, QtVersion, ToolChain};
    use pretty_assertions::assert_eq;

    fn sdk(name: &str, targets: &[&str]) -> SdkRecord {
        SdkRecord {
            targets: targets.iter().map(|t| t.to_string()).collect(),
            shared_home_path: "/home/user".into(),
            shared_targets_path: "/sdk/targets".into(),
            shared_config_path: "/sdk/vmshare".into(),
            shared_src_path: "/home/user/src".into(),
            shared_ssh_path: "/sdk/ssh".into(),
            ..SdkRecord::new(name)
        }
    }

    fn add_target(kits: &mut InMemoryKitRegistry, vm: &str, target: &str) -> KitId {
        let tc = ToolChain::mer(vm, target);
        let qt = QtVersion::mer(vm, target);
        let kit = Kit::mer(target, vm, &tc, &qt, DeviceType::MerEmulator);
        kits.add_toolchain(tc);
        kits.add_qt_version(qt);
        kits.add_kit(kit)
    }

    #[test]
    fn test_orphan_toolchain_removed() {
        let mut sdks = SdkRegistry::new();
        sdks.add(sdk("MerSDK", &["T2"]));
        let mut kits = InMemoryKitRegistry::new();
        let tc = ToolChain::mer("MerSDK", "T1");
        let tc_id = kits.add_toolchain(tc);

        let report = KitReconciler::new().reconcile(&sdks, &mut kits);
        assert_eq!(report.removed_toolchains, vec![tc_id]);
        assert!(kits.toolchains().is_empty());
    }

    #[test]
    fn test_coherent_kit_validated_and_idempotent() {
        let mut sdks = SdkRegistry::new();
        sdks.add(sdk("MerSDK", &["SailfishOS-i486"]));
        let mut kits = InMemoryKitRegistry::new();
        let kit_id = add_target(&mut kits, "MerSDK", "SailfishOS-i486");

        let reconciler = KitReconciler::new();
        let first = reconciler.reconcile(&sdks, &mut kits);
        assert!(!first.has_changes());
        assert_eq!(first.validated_kits, vec![kit_id.clone()]);

        let second = reconciler.reconcile(&sdks, &mut kits);
        assert_eq!(first, second);
        assert_eq!(kits.validation_count(&kit_id), 2);

        let record = sdks.get("MerSDK").unwrap();
        assert!(is_sdk_complete(record, &sdks, &kits));
    }

    #[test]
    fn test_kit_losing_target_removed() {
        let mut sdks = SdkRegistry::new();
        sdks.add(sdk("MerSDK", &["SailfishOS-i486"]));
        let mut kits = InMemoryKitRegistry::new();
        add_target(&mut kits, "MerSDK", "SailfishOS-i486");
        let stale = add_target(&mut kits, "MerSDK", "SailfishOS-armv7hl");

        let report = KitReconciler::new().reconcile(&sdks, &mut kits);
        assert_eq!(report.removed_kits, vec![stale]);
        assert_eq!(report.removed_toolchains.len(), 1);
        assert_eq!(report.removed_qt_versions.len(), 1);
        assert_eq!(kits.kits().len(), 1);
    }

    #[test]
    fn test_mismatched_vm_is_incoherent() {
        let mut sdks = SdkRegistry::new();
        sdks.add(sdk("MerSDK", &["T"]));
        sdks.add(sdk("OtherSDK", &["T"]));
        let mut kits = InMemoryKitRegistry::new();
        let tc = ToolChain::mer("OtherSDK", "T");
        let qt = QtVersion::mer("MerSDK", "T");
        let kit = Kit::mer("T", "MerSDK", &tc, &qt, DeviceType::MerArm);
        kits.add_toolchain(tc);
        kits.add_qt_version(qt);
        let kit_id = kits.add_kit(kit.clone());

        assert!(!is_kit_coherent(&kit, &sdks, &kits));
        let report = KitReconciler::new().reconcile(&sdks, &mut kits);
        assert_eq!(report.removed_kits, vec![kit_id]);
    }

    #[test]
    fn test_user_kits_untouched() {
        let sdks = SdkRegistry::new();
        let mut kits = InMemoryKitRegistry::new();
        let mut kit = Kit::new("Handmade");
        kit.device_type = Some(DeviceType::MerArm);
        kit.sdk = Some("MerSDK".into());
        kits.add_kit(kit);

        let report = KitReconciler::new().reconcile(&sdks, &mut kits);
        assert!(!report.has_changes());
        assert_eq!(kits.kits().len(), 1);
    }

    #[test]
    fn test_kit_of_unregistered_sdk_untouched() {
        let sdks = SdkRegistry::new();
        let mut kits = InMemoryKitRegistry::new();
        let mut kit = Kit::new("Emulator");
        kit.auto_detected = true;
        kit.sdk = Some("GoneSDK".into());
        kit.device_type = Some(DeviceType::MerEmulator);
        let kit_id = kits.add_kit(kit);

        let report = KitReconciler::new().reconcile(&sdks, &mut kits);
        assert!(!report.has_changes());
        assert!(report.validated_kits.is_empty());
        assert_eq!(kits.validation_count(&kit_id), 0);
        assert_eq!(kits.kits().len(), 1);
    }

    #[test]
    fn test_initialize_runs_once() {
        let sdks = SdkRegistry::new();
        let mut kits = InMemoryKitRegistry::new();
        let mut reconciler = KitReconciler::new();
        assert!(reconciler.initialize(&sdks, &mut kits).is_some());
        assert!(reconciler.is_initialized());
        assert!(reconciler.initialize(&sdks, &mut kits).is_none());
    }

    #[test]
    fn test_purge_managed_kits() {
        let mut kits = InMemoryKitRegistry::new();
        add_target(&mut kits, "MerSDK", "SailfishOS-i486");
        let user = kits.add_kit(Kit::new("Desktop"));

        let report = purge_managed_kits(&mut kits);
        assert_eq!(report.removed_kits.len(), 1);
        assert_eq!(report.removed_toolchains.len(), 1);
        assert_eq!(report.removed_qt_versions.len(), 1);
        assert_eq!(kits.kits().len(), 1);
        assert_eq!(kits.kits()[0].id, user);
    }
}
