//! Tests for kit reconciliation against the SDK registry.

use mersdk_core::kits::{
    DeviceType, InMemoryKitRegistry, Kit, KitId, KitRegistry, QtVersion, QtVersionKind, ToolChain,
    ToolChainKind,
};
use mersdk_core::reconcile::{is_kit_coherent, KitReconciler};
use mersdk_core::sdk::{SdkRecord, SdkRegistry};
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

fn add_target(kits: &mut InMemoryKitRegistry, vm: &str, target: &str, device: DeviceType) -> KitId {
    let tc = ToolChain::mer(vm, target);
    let qt = QtVersion::mer(vm, target);
    let kit = Kit::mer(format!("{target} ({vm})"), vm, &tc, &qt, device);
    kits.add_toolchain(tc);
    kits.add_qt_version(qt);
    kits.add_kit(kit)
}

#[test]
fn test_toolchain_for_unknown_target_removed() {
    let mut sdks = SdkRegistry::new();
    sdks.add(sdk("MerSDK", &["T2"]));

    let mut kits = InMemoryKitRegistry::new();
    let t1 = kits.add_toolchain(ToolChain::mer("MerSDK", "T1"));
    let t2 = kits.add_toolchain(ToolChain::mer("MerSDK", "T2"));

    let report = KitReconciler::new().reconcile(&sdks, &mut kits);
    assert_eq!(report.removed_toolchains, vec![t1]);
    let remaining: Vec<_> = kits.toolchains().into_iter().map(|t| t.id).collect();
    assert_eq!(remaining, vec![t2]);
}

#[test]
fn test_parts_of_removed_sdk_go_but_its_kits_stay() {
    let mut sdks = SdkRegistry::new();
    sdks.add(sdk("MerSDK", &["SailfishOS-i486"]));

    let mut kits = InMemoryKitRegistry::new();
    let kept = add_target(&mut kits, "MerSDK", "SailfishOS-i486", DeviceType::MerEmulator);
    let gone_emulator = add_target(&mut kits, "GoneSDK", "SailfishOS-i486", DeviceType::MerEmulator);
    let gone_arm = add_target(&mut kits, "GoneSDK", "SailfishOS-armv7hl", DeviceType::MerArm);

    let report = KitReconciler::new().reconcile(&sdks, &mut kits);
    assert_eq!(report.removed_toolchains.len(), 2);
    assert_eq!(report.removed_qt_versions.len(), 2);
    // Kits of an SDK that is not registered are not ours to judge
    assert!(report.removed_kits.is_empty());
    assert_eq!(report.validated_kits, vec![kept.clone()]);

    let ids: Vec<_> = kits.kits().into_iter().map(|k| k.id).collect();
    assert_eq!(ids, vec![kept, gone_emulator, gone_arm]);
}

#[test]
fn test_reconcile_reaches_fixed_point() {
    let mut sdks = SdkRegistry::new();
    sdks.add(sdk("MerSDK", &["SailfishOS-i486", "SailfishOS-armv7hl"]));

    let mut kits = InMemoryKitRegistry::new();
    add_target(&mut kits, "MerSDK", "SailfishOS-i486", DeviceType::MerEmulator);
    add_target(&mut kits, "MerSDK", "SailfishOS-armv7hl", DeviceType::MerArm);
    add_target(&mut kits, "MerSDK", "SailfishOS-aarch64", DeviceType::MerArm);

    let reconciler = KitReconciler::new();
    let first = reconciler.reconcile(&sdks, &mut kits);
    assert!(first.has_changes());

    for kit in kits.kits() {
        assert!(is_kit_coherent(&kit, &sdks, &kits), "{} incoherent", kit.display_name);
    }

    let second = reconciler.reconcile(&sdks, &mut kits);
    assert!(!second.has_changes());
    assert_eq!(second.validated_kits.len(), 2);
}

#[test]
fn test_non_mer_parts_make_kit_incoherent() {
    let mut sdks = SdkRegistry::new();
    sdks.add(sdk("MerSDK", &["SailfishOS-i486"]));

    let mut kits = InMemoryKitRegistry::new();
    let tc = ToolChain::mer("MerSDK", "SailfishOS-i486");
    let desktop_qt = QtVersion {
        id: mersdk_core::kits::QtVersionId::generate(),
        display_name: "Qt 5.2 Desktop".into(),
        auto_detected: true,
        kind: QtVersionKind::Other {
            type_id: "Qt4ProjectManager.QtVersion.Desktop".into(),
        },
    };
    let kit = Kit::mer("Mixed", "MerSDK", &tc, &desktop_qt, DeviceType::MerEmulator);
    kits.add_toolchain(tc);
    kits.add_qt_version(desktop_qt);
    let kit_id = kits.add_kit(kit);

    let report = KitReconciler::new().reconcile(&sdks, &mut kits);
    assert_eq!(report.removed_kits, vec![kit_id]);
    // Non-Mer Qt versions are never touched
    assert_eq!(kits.qt_versions().len(), 1);
}

#[test]
fn test_foreign_toolchains_untouched() {
    let sdks = SdkRegistry::new();
    let mut kits = InMemoryKitRegistry::new();
    kits.add_toolchain(ToolChain {
        id: mersdk_core::kits::ToolChainId::generate(),
        display_name: "GCC (x86 64bit)".into(),
        auto_detected: true,
        kind: ToolChainKind::Other {
            type_id: "ProjectExplorer.ToolChain.Gcc".into(),
        },
    });
    let mut user_tc = ToolChain::mer("MerSDK", "SailfishOS-i486");
    user_tc.auto_detected = false;
    kits.add_toolchain(user_tc);

    let report = KitReconciler::new().reconcile(&sdks, &mut kits);
    assert!(!report.has_changes());
    assert_eq!(kits.toolchains().len(), 2);
}
