//! Kit queries used by run configuration and deploy layers

use super::model::{Kit, QtVersion, ToolChain};
use super::registry::KitRegistry;
use crate::devices::DeviceRegistry;
use crate::sdk::SdkRegistry;

/// Auto-detected Mer toolchains
pub fn mer_toolchains(kits: &dyn KitRegistry) -> Vec<ToolChain> {
    kits.toolchains()
        .into_iter()
        .filter(|t| t.auto_detected && t.is_mer())
        .collect()
}

/// Auto-detected Mer Qt versions
pub fn mer_qt_versions(kits: &dyn KitRegistry) -> Vec<QtVersion> {
    kits.qt_versions()
        .into_iter()
        .filter(|q| q.auto_detected && q.is_mer())
        .collect()
}

/// True if the kit's toolchain is a Mer toolchain
pub fn has_mer_toolchain(kit: &Kit, kits: &dyn KitRegistry) -> bool {
    kit.toolchain
        .as_ref()
        .and_then(|id| kits.toolchain(id))
        .is_some_and(|t| t.is_mer())
}

/// True if the kit's device type is one the Mer device factory handles
pub fn has_mer_device_type(kit: &Kit) -> bool {
    kit.device_type.as_ref().is_some_and(|t| t.is_mer())
}

/// True if the kit builds in a registered build engine with a Mer
/// toolchain or for a Mer device type
pub fn is_mer_kit(kit: &Kit, sdks: &SdkRegistry, kits: &dyn KitRegistry) -> bool {
    let Some(vm_name) = kit.sdk.as_deref() else {
        return false;
    };
    if !sdks.contains_name(vm_name) {
        return false;
    }
    has_mer_toolchain(kit, kits) || has_mer_device_type(kit)
}

/// True if the kit's device resolves and is a Mer device
pub fn has_mer_device(kit: &Kit, devices: &dyn DeviceRegistry) -> bool {
    kit.device
        .as_ref()
        .and_then(|id| devices.device(id))
        .is_some_and(|d| d.device_type().is_mer())
}

/// Target name of a Mer kit's toolchain
pub fn target_name_for_kit(
    kit: &Kit,
    sdks: &SdkRegistry,
    kits: &dyn KitRegistry,
) -> Option<String> {
    if !is_mer_kit(kit, sdks, kits) {
        return None;
    }
    let toolchain = kits.toolchain(kit.toolchain.as_ref()?)?;
    toolchain
        .mer_target()
        .map(|(_, target_name)| target_name.to_string())
}

/// Mer kits building for a target
pub fn kits_for_target(target_name: &str, sdks: &SdkRegistry, kits: &dyn KitRegistry) -> Vec<Kit> {
    if target_name.is_empty() {
        return Vec::new();
    }
    kits.kits()
        .into_iter()
        .filter(|k| target_name_for_kit(k, sdks, kits).as_deref() == Some(target_name))
        .collect()
}
