//! Kit registry seam and an in-memory implementation

use std::collections::HashMap;

use super::model::{Kit, KitId, QtVersion, QtVersionId, ToolChain, ToolChainId};

/// The IDE's toolchain, Qt version and kit managers, as one collaborator.
///
/// List queries return snapshots so callers may deregister while iterating
/// over them.
pub trait KitRegistry {
    /// All registered toolchains
    fn toolchains(&self) -> Vec<ToolChain>;

    /// All registered Qt versions
    fn qt_versions(&self) -> Vec<QtVersion>;

    /// All registered kits
    fn kits(&self) -> Vec<Kit>;

    /// Look up a toolchain
    fn toolchain(&self, id: &ToolChainId) -> Option<ToolChain>;

    /// Look up a Qt version
    fn qt_version(&self, id: &QtVersionId) -> Option<QtVersion>;

    /// Look up a kit
    fn kit(&self, id: &KitId) -> Option<Kit>;

    /// Deregister a toolchain. Returns false if it was not registered.
    fn deregister_toolchain(&mut self, id: &ToolChainId) -> bool;

    /// Remove a Qt version. Returns false if it was not registered.
    fn remove_qt_version(&mut self, id: &QtVersionId) -> bool;

    /// Deregister a kit. Returns false if it was not registered.
    fn deregister_kit(&mut self, id: &KitId) -> bool;

    /// Ask the host to (re-)validate a kit
    fn validate_kit(&mut self, id: &KitId) -> bool;
}

/// [`KitRegistry`] kept entirely in memory, in registration order
#[derive(Debug, Clone, Default)]
pub struct InMemoryKitRegistry {
    toolchains: Vec<ToolChain>,
    qt_versions: Vec<QtVersion>,
    kits: Vec<Kit>,
    validations: HashMap<KitId, usize>,
}

impl InMemoryKitRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a toolchain, replacing one with the same id
    pub fn add_toolchain(&mut self, toolchain: ToolChain) -> ToolChainId {
        let id = toolchain.id.clone();
        self.toolchains.retain(|t| t.id != id);
        self.toolchains.push(toolchain);
        id
    }

    /// Register a Qt version, replacing one with the same id
    pub fn add_qt_version(&mut self, qt_version: QtVersion) -> QtVersionId {
        let id = qt_version.id.clone();
        self.qt_versions.retain(|q| q.id != id);
        self.qt_versions.push(qt_version);
        id
    }

    /// Register a kit, replacing one with the same id
    pub fn add_kit(&mut self, kit: Kit) -> KitId {
        let id = kit.id.clone();
        self.kits.retain(|k| k.id != id);
        self.kits.push(kit);
        id
    }

    /// How often a kit was validated
    pub fn validation_count(&self, id: &KitId) -> usize {
        self.validations.get(id).copied().unwrap_or(0)
    }
}

impl KitRegistry for InMemoryKitRegistry {
    fn toolchains(&self) -> Vec<ToolChain> {
        self.toolchains.clone()
    }

    fn qt_versions(&self) -> Vec<QtVersion> {
        self.qt_versions.clone()
    }

    fn kits(&self) -> Vec<Kit> {
        self.kits.clone()
    }

    fn toolchain(&self, id: &ToolChainId) -> Option<ToolChain> {
        self.toolchains.iter().find(|t| &t.id == id).cloned()
    }

    fn qt_version(&self, id: &QtVersionId) -> Option<QtVersion> {
        self.qt_versions.iter().find(|q| &q.id == id).cloned()
    }

    fn kit(&self, id: &KitId) -> Option<Kit> {
        self.kits.iter().find(|k| &k.id == id).cloned()
    }

    fn deregister_toolchain(&mut self, id: &ToolChainId) -> bool {
        let before = self.toolchains.len();
        self.toolchains.retain(|t| &t.id != id);
        self.toolchains.len() != before
    }

    fn remove_qt_version(&mut self, id: &QtVersionId) -> bool {
        let before = self.qt_versions.len();
        self.qt_versions.retain(|q| &q.id != id);
        self.qt_versions.len() != before
    }

    fn deregister_kit(&mut self, id: &KitId) -> bool {
        let before = self.kits.len();
        self.kits.retain(|k| &k.id != id);
        self.validations.remove(id);
        self.kits.len() != before
    }

    fn validate_kit(&mut self, id: &KitId) -> bool {
        if !self.kits.iter().any(|k| &k.id == id) {
            return false;
        }
        *self.validations.entry(id.clone()).or_insert(0) += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kits::DeviceType;

    #[test]
    fn test_register_and_deregister() {
        let mut registry = InMemoryKitRegistry::new();
        let tc = ToolChain::mer("MerSDK", "SailfishOS-i486");
        let qt = QtVersion::mer("MerSDK", "SailfishOS-i486");
        let kit = Kit::mer("Emulator", "MerSDK", &tc, &qt, DeviceType::MerEmulator);

        let tc_id = registry.add_toolchain(tc);
        registry.add_qt_version(qt);
        let kit_id = registry.add_kit(kit);

        assert!(registry.toolchain(&tc_id).is_some());
        assert!(registry.validate_kit(&kit_id));
        assert_eq!(registry.validation_count(&kit_id), 1);

        assert!(registry.deregister_kit(&kit_id));
        assert!(!registry.deregister_kit(&kit_id));
        assert!(!registry.validate_kit(&kit_id));
        assert_eq!(registry.validation_count(&kit_id), 0);
        assert!(registry.deregister_toolchain(&tc_id));
        assert!(registry.toolchains().is_empty());
        assert_eq!(registry.qt_versions().len(), 1);
    }
}
