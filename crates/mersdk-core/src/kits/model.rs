//! Toolchains, Qt versions, kits and device types as the manager sees them.
//!
//! These carry only the tagged subset of the IDE's objects that
//! reconciliation reads and writes.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Allocate a fresh random id
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Wrap an existing id
            pub fn from_string(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// String form of the id
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Toolchain identifier
    ToolChainId
);
string_id!(
    /// Qt version identifier
    QtVersionId
);
string_id!(
    /// Kit identifier
    KitId
);
string_id!(
    /// Device identifier
    DeviceId
);

/// What kind of toolchain this is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolChainKind {
    /// Cross compiler running inside a build engine
    Mer {
        /// Build engine virtual machine
        vm_name: String,
        /// Target inside that engine
        target_name: String,
    },
    /// Any other toolchain
    Other {
        /// Host type identifier
        type_id: String,
    },
}

/// A registered toolchain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolChain {
    /// Registry id
    pub id: ToolChainId,
    /// Name shown to the user
    pub display_name: String,
    /// Created by the manager rather than the user
    pub auto_detected: bool,
    /// Mer or foreign toolchain
    pub kind: ToolChainKind,
}

impl ToolChain {
    /// An auto-detected toolchain for a target in a build engine
    pub fn mer(vm_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        let vm_name = vm_name.into();
        let target_name = target_name.into();
        Self {
            id: ToolChainId::generate(),
            display_name: format!("GCC ({} in {})", target_name, vm_name),
            auto_detected: true,
            kind: ToolChainKind::Mer {
                vm_name,
                target_name,
            },
        }
    }

    /// Build engine and target, for Mer toolchains
    pub fn mer_target(&self) -> Option<(&str, &str)> {
        match &self.kind {
            ToolChainKind::Mer {
                vm_name,
                target_name,
            } => Some((vm_name, target_name)),
            ToolChainKind::Other { .. } => None,
        }
    }

    /// True for toolchains living in a build engine
    pub fn is_mer(&self) -> bool {
        matches!(self.kind, ToolChainKind::Mer { .. })
    }
}

/// What kind of Qt version this is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QtVersionKind {
    /// Qt installed in a build engine target
    Mer {
        /// Build engine virtual machine
        vm_name: String,
        /// Target inside that engine
        target_name: String,
    },
    /// Any other Qt version
    Other {
        /// Host type identifier
        type_id: String,
    },
}

/// A registered Qt version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QtVersion {
    /// Registry id
    pub id: QtVersionId,
    /// Name shown to the user
    pub display_name: String,
    /// Created by the manager rather than the user
    pub auto_detected: bool,
    /// Mer or foreign Qt version
    pub kind: QtVersionKind,
}

impl QtVersion {
    /// An auto-detected Qt version for a target in a build engine
    pub fn mer(vm_name: impl Into<String>, target_name: impl Into<String>) -> Self {
        let vm_name = vm_name.into();
        let target_name = target_name.into();
        Self {
            id: QtVersionId::generate(),
            display_name: format!("Qt in {} ({})", target_name, vm_name),
            auto_detected: true,
            kind: QtVersionKind::Mer {
                vm_name,
                target_name,
            },
        }
    }

    /// Build engine and target, for Mer Qt versions
    pub fn mer_target(&self) -> Option<(&str, &str)> {
        match &self.kind {
            QtVersionKind::Mer {
                vm_name,
                target_name,
            } => Some((vm_name, target_name)),
            QtVersionKind::Other { .. } => None,
        }
    }

    /// True for Qt versions living in a build engine
    pub fn is_mer(&self) -> bool {
        matches!(self.kind, QtVersionKind::Mer { .. })
    }
}

/// Device type a kit deploys to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    /// Physical ARM device
    MerArm,
    /// Emulator virtual machine
    MerEmulator,
    /// Any other device type
    Other(String),
}

impl DeviceType {
    /// True for the types the Mer device factory can create
    pub fn is_mer(&self) -> bool {
        matches!(self, DeviceType::MerArm | DeviceType::MerEmulator)
    }
}

/// A kit: the tagged subset the manager reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kit {
    /// Registry id
    pub id: KitId,
    /// Name shown to the user
    pub display_name: String,
    /// Created by the manager rather than the user
    pub auto_detected: bool,
    /// Build engine virtual machine the kit builds in
    pub sdk: Option<String>,
    /// Compiler
    pub toolchain: Option<ToolChainId>,
    /// Qt installation
    pub qt_version: Option<QtVersionId>,
    /// Kind of device the kit deploys to
    pub device_type: Option<DeviceType>,
    /// Concrete deploy device
    pub device: Option<DeviceId>,
}

impl Kit {
    /// An empty, user-created kit
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            id: KitId::generate(),
            display_name: display_name.into(),
            auto_detected: false,
            sdk: None,
            toolchain: None,
            qt_version: None,
            device_type: None,
            device: None,
        }
    }

    /// An auto-detected kit tying a toolchain and Qt version to a build
    /// engine
    pub fn mer(
        display_name: impl Into<String>,
        vm_name: impl Into<String>,
        toolchain: &ToolChain,
        qt_version: &QtVersion,
        device_type: DeviceType,
    ) -> Self {
        Self {
            auto_detected: true,
            sdk: Some(vm_name.into()),
            toolchain: Some(toolchain.id.clone()),
            qt_version: Some(qt_version.id.clone()),
            device_type: Some(device_type),
            ..Self::new(display_name)
        }
    }
}
