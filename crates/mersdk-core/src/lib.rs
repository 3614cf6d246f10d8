//! # MerSDK Core Library
//!
//! Bookkeeping for Mer (Sailfish OS) build engines on the IDE side.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The registry of configured SDK build engines (virtual machines)
//! - Persistence of that registry in Qt Creator's settings XML format,
//!   including reconciliation of user-local and installer-global files
//! - Reconciliation of IDE toolchains, Qt versions and kits against the registry
//! - Generation of the `devices.xml` descriptor consumed by SDK tooling
//! - SSH keypair generation and public key authorization
//! - The package hand-off contract of the RPM deploy step
//!
//! ## Example
//!
//! ```rust,ignore
//! use mersdk_core::prelude::*;
//!
//! let mut manager = SdkManager::new(ManagerConfig::from_env());
//! manager.subscribe(|event| println!("{event:?}"));
//!
//! // Once the host has loaded its kits and devices
//! manager.initialize(&mut kit_registry, &device_registry);
//!
//! // On the host's save-settings request
//! manager.store_sdks()?;
//! ```

pub mod config;
pub mod constants;
pub mod deploy;
pub mod devices;
pub mod events;
mod fsutil;
pub mod kits;
pub mod manager;
pub mod reconcile;
pub mod sdk;
pub mod settings;
pub mod ssh;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::ManagerConfig;
    pub use crate::devices::{
        Device, DeviceKind, DeviceRecord, DeviceRegistry, DescriptorReport,
        InMemoryDeviceRegistry,
    };
    pub use crate::events::{SdkManagerEvent, SubscriptionId};
    pub use crate::kits::{
        DeviceType, InMemoryKitRegistry, Kit, KitId, KitRegistry, QtVersion, QtVersionId,
        QtVersionKind, ToolChain, ToolChainId, ToolChainKind,
    };
    pub use crate::manager::SdkManager;
    pub use crate::reconcile::{KitReconciler, ReconciliationReport};
    pub use crate::sdk::{SdkRecord, SdkRegistry, VirtualMachineBackend, VirtualMachineInfo};
    pub use crate::settings::{SettingsDocument, SettingsStore};
    pub use crate::ssh::{RsaKeyGenerator, SshKeyProvisioner};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
