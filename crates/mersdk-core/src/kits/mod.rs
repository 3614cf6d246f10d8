//! IDE kit state the manager reconciles against
//!
//! The host owns toolchains, Qt versions and kits. This module models the
//! parts the manager reads and defines the [`KitRegistry`] seam through which
//! it deregisters stale entries.

mod model;
pub mod queries;
mod registry;

pub use model::{
    DeviceId, DeviceType, Kit, KitId, QtVersion, QtVersionId, QtVersionKind, ToolChain,
    ToolChainId, ToolChainKind,
};
pub use queries::{has_mer_device, is_mer_kit, kits_for_target, target_name_for_kit};
pub use registry::{InMemoryKitRegistry, KitRegistry};
