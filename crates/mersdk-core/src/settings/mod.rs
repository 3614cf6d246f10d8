//! SDK settings persistence
//!
//! The registry is stored in Qt Creator's persistent-settings XML dialect so
//! the document stays interchangeable with the one the SDK installer writes.
//!
//! - [`SettingsDocument`]: the versioned key-value document
//! - [`SettingsStore`]: local/global resolution, restore and save

mod document;
mod error;
mod persistent;
mod store;
mod variant;

pub use document::SettingsDocument;
pub use error::SettingsError;
pub use persistent::{parse_persistent_settings, write_persistent_settings};
pub use store::{Resolution, RestoreOutcome, SettingsStore};
pub use variant::{Value, ValueMap};
