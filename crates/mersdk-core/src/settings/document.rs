//! The versioned SDK settings document.

use std::fs;
use std::path::Path;

use super::error::SettingsError;
use super::persistent::{parse_persistent_settings, write_persistent_settings};
use super::variant::{Value, ValueMap};
use crate::constants::{
    MER_SDK_COUNT_KEY, MER_SDK_DATA_KEY, MER_SDK_DOCTYPE, MER_SDK_FILE_VERSION_KEY,
    MER_SDK_INSTALLDIR,
};
use crate::fsutil::write_atomic;

/// Key-value document holding `FileVersion`, `InstallDir`, `SdkCount` and
/// one `Sdk<i>` map per stored SDK.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsDocument {
    values: ValueMap,
}

impl SettingsDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap already parsed top-level values
    pub fn from_values(values: ValueMap) -> Self {
        Self { values }
    }

    /// Parse a document from XML text
    pub fn parse(xml: &str) -> Result<Self, SettingsError> {
        Ok(Self::from_values(parse_persistent_settings(xml)?))
    }

    /// Load a document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Serialize to XML text
    pub fn to_xml(&self) -> Result<String, SettingsError> {
        write_persistent_settings(&self.values, MER_SDK_DOCTYPE)
    }

    /// Atomically replace the document on disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        write_atomic(path, xml.as_bytes(), false).map_err(|source| SettingsError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// All top-level values
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Get a top-level value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a top-level value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Check if a top-level key exists
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Schema version, 0 when absent or unreadable
    pub fn file_version(&self) -> i64 {
        self.get(MER_SDK_FILE_VERSION_KEY)
            .and_then(Value::to_int)
            .unwrap_or(0)
    }

    /// SDK install directory recorded by whoever wrote the document
    pub fn install_dir(&self) -> String {
        self.get(MER_SDK_INSTALLDIR)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Declared number of SDK maps
    pub fn sdk_count(&self) -> usize {
        self.get(MER_SDK_COUNT_KEY)
            .and_then(Value::to_int)
            .map(|c| c.max(0) as usize)
            .unwrap_or(0)
    }

    /// Key of the i-th SDK map
    pub fn sdk_key(index: usize) -> String {
        format!("{}{}", MER_SDK_DATA_KEY, index)
    }

    /// The i-th SDK map. A non-map value reads as an empty map.
    pub fn sdk_map(&self, index: usize) -> Option<ValueMap> {
        self.get(&Self::sdk_key(index))
            .map(|v| v.as_map().cloned().unwrap_or_default())
    }
}
