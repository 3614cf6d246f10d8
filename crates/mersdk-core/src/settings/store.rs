//! Persistence of the SDK registry
//!
//! Two copies of the settings document may exist: the user-local one written
//! by the IDE, and a global one written by the SDK installer. When the
//! installer moved the SDK to a new directory the local copy still points at
//! the old location, so the global copy wins and the caller is told to tear
//! down the kits built from the stale data.

use std::path::{Path, PathBuf};

use super::document::SettingsDocument;
use super::error::SettingsError;
use super::variant::Value;
use crate::config::ManagerConfig;
use crate::constants::{
    MER_SDK_COUNT_KEY, MER_SDK_FILE_VERSION, MER_SDK_FILE_VERSION_KEY, MER_SDK_INSTALLDIR,
};
use crate::sdk::{SdkRecord, SdkRegistry};

/// Which document to read, and whether the local one went stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Document to read
    pub path: PathBuf,
    /// The install directory changed since the local document was written
    pub reinstall: bool,
}

/// Result of [`SettingsStore::restore`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Records read from the document, malformed ones included
    pub records: Vec<SdkRecord>,
    /// Managed kits must be purged before the records are registered
    pub reinstall: bool,
    /// Document the records came from, `None` if nothing was readable
    pub source: Option<PathBuf>,
}

/// Reads and writes the SDK settings document
#[derive(Debug, Clone)]
pub struct SettingsStore {
    local: PathBuf,
    global: PathBuf,
    install_dir: String,
    reinstall: bool,
}

impl SettingsStore {
    /// Create a store over explicit local and global document paths
    pub fn new(local: impl Into<PathBuf>, global: impl Into<PathBuf>) -> Self {
        Self {
            local: local.into(),
            global: global.into(),
            install_dir: String::new(),
            reinstall: false,
        }
    }

    /// Create a store for the documents named by a configuration
    pub fn from_config(config: &ManagerConfig) -> Self {
        Self::new(config.local_settings_file(), config.global_settings_file())
    }

    /// User-local document path (always the save target)
    pub fn local_path(&self) -> &Path {
        &self.local
    }

    /// Installer-global document path
    pub fn global_path(&self) -> &Path {
        &self.global
    }

    /// Install directory remembered from the last restore
    pub fn install_dir(&self) -> &str {
        &self.install_dir
    }

    /// Override the install directory written by [`save`](Self::save)
    pub fn set_install_dir(&mut self, install_dir: impl Into<String>) {
        self.install_dir = install_dir.into();
    }

    /// True if the last resolution found a moved install directory
    pub fn needs_reinstall_cleanup(&self) -> bool {
        self.reinstall
    }

    /// Pick the document to read.
    ///
    /// An unreadable local document falls back to the global one. If both
    /// are readable and disagree about the install directory, the global one
    /// wins and `reinstall` is raised.
    pub fn resolve_location(local: &Path, global: &Path) -> Resolution {
        let local_doc = match SettingsDocument::load(local) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!("Local SDK settings unusable: {}", e);
                return Resolution {
                    path: global.to_path_buf(),
                    reinstall: false,
                };
            }
        };

        let global_doc = match SettingsDocument::load(global) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!("Global SDK settings unusable: {}", e);
                return Resolution {
                    path: local.to_path_buf(),
                    reinstall: false,
                };
            }
        };

        if local_doc.install_dir() != global_doc.install_dir() {
            tracing::info!(
                "SDK install directory changed from '{}' to '{}', using {}",
                local_doc.install_dir(),
                global_doc.install_dir(),
                global.display()
            );
            Resolution {
                path: global.to_path_buf(),
                reinstall: true,
            }
        } else {
            Resolution {
                path: local.to_path_buf(),
                reinstall: false,
            }
        }
    }

    /// Resolve and load the document. `None` if neither copy is readable.
    pub fn load(&mut self) -> Option<(PathBuf, SettingsDocument)> {
        let resolution = Self::resolve_location(&self.local, &self.global);
        self.reinstall = resolution.reinstall;
        match SettingsDocument::load(&resolution.path) {
            Ok(doc) => Some((resolution.path, doc)),
            Err(e) => {
                tracing::debug!("No SDK settings found: {}", e);
                None
            }
        }
    }

    /// Read the stored records.
    ///
    /// Documents older than the current schema are ignored entirely. A
    /// malformed record is logged and kept so the user can repair it.
    pub fn restore(&mut self) -> RestoreOutcome {
        let Some((path, doc)) = self.load() else {
            return RestoreOutcome {
                reinstall: self.reinstall,
                ..RestoreOutcome::default()
            };
        };

        let version = doc.file_version();
        if version < MER_SDK_FILE_VERSION {
            let err = SettingsError::UnsupportedVersion {
                found: version,
                minimum: MER_SDK_FILE_VERSION,
            };
            tracing::warn!("Ignoring SDK settings {}: {}", path.display(), err);
            return RestoreOutcome {
                reinstall: self.reinstall,
                source: Some(path),
                ..RestoreOutcome::default()
            };
        }

        self.install_dir = doc.install_dir();

        // The declared count is untrusted; the scan stops at the first gap
        let count = doc.sdk_count();
        let mut records = Vec::new();
        for index in 0..count {
            let Some(map) = doc.sdk_map(index) else {
                tracing::warn!(
                    "SDK settings {} declare {} SDKs but {} is missing",
                    path.display(),
                    count,
                    SettingsDocument::sdk_key(index)
                );
                break;
            };
            match SdkRecord::from_map(&map) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("{}", e);
                    records.push(*e.record);
                }
            }
        }

        tracing::debug!("Restored {} SDKs from {}", records.len(), path.display());
        RestoreOutcome {
            records,
            reinstall: self.reinstall,
            source: Some(path),
        }
    }

    /// Build the document for the current registry contents
    pub fn to_document(&self, registry: &SdkRegistry) -> SettingsDocument {
        let mut doc = SettingsDocument::new();
        doc.insert(MER_SDK_FILE_VERSION_KEY, MER_SDK_FILE_VERSION);
        doc.insert(MER_SDK_INSTALLDIR, self.install_dir.as_str());

        let mut count = 0usize;
        for record in registry.iter() {
            let Some(map) = record.to_map() else {
                tracing::warn!("Skipping SDK without a virtual machine name");
                continue;
            };
            if !record.is_valid() {
                tracing::warn!("SDK '{}' is configured incorrectly", record.vm_name);
            }
            doc.insert(SettingsDocument::sdk_key(count), Value::Map(map));
            count += 1;
        }
        doc.insert(MER_SDK_COUNT_KEY, count as i64);
        doc
    }

    /// Write the registry to the local document. Returns the number of
    /// records written.
    pub fn save(&self, registry: &SdkRegistry) -> Result<usize, SettingsError> {
        let doc = self.to_document(registry);
        doc.save(&self.local)?;
        let count = doc.sdk_count();
        tracing::debug!("Saved {} SDKs to {}", count, self.local.display());
        Ok(count)
    }
}
