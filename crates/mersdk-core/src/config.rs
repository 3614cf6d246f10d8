//! Manager configuration
//!
//! Locations of the user-local and installer-global settings roots. The
//! settings document and the SDK tools directory both live relative to these
//! roots, the same way Qt Creator places plugin files next to its own
//! settings file.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::{MER_SDK_FILENAME, MER_SDK_TOOLS};

/// Environment variable overriding the user settings root
pub const SETTINGS_ROOT_ENV: &str = "MERSDK_SETTINGS_ROOT";

/// Environment variable overriding the global (installer) settings root
pub const GLOBAL_SETTINGS_ROOT_ENV: &str = "MERSDK_GLOBAL_SETTINGS_ROOT";

/// Configuration of an [`SdkManager`](crate::manager::SdkManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// User settings root (where Qt Creator keeps its user settings)
    pub settings_root: PathBuf,

    /// Installer-provided settings root
    pub global_settings_root: PathBuf,

    /// Settings document path relative to either root
    #[serde(default = "default_settings_file_name")]
    pub settings_file_name: String,

    /// SDK tools directory name relative to either root
    #[serde(default = "default_tools_dir_name")]
    pub tools_dir_name: String,
}

fn default_settings_file_name() -> String {
    MER_SDK_FILENAME.to_string()
}

fn default_tools_dir_name() -> String {
    MER_SDK_TOOLS.to_string()
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let settings_root = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("QtProject");

        Self {
            settings_root,
            global_settings_root: PathBuf::from("/usr/share/qtcreator/QtProject"),
            settings_file_name: default_settings_file_name(),
            tools_dir_name: default_tools_dir_name(),
        }
    }
}

impl ManagerConfig {
    /// Create a configuration with explicit roots
    pub fn with_roots(settings_root: impl Into<PathBuf>, global_root: impl Into<PathBuf>) -> Self {
        Self {
            settings_root: settings_root.into(),
            global_settings_root: global_root.into(),
            ..Self::default()
        }
    }

    /// Defaults, with roots overridden from the environment when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = env::var_os(SETTINGS_ROOT_ENV) {
            config.settings_root = PathBuf::from(root);
        }
        if let Some(root) = env::var_os(GLOBAL_SETTINGS_ROOT_ENV) {
            config.global_settings_root = PathBuf::from(root);
        }
        config
    }

    /// Load a configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save the configuration as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, content)
    }

    /// User-local settings document
    pub fn local_settings_file(&self) -> PathBuf {
        self.settings_root.join(&self.settings_file_name)
    }

    /// Installer-global settings document
    pub fn global_settings_file(&self) -> PathBuf {
        self.global_settings_root.join(&self.settings_file_name)
    }

    /// Per-user SDK tools directory
    pub fn sdk_tools_directory(&self) -> PathBuf {
        self.settings_root.join(&self.tools_dir_name)
    }

    /// SDK tools directory shipped by the installer
    pub fn global_sdk_tools_directory(&self) -> PathBuf {
        self.global_settings_root.join(&self.tools_dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_derived_paths() {
        let config = ManagerConfig::with_roots("/home/u/.config/QtProject", "/opt/sdk/QtProject");
        assert_eq!(
            config.local_settings_file(),
            PathBuf::from("/home/u/.config/QtProject/qtcreator/mersdk.xml")
        );
        assert_eq!(
            config.global_settings_file(),
            PathBuf::from("/opt/sdk/QtProject/qtcreator/mersdk.xml")
        );
        assert_eq!(
            config.sdk_tools_directory(),
            PathBuf::from("/home/u/.config/QtProject/mer-sdk-tools")
        );
        assert_eq!(
            config.global_sdk_tools_directory(),
            PathBuf::from("/opt/sdk/QtProject/mer-sdk-tools")
        );
    }

    #[test]
    fn test_json_roundtrip_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mersdk.json");
        fs::write(
            &path,
            r#"{ "settings_root": "/a", "global_settings_root": "/b" }"#,
        )
        .unwrap();

        let config = ManagerConfig::load(&path).unwrap();
        assert_eq!(config.settings_file_name, MER_SDK_FILENAME);
        assert_eq!(config.tools_dir_name, MER_SDK_TOOLS);

        config.save(&path).unwrap();
        assert_eq!(ManagerConfig::load(&path).unwrap(), config);
    }
}
