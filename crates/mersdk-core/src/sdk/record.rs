//! SDK build engine record

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::*;
use crate::settings::{Value, ValueMap};

/// One configured build engine (a virtual machine running the Mer SDK).
///
/// The virtual machine name is the record's identity inside an
/// [`SdkRegistry`](super::SdkRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkRecord {
    /// Virtual machine name (unique key)
    pub vm_name: String,

    /// Host port forwarded to the engine's SSH server
    pub ssh_port: u16,

    /// Host port forwarded to the engine's web server
    pub www_port: u16,

    /// Host name used to reach the engine
    pub host: String,

    /// User name inside the engine
    pub user_name: String,

    /// Private key used to log into the engine
    pub private_key_file: PathBuf,

    /// Host folder mounted as the engine's home
    pub shared_home_path: PathBuf,

    /// Host folder holding the installed targets
    pub shared_targets_path: PathBuf,

    /// Host folder holding shared configuration (devices.xml lives here)
    pub shared_config_path: PathBuf,

    /// Host folder mounted as the source root
    pub shared_src_path: PathBuf,

    /// Host folder holding SSH keys shared with the engine
    pub shared_ssh_path: PathBuf,

    /// Names of the build targets installed in the engine
    pub targets: Vec<String>,

    /// Start the virtual machine without a window
    pub headless: bool,
}

/// A stored SDK map that did not describe a usable record.
///
/// Carries the record as far as it could be read so callers can keep it
/// around for the user to fix.
#[derive(Error, Debug)]
#[error("SDK '{}' is configured incorrectly: {}", .record.vm_name, .problems.join("; "))]
pub struct RecordMapError {
    /// Best-effort record
    pub record: Box<SdkRecord>,
    /// What was wrong with the map
    pub problems: Vec<String>,
}

impl SdkRecord {
    /// Create a record for a virtual machine with the default host and user
    pub fn new(vm_name: impl Into<String>) -> Self {
        Self {
            vm_name: vm_name.into(),
            host: MER_SDK_DEFAULTHOST.to_string(),
            user_name: MER_SDK_DEFAULTUSER.to_string(),
            ..Self::default()
        }
    }

    /// True if every shared folder is configured
    pub fn has_shared_paths(&self) -> bool {
        [
            &self.shared_home_path,
            &self.shared_targets_path,
            &self.shared_config_path,
            &self.shared_src_path,
            &self.shared_ssh_path,
        ]
        .iter()
        .all(|p| !p.as_os_str().is_empty())
    }

    /// Structural validity: named and with all shared folders set.
    ///
    /// Whether each target also has its toolchain, Qt version and kit is
    /// checked by [`crate::reconcile::is_sdk_complete`].
    pub fn is_valid(&self) -> bool {
        !self.vm_name.is_empty() && self.has_shared_paths()
    }

    /// Check if a target is installed in this engine
    pub fn has_target(&self, target_name: &str) -> bool {
        self.targets.iter().any(|t| t == target_name)
    }

    /// Serialize into a settings map. Returns `None` for an unnamed record,
    /// which cannot be stored.
    pub fn to_map(&self) -> Option<ValueMap> {
        if self.vm_name.is_empty() {
            return None;
        }

        let mut map = ValueMap::new();
        map.insert(VIRTUAL_MACHINE.to_string(), Value::from(self.vm_name.as_str()));
        map.insert(SSH_PORT.to_string(), Value::from(self.ssh_port));
        map.insert(WWW_PORT.to_string(), Value::from(self.www_port));
        map.insert(HOST.to_string(), Value::from(self.host.as_str()));
        map.insert(USERNAME.to_string(), Value::from(self.user_name.as_str()));
        map.insert(PRIVATE_KEY_FILE.to_string(), path_value(&self.private_key_file));
        map.insert(SHARED_HOME.to_string(), path_value(&self.shared_home_path));
        map.insert(SHARED_TARGET.to_string(), path_value(&self.shared_targets_path));
        map.insert(SHARED_CONFIG.to_string(), path_value(&self.shared_config_path));
        map.insert(SHARED_SRC.to_string(), path_value(&self.shared_src_path));
        map.insert(SHARED_SSH.to_string(), path_value(&self.shared_ssh_path));
        map.insert(TARGETS.to_string(), Value::from(self.targets.clone()));
        map.insert(HEADLESS.to_string(), Value::from(self.headless));
        Some(map)
    }

    /// Read a record from a settings map.
    ///
    /// Missing optional fields fall back to defaults. Anything that leaves
    /// the record unusable is reported through [`RecordMapError`], which still
    /// holds everything that could be read.
    pub fn from_map(map: &ValueMap) -> Result<Self, RecordMapError> {
        let mut problems = Vec::new();
        let mut record = SdkRecord::default();

        match map.get(VIRTUAL_MACHINE).and_then(Value::as_str) {
            Some(name) if !name.is_empty() => record.vm_name = name.to_string(),
            _ => problems.push("missing virtual machine name".to_string()),
        }

        record.ssh_port = read_port(map, SSH_PORT, &mut problems);
        record.www_port = read_port(map, WWW_PORT, &mut problems);
        record.host = read_string(map, HOST, &mut problems);
        record.user_name = read_string(map, USERNAME, &mut problems);
        record.private_key_file = PathBuf::from(read_string(map, PRIVATE_KEY_FILE, &mut problems));
        record.shared_home_path = PathBuf::from(read_string(map, SHARED_HOME, &mut problems));
        record.shared_targets_path = PathBuf::from(read_string(map, SHARED_TARGET, &mut problems));
        record.shared_config_path = PathBuf::from(read_string(map, SHARED_CONFIG, &mut problems));
        record.shared_src_path = PathBuf::from(read_string(map, SHARED_SRC, &mut problems));
        record.shared_ssh_path = PathBuf::from(read_string(map, SHARED_SSH, &mut problems));

        match map.get(TARGETS) {
            None => {}
            Some(v) => match v.to_string_list() {
                Some(targets) => record.targets = targets,
                None => problems.push(format!("{} is not a list of names", TARGETS)),
            },
        }

        match map.get(HEADLESS) {
            None => {}
            Some(v) => match v.to_bool() {
                Some(b) => record.headless = b,
                None => problems.push(format!("{} is not a boolean", HEADLESS)),
            },
        }

        if !record.has_shared_paths() {
            problems.push("shared folders are not configured".to_string());
        }

        if problems.is_empty() {
            Ok(record)
        } else {
            Err(RecordMapError {
                record: Box::new(record),
                problems,
            })
        }
    }
}

fn path_value(path: &Path) -> Value {
    Value::String(path.to_string_lossy().to_string())
}

fn read_string(map: &ValueMap, key: &str, problems: &mut Vec<String>) -> String {
    match map.get(key) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Int(i)) => i.to_string(),
        Some(_) => {
            problems.push(format!("{} is not a string", key));
            String::new()
        }
    }
}

fn read_port(map: &ValueMap, key: &str, problems: &mut Vec<String>) -> u16 {
    let Some(value) = map.get(key) else {
        problems.push(format!("missing {}", key));
        return 0;
    };
    match value.to_int().map(u16::try_from) {
        Some(Ok(port)) => port,
        _ => {
            problems.push(format!("{} is not a valid port", key));
            0
        }
    }
}
