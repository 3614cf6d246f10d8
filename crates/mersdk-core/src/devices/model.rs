//! Devices known to the host's device manager

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::kits::{DeviceId, DeviceType};

/// Type-specific device details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Physical ARM device reached over the network
    Hardware {
        /// Host name or IP address
        host: String,
        /// Key used to log in
        private_key_file: PathBuf,
        /// Folder the build engine sees the device keys through
        shared_ssh_path: PathBuf,
    },
    /// Emulator virtual machine
    Emulator {
        /// MAC address of the emulator's internal interface
        mac: String,
        /// Subnet of the internal network
        subnet: String,
        /// Key used to log in
        private_key_file: PathBuf,
        /// Folder the build engine sees the emulator config through
        shared_config_path: PathBuf,
    },
    /// A device the Mer factory does not handle
    Other {
        /// Host type identifier
        type_id: String,
    },
}

/// A device registered with the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Host-assigned id
    pub id: DeviceId,
    /// Name shown to the user and written to `devices.xml`
    pub display_name: String,
    /// Type-specific connection details
    pub kind: DeviceKind,
}

impl Device {
    /// Create a device with a fresh id
    pub fn new(display_name: impl Into<String>, kind: DeviceKind) -> Self {
        Self {
            id: DeviceId::generate(),
            display_name: display_name.into(),
            kind,
        }
    }

    /// Device type used by kits
    pub fn device_type(&self) -> DeviceType {
        match &self.kind {
            DeviceKind::Hardware { .. } => DeviceType::MerArm,
            DeviceKind::Emulator { .. } => DeviceType::MerEmulator,
            DeviceKind::Other { type_id } => DeviceType::Other(type_id.clone()),
        }
    }
}

/// The host's device manager
pub trait DeviceRegistry {
    /// All devices, in the host's order
    fn devices(&self) -> Vec<Device>;

    /// Look up a device
    fn device(&self, id: &DeviceId) -> Option<Device>;
}

/// [`DeviceRegistry`] kept in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeviceRegistry {
    devices: Vec<Device>,
}

impl InMemoryDeviceRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device, replacing one with the same id
    pub fn add(&mut self, device: Device) -> DeviceId {
        let id = device.id.clone();
        self.devices.retain(|d| d.id != id);
        self.devices.push(device);
        id
    }

    /// Remove a device
    pub fn remove(&mut self, id: &DeviceId) -> Option<Device> {
        let pos = self.devices.iter().position(|d| &d.id == id)?;
        Some(self.devices.remove(pos))
    }
}

impl DeviceRegistry for InMemoryDeviceRegistry {
    fn devices(&self) -> Vec<Device> {
        self.devices.clone()
    }

    fn device(&self, id: &DeviceId) -> Option<Device> {
        self.devices.iter().find(|d| &d.id == id).cloned()
    }
}
