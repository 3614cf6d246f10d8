//! `devices.xml` descriptor writer.
//!
//! SDK tooling inside each build engine reads `devices.xml` from the shared
//! configuration folder to learn which devices and emulators exist.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::model::{Device, DeviceKind};
use crate::constants::{DEVICE_TYPE_REAL, DEVICE_TYPE_VBOX, MER_DEVICES_FILENAME, MER_ENGINE_SUBNET};
use crate::fsutil::write_atomic;
use crate::sdk::{SdkRecord, SdkRegistry};

/// Errors that can occur while writing a descriptor
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// XML serialization failed
    #[error("XML writing error: {0}")]
    XmlError(#[from] quick_xml::Error),
    /// I/O failure while rendering
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// The descriptor file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// Descriptor path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// One device entry of the descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceRecord {
    /// Physical device
    Hardware {
        /// Device name
        name: String,
        /// Host name or address
        ip: String,
        /// Key path relative to the device's shared SSH folder
        ssh_key_path: String,
    },
    /// Emulator
    Emulator {
        /// Device name
        name: String,
        /// Emulator MAC address
        mac: String,
        /// Last character of the MAC address
        index: String,
        /// Emulator network prefix
        subnet: String,
        /// Key path relative to the emulator's shared config folder
        ssh_key_path: String,
    },
}

impl DeviceRecord {
    /// Snapshot a device. `None` for devices the Mer factory does not handle.
    pub fn from_device(device: &Device) -> Option<Self> {
        match &device.kind {
            DeviceKind::Hardware {
                host,
                private_key_file,
                shared_ssh_path,
            } => Some(DeviceRecord::Hardware {
                name: device.display_name.clone(),
                ip: host.clone(),
                ssh_key_path: relative_key_path(private_key_file, shared_ssh_path),
            }),
            DeviceKind::Emulator {
                mac,
                subnet,
                private_key_file,
                shared_config_path,
            } => Some(DeviceRecord::Emulator {
                name: device.display_name.clone(),
                mac: mac.clone(),
                // Kept for compatibility with existing descriptor readers
                index: mac.chars().last().map(String::from).unwrap_or_default(),
                subnet: subnet.clone(),
                ssh_key_path: relative_key_path(private_key_file, shared_config_path),
            }),
            DeviceKind::Other { .. } => None,
        }
    }

    /// Device display name
    pub fn name(&self) -> &str {
        match self {
            DeviceRecord::Hardware { name, .. } | DeviceRecord::Emulator { name, .. } => name,
        }
    }

    /// `real` or `vbox`
    pub fn type_tag(&self) -> &'static str {
        match self {
            DeviceRecord::Hardware { .. } => DEVICE_TYPE_REAL,
            DeviceRecord::Emulator { .. } => DEVICE_TYPE_VBOX,
        }
    }

    /// Key path relative to the device's shared folder
    pub fn ssh_key_path(&self) -> &str {
        match self {
            DeviceRecord::Hardware { ssh_key_path, .. }
            | DeviceRecord::Emulator { ssh_key_path, .. } => ssh_key_path,
        }
    }
}

/// Outcome of rewriting the descriptors of every SDK
#[derive(Debug, Default)]
pub struct DescriptorReport {
    /// Files written
    pub written: Vec<PathBuf>,
    /// SDKs without a shared config folder
    pub skipped: Vec<String>,
    /// SDKs whose file could not be written
    pub failed: Vec<(String, DescriptorError)>,
}

impl DescriptorReport {
    /// True if no SDK's file failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Strip the shared folder prefix from a key path.
///
/// Empty when no shared folder is configured. A key outside the shared
/// folder keeps its full path.
pub fn relative_key_path(key_file: &Path, shared: &Path) -> String {
    if shared.as_os_str().is_empty() {
        return String::new();
    }
    let path = key_file.strip_prefix(shared).unwrap_or(key_file);
    path.to_string_lossy().replace('\\', "/")
}

/// Snapshot every Mer device
pub fn build_device_records(devices: &[Device]) -> Vec<DeviceRecord> {
    devices.iter().filter_map(DeviceRecord::from_device).collect()
}

/// Render the descriptor for one build engine
pub fn write_descriptor_xml(
    engine_name: &str,
    devices: &[DeviceRecord],
) -> Result<String, DescriptorError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("devices")))?;

    let mut engine = BytesStart::new("engine");
    engine.push_attribute(("name", engine_name));
    engine.push_attribute(("type", DEVICE_TYPE_VBOX));
    writer.write_event(Event::Start(engine))?;
    write_text_element(&mut writer, "subnet", MER_ENGINE_SUBNET)?;
    writer.write_event(Event::End(BytesEnd::new("engine")))?;

    for device in devices {
        write_device(&mut writer, device)?;
    }

    writer.write_event(Event::End(BytesEnd::new("devices")))?;

    let result = writer.into_inner();
    Ok(String::from_utf8_lossy(&result).to_string())
}

fn write_device<W: Write>(
    writer: &mut Writer<W>,
    device: &DeviceRecord,
) -> Result<(), DescriptorError> {
    let mut elem = BytesStart::new("device");
    elem.push_attribute(("name", device.name()));
    elem.push_attribute(("type", device.type_tag()));
    writer.write_event(Event::Start(elem))?;

    match device {
        DeviceRecord::Hardware { ip, .. } => {
            write_text_element(writer, "ip", ip)?;
        }
        DeviceRecord::Emulator {
            mac, index, subnet, ..
        } => {
            write_text_element(writer, "mac", mac)?;
            write_text_element(writer, "index", index)?;
            write_text_element(writer, "subnet", subnet)?;
        }
    }
    write_text_element(writer, "sshkeypath", device.ssh_key_path())?;

    writer.write_event(Event::End(BytesEnd::new("device")))?;
    Ok(())
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), DescriptorError> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(name)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Write the descriptor of a single SDK. `Ok(None)` when the SDK has no
/// shared config folder.
pub fn write_descriptor(
    sdk: &SdkRecord,
    devices: &[DeviceRecord],
) -> Result<Option<PathBuf>, DescriptorError> {
    if sdk.shared_config_path.as_os_str().is_empty() {
        return Ok(None);
    }
    let path = sdk.shared_config_path.join(MER_DEVICES_FILENAME);
    let xml = write_descriptor_xml(&sdk.vm_name, devices)?;
    write_atomic(&path, xml.as_bytes(), false).map_err(|source| DescriptorError::WriteFailed {
        path: path.clone(),
        source,
    })?;
    Ok(Some(path))
}

/// Write the descriptor of every registered SDK.
///
/// A failure for one SDK is recorded and the remaining SDKs are still
/// written.
pub fn write_descriptors(sdks: &SdkRegistry, devices: &[DeviceRecord]) -> DescriptorReport {
    let mut report = DescriptorReport::default();
    for sdk in sdks.iter() {
        match write_descriptor(sdk, devices) {
            Ok(Some(path)) => {
                tracing::debug!("Wrote {} for '{}'", path.display(), sdk.vm_name);
                report.written.push(path);
            }
            Ok(None) => {
                tracing::debug!("SDK '{}' has no shared config folder", sdk.vm_name);
                report.skipped.push(sdk.vm_name.clone());
            }
            Err(e) => {
                tracing::warn!("Could not update devices of '{}': {}", sdk.vm_name, e);
                report.failed.push((sdk.vm_name.clone(), e));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn emulator() -> Device {
        Device::new(
            "SailfishOS Emulator",
            DeviceKind::Emulator {
                mac: "08:00:27:7C:A1:AF".into(),
                subnet: "10.220.220".into(),
                private_key_file: "/sdk/vmshare/ssh/private_keys/SailfishOS_Emulator/nemo".into(),
                shared_config_path: "/sdk/vmshare".into(),
            },
        )
    }

    #[test]
    fn test_relative_key_path() {
        assert_eq!(
            relative_key_path(Path::new("/home/user/.ssh/keys/id_rsa"), Path::new("/home/user/.ssh")),
            "keys/id_rsa"
        );
        assert_eq!(
            relative_key_path(Path::new("/elsewhere/id_rsa"), Path::new("/home/user/.ssh")),
            "/elsewhere/id_rsa"
        );
        assert_eq!(relative_key_path(Path::new("/a/id_rsa"), Path::new("")), "");
    }

    #[test]
    fn test_emulator_record() {
        let record = DeviceRecord::from_device(&emulator()).unwrap();
        assert_eq!(
            record,
            DeviceRecord::Emulator {
                name: "SailfishOS Emulator".into(),
                mac: "08:00:27:7C:A1:AF".into(),
                index: "F".into(),
                subnet: "10.220.220".into(),
                ssh_key_path: "ssh/private_keys/SailfishOS_Emulator/nemo".into(),
            }
        );
        assert_eq!(record.type_tag(), "vbox");
    }

    #[test]
    fn test_other_devices_skipped() {
        let desktop = Device::new(
            "Local PC",
            DeviceKind::Other {
                type_id: "Desktop".into(),
            },
        );
        assert!(build_device_records(&[desktop, emulator()]).len() == 1);
    }

    #[test]
    fn test_descriptor_xml() {
        let records = build_device_records(&[emulator()]);
        let xml = write_descriptor_xml("MerSDK", &records).unwrap();
        assert!(xml.contains(r#"<engine name="MerSDK" type="vbox">"#));
        assert!(xml.contains("<subnet>10.220.220</subnet>"));
        assert!(xml.contains(r#"<device name="SailfishOS Emulator" type="vbox">"#));
        assert!(xml.contains("<index>F</index>"));
        assert!(xml.contains("<mac>08:00:27:7C:A1:AF</mac>"));
    }
}
