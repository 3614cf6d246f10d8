//! Devices and the `devices.xml` descriptor

mod descriptor;
mod model;

pub use crate::kits::DeviceId;
pub use descriptor::{
    build_device_records, relative_key_path, write_descriptor, write_descriptor_xml,
    write_descriptors, DescriptorError, DescriptorReport, DeviceRecord,
};
pub use model::{Device, DeviceKind, DeviceRegistry, InMemoryDeviceRegistry};
