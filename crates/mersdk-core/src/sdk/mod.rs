//! Build engine records and their registry

mod record;
mod registry;
mod vm;

pub use record::{RecordMapError, SdkRecord};
pub use registry::SdkRegistry;
pub use vm::{VirtualMachineBackend, VirtualMachineInfo, VmError};
