//! Virtualization backend seam
//!
//! The manager never talks to VirtualBox itself. Hosts hand in a backend that
//! knows how to look up a running build engine.

use std::path::PathBuf;
use thiserror::Error;

/// Live connection details of a build engine virtual machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualMachineInfo {
    /// Forwarded SSH port
    pub ssh_port: u16,
    /// Forwarded web port
    pub www_port: u16,
    /// Host folder shared as the engine home
    pub shared_home: PathBuf,
    /// Host folder shared as the targets root
    pub shared_targets: PathBuf,
    /// Host folder shared as the configuration root
    pub shared_config: PathBuf,
    /// Host folder shared as the source root
    pub shared_src: PathBuf,
    /// Host folder shared as the SSH key root
    pub shared_ssh: PathBuf,
}

/// Errors reported by a virtualization backend
#[derive(Error, Debug)]
pub enum VmError {
    /// No virtual machine with that name
    #[error("Virtual machine not found: {0}")]
    NotFound(String),

    /// The backend reported an error
    #[error("Virtualization backend failed: {0}")]
    Backend(String),

    /// Talking to the backend failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of live virtual machine information
pub trait VirtualMachineBackend {
    /// Query the backend for a virtual machine's ports and shared folders
    fn fetch_info(&self, vm_name: &str) -> Result<VirtualMachineInfo, VmError>;
}
