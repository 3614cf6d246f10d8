//! Error types for SSH key provisioning

use std::path::PathBuf;
use thiserror::Error;

/// Errors from [`SshKeyProvisioner::generate_keypair`](super::SshKeyProvisioner::generate_keypair)
#[derive(Error, Debug)]
pub enum KeyProvisioningError {
    /// Empty key path
    #[error("Key path is empty")]
    EmptyPath,

    /// A private key is already at the path
    #[error("File '{0}' exists")]
    AlreadyExists(PathBuf),

    /// The parent directory could not be created
    #[error("Could not create directory {path}: {source}")]
    CreateDirectory {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The RSA generator failed
    #[error("Key generation failed: {0}")]
    Generation(String),

    /// PEM or OpenSSH encoding failed
    #[error("Key encoding failed: {0}")]
    Encoding(String),

    /// A key file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Errors from [`authorize_public_key`](super::authorize_public_key)
#[derive(Error, Debug)]
pub enum AuthorizationError {
    /// The public key file does not exist
    #[error("File {0} is missing")]
    MissingPublicKey(PathBuf),

    /// The public key file has no content
    #[error("Public key file {0} is empty")]
    EmptyPublicKey(PathBuf),

    /// A key file could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The parent directory could not be created
    #[error("Could not create directory {path}: {source}")]
    CreateDirectory {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The key is already in `authorized_keys`
    #[error("Key already authorized: {public_key} already in {authorized_keys}")]
    AlreadyAuthorized {
        /// Public key file
        public_key: PathBuf,
        /// `authorized_keys` file
        authorized_keys: PathBuf,
    },

    /// A key file could not be written
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl AuthorizationError {
    /// The key was already present. Informational rather than a failure of
    /// the overall setup.
    pub fn is_already_authorized(&self) -> bool {
        matches!(self, AuthorizationError::AlreadyAuthorized { .. })
    }
}
