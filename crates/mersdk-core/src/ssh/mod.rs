//! SSH key provisioning
//!
//! Build engines and devices are reached over SSH with keys the IDE creates
//! itself. This module generates those keypairs and installs public keys
//! into `authorized_keys` files on shared folders.

mod authorize;
mod error;
mod keygen;

pub use authorize::{authorize_public_key, AuthorizeOutcome};
pub use error::{AuthorizationError, KeyProvisioningError};
pub use keygen::{
    public_key_path, KeyGenerator, KeyMaterial, RsaKeyGenerator, SshKeyProvisioner, RSA_KEY_BITS,
};
