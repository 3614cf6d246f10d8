//! `authorized_keys` maintenance

use std::fs;
use std::path::Path;

use super::error::AuthorizationError;
use crate::fsutil::write_atomic;

/// How a key was authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizeOutcome {
    /// `authorized_keys` did not exist and now holds only this key
    Created,
    /// The key was appended to an existing file
    Appended,
}

/// Add the public key stored at `public_key_path` to `authorized_keys_path`.
///
/// A key that is already present is reported as
/// [`AuthorizationError::AlreadyAuthorized`] and the file is left alone, so
/// calling this repeatedly with the same key is harmless.
pub fn authorize_public_key(
    authorized_keys_path: &Path,
    public_key_path: &Path,
) -> Result<AuthorizeOutcome, AuthorizationError> {
    if !public_key_path.exists() {
        return Err(AuthorizationError::MissingPublicKey(
            public_key_path.to_path_buf(),
        ));
    }

    let public_key = fs::read(public_key_path).map_err(|source| AuthorizationError::ReadFailed {
        path: public_key_path.to_path_buf(),
        source,
    })?;
    if public_key.is_empty() {
        return Err(AuthorizationError::EmptyPublicKey(
            public_key_path.to_path_buf(),
        ));
    }

    if let Some(dir) = authorized_keys_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        fs::create_dir_all(dir).map_err(|source| AuthorizationError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    if !authorized_keys_path.exists() {
        write_atomic(authorized_keys_path, &public_key, true).map_err(|source| {
            AuthorizationError::WriteFailed {
                path: authorized_keys_path.to_path_buf(),
                source,
            }
        })?;
        tracing::debug!("Created {}", authorized_keys_path.display());
        return Ok(AuthorizeOutcome::Created);
    }

    let mut existing =
        fs::read(authorized_keys_path).map_err(|source| AuthorizationError::ReadFailed {
            path: authorized_keys_path.to_path_buf(),
            source,
        })?;

    if contains_bytes(&existing, &public_key) {
        return Err(AuthorizationError::AlreadyAuthorized {
            public_key: public_key_path.to_path_buf(),
            authorized_keys: authorized_keys_path.to_path_buf(),
        });
    }

    existing.push(b'\n');
    existing.extend_from_slice(&public_key);
    write_atomic(authorized_keys_path, &existing, true).map_err(|source| {
        AuthorizationError::WriteFailed {
            path: authorized_keys_path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!("Appended key to {}", authorized_keys_path.display());
    Ok(AuthorizeOutcome::Appended)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_public_key() {
        let dir = TempDir::new().unwrap();
        let err = authorize_public_key(
            &dir.path().join("authorized_keys"),
            &dir.path().join("id_rsa.pub"),
        )
        .unwrap_err();
        assert!(matches!(err, AuthorizationError::MissingPublicKey(_)));
        assert!(!err.is_already_authorized());
    }

    #[test]
    fn test_empty_public_key() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("id_rsa.pub");
        fs::write(&public, "").unwrap();
        let err = authorize_public_key(&dir.path().join("authorized_keys"), &public).unwrap_err();
        assert!(matches!(err, AuthorizationError::EmptyPublicKey(_)));
    }

    #[test]
    fn test_append_to_existing() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("id_rsa.pub");
        let authorized = dir.path().join("authorized_keys");
        fs::write(&public, "ssh-rsa BBBB new").unwrap();
        fs::write(&authorized, "ssh-rsa AAAA old").unwrap();

        assert_eq!(
            authorize_public_key(&authorized, &public).unwrap(),
            AuthorizeOutcome::Appended
        );
        assert_eq!(
            fs::read_to_string(&authorized).unwrap(),
            "ssh-rsa AAAA old\nssh-rsa BBBB new"
        );
    }
}
