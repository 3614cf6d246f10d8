//! RPM package hand-off for the upload-and-install deploy step
//!
//! The packaging step produces one or more package files; the deploy step
//! uploads the first one to the device user's home directory and installs it
//! from there.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Display name of the deploy step
pub const DEPLOY_STEP_NAME: &str = "Deploy Local Rpm package via SFTP upload";

/// Errors preparing a deployment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// Packaging produced nothing
    #[error("No Rpm package build step found.")]
    NoPackageStep,

    /// The first package is not an RPM
    #[error("No package to deploy found in {}", .0.display())]
    NoPackage(PathBuf),
}

/// Directory on the device a package is uploaded to
pub fn upload_dir(user_name: &str) -> String {
    if user_name == "root" {
        "/root".to_string()
    } else {
        format!("/home/{}", user_name)
    }
}

/// What to upload and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Package on the host
    pub local_package: PathBuf,
    /// Upload directory on the device
    pub upload_dir: String,
    /// Full path of the uploaded package on the device
    pub remote_path: String,
}

impl DeployPlan {
    /// Plan the upload of the first package produced by packaging
    pub fn prepare(packages: &[PathBuf], user_name: &str) -> Result<Self, DeployError> {
        let package = packages.first().ok_or(DeployError::NoPackageStep)?;
        if !is_rpm(package) {
            return Err(DeployError::NoPackage(package.clone()));
        }

        let upload_dir = upload_dir(user_name);
        let file_name = package
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| DeployError::NoPackage(package.clone()))?;
        let remote_path = format!("{}/{}", upload_dir, file_name);

        tracing::debug!("Deploying {} to {}", package.display(), remote_path);
        Ok(Self {
            local_package: package.clone(),
            upload_dir,
            remote_path,
        })
    }
}

fn is_rpm(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".rpm")
}
