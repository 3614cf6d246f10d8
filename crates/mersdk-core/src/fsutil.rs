//! Crash-safe file replacement.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `data` to `path` through a temp file in the same directory and an
/// atomic rename. When `owner_only` is set the temp file is restricted to
/// owner read/write before any data lands in it.
pub(crate) fn write_atomic(path: &Path, data: &[u8], owner_only: bool) -> io::Result<()> {
    let tmp = staged(path, data, owner_only)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Like [`write_atomic`], but fails with [`io::ErrorKind::AlreadyExists`]
/// instead of replacing a file that is already at `path`, even one created
/// after this call started.
pub(crate) fn write_new_atomic(path: &Path, data: &[u8], owner_only: bool) -> io::Result<()> {
    let tmp = staged(path, data, owner_only)?;
    tmp.persist_noclobber(path).map_err(|e| e.error)?;
    Ok(())
}

fn staged(path: &Path, data: &[u8], owner_only: bool) -> io::Result<NamedTempFile> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = if owner_only { 0o600 } else { 0o644 };
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = owner_only;

    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}
