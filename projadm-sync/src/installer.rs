//! Installing staged files over the live configuration.
//!
//! The staged source is copied byte for byte into a fresh file next to the
//! destination, which is then renamed over it. The staged source itself is
//! never renamed or linked, so removing it afterwards leaves the installed
//! copy intact. A failed copy leaves the destination as it was, and readers
//! see either the old or the new contents, never a partial file.
//!
//! The replacement takes the destination's existing permissions.

use std::fs::{self, File, Permissions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use projadm_core::RunContext;

use crate::error::{fs_err, AdminError};

/// Outcome of an [`install`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// The destination now holds the source's bytes.
    Installed { path: PathBuf },
    /// Dry-run mode: the destination *would* have been overwritten.
    WouldInstall { path: PathBuf },
}

impl InstallResult {
    pub fn path(&self) -> &Path {
        match self {
            InstallResult::Installed { path } | InstallResult::WouldInstall { path } => path,
        }
    }
}

/// Copy the contents of `src` over `dst`.
///
/// In dry-run mode nothing is touched and the intent is logged.
pub fn install(ctx: &RunContext, src: &Path, dst: &Path) -> Result<InstallResult, AdminError> {
    if ctx.is_dry_run() {
        debug!(
            "{}not copying {} to {}",
            ctx.prefix(),
            src.display(),
            dst.display()
        );
        return Ok(InstallResult::WouldInstall {
            path: dst.to_path_buf(),
        });
    }

    debug!("copying {} to {}", src.display(), dst.display());
    if let Err(e) = copy_contents(src, dst) {
        error!("failed to copy {} to {} ({})", src.display(), dst.display(), kind_of(&e));
        return Err(e);
    }

    Ok(InstallResult::Installed {
        path: dst.to_path_buf(),
    })
}

fn copy_contents(src: &Path, dst: &Path) -> Result<(), AdminError> {
    let mut reader = File::open(src).map_err(|e| fs_err("read", src, e))?;

    let dir = match dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Dropped (and removed) on any early return below.
    let mut sibling = tempfile::Builder::new()
        .prefix(".projadm-install.")
        .tempfile_in(dir)
        .map_err(|e| fs_err("create temporary file in", dir, e))?;

    io::copy(&mut reader, sibling.as_file_mut())
        .map_err(|e| fs_err("copy to", sibling.path(), e))?;
    sibling
        .as_file()
        .sync_all()
        .map_err(|e| fs_err("flush", sibling.path(), e))?;

    let permissions = match fs::metadata(dst) {
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => default_permissions(sibling.as_file())
            .map_err(|e| fs_err("inspect", sibling.path(), e))?,
        Err(e) => return Err(fs_err("inspect", dst, e)),
    };
    sibling
        .as_file()
        .set_permissions(permissions)
        .map_err(|e| fs_err("set permissions on", sibling.path(), e))?;

    sibling
        .persist(dst)
        .map_err(|e| fs_err("replace", dst, e.error))?;
    Ok(())
}

/// Mode for a destination that does not exist yet. Temporary files are
/// created owner-only, which must not carry over to the live file.
#[cfg(unix)]
fn default_permissions(_file: &File) -> io::Result<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(file: &File) -> io::Result<Permissions> {
    Ok(file.metadata()?.permissions())
}

fn kind_of(err: &AdminError) -> String {
    match err {
        AdminError::Filesystem { kind, .. } => kind.to_string(),
        other => other.to_string(),
    }
}
