//! Host-wide advisory lock serializing projadm invocations.
//!
//! The lock is an exclusive `flock`-style lock on a file under the system
//! temp directory. Acquisition never waits: a held lock is reported as
//! [`AdminError::LockContention`] straight away. The lock is released when
//! the [`InstanceLock`] guard is dropped, whichever way the protected region
//! is left. The lock file itself is left in place.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs4::FileExt;
use tracing::debug;

use crate::error::{fs_err, AdminError};

/// Guard for the instance lock; unlocks on drop.
#[derive(Debug)]
pub struct InstanceLock {
    file: File,
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock at `path` with zero timeout.
    pub fn try_acquire(path: &Path) -> Result<Self, AdminError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| fs_err("create", parent, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| fs_err("open lock", path, e))?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!("acquired lock {}", path.display());
                Ok(Self {
                    file,
                    path: path.to_path_buf(),
                })
            }
            Err(e) if is_contended(&e) => Err(AdminError::LockContention {
                path: path.to_path_buf(),
            }),
            Err(e) => Err(fs_err("lock", path, e)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("released lock {}", self.path.display());
    }
}

/// Unix reports a held lock as `EWOULDBLOCK`; Windows reports
/// `ERROR_LOCK_VIOLATION`, which has no `ErrorKind` of its own.
fn is_contended(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::WouldBlock
        || (err.raw_os_error().is_some()
            && err.raw_os_error() == fs4::lock_contended_error().raw_os_error())
}
