//! Error types for projadm-sync.

use std::path::PathBuf;

use thiserror::Error;

use projadm_core::RemoteError;

/// Why a filesystem operation failed, kept apart for the log message only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsFailure {
    Permission,
    Io,
}

impl std::fmt::Display for FsFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsFailure::Permission => write!(f, "permissions"),
            FsFailure::Io => write!(f, "I/O"),
        }
    }
}

/// Every way an invocation can end early. None of them is recovered from.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Conflicting or missing options.
    #[error("{0}")]
    Usage(String),

    /// A required input is absent (config file, project name, source root).
    #[error("{0}")]
    Precondition(String),

    /// The configuration service failed or returned nothing.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// An external command exited non-zero or could not be run.
    #[error("{message}: {command} ({status})")]
    Command {
        message: String,
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// A file could not be copied, written or removed.
    #[error("failed to {action} {path} ({kind}): {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        kind: FsFailure,
        #[source]
        source: std::io::Error,
    },

    /// Another invocation holds the instance lock.
    #[error("already running (lock held: {})", path.display())]
    LockContention { path: PathBuf },
}

/// Convenience constructor for [`AdminError::Filesystem`].
pub(crate) fn fs_err(
    action: &'static str,
    path: impl Into<PathBuf>,
    source: std::io::Error,
) -> AdminError {
    let kind = if source.kind() == std::io::ErrorKind::PermissionDenied {
        FsFailure::Permission
    } else {
        FsFailure::Io
    };
    AdminError::Filesystem {
        action,
        path: path.into(),
        kind,
        source,
    }
}
