//! Domain types shared by every projadm crate.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Name of a project as registered with the indexing service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(pub String);

impl ProjectName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty name would address the whole source root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Execution mode
// ---------------------------------------------------------------------------

/// Whether side effects are carried out or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    #[default]
    Apply,
    DryRun,
}

impl ExecMode {
    /// `--noop` on the command line maps to [`ExecMode::DryRun`].
    pub fn from_noop(noop: bool) -> Self {
        if noop {
            ExecMode::DryRun
        } else {
            ExecMode::Apply
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecMode::Apply => write!(f, "apply"),
            ExecMode::DryRun => write!(f, "dry-run"),
        }
    }
}

/// Per-invocation context handed to every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunContext {
    pub mode: ExecMode,
}

impl RunContext {
    pub fn new(mode: ExecMode) -> Self {
        Self { mode }
    }

    pub fn apply() -> Self {
        Self::new(ExecMode::Apply)
    }

    pub fn dry_run() -> Self {
        Self::new(ExecMode::DryRun)
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == ExecMode::DryRun
    }

    /// Log prefix marking simulated actions.
    pub fn prefix(&self) -> &'static str {
        if self.is_dry_run() {
            "[dry-run] "
        } else {
            ""
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// How to run the external configuration merge tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    /// Merge tool executable.
    pub program: PathBuf,
    /// Leading arguments passed before the positional ones (e.g. `-D`).
    pub extra_args: Vec<String>,
    /// Jar archive the merge tool runs.
    pub jar: PathBuf,
    /// Read-only configuration overlaid on every refresh.
    pub ro_config: PathBuf,
    /// Java binary, when the default one should not be used.
    pub java: Option<PathBuf>,
}

impl MergeSettings {
    /// Arguments for merging `staged` with the read-only configuration:
    /// `[extra...] -a <jar> <ro_config> <staged> [-j <java>]`.
    pub fn arguments(&self, staged: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.extra_args.iter().map(OsString::from).collect();
        args.push("-a".into());
        args.push(self.jar.clone().into_os_string());
        args.push(self.ro_config.clone().into_os_string());
        args.push(staged.as_os_str().to_owned());
        if let Some(java) = &self.java {
            args.push("-j".into());
            args.push(java.clone().into_os_string());
        }
        args
    }
}

/// Everything a driver invocation needs to know about the instance it manages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSettings {
    /// Instance base directory; the live configuration is `<base>/etc/configuration.xml`.
    pub base_dir: PathBuf,
    /// Present when a read-only configuration must be merged on refresh.
    pub merge: Option<MergeSettings>,
    /// Directory staged configuration files are created in.
    pub staging_dir: PathBuf,
    /// Host-wide lock serializing invocations.
    pub lock_path: PathBuf,
    /// Push the refreshed local configuration back to the service at the end.
    pub upload: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
