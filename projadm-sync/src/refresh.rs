//! Rebuilding the live configuration file from the running service.
//!
//! ## Refresh protocol
//!
//! 1. Check `<base>/etc/configuration.xml` exists (refresh needs an
//!    initialized instance).
//! 2. Fetch the current configuration from the service (skipped in dry-run).
//! 3. Stage it in a temporary file.
//! 4. Without a read-only configuration, install the staged file. With one,
//!    run the merge tool over the staged file and install its output, staged
//!    in a second temporary file.
//! 5. Staged files are removed when they go out of scope, on every path.
//!
//! The service copy is authoritative. The read-only configuration is merged
//! on every refresh.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use projadm_core::{paths::config_file_path, ConfigService, MergeSettings, RemoteError, RunContext};

use crate::command::{run_command, Invocation};
use crate::error::{fs_err, AdminError};
use crate::installer::{install, InstallResult};

/// Outcome of a [`refresh`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The live configuration was replaced.
    Installed { path: PathBuf, merged: bool },
    /// Dry-run mode: the live configuration *would* have been replaced.
    WouldInstall { path: PathBuf, merged: bool },
}

impl RefreshOutcome {
    fn from_install(result: InstallResult, merged: bool) -> Self {
        match result {
            InstallResult::Installed { path } => RefreshOutcome::Installed { path, merged },
            InstallResult::WouldInstall { path } => RefreshOutcome::WouldInstall { path, merged },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            RefreshOutcome::Installed { path, .. } | RefreshOutcome::WouldInstall { path, .. } => {
                path
            }
        }
    }

    pub fn merged(&self) -> bool {
        match self {
            RefreshOutcome::Installed { merged, .. }
            | RefreshOutcome::WouldInstall { merged, .. } => *merged,
        }
    }
}

/// Replace the configuration under `base_dir` with the service's current one,
/// merged with the read-only configuration when `merge` is given.
pub fn refresh(
    ctx: &RunContext,
    service: &dyn ConfigService,
    base_dir: &Path,
    merge: Option<&MergeSettings>,
    staging_dir: &Path,
) -> Result<RefreshOutcome, AdminError> {
    let main_config = config_file_path(base_dir);
    if !main_config.is_file() {
        return Err(AdminError::Precondition(format!(
            "file {} does not exist",
            main_config.display()
        )));
    }

    let current = if ctx.is_dry_run() {
        None
    } else {
        let config = service.fetch_configuration()?;
        if config.is_empty() {
            return Err(RemoteError::Empty {
                operation: "fetch configuration",
            }
            .into());
        }
        Some(config)
    };

    let staged = stage(staging_dir, "current", current.as_deref())?;
    debug!("temporary file for current config: {}", staged.path().display());

    let Some(merge) = merge else {
        info!("{}Refreshing configuration", ctx.prefix());
        let result = install(ctx, staged.path(), &main_config)?;
        return Ok(RefreshOutcome::from_install(result, false));
    };

    info!(
        "{}Refreshing configuration (merging with read-only config)",
        ctx.prefix()
    );
    let invocation = Invocation::new(&merge.program).args(merge.arguments(staged.path()));
    let merged = run_command(ctx, &invocation, "cannot merge configuration")?;

    let merged_file = stage(
        staging_dir,
        "merged",
        merged.as_ref().map(|r| r.stdout.as_str()),
    )?;
    debug!(
        "temporary file for merged config: {}",
        merged_file.path().display()
    );
    let result = install(ctx, merged_file.path(), &main_config)?;
    Ok(RefreshOutcome::from_install(result, true))
}

/// Create a temporary file in `dir`, filled with `content` when there is any.
///
/// The file is deleted when the returned handle is dropped.
fn stage(dir: &Path, label: &str, content: Option<&str>) -> Result<NamedTempFile, AdminError> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("projadm-{label}-"))
        .suffix(".xml")
        .tempfile_in(dir)
        .map_err(|e| fs_err("create staging file in", dir, e))?;

    if let Some(content) = content {
        file.write_all(content.as_bytes())
            .map_err(|e| fs_err("write", file.path().to_path_buf(), e))?;
        file.flush()
            .map_err(|e| fs_err("flush", file.path().to_path_buf(), e))?;
    }
    Ok(file)
}
