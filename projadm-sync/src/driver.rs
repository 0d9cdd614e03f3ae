//! Top-level invocation: lock, one operation, refresh, optional upload.
//!
//! ```text
//! Idle -> Locked -> { Adding | Deleting | RefreshingOnly } -> Uploading? -> Done
//! ```
//!
//! The lock guard lives for the whole of [`run`], so it is released on every
//! return path, errors included.

use std::path::PathBuf;

use tracing::info;

use projadm_core::{
    paths::config_file_path, ConfigService, InstanceSettings, ProjectName, RunContext,
};

use crate::error::{fs_err, AdminError};
use crate::lock::InstanceLock;
use crate::project::{add_project, delete_project, SourceRemoval};
use crate::refresh::{refresh, RefreshOutcome};

/// The single workflow an invocation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Register each project, then refresh.
    Add(Vec<ProjectName>),
    /// Deregister each project (and optionally delete its sources), then refresh.
    Delete {
        projects: Vec<ProjectName>,
        delete_source: bool,
    },
    /// Only refresh the local configuration.
    Refresh,
}

/// Outcome of the optional upload step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    NotRequested,
    Uploaded { bytes: usize },
    /// Dry-run mode: the file *would* have been pushed.
    WouldUpload { path: PathBuf },
}

/// Summary of a completed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverReport {
    pub added: Vec<ProjectName>,
    pub deleted: Vec<(ProjectName, SourceRemoval)>,
    pub refresh: RefreshOutcome,
    pub upload: UploadOutcome,
}

/// Run `operation` against the instance described by `settings`.
pub fn run(
    ctx: &RunContext,
    settings: &InstanceSettings,
    service: &dyn ConfigService,
    operation: &Operation,
) -> Result<DriverReport, AdminError> {
    let _lock = InstanceLock::try_acquire(&settings.lock_path)?;

    let mut added = Vec::new();
    let mut deleted = Vec::new();
    match operation {
        Operation::Add(projects) => {
            for project in projects {
                add_project(ctx, service, project)?;
                added.push(project.clone());
            }
        }
        Operation::Delete {
            projects,
            delete_source,
        } => {
            for project in projects {
                let removal = delete_project(ctx, service, project, *delete_source)?;
                deleted.push((project.clone(), removal));
            }
        }
        Operation::Refresh => {}
    }

    let refresh = refresh(
        ctx,
        service,
        &settings.base_dir,
        settings.merge.as_ref(),
        &settings.staging_dir,
    )?;

    let upload = if settings.upload {
        upload(ctx, settings, service)?
    } else {
        UploadOutcome::NotRequested
    };

    Ok(DriverReport {
        added,
        deleted,
        refresh,
        upload,
    })
}

fn upload(
    ctx: &RunContext,
    settings: &InstanceSettings,
    service: &dyn ConfigService,
) -> Result<UploadOutcome, AdminError> {
    let main_config = config_file_path(&settings.base_dir);
    if !main_config.is_file() {
        return Err(AdminError::Precondition(format!(
            "file {} does not exist",
            main_config.display()
        )));
    }

    if ctx.is_dry_run() {
        info!(
            "{}would upload configuration from {}",
            ctx.prefix(),
            main_config.display()
        );
        return Ok(UploadOutcome::WouldUpload { path: main_config });
    }

    let data = std::fs::read(&main_config).map_err(|e| fs_err("read", &main_config, e))?;
    info!("Uploading configuration from {}", main_config.display());
    service.push_configuration(&data)?;
    Ok(UploadOutcome::Uploaded { bytes: data.len() })
}
