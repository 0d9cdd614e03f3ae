//! Adding and deleting projects.
//!
//! Both workflows only change the service's registry (and, for delete, the
//! project's source tree). The on-disk configuration is brought up to date
//! by the refresh the driver runs afterwards.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use projadm_core::{paths::SOURCE_ROOT_KEY, ConfigService, ProjectName, RunContext};

use crate::error::{fs_err, AdminError};

/// What happened to a project's source tree during [`delete_project`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRemoval {
    /// Source deletion was not requested.
    Kept,
    Removed { path: PathBuf },
    /// Dry-run mode: the tree *would* have been removed.
    WouldRemove { path: PathBuf },
}

/// A project name must be exactly one normal path component, so that
/// `sourceRoot/<name>` stays a direct child of the source root.
fn check_name(action: &str, project: &ProjectName) -> Result<(), AdminError> {
    if project.is_empty() {
        return Err(AdminError::Precondition(format!(
            "invalid project {action}: missing project name"
        )));
    }
    let mut components = Path::new(project.as_str()).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(AdminError::Precondition(format!(
            "invalid project {action}: '{project}' is not a single directory name"
        ))),
    }
}

/// Register `project` with the service.
///
/// The project's sources are expected to already sit under the service's
/// source root; nothing is checked locally.
pub fn add_project(
    ctx: &RunContext,
    service: &dyn ConfigService,
    project: &ProjectName,
) -> Result<(), AdminError> {
    check_name("addition", project)?;
    info!("{}Adding project {project}", ctx.prefix());
    if !ctx.is_dry_run() {
        service.register_project(project)?;
    }
    Ok(())
}

/// Remove `project` and its indexed data from the service, then optionally
/// delete its source tree under the service's source root.
///
/// The source root is looked up after deregistration. If that lookup fails
/// the project stays deregistered with its sources intact; nothing is rolled
/// back.
pub fn delete_project(
    ctx: &RunContext,
    service: &dyn ConfigService,
    project: &ProjectName,
    delete_source: bool,
) -> Result<SourceRemoval, AdminError> {
    check_name("deletion", project)?;

    info!("{}Deleting project {project} and its index data", ctx.prefix());
    if !ctx.is_dry_run() {
        service.deregister_project(project)?;
    }

    if !delete_source {
        return Ok(SourceRemoval::Kept);
    }

    let src_root = service.read_config_value(SOURCE_ROOT_KEY)?;
    if src_root.is_empty() {
        return Err(AdminError::Precondition("source root empty".to_string()));
    }
    debug!("source root = {src_root}");

    let source_dir = PathBuf::from(src_root).join(project.as_str());
    debug!("removing directory tree {}", source_dir.display());
    if ctx.is_dry_run() {
        info!(
            "{}would remove source code under {}",
            ctx.prefix(),
            source_dir.display()
        );
        return Ok(SourceRemoval::WouldRemove { path: source_dir });
    }

    info!("Removing source code under {}", source_dir.display());
    std::fs::remove_dir_all(&source_dir).map_err(|e| fs_err("remove", &source_dir, e))?;
    Ok(SourceRemoval::Removed { path: source_dir })
}
