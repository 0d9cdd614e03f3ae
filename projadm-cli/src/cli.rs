//! Command-line surface and its translation into instance settings.
//!
//! All option checks happen here, before the instance lock is taken or the
//! service is contacted.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use tracing::debug;

use projadm_core::{
    paths::{self, DEFAULT_BASE_DIR, DEFAULT_URI, MERGE_TOOL_NAME},
    InstanceSettings, MergeSettings, ProjectName,
};
use projadm_sync::{AdminError, Operation};

#[derive(Parser, Debug)]
#[command(
    name = "projadm",
    version,
    about = "Add or delete indexer projects and refresh the instance configuration",
    long_about = None,
)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["add", "delete", "refresh"]),
))]
pub struct Cli {
    /// Enable debug prints.
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Instance base directory.
    #[arg(short = 'b', long, default_value = DEFAULT_BASE_DIR)]
    pub base: PathBuf,

    /// Read-only configuration merged into every refresh.
    #[arg(short = 'R', long)]
    pub roconfig: Option<PathBuf>,

    /// URI of the webapp with context path.
    #[arg(short = 'U', long, default_value = DEFAULT_URI)]
    pub uri: String,

    /// Path to the config merge program.
    #[arg(short = 'c', long)]
    pub configmerge: Option<PathBuf>,

    /// Java binary used by the config merge program.
    #[arg(long)]
    pub java: Option<PathBuf>,

    /// Jar archive the config merge program runs.
    #[arg(long)]
    pub jar: Option<PathBuf>,

    /// Upload the configuration to the webapp at the end.
    #[arg(short = 'u', long)]
    pub upload: bool,

    /// Do not run any commands or modify any configuration, just report.
    #[arg(short = 'n', long)]
    pub noop: bool,

    /// Keep the source code when deleting a project.
    #[arg(short = 'N', long)]
    pub nosourcedelete: bool,

    /// Add projects (their sources must already be under the source root).
    #[arg(short = 'a', long, value_name = "PROJECT", num_args = 1..)]
    pub add: Vec<String>,

    /// Delete projects with their index data and source code.
    #[arg(short = 'd', long, value_name = "PROJECT", num_args = 1..)]
    pub delete: Vec<String>,

    /// Refresh the configuration, merging the read-only configuration if given.
    #[arg(short = 'r', long)]
    pub refresh: bool,
}

impl Cli {
    /// The single workflow selected on the command line.
    pub fn operation(&self) -> Result<Operation, AdminError> {
        let names = |list: &[String]| -> Vec<ProjectName> {
            list.iter().cloned().map(ProjectName::from).collect()
        };
        if !self.add.is_empty() {
            Ok(Operation::Add(names(&self.add)))
        } else if !self.delete.is_empty() {
            Ok(Operation::Delete {
                projects: names(&self.delete),
                delete_source: !self.nosourcedelete,
            })
        } else if self.refresh {
            Ok(Operation::Refresh)
        } else {
            Err(AdminError::Usage(
                "one of --add, --delete or --refresh is required".to_string(),
            ))
        }
    }

    /// Validate options and build the settings for this instance.
    pub fn instance_settings(
        &self,
        temp_dir: &Path,
        program: &str,
    ) -> Result<InstanceSettings, AdminError> {
        if self.nosourcedelete && self.delete.is_empty() {
            return Err(AdminError::Usage(
                "The no source delete option is only valid for delete".to_string(),
            ));
        }

        if !self.base.is_dir() {
            return Err(AdminError::Usage(format!(
                "Not a directory: {}; set the base directory with the --base option",
                self.base.display()
            )));
        }
        debug!("using {} as instance base", self.base.display());

        let merge = match &self.roconfig {
            Some(roconfig) => Some(self.merge_settings(roconfig)?),
            None => None,
        };

        if self.uri.trim().is_empty() {
            return Err(AdminError::Usage(
                "URI of the webapp not specified".to_string(),
            ));
        }

        Ok(InstanceSettings {
            base_dir: self.base.clone(),
            merge,
            staging_dir: temp_dir.to_path_buf(),
            lock_path: paths::lock_path(temp_dir, program),
            upload: self.upload,
        })
    }

    /// A read-only configuration needs the merge tool and its jar.
    fn merge_settings(&self, roconfig: &Path) -> Result<MergeSettings, AdminError> {
        if !roconfig.is_file() {
            return Err(AdminError::Usage(format!(
                "File {} does not exist",
                roconfig.display()
            )));
        }
        debug!("using {} as read-only config", roconfig.display());

        let program = resolve_merge_tool(self.configmerge.as_deref()).ok_or_else(|| {
            AdminError::Usage(
                "Use the --configmerge option to specify the path to the config merge program"
                    .to_string(),
            )
        })?;
        debug!("using {} as config merge program", program.display());

        let jar = self.jar.clone().ok_or_else(|| {
            AdminError::Usage(
                "jar file needed for config merge tool, use --jar to specify one".to_string(),
            )
        })?;

        let mut extra_args = Vec::new();
        if self.debug {
            extra_args.push("-D".to_string());
        }

        Ok(MergeSettings {
            program,
            extra_args,
            jar,
            ro_config: roconfig.to_path_buf(),
            java: self.java.clone(),
        })
    }
}

/// An explicit path wins when it names a file or a program on `PATH`;
/// otherwise the default merge tool is looked up on `PATH`.
pub fn resolve_merge_tool(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) if path.is_file() => Some(path.to_path_buf()),
        Some(path) => which::which(path).ok(),
        None => which::which(MERGE_TOOL_NAME).ok(),
    }
}
