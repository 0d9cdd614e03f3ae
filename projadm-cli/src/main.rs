//! projadm — add or delete indexer projects and keep the instance
//! configuration in step with the running webapp.
//!
//! # Usage
//!
//! ```text
//! projadm --add <project>... [--upload] [--noop]
//! projadm --delete <project>... [--nosourcedelete] [--upload] [--noop]
//! projadm --refresh [--roconfig <file> --jar <jar> [--configmerge <path>] [--java <path>]]
//! ```
//!
//! Exits 0 on success and 1 on any failure, including a second concurrent
//! invocation on the same host.

mod cli;

use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use projadm_core::{ExecMode, RunContext};
use projadm_remote::HttpConfigService;
use projadm_sync::{
    driver::{self, DriverReport},
    AdminError, RefreshOutcome, SourceRemoval, UploadOutcome,
};

use cli::Cli;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AdminError>() {
                Some(AdminError::LockContention { .. }) => warn!("Already running, exiting."),
                _ => error!("{err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = RunContext::new(ExecMode::from_noop(cli.noop));
    let temp_dir = std::env::temp_dir();
    let program = program_name();

    let operation = cli.operation()?;
    let settings = cli.instance_settings(&temp_dir, &program)?;
    let service = HttpConfigService::new(&cli.uri)
        .map_err(|e| AdminError::Usage(e.to_string()))?;

    let report = driver::run(&ctx, &settings, &service, &operation)
        .with_context(|| format!("{program} failed"))?;
    log_report(&ctx, &report);
    Ok(())
}

/// Basename of the running executable, used to name the instance lock.
fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_stem)
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "projadm".to_string())
}

fn log_report(ctx: &RunContext, report: &DriverReport) {
    let prefix = ctx.prefix();
    for project in &report.added {
        info!("{prefix}✓ added '{project}'");
    }
    for (project, removal) in &report.deleted {
        match removal {
            SourceRemoval::Kept => info!("{prefix}✓ deleted '{project}' (source kept)"),
            SourceRemoval::Removed { path } => {
                info!("{prefix}✓ deleted '{project}' and {}", path.display())
            }
            SourceRemoval::WouldRemove { path } => {
                info!("{prefix}✓ would delete '{project}' and {}", path.display())
            }
        }
    }
    let how = if report.refresh.merged() {
        " (merged with read-only config)"
    } else {
        ""
    };
    match &report.refresh {
        RefreshOutcome::Installed { path, .. } => {
            info!("✓ configuration refreshed: {}{how}", path.display())
        }
        RefreshOutcome::WouldInstall { path, .. } => {
            info!("{prefix}✓ would refresh configuration: {}{how}", path.display())
        }
    }
    match &report.upload {
        UploadOutcome::NotRequested => {}
        UploadOutcome::Uploaded { bytes } => info!("✓ uploaded configuration ({bytes} bytes)"),
        UploadOutcome::WouldUpload { path } => {
            info!("{prefix}✓ would upload {}", path.display())
        }
    }
}

fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false);
    if debug {
        let _ = builder.try_init();
    } else {
        let _ = builder.without_time().with_level(false).try_init();
    }
}
