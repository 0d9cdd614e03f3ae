//! # projadm-sync
//!
//! Project lifecycle orchestration for an indexer instance.
//!
//! [`driver::run`] is the entrypoint: it takes the instance lock, runs one
//! [`Operation`], refreshes the on-disk configuration from the service and
//! optionally uploads it back. The pieces it composes are usable on their own:
//! [`command`] runs external programs, [`lock`] serializes invocations,
//! [`installer`] copies staged files into place, [`refresh`] rebuilds the
//! live configuration and [`project`] adds or deletes projects.

pub mod command;
pub mod driver;
pub mod error;
pub mod installer;
pub mod lock;
pub mod project;
pub mod refresh;

pub use driver::{DriverReport, Operation, UploadOutcome};
pub use error::{AdminError, FsFailure};
pub use installer::InstallResult;
pub use lock::InstanceLock;
pub use project::SourceRemoval;
pub use refresh::RefreshOutcome;
