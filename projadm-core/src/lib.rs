//! projadm core library — domain types, instance paths, the remote service
//! boundary and its errors.
//!
//! - [`types`] — newtypes, execution mode and instance settings
//! - [`paths`] — fixed on-disk locations of an indexer instance
//! - [`service`] — [`ConfigService`], the remote configuration endpoint
//! - [`error`] — [`RemoteError`]

pub mod error;
pub mod paths;
pub mod service;
pub mod types;

pub use error::RemoteError;
pub use service::ConfigService;
pub use types::{ExecMode, InstanceSettings, MergeSettings, ProjectName, RunContext};
