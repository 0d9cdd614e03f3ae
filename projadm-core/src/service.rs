//! The remote configuration endpoint as seen by the orchestration code.
//!
//! The webapp holds the live, in-memory configuration. Everything that
//! touches project registration or the authoritative configuration text
//! goes through this trait, so workflows can be driven against an HTTP
//! client in production and an in-memory fake in tests.

use crate::error::RemoteError;
use crate::types::ProjectName;

pub trait ConfigService {
    /// Current configuration text (XML) of the running service.
    fn fetch_configuration(&self) -> Result<String, RemoteError>;

    /// Replace the running configuration with `config`.
    fn push_configuration(&self, config: &[u8]) -> Result<(), RemoteError>;

    /// Register a project whose sources already sit under the source root.
    fn register_project(&self, project: &ProjectName) -> Result<(), RemoteError>;

    /// Remove a project and its indexed data from the service.
    fn deregister_project(&self, project: &ProjectName) -> Result<(), RemoteError>;

    /// Read a single configuration value, e.g. `sourceRoot`.
    fn read_config_value(&self, key: &str) -> Result<String, RemoteError>;
}
