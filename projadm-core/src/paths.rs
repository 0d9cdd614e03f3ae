use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_DIR: &str = "/var/opengrok";
pub const DEFAULT_URI: &str = "http://localhost:8080/source";

/// Name looked up on `PATH` when no merge tool path is given.
pub const MERGE_TOOL_NAME: &str = "opengrok-config-merge";

/// Configuration key holding the directory all project sources live under.
pub const SOURCE_ROOT_KEY: &str = "sourceRoot";

pub const CONFIG_DIR: &str = "etc";
pub const CONFIG_FILE: &str = "configuration.xml";

/// `<base>/etc/configuration.xml`
pub fn config_file_path(base_dir: &Path) -> PathBuf {
    base_dir.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// `<temp_dir>/<program>.lock`
pub fn lock_path(temp_dir: &Path, program: &str) -> PathBuf {
    temp_dir.join(format!("{program}.lock"))
}
