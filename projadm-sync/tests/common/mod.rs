//! Shared fixtures: an in-memory configuration service and a scratch instance.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use projadm_core::{
    paths::config_file_path, ConfigService, InstanceSettings, ProjectName, RemoteError,
};
use tempfile::TempDir;

pub const OLD_CONFIG: &str = "<configuration><old/></configuration>\n";

/// In-memory stand-in for the indexer webapp.
#[derive(Default)]
pub struct FakeService {
    pub projects: RefCell<Vec<String>>,
    pub values: RefCell<HashMap<String, String>>,
    pub calls: RefCell<Vec<String>>,
    pub pushed: RefCell<Option<Vec<u8>>>,
    /// Operation name ("fetch", "push", "register", "deregister", "read") to fail.
    pub fail_on: RefCell<Option<&'static str>>,
    /// Returned by fetch instead of the rendered configuration.
    pub config_override: RefCell<Option<String>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(names: &[&str]) -> Self {
        let service = Self::new();
        service
            .projects
            .borrow_mut()
            .extend(names.iter().map(|n| n.to_string()));
        service
    }

    pub fn with_source_root(self, root: &Path) -> Self {
        self.values
            .borrow_mut()
            .insert("sourceRoot".to_string(), root.display().to_string());
        self
    }

    pub fn fail_on(&self, operation: &'static str) {
        *self.fail_on.borrow_mut() = Some(operation);
    }

    pub fn rendered_config(&self) -> String {
        let mut out = String::from("<configuration>\n");
        for p in self.projects.borrow().iter() {
            out.push_str(&format!("  <project name=\"{p}\"/>\n"));
        }
        out.push_str("</configuration>\n");
        out
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls that would change state on the service.
    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                c.starts_with("push") || c.starts_with("register") || c.starts_with("deregister")
            })
            .collect()
    }

    fn record(&self, call: String, operation: &'static str) -> Result<(), RemoteError> {
        self.calls.borrow_mut().push(call);
        if *self.fail_on.borrow() == Some(operation) {
            return Err(RemoteError::Transport {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigService for FakeService {
    fn fetch_configuration(&self) -> Result<String, RemoteError> {
        self.record("fetch".to_string(), "fetch")?;
        if let Some(config) = self.config_override.borrow().clone() {
            return Ok(config);
        }
        Ok(self.rendered_config())
    }

    fn push_configuration(&self, config: &[u8]) -> Result<(), RemoteError> {
        self.record("push".to_string(), "push")?;
        *self.pushed.borrow_mut() = Some(config.to_vec());
        Ok(())
    }

    fn register_project(&self, project: &ProjectName) -> Result<(), RemoteError> {
        self.record(format!("register:{project}"), "register")?;
        self.projects.borrow_mut().push(project.to_string());
        Ok(())
    }

    fn deregister_project(&self, project: &ProjectName) -> Result<(), RemoteError> {
        self.record(format!("deregister:{project}"), "deregister")?;
        self.projects.borrow_mut().retain(|p| p != project.as_str());
        Ok(())
    }

    fn read_config_value(&self, key: &str) -> Result<String, RemoteError> {
        self.record(format!("read:{key}"), "read")?;
        Ok(self.values.borrow().get(key).cloned().unwrap_or_default())
    }
}

/// A scratch instance: `<tmp>/base/etc/configuration.xml`, a staging
/// directory and a lock path, all inside one `TempDir`.
pub struct Instance {
    pub tmp: TempDir,
    pub settings: InstanceSettings,
}

impl Instance {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("tempdir");
        let base_dir = tmp.path().join("base");
        fs::create_dir_all(base_dir.join("etc")).expect("mkdir etc");
        fs::write(config_file_path(&base_dir), OLD_CONFIG).expect("write config");
        let staging_dir = tmp.path().join("staging");
        fs::create_dir_all(&staging_dir).expect("mkdir staging");

        let settings = InstanceSettings {
            base_dir,
            merge: None,
            staging_dir,
            lock_path: tmp.path().join("projadm.lock"),
            upload: false,
        };
        Self { tmp, settings }
    }

    pub fn config_path(&self) -> PathBuf {
        config_file_path(&self.settings.base_dir)
    }

    pub fn config(&self) -> String {
        fs::read_to_string(self.config_path()).expect("read config")
    }

    pub fn staging_is_empty(&self) -> bool {
        fs::read_dir(&self.settings.staging_dir)
            .expect("read staging")
            .next()
            .is_none()
    }
}

/// Write an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

/// Merge tool that wraps the read-only config and the staged config.
/// Positional layout: `-a <jar> <ro> <staged>`.
#[cfg(unix)]
pub fn merging_script(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "config-merge",
        r#"printf '<merged>\n'; cat "$3"; cat "$4"; printf '</merged>\n'"#,
    )
}

#[cfg(unix)]
pub fn failing_script(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "config-merge-broken",
        "echo 'half a config'; echo 'merge exploded' >&2; exit 2",
    )
}
