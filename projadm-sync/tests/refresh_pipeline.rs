//! Configuration refresh: fetch, stage, optional merge, install.

mod common;

use std::fs;
use std::path::PathBuf;

use common::{FakeService, Instance, OLD_CONFIG};
use projadm_core::{MergeSettings, RunContext};
use projadm_sync::{refresh::refresh, AdminError, RefreshOutcome};

fn merge_settings(instance: &Instance, program: PathBuf) -> MergeSettings {
    let ro_config = instance.tmp.path().join("ro.xml");
    fs::write(&ro_config, "<readonly/>\n").expect("write ro config");
    MergeSettings {
        program,
        extra_args: vec![],
        jar: instance.tmp.path().join("opengrok.jar"),
        ro_config,
        java: None,
    }
}

#[test]
fn refresh_without_overlay_installs_fetched_content_verbatim() {
    let instance = Instance::new();
    let service = FakeService::with_projects(&["proj1", "proj2"]);

    let outcome = refresh(
        &RunContext::apply(),
        &service,
        &instance.settings.base_dir,
        None,
        &instance.settings.staging_dir,
    )
    .expect("refresh");

    assert_eq!(
        outcome,
        RefreshOutcome::Installed {
            path: instance.config_path(),
            merged: false
        }
    );
    assert_eq!(instance.config(), service.rendered_config());
    assert_eq!(service.calls(), vec!["fetch"]);
    assert!(instance.staging_is_empty(), "staged files must be removed");
}

#[test]
fn missing_local_config_fails_before_contacting_service() {
    let instance = Instance::new();
    fs::remove_file(instance.config_path()).unwrap();
    let service = FakeService::new();

    for ctx in [RunContext::apply(), RunContext::dry_run()] {
        let err = refresh(
            &ctx,
            &service,
            &instance.settings.base_dir,
            None,
            &instance.settings.staging_dir,
        )
        .expect_err("missing config");
        assert!(matches!(err, AdminError::Precondition(_)), "got: {err}");
        assert!(err.to_string().contains("configuration.xml"));
    }
    assert!(service.calls().is_empty());
}

#[test]
fn empty_fetch_is_fatal_and_keeps_local_config() {
    let instance = Instance::new();
    let service = FakeService::new();
    *service.config_override.borrow_mut() = Some(String::new());

    let err = refresh(
        &RunContext::apply(),
        &service,
        &instance.settings.base_dir,
        None,
        &instance.settings.staging_dir,
    )
    .expect_err("empty fetch");
    assert!(matches!(err, AdminError::Remote(_)), "got: {err}");
    assert_eq!(instance.config(), OLD_CONFIG);
}

#[test]
fn fetch_failure_is_fatal_and_keeps_local_config() {
    let instance = Instance::new();
    let service = FakeService::new();
    service.fail_on("fetch");

    let err = refresh(
        &RunContext::apply(),
        &service,
        &instance.settings.base_dir,
        None,
        &instance.settings.staging_dir,
    )
    .expect_err("fetch failure");
    assert!(matches!(err, AdminError::Remote(_)), "got: {err}");
    assert_eq!(instance.config(), OLD_CONFIG);
    assert!(instance.staging_is_empty());
}

#[test]
fn dry_run_skips_fetch_and_merge_and_leaves_config() {
    let instance = Instance::new();
    let service = FakeService::with_projects(&["proj1"]);
    // The merge tool does not exist; dry-run must not try to run it.
    let merge = merge_settings(&instance, PathBuf::from("/definitely/not/config-merge"));

    let outcome = refresh(
        &RunContext::dry_run(),
        &service,
        &instance.settings.base_dir,
        Some(&merge),
        &instance.settings.staging_dir,
    )
    .expect("dry-run refresh");

    assert_eq!(
        outcome,
        RefreshOutcome::WouldInstall {
            path: instance.config_path(),
            merged: true
        }
    );
    assert!(service.calls().is_empty(), "dry-run must not fetch");
    assert_eq!(instance.config(), OLD_CONFIG);
    assert!(instance.staging_is_empty());
}

#[cfg(unix)]
mod merge {
    use super::*;
    use crate::common::{self, failing_script, merging_script};

    #[test]
    fn overlay_installs_merge_output_not_fetched_content() {
        let instance = Instance::new();
        let service = FakeService::with_projects(&["proj1"]);
        let merge = merge_settings(&instance, merging_script(instance.tmp.path()));

        let outcome = refresh(
            &RunContext::apply(),
            &service,
            &instance.settings.base_dir,
            Some(&merge),
            &instance.settings.staging_dir,
        )
        .expect("refresh with merge");

        assert!(outcome.merged());
        let expected = format!(
            "<merged>\n<readonly/>\n{}</merged>\n",
            service.rendered_config()
        );
        assert_eq!(instance.config(), expected);
        assert_ne!(instance.config(), service.rendered_config());
        assert!(instance.staging_is_empty());
    }

    #[test]
    fn merge_receives_java_path_when_given() {
        let instance = Instance::new();
        let service = FakeService::new();
        let script = common::write_script(
            instance.tmp.path(),
            "echo-args",
            r#"printf '%s\n' "$*""#,
        );
        let mut merge = merge_settings(&instance, script);
        merge.java = Some(PathBuf::from("/opt/java/bin/java"));

        refresh(
            &RunContext::apply(),
            &service,
            &instance.settings.base_dir,
            Some(&merge),
            &instance.settings.staging_dir,
        )
        .expect("refresh");

        let installed = instance.config();
        assert!(installed.starts_with("-a "), "got: {installed}");
        assert!(installed.contains(&merge.ro_config.display().to_string()));
        assert!(installed.trim_end().ends_with("-j /opt/java/bin/java"));
    }

    #[test]
    fn merge_failure_leaves_previous_config_untouched() {
        let instance = Instance::new();
        let service = FakeService::with_projects(&["proj1"]);
        let merge = merge_settings(&instance, failing_script(instance.tmp.path()));

        let err = refresh(
            &RunContext::apply(),
            &service,
            &instance.settings.base_dir,
            Some(&merge),
            &instance.settings.staging_dir,
        )
        .expect_err("merge must fail");

        match &err {
            AdminError::Command {
                message, stderr, ..
            } => {
                assert_eq!(message, "cannot merge configuration");
                assert!(stderr.contains("merge exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(instance.config(), OLD_CONFIG);
        assert!(instance.staging_is_empty(), "staged files removed on failure");
    }
}
