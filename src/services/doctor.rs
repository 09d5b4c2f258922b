use crate::domain::models::{CheckItem, DoctorReport};
use crate::services::config::{load_settings, ConfigError, Settings};
use crate::services::pipeline::probe_tool;
use crate::services::runner::CommandRunner;
use std::path::Path;

fn check(name: &str, status: &str) -> CheckItem {
    CheckItem {
        name: name.to_string(),
        status: status.to_string(),
    }
}

fn dir_status(path: &Path) -> &'static str {
    if path.is_dir() {
        "ok"
    } else if path.exists() {
        "not_a_directory"
    } else {
        "missing"
    }
}

pub fn run_doctor(config_path: &Path, runner: &dyn CommandRunner) -> DoctorReport {
    let (settings, config_status) = match load_settings(config_path) {
        Ok(s) => (s, "ok"),
        Err(ConfigError::Missing(_)) => (Settings::default(), "missing"),
        Err(e) => {
            tracing::warn!(error = %e, "configuration unusable, checking defaults");
            (Settings::default(), "invalid")
        }
    };

    let checks = vec![
        check("config", config_status),
        check("scripts_dir", dir_status(&settings.scripts_dir)),
        check("signatures_dir", dir_status(&settings.signatures_dir)),
        check(
            "signing_tool",
            if probe_tool(&settings, runner).is_ok() {
                "ok"
            } else {
                "missing"
            },
        ),
        // Informational: an absent key is generated on the next run.
        check(
            "key_artifact",
            if settings.key_artifact_path().is_file() {
                "ok"
            } else {
                "absent"
            },
        ),
    ];

    let overall = if checks
        .iter()
        .all(|c| c.status == "ok" || c.name == "key_artifact")
    {
        "ok"
    } else {
        "needs_attention"
    }
    .to_string();

    DoctorReport { overall, checks }
}
