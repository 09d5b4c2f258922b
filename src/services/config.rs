use crate::domain::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("failed to read configuration {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn default_key_name() -> String {
    DEFAULT_KEY_NAME.to_string()
}

fn default_script_location_prefix() -> String {
    DEFAULT_SCRIPT_LOCATION_PREFIX.to_string()
}

fn default_signature_location_prefix() -> String {
    DEFAULT_SIGNATURE_LOCATION_PREFIX.to_string()
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCRIPTS_DIR)
}

fn default_signatures_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SIGNATURES_DIR)
}

fn default_registry_path() -> PathBuf {
    PathBuf::from(DEFAULT_REGISTRY_PATH)
}

fn default_gpg_program() -> String {
    DEFAULT_GPG_PROGRAM.to_string()
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_jobs() -> usize {
    1
}

/// Immutable run configuration, loaded once and passed down explicitly.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default = "default_script_location_prefix")]
    pub script_location_prefix: String,
    #[serde(default = "default_signature_location_prefix")]
    pub signature_location_prefix: String,
    #[serde(default)]
    pub force_overwrite: bool,
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
    #[serde(default = "default_signatures_dir")]
    pub signatures_dir: PathBuf,
    /// Directory holding the `<key_name>.asc` key artifact.
    #[serde(default = "default_signatures_dir")]
    pub key_store_dir: PathBuf,
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    #[serde(default = "default_gpg_program")]
    pub gpg_program: String,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Attempt signing even when key generation failed for that script.
    #[serde(default = "default_true")]
    pub sign_after_key_failure: bool,
    #[serde(default)]
    pub export_public_key: bool,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_name: default_key_name(),
            script_location_prefix: default_script_location_prefix(),
            signature_location_prefix: default_signature_location_prefix(),
            force_overwrite: false,
            scripts_dir: default_scripts_dir(),
            signatures_dir: default_signatures_dir(),
            key_store_dir: default_signatures_dir(),
            registry_path: default_registry_path(),
            gpg_program: default_gpg_program(),
            command_timeout_secs: default_command_timeout_secs(),
            sign_after_key_failure: true,
            export_public_key: false,
            jobs: default_jobs(),
        }
    }
}

impl Settings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn key_artifact_path(&self) -> PathBuf {
        self.key_store_dir
            .join(format!("{}.{}", self.key_name, SIGNATURE_EXTENSION))
    }

    pub fn signature_path(&self, file_name: &str) -> PathBuf {
        self.signatures_dir
            .join(format!("{}.{}", file_name, SIGNATURE_EXTENSION))
    }

    pub fn script_location(&self, file_name: &str) -> String {
        format!("{}{}", self.script_location_prefix, file_name)
    }

    pub fn signature_location(&self, file_name: &str) -> String {
        format!(
            "{}{}.{}",
            self.signature_location_prefix, file_name, SIGNATURE_EXTENSION
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_name.trim().is_empty() {
            return Err(ConfigError::Invalid("key_name must not be empty".into()));
        }
        if self.jobs == 0 {
            return Err(ConfigError::Invalid("jobs must be at least 1".into()));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "command_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.gpg_program.trim().is_empty() {
            return Err(ConfigError::Invalid("gpg_program must not be empty".into()));
        }
        Ok(())
    }
}

pub fn parse_settings(raw: &str, path: &Path) -> Result<Settings, ConfigError> {
    // An empty document deserializes as unit, not as a mapping.
    if raw.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings = serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Missing(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = parse_settings(&raw, path)?;
    tracing::debug!(
        config = %path.display(),
        key = %settings.key_name,
        force_overwrite = settings.force_overwrite,
        jobs = settings.jobs,
        "configuration loaded"
    );
    Ok(settings)
}
