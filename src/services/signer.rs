use crate::services::config::Settings;
use crate::services::gpg;
use crate::services::keystore::{fmt_code, KeyStoreSection};
use crate::services::passphrase::Passphrase;
use crate::services::runner::{CommandRunner, RunError};
use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum SignError {
    #[error(transparent)]
    Tool(#[from] RunError),
    #[error("signing exited with {}: {diagnostic}", fmt_code(.code))]
    Failed {
        code: Option<i32>,
        diagnostic: String,
    },
    #[error("signing reported success but wrote no artifact at {0}")]
    MissingArtifact(String),
}

pub struct Signer<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
}

impl<'a> Signer<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn CommandRunner) -> Self {
        Self { settings, runner }
    }

    /// Writes a detached armored signature for `script` at `output`,
    /// replacing any previous artifact. On failure nothing is left at
    /// `output`.
    pub fn sign(
        &self,
        _section: &mut KeyStoreSection<'_>,
        script: &Path,
        passphrase: &Passphrase,
        output: &Path,
    ) -> Result<(), SignError> {
        let key = self.settings.key_name.as_str();
        let result = self
            .runner
            .run(
                &self.settings.gpg_program,
                &gpg::detach_sign_args(key, passphrase.expose(), script, output),
                self.settings.command_timeout(),
            )
            .map_err(SignError::from)
            .and_then(|out| {
                if !out.success() {
                    return Err(SignError::Failed {
                        code: out.code,
                        diagnostic: out.diagnostic(),
                    });
                }
                if !output.is_file() {
                    return Err(SignError::MissingArtifact(output.display().to_string()));
                }
                Ok(())
            });

        if result.is_err() {
            discard_artifact(output);
        }
        result
    }
}

/// Removes a stale or partial artifact; absence is fine.
pub fn discard_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(artifact = %path.display(), "removed signature artifact"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(artifact = %path.display(), error = %e, "could not remove signature artifact"),
    }
}
