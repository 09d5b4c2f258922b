//! Key lifecycle and the key-store exclusive section.
//!
//! Every operation that touches the key store (existence check, generation,
//! signing) takes a `&mut KeyStoreSection`, which can only be obtained from
//! [`KeyStoreLock::enter`]. At most one section exists at a time and it is
//! released when dropped, on every exit path.

use crate::services::config::Settings;
use crate::services::gpg;
use crate::services::passphrase::Passphrase;
use crate::services::runner::{CommandRunner, RunError};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(thiserror::Error, Debug)]
pub enum KeyError {
    #[error(transparent)]
    Tool(#[from] RunError),
    #[error("key generation exited with {}: {diagnostic}", fmt_code(.code))]
    Failed {
        code: Option<i32>,
        diagnostic: String,
    },
    #[error("public key export failed: {0}")]
    Export(String),
}

pub(crate) fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "signal".to_string(),
    }
}

/// Counters mutated only while the section is held.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KeyStoreLedger {
    pub generations: usize,
    pub failures: usize,
}

#[derive(Debug, Default)]
pub struct KeyStoreLock {
    ledger: Mutex<KeyStoreLedger>,
}

impl KeyStoreLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until no other worker holds the section.
    pub fn enter(&self) -> KeyStoreSection<'_> {
        // The ledger holds plain counters, so a panic elsewhere cannot leave
        // it in a state worth refusing.
        let guard = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        KeyStoreSection { ledger: guard }
    }

    pub fn ledger(&self) -> KeyStoreLedger {
        *self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct KeyStoreSection<'a> {
    ledger: MutexGuard<'a, KeyStoreLedger>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Reused,
    Generated,
}

pub struct KeyLifecycleManager<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
}

impl<'a> KeyLifecycleManager<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn CommandRunner) -> Self {
        Self { settings, runner }
    }

    pub fn key_present(&self, _section: &KeyStoreSection<'_>) -> bool {
        self.settings.key_artifact_path().is_file()
    }

    /// Generates the key unless the artifact exists and `force_overwrite` is
    /// off. `KeyError::Export` means the key was generated but not exported;
    /// it still counts as a generation.
    pub fn ensure_key(
        &self,
        section: &mut KeyStoreSection<'_>,
        passphrase: &Passphrase,
        force_overwrite: bool,
    ) -> Result<KeyAction, KeyError> {
        let key = self.settings.key_name.as_str();
        if !force_overwrite && self.key_present(section) {
            tracing::debug!(key, "key artifact present, reusing");
            return Ok(KeyAction::Reused);
        }

        let result = self.generate(key, passphrase);
        match &result {
            Ok(_) | Err(KeyError::Export(_)) => section.ledger.generations += 1,
            Err(_) => section.ledger.failures += 1,
        }
        result
    }

    fn generate(&self, key: &str, passphrase: &Passphrase) -> Result<KeyAction, KeyError> {
        tracing::info!(key, "generating signing key");
        let out = self.runner.run(
            &self.settings.gpg_program,
            &gpg::keygen_args(key, passphrase.expose()),
            self.settings.command_timeout(),
        )?;
        if !out.success() {
            return Err(KeyError::Failed {
                code: out.code,
                diagnostic: out.diagnostic(),
            });
        }

        if self.settings.export_public_key {
            self.export(key)?;
        }
        Ok(KeyAction::Generated)
    }

    fn export(&self, key: &str) -> Result<(), KeyError> {
        let artifact = self.settings.key_artifact_path();
        if let Some(parent) = artifact.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| KeyError::Export(format!("{}: {}", parent.display(), e)))?;
        }
        let out = self
            .runner
            .run(
                &self.settings.gpg_program,
                &gpg::export_public_key_args(key, &artifact),
                self.settings.command_timeout(),
            )
            .map_err(|e| KeyError::Export(e.to_string()))?;
        if !out.success() {
            return Err(KeyError::Export(out.diagnostic()));
        }
        tracing::debug!(key, artifact = %artifact.display(), "public key exported");
        Ok(())
    }
}
