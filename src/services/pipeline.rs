//! Signing pipeline.
//!
//! Per script: `Discovered -> KeyEnsured -> Signed -> MetadataExtracted ->
//! Recorded`, leaving early as `Skipped` when signing (or, by policy, key
//! generation) fails. Each script gets exactly one attempt. Key-store work runs
//! inside the exclusive section; reading and metadata extraction run outside
//! it.

use crate::domain::models::{Registry, RunReport, ScriptRecord, SkipStage, SkippedScript};
use crate::services::config::Settings;
use crate::services::discovery::{discover_scripts, DiscoveredScript};
use crate::services::gpg;
use crate::services::keystore::{
    KeyAction, KeyError, KeyLifecycleManager, KeyStoreLedger, KeyStoreLock,
};
use crate::services::metadata;
use crate::services::output::Reporter;
use crate::services::passphrase::Passphrase;
use crate::services::registry::{write_registry, RegistryError};
use crate::services::runner::CommandRunner;
use crate::services::signer::{discard_artifact, Signer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Failures that abort the whole run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("environment error: {0}")]
    Environment(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Environment(_) => "ENVIRONMENT_ERROR",
            PipelineError::Registry(_) => "REGISTRY_WRITE_ERROR",
        }
    }
}

#[derive(Debug)]
enum ScriptOutcome {
    Recorded(ScriptRecord),
    Skipped(SkippedScript),
}

#[derive(Debug)]
pub struct RunOutcome {
    pub discovered: usize,
    pub registry: Registry,
    pub skipped: Vec<SkippedScript>,
    pub ledger: KeyStoreLedger,
}

pub struct Coordinator<'a> {
    settings: &'a Settings,
    runner: &'a dyn CommandRunner,
    reporter: Reporter,
    lock: KeyStoreLock,
}

impl<'a> Coordinator<'a> {
    pub fn new(settings: &'a Settings, runner: &'a dyn CommandRunner, reporter: Reporter) -> Self {
        Self {
            settings,
            runner,
            reporter,
            lock: KeyStoreLock::new(),
        }
    }

    /// Processes `scripts` and assembles the registry in their order.
    pub fn run(&self, scripts: &[DiscoveredScript]) -> RunOutcome {
        let outcomes = if self.settings.jobs <= 1 || scripts.len() <= 1 {
            scripts.iter().map(|s| self.process(s)).collect()
        } else {
            self.process_parallel(scripts)
        };

        let mut registry = Registry::new();
        let mut skipped = Vec::new();
        for outcome in outcomes {
            match outcome {
                ScriptOutcome::Recorded(r) => registry.push(r),
                ScriptOutcome::Skipped(s) => skipped.push(s),
            }
        }
        RunOutcome {
            discovered: scripts.len(),
            registry,
            skipped,
            ledger: self.lock.ledger(),
        }
    }

    fn process_parallel(&self, scripts: &[DiscoveredScript]) -> Vec<ScriptOutcome> {
        let cursor = AtomicUsize::new(0);
        let slots: Vec<Mutex<Option<ScriptOutcome>>> =
            scripts.iter().map(|_| Mutex::new(None)).collect();
        let workers = self.settings.jobs.min(scripts.len());
        tracing::debug!(workers, scripts = scripts.len(), "starting workers");

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let i = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(script) = scripts.get(i) else {
                        break;
                    };
                    let outcome = self.process(script);
                    *slots[i].lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
                });
            }
        });

        slots
            .into_iter()
            .filter_map(|slot| slot.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect()
    }

    fn skip(&self, script: &DiscoveredScript, stage: SkipStage, error: String) -> ScriptOutcome {
        ScriptOutcome::Skipped(SkippedScript {
            script: script.file_name.clone(),
            stage,
            error,
        })
    }

    fn process(&self, script: &DiscoveredScript) -> ScriptOutcome {
        let name = script.file_name.as_str();
        let _span = tracing::info_span!("script", script = %name).entered();
        let passphrase = Passphrase::generate();
        let signature_path = self.settings.signature_path(name);
        let keys = KeyLifecycleManager::new(self.settings, self.runner);
        let signer = Signer::new(self.settings, self.runner);

        {
            let mut section = self.lock.enter();
            match keys.ensure_key(&mut section, &passphrase, self.settings.force_overwrite) {
                Ok(KeyAction::Generated) => self
                    .reporter
                    .success(&format!("Signing key generated for {}.", name)),
                Ok(KeyAction::Reused) => {}
                Err(KeyError::Export(e)) => self.reporter.warn(&format!(
                    "Signing key generated for {} but public key export failed: {}",
                    name, e
                )),
                Err(e) => {
                    self.reporter
                        .error(&format!("Error generating signing key for {}: {}", name, e));
                    if !self.settings.sign_after_key_failure {
                        return self.skip(script, SkipStage::Key, e.to_string());
                    }
                    self.reporter.warn(&format!(
                        "Attempting to sign {} with the key currently on store.",
                        name
                    ));
                }
            }

            if let Err(e) = signer.sign(&mut section, &script.path, &passphrase, &signature_path) {
                self.reporter
                    .error(&format!("Error signing {}: {}", name, e));
                return self.skip(script, SkipStage::Sign, e.to_string());
            }
        }

        let contents = match std::fs::read(&script.path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                discard_artifact(&signature_path);
                self.reporter
                    .error(&format!("Error reading {}: {}", name, e));
                return self.skip(script, SkipStage::Read, e.to_string());
            }
        };
        let meta = metadata::extract(&contents);
        tracing::debug!(fields = meta.len(), "metadata extracted");

        let record = ScriptRecord::new(
            &meta,
            self.settings.script_location(name),
            self.settings.signature_location(name),
            passphrase.into_inner(),
        );
        self.reporter.success(&format!("{} signed successfully.", name));
        ScriptOutcome::Recorded(record)
    }
}

fn ensure_dir(path: &std::path::Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(path)
        .map_err(|e| PipelineError::Environment(format!("{}: {}", path.display(), e)))
}

/// Confirms the signing tool can be started at all before touching scripts.
pub fn probe_tool(settings: &Settings, runner: &dyn CommandRunner) -> Result<(), PipelineError> {
    let out = runner
        .run(
            &settings.gpg_program,
            &gpg::version_args(),
            settings.command_timeout(),
        )
        .map_err(|e| PipelineError::Environment(e.to_string()))?;
    if !out.success() {
        return Err(PipelineError::Environment(format!(
            "{} --version failed: {}",
            settings.gpg_program,
            out.diagnostic()
        )));
    }
    Ok(())
}

/// Full run: prepare directories, probe the tool, sign every discovered
/// script, then write the registry once.
pub fn execute(
    settings: &Settings,
    runner: &dyn CommandRunner,
    reporter: Reporter,
) -> Result<RunReport, PipelineError> {
    ensure_dir(&settings.signatures_dir)?;
    ensure_dir(&settings.scripts_dir)?;
    probe_tool(settings, runner)?;

    let scripts = discover_scripts(&settings.scripts_dir).map_err(|e| {
        PipelineError::Environment(format!("{}: {}", settings.scripts_dir.display(), e))
    })?;
    tracing::info!(count = scripts.len(), dir = %settings.scripts_dir.display(), "scripts discovered");

    let outcome = Coordinator::new(settings, runner, reporter).run(&scripts);
    write_registry(&settings.registry_path, &outcome.registry)?;
    reporter.success(&format!(
        "Data has been saved to {}.",
        settings.registry_path.display()
    ));

    Ok(RunReport {
        registry_path: settings.registry_path.display().to_string(),
        discovered: outcome.discovered,
        signed: outcome.registry.len(),
        key_generations: outcome.ledger.generations,
        key_failures: outcome.ledger.failures,
        skipped: outcome.skipped,
    })
}
