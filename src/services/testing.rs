//! In-process stand-in for the signing tool, shared by service unit tests.

use crate::services::runner::{CommandOutput, CommandRunner, RunError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Exit(i32),
    TimedOut,
    NotFound,
}

#[derive(Debug)]
pub struct MockRunner {
    pub keygen: Outcome,
    pub sign: Outcome,
    pub export: Outcome,
    pub version: Outcome,
    /// Script file names whose signing exits non-zero.
    pub sign_fail_on: Vec<String>,
    /// Time spent inside a signing call, to make overlapping calls visible.
    pub sign_delay: Duration,
    /// Script file names deleted right after a successful signature.
    pub remove_after_sign: Vec<String>,
    pub(crate) calls: Mutex<Vec<Vec<String>>>,
    pub(crate) active: AtomicUsize,
    pub(crate) max_active: AtomicUsize,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self {
            keygen: Outcome::Ok,
            sign: Outcome::Ok,
            export: Outcome::Ok,
            version: Outcome::Ok,
            sign_fail_on: Vec::new(),
            sign_delay: Duration::ZERO,
            remove_after_sign: Vec::new(),
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

impl MockRunner {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn keygen_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| has(c, "--quick-gen-key"))
            .count()
    }

    pub fn sign_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| has(c, "--detach-sign"))
            .count()
    }

    /// Highest number of tool invocations observed running at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn finish(program: &str, outcome: Outcome) -> Result<CommandOutput, RunError> {
        match outcome {
            Outcome::Ok => Ok(CommandOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }),
            Outcome::Exit(code) => Ok(CommandOutput {
                code: Some(code),
                stdout: String::new(),
                stderr: format!("mock failure {}", code),
            }),
            Outcome::TimedOut => Err(RunError::TimedOut {
                program: program.to_string(),
                secs: 1,
            }),
            Outcome::NotFound => Err(RunError::NotFound {
                program: program.to_string(),
            }),
        }
    }

    fn dispatch(&self, program: &str, args: &[String]) -> Result<CommandOutput, RunError> {
        if has(args, "--version") {
            return Self::finish(program, self.version);
        }
        if has(args, "--quick-gen-key") {
            return Self::finish(program, self.keygen);
        }
        if has(args, "--export") {
            if self.export == Outcome::Ok {
                if let Some(out) = flag_value(args, "--output") {
                    std::fs::write(out, "mock public key").expect("write export");
                }
            }
            return Self::finish(program, self.export);
        }
        if has(args, "--detach-sign") {
            std::thread::sleep(self.sign_delay);
            let script = args.last().map(String::as_str).unwrap_or_default();
            let name = Path::new(script)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if self.sign_fail_on.contains(&name) {
                return Self::finish(program, Outcome::Exit(2));
            }
            if self.sign == Outcome::Ok {
                if let Some(out) = flag_value(args, "--output") {
                    std::fs::write(out, "mock signature").expect("write signature");
                }
                if self.remove_after_sign.contains(&name) {
                    std::fs::remove_file(script).expect("remove script");
                }
            }
            return Self::finish(program, self.sign);
        }
        Self::finish(program, Outcome::Exit(64))
    }
}

impl CommandRunner for MockRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        _timeout: Duration,
    ) -> Result<CommandOutput, RunError> {
        self.calls.lock().expect("calls lock").push(args.to_vec());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        let result = self.dispatch(program, args);
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
