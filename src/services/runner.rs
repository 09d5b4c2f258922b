//! Narrow subprocess capability: run a named tool with an argument list under
//! a timeout and hand back exit status plus captured output.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// Cap on captured bytes per stream.
const MAX_CAPTURE_BYTES: usize = 256 * 1024;

/// How long to keep collecting output after the tool exits or is killed.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Best single-line diagnostic from the tool.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        self.stdout.trim().to_string()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("program not found: {program}")]
    NotFound { program: String },
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} did not finish within {secs}s")]
    TimedOut { program: String, secs: u64 },
    #[error("failed waiting for {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunError>;
}

/// Runs real processes. Stdin is closed so a tool can never wait on a prompt.
///
/// On unix the tool leads its own process group, and a timeout kills the
/// whole group so helpers it forked cannot outlive the deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

/// Output of one pipe, filled by a detached reader thread. The thread may
/// outlive the run when some descendant keeps the pipe open.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    done: mpsc::Receiver<()>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = mpsc::channel();
        if let Some(mut pipe) = pipe {
            let sink = Arc::clone(&buf);
            std::thread::spawn(move || {
                let mut chunk = [0u8; 8192];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            let mut b = sink.lock().unwrap_or_else(PoisonError::into_inner);
                            let room = MAX_CAPTURE_BYTES.saturating_sub(b.len());
                            b.extend_from_slice(&chunk[..n.min(room)]);
                        }
                    }
                }
                let _ = tx.send(());
            });
        }
        Self { buf, done }
    }

    /// Waits for EOF until `deadline`, then returns whatever was read.
    fn collect(self, deadline: Instant) -> String {
        let wait = deadline.saturating_duration_since(Instant::now());
        if self.done.recv_timeout(wait).is_err() {
            tracing::debug!("output stream still open after deadline");
        }
        let b = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&b).into_owned()
    }
}

#[cfg(unix)]
fn isolate(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_cmd: &mut Command) {}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    #[allow(clippy::cast_possible_wrap)]
    let group = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(group, Signal::SIGKILL) {
        tracing::debug!(error = %e, "killpg failed, killing direct child only");
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, RunError> {
        tracing::debug!(program, argc = args.len(), "spawning");
        let started = Instant::now();
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        isolate(&mut cmd);
        let mut child = match cmd.spawn() {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RunError::NotFound {
                    program: program.to_string(),
                })
            }
            Err(source) => {
                return Err(RunError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
        };

        // Drain both pipes while waiting so a chatty tool cannot block on write.
        let stdout = Capture::start(child.stdout.take());
        let stderr = Capture::start(child.stderr.take());

        let status = match child.wait_timeout(timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                kill_tree(&mut child);
                let _ = child.wait();
                let grace = Instant::now() + OUTPUT_GRACE;
                stdout.collect(grace);
                stderr.collect(grace);
                tracing::warn!(program, secs = timeout.as_secs(), "killed after timeout");
                return Err(RunError::TimedOut {
                    program: program.to_string(),
                    secs: timeout.as_secs(),
                });
            }
            Err(source) => {
                kill_tree(&mut child);
                let _ = child.wait();
                return Err(RunError::Io {
                    program: program.to_string(),
                    source,
                });
            }
        };

        // A descendant may still hold the pipes; stop reading at the deadline.
        let deadline = (started + timeout).max(Instant::now() + OUTPUT_GRACE);
        let out = CommandOutput {
            code: status.code(),
            stdout: stdout.collect(deadline),
            stderr: stderr.collect(deadline),
        };
        tracing::debug!(program, code = ?out.code, "finished");
        Ok(out)
    }
}
