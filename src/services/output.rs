use crate::domain::models::{ErrorBody, JsonErr, JsonOut};
use console::style;
use serde::Serialize;

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok: true, data })?
        );
    } else {
        println!("{}", row(&data));
    }
    Ok(())
}

pub fn print_error(json: bool, code: &str, message: &str) {
    if json {
        let body = JsonErr {
            ok: false,
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        };
        match serde_json::to_string_pretty(&body) {
            Ok(s) => println!("{}", s),
            Err(_) => println!("{{\"ok\":false}}"),
        }
    } else {
        Reporter::new(false).error(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Operator-facing status lines: `[hh:mm:ss AM] message`, timestamp colored
/// by severity. Goes to stderr in JSON mode so stdout stays one document.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    to_stderr: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { to_stderr: json }
    }

    pub fn success(&self, message: &str) {
        self.emit(Severity::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Severity::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.emit(Severity::Error, message);
    }

    fn emit(&self, severity: Severity, message: &str) {
        let line = format_line(severity, &timestamp(), message);
        if self.to_stderr || severity == Severity::Error {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%I:%M:%S %p").to_string()
}

fn format_line(severity: Severity, ts: &str, message: &str) -> String {
    let ts = match severity {
        Severity::Success => style(ts).green(),
        Severity::Warning => style(ts).yellow(),
        Severity::Error => style(ts).red(),
    };
    format!("[{}] {}", ts, message)
}
