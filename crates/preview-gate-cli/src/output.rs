//! GitHub Actions workflow commands: step outputs and failure annotations.

use std::io::Write;
use std::path::PathBuf;

use preview_gate_core::{GateError, OutputSink};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Writes step outputs where the runner expects them.
///
/// With `GITHUB_OUTPUT` set, outputs are appended to that file using the
/// `name<<delimiter` form; otherwise the legacy `::set-output` command is
/// printed to stdout.
pub struct ActionOutputs {
    file: Option<PathBuf>,
}

impl ActionOutputs {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self { file }
    }
}

impl OutputSink for ActionOutputs {
    fn set_output(&mut self, name: &str, value: &str) -> preview_gate_core::Result<()> {
        let Some(path) = &self.file else {
            println!("::set-output name={name}::{}", escape_data(value));
            return Ok(());
        };

        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        let entry = format!("{name}<<{delimiter}\n{value}\n{delimiter}\n");
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut f| f.write_all(entry.as_bytes()))
            .map_err(|source| GateError::Output {
                name: name.to_string(),
                source,
            })
    }
}

/// Emit an `::error::` annotation; the runner marks the step failed once the
/// process exits non-zero.
pub fn report_failure(message: &str) {
    println!("{}", failure_line(message));
}

fn failure_line(message: &str) -> String {
    let message = if message.trim().is_empty() {
        "unspecified error occurred"
    } else {
        message
    };
    format!("::error::{}", escape_data(message))
}

/// Workflow command data escaping: `%`, CR and LF.
fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}
