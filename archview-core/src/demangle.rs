//! Symbol demangling through an external filter such as `c++filt`.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{ArchviewError, Result};

/// Filter used when none is configured.
pub const DEFAULT_DEMANGLER: &str = "c++filt";

/// Pipe `input` through `command` and return its standard output.
///
/// `command` is split on whitespace into a program and its arguments. The
/// call blocks until the filter exits.
pub fn demangle(command: &str, input: &str) -> Result<String> {
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or(DEFAULT_DEMANGLER);

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ArchviewError::Spawn {
            command: command.to_string(),
            source,
        })?;

    // Feed stdin from another thread so a full stdout pipe cannot stall us.
    let mut stdin = child.stdin.take();
    let payload = input.to_owned();
    let writer = std::thread::spawn(move || -> std::io::Result<()> {
        if let Some(stdin) = stdin.as_mut() {
            stdin.write_all(payload.as_bytes())?;
        }
        Ok(())
    });

    let output = child
        .wait_with_output()
        .map_err(|source| ArchviewError::Spawn {
            command: command.to_string(),
            source,
        })?;

    if let Ok(Err(e)) = writer.join() {
        // A filter that exits early closes its stdin; its status decides.
        tracing::debug!("writing to {} failed: {}", command, e);
    }

    if !output.status.success() {
        return Err(ArchviewError::Demangle {
            command: command.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    tracing::debug!(bytes = output.stdout.len(), "demangled with {}", command);
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
