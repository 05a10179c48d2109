//! Extension process execution.
//!
//! The runner spawns a resolved program, feeds it its input on stdin and
//! captures stdout in full. It does not interpret the output: callers decide
//! whether the bytes are a page document or raw text.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::{LumenError, LumenResult};

/// A concrete process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Bytes written to the child's stdin. `None` leaves stdin empty.
    pub input: Option<Vec<u8>>,
    /// Extra environment variables for the child.
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    pub fn new(program: PathBuf, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            input: None,
            env: BTreeMap::new(),
        }
    }
}

/// Run an invocation to completion and return its stdout.
///
/// A non-zero exit status is reported as [`LumenError::ExitStatus`] carrying
/// the child's stderr. There is no timeout: a hung child blocks the caller.
pub fn run(invocation: &Invocation) -> LumenResult<Vec<u8>> {
    let mut command = Command::new(&invocation.program);
    command
        .args(&invocation.args)
        .envs(&invocation.env)
        .stdin(if invocation.input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!(program = %invocation.program.display(), args = ?invocation.args, "spawning");
    let mut child = command.spawn().map_err(|source| LumenError::Spawn {
        program: invocation.program.clone(),
        source,
    })?;

    // Feed stdin from a separate thread so a child that writes before it
    // reads cannot deadlock against us.
    let writer = match (child.stdin.take(), invocation.input.clone()) {
        (Some(mut stdin), Some(input)) => Some(std::thread::spawn(move || {
            // A child that exits without reading its input is not an error.
            let _ = stdin.write_all(&input);
        })),
        _ => None,
    };

    let output = child.wait_with_output()?;
    if let Some(writer) = writer {
        let _ = writer.join();
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::debug!(program = %invocation.program.display(), status = ?output.status, "child failed");
        return Err(LumenError::ExitStatus {
            program: invocation.program.clone(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    Ok(output.stdout)
}
