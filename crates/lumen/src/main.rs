//! Lumen: a terminal launcher for extension commands.

mod cli;

use std::process::ExitCode;

use lumen_core::LumenError;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<LumenError>() {
                Some(LumenError::Usage { message }) => eprintln!("{}", message),
                _ => eprintln!("Error: {:#}", err),
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Map a failure to the process exit code. Errors that did not come from the
/// core library exit with 2.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<LumenError>()
        .map(LumenError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(2)
}
