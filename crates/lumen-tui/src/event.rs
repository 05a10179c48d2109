use crossterm::event::KeyEvent;

use lumen_core::{LumenError, LumenResult, RunTarget};

use crate::pages::Page;

/// Everything the model reacts to: terminal input and the results of
/// deferred work.
pub enum Event {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// SIGINT
    Interrupt,
    OpenUrl(String),
    CopyText(String),
    /// Exit and hand `text` to the caller for stdout.
    Print(String),
    Push(Page),
    Pop,
    /// Run an extension command in a new runner page.
    Run(RunTarget),
    Error(LumenError),
    /// Output of the runner page with id `runner`.
    RunnerOutput {
        runner: u64,
        result: LumenResult<Vec<u8>>,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Key(_) => "key",
            Event::Resize { .. } => "resize",
            Event::Interrupt => "interrupt",
            Event::OpenUrl(_) => "open-url",
            Event::CopyText(_) => "copy-text",
            Event::Print(_) => "print",
            Event::Push(_) => "push",
            Event::Pop => "pop",
            Event::Run(_) => "run",
            Event::Error(_) => "error",
            Event::RunnerOutput { .. } => "runner-output",
        }
    }
}
