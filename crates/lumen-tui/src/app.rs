use std::io::{self, Stderr};
use std::thread;

use crossterm::event::{self as term, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc::{self, UnboundedSender};

use lumen_core::LumenResult;

use crate::event::Event;
use crate::model::Model;

type TuiTerminal = Terminal<CrosstermBackend<Stderr>>;

/// Run the interactive UI until the model quits.
///
/// Returns the text the model asked to print, if any; the caller writes it
/// once the terminal has been restored.
pub fn run(mut model: Model) -> LumenResult<Option<String>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut terminal = init_terminal()?;
    let result = runtime.block_on(event_loop(&mut terminal, &mut model));
    let restored = restore_terminal(&mut terminal);

    result?;
    restored?;
    Ok(model.take_output())
}

/// The UI draws on stderr so that stdout stays free for printed output.
fn init_terminal() -> io::Result<TuiTerminal> {
    enable_raw_mode()?;
    let mut stderr = io::stderr();
    execute!(stderr, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stderr))
}

fn restore_terminal(terminal: &mut TuiTerminal) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

async fn event_loop(terminal: &mut TuiTerminal, model: &mut Model) -> LumenResult<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    spawn_interrupt_listener(tx.clone());

    let size = terminal.size()?;
    model.handle_event(Event::Resize {
        width: size.width,
        height: size.height,
    });

    let mut quit = model.init().spawn(&tx);
    while !quit {
        terminal.draw(|frame| model.render(frame.area(), frame.buffer_mut()))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        quit = model.handle_event(event).spawn(&tx);
    }

    terminal.draw(|frame| model.render(frame.area(), frame.buffer_mut()))?;
    tracing::debug!("event loop finished");
    Ok(())
}

/// Forward terminal input to the loop from a dedicated thread, since reading
/// blocks.
fn spawn_input_reader(tx: UnboundedSender<Event>) {
    thread::spawn(move || loop {
        let event = match term::read() {
            Ok(term::Event::Key(key)) if key.kind != KeyEventKind::Release => Event::Key(key),
            Ok(term::Event::Resize(width, height)) => Event::Resize { width, height },
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "terminal input closed");
                break;
            }
        };

        if tx.send(event).is_err() {
            break;
        }
    });
}

fn spawn_interrupt_listener(tx: UnboundedSender<Event>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = tx.send(Event::Interrupt);
        }
    });
}
