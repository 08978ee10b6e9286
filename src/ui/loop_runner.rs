//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, fetch cycle results, signals and a periodic
//! tick.

use crate::app::{App, AppEvent, Trigger};
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, MouseButton, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::input::{handle_input, handle_mouse_down};
use super::render::render;

/// Number of frames in the loading spinner animation.
pub(super) const SPINNER_FRAMES: usize = 10;

/// Result of handling an input event.
pub enum Action {
    /// Keep running.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the dashboard until the user quits or a signal arrives.
///
/// Starts the initial fetch cycle (if a user is signed in) before entering
/// the loop. Mouse capture is only enabled while the menu is open, so
/// terminal text selection keeps working the rest of the time.
pub async fn run(
    app: &mut App,
    event_tx: mpsc::Sender<AppEvent>,
    mut event_rx: mpsc::Receiver<AppEvent>,
) -> Result<()> {
    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(250));
    let mut mouse_captured = false;

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    app.trigger_cycle(Trigger::Mount, &event_tx);

    loop {
        if app.needs_redraw {
            terminal.draw(|f| render(f, app))?;
            app.needs_redraw = false;
        }

        if app.menu.is_open() != mouse_captured {
            mouse_captured = app.menu.is_open();
            if mouse_captured {
                execute!(terminal.backend_mut(), EnableMouseCapture)?;
            } else {
                execute!(terminal.backend_mut(), DisableMouseCapture)?;
            }
            tracing::trace!(mouse_captured, "Mouse capture toggled");
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Drain finished cycles before waiting on more input
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break;
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break;
            }

            maybe_event = event_stream.next() => {
                let action = match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        handle_input(app, key.code, key.modifiers, &event_tx)
                    }
                    Some(Ok(Event::Mouse(mouse)))
                        if mouse.kind == MouseEventKind::Down(MouseButton::Left) =>
                    {
                        handle_mouse_down(app, mouse.column, mouse.row, &event_tx);
                        Ok(Action::Continue)
                    }
                    Some(Ok(Event::Resize(_, _))) => {
                        app.needs_redraw = true;
                        Ok(Action::Continue)
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Terminal event stream error");
                        Ok(Action::Continue)
                    }
                    None => break,
                    _ => Ok(Action::Continue),
                };
                match action {
                    Ok(Action::Quit) => break,
                    Ok(Action::Continue) => {}
                    Err(e) => app.set_status(format!("Error: {}", e)),
                }
            }

            Some(event) = event_rx.recv() => {
                app.handle_event(event);
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    }

    if mouse_captured {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    restore_terminal(terminal)?;
    Ok(())
}

/// Advance the spinner while a cycle is loading.
fn handle_tick(app: &mut App) {
    if app.feed.loading {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
