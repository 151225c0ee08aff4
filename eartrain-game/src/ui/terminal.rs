//! Interactive terminal front end
//!
//! Raw-mode crossterm screen showing the note row, status line and guess
//! input. Key presses are forwarded to the controller; the screen is redrawn
//! from the event stream only.

use crate::error::{Error, Result};
use crate::session::GameController;
use crate::ui::input::{command_for, UiCommand};
use crate::ui::view::ViewModel;
use crossterm::event::{Event, EventStream};
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use eartrain_common::Note;
use futures::StreamExt;
use std::io::{stdout, Stdout, Write};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

const HELP: &str = "Ctrl+S start | Enter submit | Esc quit round | Ctrl+C exit";
const HELP_GUESSING: &str = "Enter submit | Esc quit round | Ctrl+C exit";
const HELP_PLAYING: &str = "Listening... Esc quit round | Ctrl+C exit";

/// Raw mode and alternate screen, restored on drop
struct TerminalGuard;

impl TerminalGuard {
    fn enter(out: &mut Stdout) -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| Error::Terminal(format!("Failed to enable raw mode: {}", e)))?;
        let guard = Self;
        execute!(out, EnterAlternateScreen, cursor::Hide)
            .map_err(|e| Error::Terminal(format!("Failed to enter alternate screen: {}", e)))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        let _ = execute!(out, cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Run the terminal UI until the user exits
pub async fn run(controller: GameController) -> Result<()> {
    let mut out = stdout();
    let _guard = TerminalGuard::enter(&mut out)?;

    let mut game_events = controller.subscribe();
    let mut keys = EventStream::new();
    let mut view = ViewModel::new();

    render(&mut out, &view)?;

    loop {
        tokio::select! {
            key = keys.next() => match key {
                Some(Ok(Event::Key(key))) => {
                    let Some(command) = command_for(&key) else {
                        continue;
                    };
                    if let Flow::Exit = dispatch(&controller, &mut view, command).await {
                        break;
                    }
                }
                Some(Ok(Event::Resize(..))) => {}
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    controller.quit_round().await;
                    return Err(e.into());
                }
                None => break,
            },
            received = game_events.recv() => match received {
                Ok(event) => {
                    debug!("UI event {}", event.event_type());
                    view.apply(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("UI lagged behind game events, skipped {}", skipped);
                }
                Err(RecvError::Closed) => break,
            },
        }

        render(&mut out, &view)?;
    }

    controller.quit_round().await;
    debug!("Terminal UI closed");
    Ok(())
}

async fn dispatch(controller: &GameController, view: &mut ViewModel, command: UiCommand) -> Flow {
    match command {
        UiCommand::Start => {
            if view.start_enabled {
                controller.spawn_round();
            }
        }
        UiCommand::Submit => {
            if let Some(text) = view.submission() {
                let text = text.to_string();
                controller.submit_guess(&text).await;
            }
        }
        UiCommand::Quit => controller.quit_round().await,
        UiCommand::Exit => return Flow::Exit,
        UiCommand::Char(c) => view.push_char(c),
        UiCommand::Backspace => view.backspace(),
    }
    Flow::Continue
}

fn render(out: &mut Stdout, view: &ViewModel) -> Result<()> {
    queue!(
        out,
        terminal::Clear(ClearType::All),
        cursor::MoveTo(2, 1),
        SetForegroundColor(Color::Cyan),
        Print("Ear Trainer"),
        ResetColor,
        cursor::MoveTo(2, 3),
    )?;

    for note in Note::ALL {
        if view.is_underlined(note) {
            queue!(
                out,
                SetAttribute(Attribute::Underlined),
                SetAttribute(Attribute::Bold),
                Print(note.letter()),
                SetAttribute(Attribute::Reset),
            )?;
        } else {
            queue!(out, Print(note.letter()))?;
        }
        queue!(out, Print("   "))?;
    }

    let input_color = if view.input_enabled {
        Color::Yellow
    } else {
        Color::DarkGrey
    };

    queue!(
        out,
        cursor::MoveTo(2, 5),
        Print(&view.status),
        cursor::MoveTo(2, 7),
        SetForegroundColor(input_color),
        Print("Guess: "),
        ResetColor,
        Print(&view.input),
        cursor::MoveTo(2, 9),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "Round {}   Score {}/{}",
            view.round, view.correct, view.judged
        )),
        cursor::MoveTo(2, 11),
        Print(help_line(view)),
        ResetColor,
    )?;

    out.flush()?;
    Ok(())
}

/// Key hints for what the controls currently accept
fn help_line(view: &ViewModel) -> &'static str {
    if view.start_enabled {
        HELP
    } else if view.input_enabled {
        HELP_GUESSING
    } else {
        HELP_PLAYING
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eartrain_common::events::GameEvent;

    fn controls(start_enabled: bool, input_enabled: bool) -> ViewModel {
        let mut view = ViewModel::new();
        view.apply(&GameEvent::ControlsChanged {
            start_enabled,
            input_enabled,
        });
        view
    }

    #[test]
    fn test_help_line_follows_controls() {
        assert_eq!(help_line(&controls(true, false)), HELP);
        assert_eq!(help_line(&controls(false, false)), HELP_PLAYING);

        let guessing = help_line(&controls(false, true));
        assert_eq!(guessing, HELP_GUESSING);
        assert!(guessing.contains("Enter submit"));
        assert!(!guessing.contains("Listen"));
    }
}
