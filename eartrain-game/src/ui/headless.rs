//! Line-oriented front end for scripting and pipes
//!
//! Reads commands from stdin, one per line:
//! - `start` / `s`: start a round
//! - `quit` / `q`: quit the current round
//! - `state`: print the session snapshot
//! - `exit`: leave the program
//! - anything else: submitted as a guess
//!
//! Every game event is written to stdout as one JSON object per line. When
//! input ends, events keep flowing until the session settles (the pending
//! round reaches its guess or is judged and advanced), then the round is
//! quit. Ctrl+C quits at once.

use crate::error::Result;
use crate::session::{GameController, RoundOutcome};
use eartrain_common::events::GameEvent;
use serde::Serialize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand {
    Start,
    Quit,
    State,
    Exit,
    Guess(String),
}

impl LineCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "start" | "s" => Self::Start,
            "quit" | "q" => Self::Quit,
            "state" => Self::State,
            "exit" => Self::Exit,
            _ => Self::Guess(line.to_string()),
        }
    }
}

/// Drive the session from stdin until input ends, `exit`, or Ctrl+C
pub async fn run(controller: GameController) -> Result<()> {
    let mut out = std::io::stdout();
    tokio::select! {
        result = run_with(&controller, BufReader::new(tokio::io::stdin()), &mut out) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, quitting round");
            controller.quit_round().await;
            Ok(())
        }
    }
}

/// Drive the session from `reader`, writing JSON lines to `out`
pub async fn run_with<R, W>(controller: &GameController, reader: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut game_events = controller.subscribe();
    let mut lines = reader.lines();
    let mut pending_round: Option<JoinHandle<RoundOutcome>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed, waiting for the session to settle");
                    settle(controller, &mut game_events, pending_round.take(), out).await?;
                    break;
                };
                match LineCommand::parse(&line) {
                    LineCommand::Start => {
                        pending_round = Some(controller.spawn_round());
                    }
                    LineCommand::Quit => controller.quit_round().await,
                    LineCommand::State => {
                        let snapshot = controller.snapshot().await;
                        write_json(out, &serde_json::json!({ "snapshot": snapshot }))?;
                    }
                    LineCommand::Exit => break,
                    LineCommand::Guess(text) => {
                        if controller.submit_guess(&text).await.is_none() {
                            warn!("Guess {:?} ignored, no target to judge", text);
                        }
                    }
                }
            },
            received = game_events.recv() => {
                if !forward(received, out)? {
                    break;
                }
            },
        }
    }

    controller.quit_round().await;
    drain(&mut game_events, out)
}

/// Forward events until the last started round has played out and the
/// snapshot reports nothing left scheduled
async fn settle<W: Write>(
    controller: &GameController,
    game_events: &mut Receiver<GameEvent>,
    pending_round: Option<JoinHandle<RoundOutcome>>,
    out: &mut W,
) -> Result<()> {
    if let Some(mut round) = pending_round {
        loop {
            tokio::select! {
                outcome = &mut round => {
                    match outcome {
                        Ok(outcome) => debug!("Pending round ended: {:?}", outcome),
                        Err(e) => warn!("Round task failed: {}", e),
                    }
                    break;
                },
                received = game_events.recv() => {
                    if !forward(received, out)? {
                        return Ok(());
                    }
                },
            }
        }
    }

    while !controller.snapshot().await.is_settled() {
        if !forward(game_events.recv().await, out)? {
            break;
        }
    }
    Ok(())
}

/// Write one received event; false once the bus is gone
fn forward<W: Write>(
    received: std::result::Result<GameEvent, RecvError>,
    out: &mut W,
) -> Result<bool> {
    match received {
        Ok(event) => write_json(out, &event)?,
        Err(RecvError::Lagged(skipped)) => {
            warn!("Output lagged behind game events, skipped {}", skipped);
        }
        Err(RecvError::Closed) => return Ok(false),
    }
    Ok(true)
}

fn drain<W: Write>(receiver: &mut Receiver<GameEvent>, out: &mut W) -> Result<()> {
    loop {
        match receiver.try_recv() {
            Ok(event) => write_json(out, &event)?,
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => return Ok(()),
        }
    }
}

fn write_json<T: Serialize, W: Write>(out: &mut W, value: &T) -> Result<()> {
    let line = serde_json::to_string(value)?;
    writeln!(out, "{}", line)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::session::UniformPicker;
    use eartrain_common::config::GameTiming;
    use eartrain_common::events::EventBus;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn silent_controller() -> GameController {
        GameController::new(
            Arc::new(SilentPlayer),
            Box::new(UniformPicker::new(Some(7))),
            GameTiming::default(),
            EventBus::default(),
        )
    }

    fn parse_output(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn is_status(event: &Value, kind: &str) -> bool {
        event["type"] == "StatusChanged" && event["status"]["kind"] == kind
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(LineCommand::parse("start"), LineCommand::Start);
        assert_eq!(LineCommand::parse(" S "), LineCommand::Start);
        assert_eq!(LineCommand::parse("q"), LineCommand::Quit);
        assert_eq!(LineCommand::parse("exit"), LineCommand::Exit);
        assert_eq!(LineCommand::parse("STATE"), LineCommand::State);
        assert_eq!(LineCommand::parse(" g "), LineCommand::Guess(" g ".to_string()));
        assert_eq!(LineCommand::parse(""), LineCommand::Guess(String::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_lets_round_reach_guess() {
        let controller = silent_controller();
        let mut out = Vec::new();

        // The guess arrives before any target is revealed and is ignored
        run_with(&controller, &b"start\nC\n"[..], &mut out).await.unwrap();

        let events = parse_output(out);
        let awaiting = events
            .iter()
            .position(|e| is_status(e, "awaiting_guess"))
            .expect("round reached its guess");
        let cancelled = events
            .iter()
            .position(|e| e["type"] == "RoundCancelled")
            .expect("round quit after input closed");
        assert!(awaiting < cancelled);
        assert!(!events.iter().any(|e| e["type"] == "RoundJudged"));
        assert_eq!(events.last().unwrap()["type"], "IndicatorsCleared");
        assert!(!controller.snapshot().await.in_progress);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_waits_out_auto_advance() {
        let controller = silent_controller();
        let (mut input, reader) = tokio::io::duplex(64);
        let script = tokio::spawn(async move {
            input.write_all(b"start\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            input.write_all(b"c\nstate\n").await.unwrap();
        });

        let mut out = Vec::new();
        run_with(&controller, BufReader::new(reader), &mut out).await.unwrap();
        script.await.unwrap();

        let events = parse_output(out);
        let judged = events
            .iter()
            .position(|e| e["type"] == "RoundJudged" && e["round"] == 1)
            .expect("first round judged");
        let snapshot = events
            .iter()
            .find(|e| e.get("snapshot").is_some())
            .expect("state printed");
        assert_eq!(snapshot["snapshot"]["advance_pending"], true);

        let next_round = events
            .iter()
            .position(|e| e["type"] == "RoundStarted" && e["round"] == 2)
            .expect("auto-advance ran after input closed");
        assert!(judged < next_round);
        assert!(events[next_round..].iter().any(|e| is_status(e, "awaiting_guess")));
        assert_eq!(controller.snapshot().await.round, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_quits_without_waiting() {
        let controller = silent_controller();
        let started = tokio::time::Instant::now();
        let mut out = Vec::new();

        run_with(&controller, &b"exit\n"[..], &mut out).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(1));
        let events = parse_output(out);
        assert!(events.iter().any(|e| e["type"] == "RoundCancelled"));
        assert!(is_status(&events[events.len() - 2], "stopped"));
    }
}
