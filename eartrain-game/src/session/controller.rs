//! Game session controller - round lifecycle and playback sequencing
//!
//! **Round sequence:**
//! 1. Scale: every note in canonical order, one note duration each
//! 2. Cue: the first scale note, `cue_repeats` times
//! 3. Target: random note starts playing (no indicator), guess input opens
//! 4. Judgement: one guess, then after `advance_delay` the next round starts
//!
//! Every step is preceded by a checkpoint. Quit sets the cancel flag; the
//! in-flight note is not preempted, the sequence stops at the next checkpoint.
//! The state lock is never held across an `.await`.

use crate::audio::AudioPlayer;
use crate::session::picker::TargetPicker;
use crate::session::state::{Controls, SessionSnapshot, SessionState};
use eartrain_common::config::GameTiming;
use eartrain_common::events::{EventBus, GameEvent, Status};
use eartrain_common::Note;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// How a call to `start_round` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Target is playing and the guess input is open
    AwaitingGuess,
    /// Quit (or a newer round) cut the sequence short
    Cancelled,
    /// Another round was already running; nothing changed
    AlreadyInProgress,
}

/// Result of judging one guess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgement {
    pub round: u64,
    /// Guess after trimming and uppercasing
    pub guess: String,
    pub target: Note,
    pub correct: bool,
}

struct Inner {
    state: Mutex<SessionState>,
    picker: Mutex<Box<dyn TargetPicker>>,
    player: Arc<dyn AudioPlayer>,
    events: EventBus,
    timing: GameTiming,
}

/// Owns the session state and drives rounds.
///
/// Cheap to clone; clones share one session. UI handlers hold a clone and
/// delegate into it.
#[derive(Clone)]
pub struct GameController {
    inner: Arc<Inner>,
}

impl GameController {
    pub fn new(
        player: Arc<dyn AudioPlayer>,
        picker: Box<dyn TargetPicker>,
        timing: GameTiming,
        events: EventBus,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::new()),
                picker: Mutex::new(picker),
                player,
                events,
                timing,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.inner.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    fn emit(&self, event: GameEvent) {
        self.inner.events.emit_lossy(event);
    }

    fn set_status(&self, status: Status) {
        self.emit(GameEvent::StatusChanged { status });
    }

    fn set_controls(&self, state: &mut SessionState, controls: Controls) {
        state.controls = controls;
        self.emit(GameEvent::ControlsChanged {
            start_enabled: controls.start_enabled,
            input_enabled: controls.input_enabled,
        });
    }

    /// Run `start_round` as its own task
    pub fn spawn_round(&self) -> JoinHandle<RoundOutcome> {
        let controller = self.clone();
        tokio::spawn(async move { controller.start_round().await })
    }

    /// Play one round up to the point where a guess is expected.
    ///
    /// No-op while a round is in progress.
    pub async fn start_round(&self) -> RoundOutcome {
        let round = {
            let mut state = self.inner.state.lock().await;
            if state.in_progress {
                debug!("Round {} already in progress, ignoring start", state.round);
                return RoundOutcome::AlreadyInProgress;
            }
            let round = state.begin_round();
            self.set_controls(
                &mut state,
                Controls {
                    start_enabled: false,
                    input_enabled: false,
                },
            );
            round
        };

        info!("Round {} started", round);
        self.emit(GameEvent::RoundStarted {
            round,
            timestamp: chrono::Utc::now(),
        });
        self.set_status(Status::PlayingScale);

        if !self.play_scale_for(round).await {
            return self.cancelled(round);
        }

        for repeat in 0..self.inner.timing.cue_repeats {
            debug!("Round {} cue {}/{}", round, repeat + 1, self.inner.timing.cue_repeats);
            if !self.play_step(round, Note::CUE, true).await {
                return self.cancelled(round);
            }
        }

        let target = self.inner.picker.lock().await.pick();

        let mut state = self.inner.state.lock().await;
        if !state.may_continue(round) {
            drop(state);
            return self.cancelled(round);
        }

        state.start_playback(self.inner.player.as_ref(), target);
        state.target_note = Some(target);
        self.set_controls(
            &mut state,
            Controls {
                start_enabled: false,
                input_enabled: true,
            },
        );
        drop(state);

        debug!("Round {} target chosen", round);
        self.set_status(Status::AwaitingGuess);
        RoundOutcome::AwaitingGuess
    }

    fn cancelled(&self, round: u64) -> RoundOutcome {
        debug!("Round {} sequence stopped at checkpoint", round);
        RoundOutcome::Cancelled
    }

    /// Play the reference scale for the current round.
    ///
    /// Returns false if the scale was cut short by quit.
    pub async fn play_scale(&self) -> bool {
        let round = self.inner.state.lock().await.round;
        self.play_scale_for(round).await
    }

    async fn play_scale_for(&self, round: u64) -> bool {
        for note in Note::ALL {
            if !self.play_step(round, note, true).await {
                return false;
            }
        }
        true
    }

    /// One sequenced note: checkpoint, start clip, wait one note duration.
    ///
    /// Returns false if the checkpoint before or after the wait failed. On the
    /// cancelled path the indicator is left as is; quit clears all of them.
    async fn play_step(&self, round: u64, note: Note, show_indicator: bool) -> bool {
        {
            let mut state = self.inner.state.lock().await;
            if !state.may_continue(round) {
                return false;
            }
            state.start_playback(self.inner.player.as_ref(), note);
        }

        debug!("Round {} playing {}", round, note);
        if show_indicator {
            self.emit(GameEvent::NoteIndicator { note, active: true });
        }

        tokio::time::sleep(self.inner.timing.note_duration).await;

        if !self.inner.state.lock().await.may_continue(round) {
            return false;
        }

        if show_indicator {
            self.emit(GameEvent::NoteIndicator { note, active: false });
        }
        true
    }

    /// Judge a guess for the current round.
    ///
    /// Returns None (and changes nothing) when no round is in progress or the
    /// target has not started playing yet. Otherwise schedules the next round
    /// after the advance delay.
    pub async fn submit_guess(&self, raw_input: &str) -> Option<Judgement> {
        let judgement = {
            let mut state = self.inner.state.lock().await;
            if !state.in_progress {
                debug!("Guess ignored, no round in progress");
                return None;
            }
            let Some(target) = state.target_note else {
                debug!("Guess ignored, round {} target not revealed yet", state.round);
                return None;
            };

            let guess = Note::normalize_guess(raw_input);
            let correct = target.matches_guess(&guess);

            state.in_progress = false;
            state.advance_pending = true;
            let controls = Controls {
                input_enabled: false,
                ..state.controls
            };
            self.set_controls(&mut state, controls);

            Judgement {
                round: state.round,
                guess,
                target,
                correct,
            }
        };

        info!(
            "Round {} judged: guess={:?} target={} correct={}",
            judgement.round, judgement.guess, judgement.target, judgement.correct
        );

        self.emit(GameEvent::RoundJudged {
            round: judgement.round,
            guess: judgement.guess.clone(),
            target: judgement.target,
            correct: judgement.correct,
            timestamp: chrono::Utc::now(),
        });
        self.set_status(if judgement.correct {
            Status::Correct
        } else {
            Status::Incorrect {
                answer: judgement.target,
            }
        });

        self.schedule_advance(judgement.round);
        Some(judgement)
    }

    fn schedule_advance(&self, round: u64) {
        let controller = self.clone();
        let delay = self.inner.timing.advance_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut state = controller.inner.state.lock().await;
                if !state.may_continue(round) || state.in_progress {
                    if state.round == round {
                        state.advance_pending = false;
                    }
                    debug!("Auto-advance after round {} skipped", round);
                    return;
                }
            }

            controller.emit(GameEvent::InputReset);
            controller.start_round().await;
        });
    }

    /// Cancel whatever is running. Idempotent.
    pub async fn quit_round(&self) {
        let round = {
            let mut state = self.inner.state.lock().await;
            state.cancel_requested = true;
            state.advance_pending = false;
            if let Some(note) = state.stop_playback() {
                debug!("Stopped {} on quit", note);
            }
            state.in_progress = false;
            state.target_note = None;
            self.set_controls(
                &mut state,
                Controls {
                    start_enabled: true,
                    input_enabled: true,
                },
            );
            state.round
        };

        info!("Round {} cancelled", round);
        self.emit(GameEvent::RoundCancelled {
            round,
            timestamp: chrono::Utc::now(),
        });
        self.set_status(Status::Stopped);
        self.emit(GameEvent::IndicatorsCleared);
    }
}
