//! Firing coordination.
//!
//! The coordinator owns the single "currently ringing" slot. A firing
//! episode walks `idle -> ringing -> (dismissed | snoozed)`:
//!
//! - at most one alarm is ringing system-wide at any instant; callers that
//!   find the slot busy simply retry on a later scan tick
//! - tone playback failures degrade to a simulated cue and never abort
//!   the episode
//! - the decision wait races a real deadline; no answer auto-snoozes,
//!   Ctrl-C dismisses

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::sound::SoundPlayer;
use crate::store::SharedStore;
use crate::types::{Alarm, FireTime};

use super::snooze::snoozed_instance;

// ============================================================================
// Protocol types
// ============================================================================

/// A line of input routed to the decision protocol while an alarm rings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseLine {
    /// Raw text the user typed.
    Line(String),
    /// Emergency interrupt (Ctrl-C) observed while ringing.
    Interrupt,
}

/// The user's decision for a ringing alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Stop this alarm; resets its snooze bookkeeping.
    Dismiss,
    /// Postpone by the alarm's snooze duration.
    Snooze,
}

/// How a firing episode ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FiringOutcome {
    /// The alarm was dismissed.
    Dismissed,
    /// The alarm was snoozed; the contained instance is the follow-up to
    /// hand to an independent watch task.
    Snoozed(Alarm),
}

/// Notifications emitted by the engine for the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmEvent {
    /// An alarm started ringing and awaits a decision.
    Ringing {
        /// Alarm label.
        label: String,
        /// Scheduled fire time.
        time: FireTime,
        /// Snooze count of the ringing instance.
        snooze_count: u32,
    },
    /// Tone playback failed; a simulated cue should be shown instead.
    PlaybackFailed {
        /// Why playback failed.
        reason: String,
    },
    /// The user typed something that is neither dismiss nor snooze.
    InvalidResponse {
        /// The rejected input.
        input: String,
    },
    /// The ringing alarm was snoozed.
    Snoozed {
        /// Label of the follow-up instance.
        label: String,
        /// When the follow-up will ring.
        time: FireTime,
        /// Snooze count of the follow-up instance.
        snooze_count: u32,
        /// Snooze duration in minutes.
        minutes: u32,
    },
    /// The ringing alarm was dismissed.
    Dismissed {
        /// Alarm label.
        label: String,
    },
}

/// Parses a routed input line into a decision.
///
/// `1`/`dismiss` dismiss, `2`/`snooze`/empty input snooze, anything else
/// is rejected.
#[must_use]
pub fn parse_decision(input: &str) -> Option<Decision> {
    match input.trim().to_lowercase().as_str() {
        "1" | "dismiss" => Some(Decision::Dismiss),
        "2" | "" | "snooze" => Some(Decision::Snooze),
        _ => None,
    }
}

// ============================================================================
// FiringCoordinator
// ============================================================================

/// Serializes firing episodes and runs the decision protocol.
pub struct FiringCoordinator {
    store: SharedStore,
    player: Arc<dyn SoundPlayer>,
    events: mpsc::UnboundedSender<AlarmEvent>,
    /// Routed input lines, consumed only while ringing.
    responses: Mutex<mpsc::UnboundedReceiver<ResponseLine>>,
    /// The single firing slot. `try_lock` failure means another alarm is
    /// ringing right now.
    slot: Mutex<()>,
    /// Mirrors slot occupancy for the stdin router and the signal task.
    ringing: watch::Sender<bool>,
    response_timeout: Duration,
}

impl FiringCoordinator {
    /// Creates a coordinator.
    ///
    /// `responses` carries input lines routed here while an alarm rings;
    /// `events` receives display notifications; `response_timeout` bounds
    /// the decision wait (timeout auto-snoozes).
    pub fn new(
        store: SharedStore,
        player: Arc<dyn SoundPlayer>,
        events: mpsc::UnboundedSender<AlarmEvent>,
        responses: mpsc::UnboundedReceiver<ResponseLine>,
        response_timeout: Duration,
    ) -> Self {
        let (ringing, _) = watch::channel(false);
        Self {
            store,
            player,
            events,
            responses: Mutex::new(responses),
            slot: Mutex::new(()),
            ringing,
            response_timeout,
        }
    }

    /// True while a firing episode is in progress.
    #[must_use]
    pub fn is_ringing(&self) -> bool {
        *self.ringing.borrow()
    }

    /// Subscribes to ringing-state changes (used by the input router).
    #[must_use]
    pub fn ringing_state(&self) -> watch::Receiver<bool> {
        self.ringing.subscribe()
    }

    /// Runs one firing episode for `alarm`.
    ///
    /// Returns `None` without ringing if another episode is in progress;
    /// the caller retries on a later tick. Otherwise plays the tone, awaits
    /// the decision, applies the outcome to the stored alarm and reports
    /// how the episode ended.
    pub async fn fire(&self, alarm: Alarm) -> Option<FiringOutcome> {
        let Ok(_guard) = self.slot.try_lock() else {
            debug!(label = %alarm.label, "firing slot busy, deferring to next scan");
            return None;
        };

        self.ringing.send_replace(true);
        let outcome = self.run_episode(&alarm).await;
        self.ringing.send_replace(false);
        Some(outcome)
    }

    async fn run_episode(&self, alarm: &Alarm) -> FiringOutcome {
        self.emit(AlarmEvent::Ringing {
            label: alarm.label.clone(),
            time: alarm.time,
            snooze_count: alarm.snooze_count,
        });

        if let Err(e) = self.player.play(&alarm.tone) {
            warn!(tone = %alarm.tone.display(), "tone playback failed: {e}");
            self.emit(AlarmEvent::PlaybackFailed {
                reason: e.to_string(),
            });
        }

        match self.await_decision().await {
            Decision::Dismiss => {
                self.apply_dismiss(alarm).await;
                FiringOutcome::Dismissed
            }
            Decision::Snooze => {
                let follow = self.apply_snooze(alarm).await;
                FiringOutcome::Snoozed(follow)
            }
        }
    }

    /// Waits for a dismiss/snooze decision.
    ///
    /// Invalid input gets a corrective event and another chance; the whole
    /// wait is bounded by the response deadline, after which the alarm is
    /// snoozed automatically. An interrupt dismisses immediately.
    async fn await_decision(&self) -> Decision {
        let deadline = Instant::now() + self.response_timeout;
        let mut responses = self.responses.lock().await;

        loop {
            tokio::select! {
                () = tokio::time::sleep_until(deadline) => {
                    debug!("no response before deadline, auto-snoozing");
                    return Decision::Snooze;
                }
                line = responses.recv() => match line {
                    None => {
                        // Input channel closed; let the deadline decide.
                        tokio::time::sleep_until(deadline).await;
                        return Decision::Snooze;
                    }
                    Some(ResponseLine::Interrupt) => return Decision::Dismiss,
                    Some(ResponseLine::Line(text)) => match parse_decision(&text) {
                        Some(decision) => return decision,
                        None => self.emit(AlarmEvent::InvalidResponse { input: text }),
                    },
                },
            }
        }
    }

    async fn apply_dismiss(&self, alarm: &Alarm) {
        let mut store = self.store.lock().await;
        if let Some(origin) = store.get_mut(&alarm.id) {
            origin.snoozed = false;
            origin.snooze_count = 0;
        }
        drop(store);

        self.emit(AlarmEvent::Dismissed {
            label: alarm.label.clone(),
        });
    }

    async fn apply_snooze(&self, alarm: &Alarm) -> Alarm {
        let follow = snoozed_instance(alarm, Local::now());

        // Park the stored alarm while the follow-up is pending, so the
        // main scan cannot fire it a second time.
        let mut store = self.store.lock().await;
        if let Some(origin) = store.get_mut(&alarm.id) {
            origin.snoozed = true;
        }
        drop(store);

        self.emit(AlarmEvent::Snoozed {
            label: follow.label.clone(),
            time: follow.time,
            snooze_count: follow.snooze_count,
            minutes: follow.snooze_minutes,
        });
        follow
    }

    fn emit(&self, event: AlarmEvent) {
        if self.events.send(event).is_err() {
            debug!("event channel closed, display task gone");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
