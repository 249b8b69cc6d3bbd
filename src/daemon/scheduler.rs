//! Background scan loop and snooze watch tasks.
//!
//! The scheduler has two duties:
//!
//! 1. **Main scan**: every scan interval, ring due alarms (enabled, not
//!    parked behind a snooze, matching the current minute) in store order.
//!    Episodes are strictly serialized through the coordinator's single
//!    slot; an alarm blocked by a busy slot simply matches again on a later
//!    tick while its minute lasts.
//! 2. **Snooze watches**: each snoozed firing hands its follow-up instance
//!    to an independent watch loop with the same cadence. A watch ends when
//!    its alarm is dismissed and carries on with the new instance when it
//!    is snoozed again.
//!
//! All watch tasks live in a [`JoinSet`] and are aborted on shutdown, so no
//! background work outlives the running flag.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::store::SharedStore;
use crate::types::{minute_stamp, Alarm};

use super::coordinator::{FiringCoordinator, FiringOutcome};

// ============================================================================
// Scheduler
// ============================================================================

/// The periodic monitor driving alarm firings.
pub struct Scheduler {
    store: SharedStore,
    coordinator: Arc<FiringCoordinator>,
    scan_interval: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Scheduler {
    /// Creates a scheduler.
    ///
    /// `shutdown` is the process-wide running flag; flipping it to `true`
    /// stops the scan loop and cancels all outstanding watches.
    pub fn new(
        store: SharedStore,
        coordinator: Arc<FiringCoordinator>,
        scan_interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            store,
            coordinator,
            scan_interval,
            shutdown,
        }
    }

    /// Runs the scan loop until shutdown.
    ///
    /// Should be spawned as a separate tokio task.
    pub async fn run(mut self) {
        let mut watches = JoinSet::new();
        let mut ticker = interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.scan_interval.as_secs_f64(),
            "alarm monitoring started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.scan(&mut watches).await,
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        // Cancel every outstanding snooze watch before returning.
        watches.shutdown().await;
        info!("alarm monitoring stopped");
    }

    /// One scan pass: ring every due alarm, in store order.
    async fn scan(&mut self, watches: &mut JoinSet<()>) {
        let now = Local::now();
        let due: Vec<Alarm> = {
            let store = self.store.lock().await;
            store
                .iter()
                .filter(|(_, alarm)| alarm.is_due(&now))
                .map(|(_, alarm)| alarm.clone())
                .collect()
        };

        for alarm in due {
            if *self.shutdown.borrow() {
                return;
            }

            let id = alarm.id;
            let Some(outcome) = self.coordinator.fire(alarm).await else {
                // Slot busy (a snooze watch is ringing); this alarm matches
                // again on the next tick if its minute has not passed.
                continue;
            };

            // The episode ran: stamp the minute so a dismissed alarm does
            // not ring again before the clock moves on.
            {
                let mut store = self.store.lock().await;
                if let Some(origin) = store.get_mut(&id) {
                    origin.last_fired = Some(minute_stamp(&now));
                }
            }

            if let FiringOutcome::Snoozed(follow) = outcome {
                debug!(label = %follow.label, time = %follow.time, "starting snooze watch");
                watches.spawn(watch_snoozed(
                    self.coordinator.clone(),
                    self.shutdown.clone(),
                    follow,
                    self.scan_interval,
                ));
            }
        }
    }
}

// ============================================================================
// Snooze watch
// ============================================================================

/// Monitors a single snoozed instance until it is dismissed.
///
/// Checks the instance's fire time on the same cadence as the main scan.
/// When it rings and is snoozed again, the loop continues with the new
/// follow-up instance; a dismissal (or shutdown) ends the task.
pub async fn watch_snoozed(
    coordinator: Arc<FiringCoordinator>,
    mut shutdown: watch::Receiver<bool>,
    mut alarm: Alarm,
    scan_interval: Duration,
) {
    let mut ticker = interval(scan_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Local::now();
                if !alarm.time.matches(&now) {
                    continue;
                }
                match coordinator.fire(alarm.clone()).await {
                    // Slot busy; retry next tick while the minute lasts.
                    None => continue,
                    Some(FiringOutcome::Dismissed) => {
                        debug!(label = %alarm.label, "snooze watch finished");
                        return;
                    }
                    Some(FiringOutcome::Snoozed(follow)) => {
                        debug!(label = %follow.label, time = %follow.time, "snoozed again");
                        alarm = follow;
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return;
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::coordinator::{AlarmEvent, ResponseLine};
    use crate::sound::MockSoundPlayer;
    use crate::store::{shared_store, SharedStore};
    use crate::types::{Alarm, FireTime};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    const TICK: Duration = Duration::from_millis(20);

    struct Harness {
        store: SharedStore,
        coordinator: Arc<FiringCoordinator>,
        responses: mpsc::UnboundedSender<ResponseLine>,
        events: mpsc::UnboundedReceiver<AlarmEvent>,
        shutdown: watch::Sender<bool>,
    }

    fn harness() -> Harness {
        let store = shared_store();
        let player = Arc::new(MockSoundPlayer::new());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let coordinator = Arc::new(FiringCoordinator::new(
            store.clone(),
            player,
            event_tx,
            response_rx,
            Duration::from_secs(5),
        ));
        let (shutdown, _) = watch::channel(false);
        Harness {
            store,
            coordinator,
            responses: response_tx,
            events: event_rx,
            shutdown,
        }
    }

    fn spawn_scheduler(h: &Harness) -> tokio::task::JoinHandle<()> {
        let scheduler = Scheduler::new(
            h.store.clone(),
            h.coordinator.clone(),
            TICK,
            h.shutdown.subscribe(),
        );
        tokio::spawn(scheduler.run())
    }

    /// An alarm due in the current minute.
    fn due_now(label: &str) -> Alarm {
        let now = Local::now();
        Alarm::new(
            FireTime::from_instant(&now),
            "tones/beep.wav",
            5,
            Some(label.to_string()),
        )
    }

    async fn next_event(events: &mut mpsc::UnboundedReceiver<AlarmEvent>) -> AlarmEvent {
        timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("timed out waiting for an event")
            .expect("event channel closed")
    }

    async fn expect_no_ringing(events: &mut mpsc::UnboundedReceiver<AlarmEvent>, wait: Duration) {
        let result = timeout(wait, async {
            loop {
                if let Some(AlarmEvent::Ringing { label, .. }) = events.recv().await {
                    return label;
                }
            }
        })
        .await;
        assert!(result.is_err(), "unexpected ringing: {result:?}");
    }

    #[tokio::test]
    async fn test_due_alarm_rings_and_dismisses() {
        let mut h = harness();
        let alarm = due_now("Wake up");
        h.store.lock().await.add(alarm.clone());
        h.responses
            .send(ResponseLine::Line("1".to_string()))
            .unwrap();

        let handle = spawn_scheduler(&h);

        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { label, .. } if label == "Wake up"
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Dismissed { .. }
        ));

        h.shutdown.send(true).unwrap();
        timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler should stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_disabled_alarm_never_rings() {
        let mut h = harness();
        let mut alarm = due_now("Disabled");
        alarm.enabled = false;
        h.store.lock().await.add(alarm);

        let handle = spawn_scheduler(&h);
        expect_no_ringing(&mut h.events, Duration::from_millis(150)).await;

        h.shutdown.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_snoozed_flag_excludes_from_scan() {
        let mut h = harness();
        let mut alarm = due_now("Parked");
        alarm.snoozed = true;
        h.store.lock().await.add(alarm);

        let handle = spawn_scheduler(&h);
        expect_no_ringing(&mut h.events, Duration::from_millis(150)).await;

        h.shutdown.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_dismissed_alarm_does_not_rering_within_minute() {
        let mut h = harness();
        let alarm = due_now("Once");
        h.store.lock().await.add(alarm);
        h.responses
            .send(ResponseLine::Line("1".to_string()))
            .unwrap();

        let handle = spawn_scheduler(&h);

        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { .. }
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Dismissed { .. }
        ));

        // Several more ticks pass within the same minute without ringing.
        expect_no_ringing(&mut h.events, Duration::from_millis(150)).await;

        h.shutdown.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_snooze_parks_origin_and_spawns_watch() {
        let mut h = harness();
        let alarm = due_now("Snoozer");
        let id = h.store.lock().await.add(alarm);
        h.responses
            .send(ResponseLine::Line("2".to_string()))
            .unwrap();

        let handle = spawn_scheduler(&h);

        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { .. }
        ));
        let snoozed = next_event(&mut h.events).await;
        assert!(matches!(
            &snoozed,
            AlarmEvent::Snoozed { snooze_count: 1, minutes: 5, .. }
        ));

        // The stored alarm is parked and the scan leaves it alone.
        assert!(h.store.lock().await.get(&id).unwrap().snoozed);
        expect_no_ringing(&mut h.events, Duration::from_millis(150)).await;

        h.shutdown.send(true).unwrap();
        timeout(Duration::from_secs(2), handle)
            .await
            .expect("shutdown should also cancel the watch")
            .unwrap();
    }

    #[tokio::test]
    async fn test_simultaneous_alarms_ring_one_at_a_time() {
        let mut h = harness();
        h.store.lock().await.add(due_now("First"));
        h.store.lock().await.add(due_now("Second"));

        let handle = spawn_scheduler(&h);

        // One alarm rings; the other stays pending while the slot is held.
        let first = next_event(&mut h.events).await;
        assert!(matches!(first, AlarmEvent::Ringing { .. }));
        expect_no_ringing(&mut h.events, Duration::from_millis(100)).await;
        assert!(h.coordinator.is_ringing());

        // Resolving the first episode frees the slot for the second.
        h.responses
            .send(ResponseLine::Line("1".to_string()))
            .unwrap();
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Dismissed { .. }
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { .. }
        ));

        h.responses
            .send(ResponseLine::Line("1".to_string()))
            .unwrap();
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Dismissed { .. }
        ));

        h.shutdown.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_watch_rings_and_ends_on_dismiss() {
        let mut h = harness();
        let alarm = due_now("Watched");
        h.store.lock().await.add(alarm.clone());
        h.responses
            .send(ResponseLine::Line("1".to_string()))
            .unwrap();

        let watch_task = tokio::spawn(watch_snoozed(
            h.coordinator.clone(),
            h.shutdown.subscribe(),
            alarm,
            TICK,
        ));

        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { .. }
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Dismissed { .. }
        ));

        timeout(Duration::from_secs(2), watch_task)
            .await
            .expect("watch should end after dismissal")
            .unwrap();
    }

    #[tokio::test]
    async fn test_watch_continues_after_resnooze() {
        let mut h = harness();
        let alarm = due_now("Chained");
        h.store.lock().await.add(alarm.clone());
        h.responses
            .send(ResponseLine::Line("2".to_string()))
            .unwrap();

        let watch_task = tokio::spawn(watch_snoozed(
            h.coordinator.clone(),
            h.shutdown.subscribe(),
            alarm,
            TICK,
        ));

        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Ringing { .. }
        ));
        assert!(matches!(
            next_event(&mut h.events).await,
            AlarmEvent::Snoozed { snooze_count: 1, .. }
        ));

        // The follow-up is minutes away; the watch keeps running quietly
        // until shutdown cancels it.
        expect_no_ringing(&mut h.events, Duration::from_millis(100)).await;
        h.shutdown.send(true).unwrap();
        timeout(Duration::from_secs(2), watch_task)
            .await
            .expect("watch should stop on shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_idle_scheduler() {
        let h = harness();
        let handle = spawn_scheduler(&h);

        tokio::time::sleep(Duration::from_millis(50)).await;
        h.shutdown.send(true).unwrap();

        timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler should stop promptly")
            .unwrap();
    }
}
