//! Snooze computation.
//!
//! A snoozed firing does not reschedule the stored alarm; it produces a
//! fresh pending instance offset by the alarm's snooze duration, which an
//! independent watch task then monitors.

use chrono::{DateTime, Duration, Local};

use crate::types::{Alarm, FireTime};

/// Computes the follow-up instance for a snoozed firing.
///
/// The result fires at the time-of-day of `now + snooze_minutes`, at minute
/// resolution (seconds are dropped, matching the due-scan granularity). The
/// label gains a `(Snooze n)` suffix and the snooze count is incremented;
/// repeated snoozes chain suffixes. The instance keeps the identity of the
/// stored alarm it descends from and is itself active (not snoozed).
///
/// This is a pure function: deterministic given `now`, no side effects.
#[must_use]
pub fn snoozed_instance(alarm: &Alarm, now: DateTime<Local>) -> Alarm {
    let fire_at = now + Duration::minutes(i64::from(alarm.snooze_minutes));
    let count = alarm.snooze_count + 1;

    let mut instance = alarm.clone();
    instance.time = FireTime::from_instant(&fire_at);
    instance.label = format!("{} (Snooze {count})", alarm.label);
    instance.snooze_count = count;
    instance.snoozed = false;
    instance.last_fired = None;
    instance
}
