//! Core data types for the alarm clock.
//!
//! This module defines the data structures used for:
//! - Time-of-day representation and `HH:MM` parsing
//! - Alarm records with stable identifiers
//! - Runtime configuration with validation

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// FireTime
// ============================================================================

/// Errors produced when parsing a `HH:MM` time string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFormatError {
    /// Input did not have exactly two numeric `:`-separated segments.
    #[error("expected HH:MM in 24-hour format, got '{0}'")]
    Malformed(String),

    /// Hour segment was outside 0-23.
    #[error("hour {0} is out of range (0-23)")]
    HourOutOfRange(u32),

    /// Minute segment was outside 0-59.
    #[error("minute {0} is out of range (0-59)")]
    MinuteOutOfRange(u32),
}

/// A wall-clock time of day at minute resolution.
///
/// Alarms carry no date component: a `FireTime` is due every day at the
/// next occurrence of its hour and minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireTime {
    /// Hour in 24-hour format (0-23).
    pub hour: u32,
    /// Minute (0-59).
    pub minute: u32,
}

impl FireTime {
    /// Creates a fire time, validating both fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, TimeFormatError> {
        if hour > 23 {
            return Err(TimeFormatError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(TimeFormatError::MinuteOutOfRange(minute));
        }
        Ok(Self { hour, minute })
    }

    /// Returns true if the given instant falls within this fire time's
    /// minute. Seconds are ignored.
    #[must_use]
    pub fn matches(&self, now: &DateTime<Local>) -> bool {
        now.hour() == self.hour && now.minute() == self.minute
    }

    /// The time-of-day of `instant`, with seconds dropped.
    #[must_use]
    pub fn from_instant(instant: &DateTime<Local>) -> Self {
        Self {
            hour: instant.hour(),
            minute: instant.minute(),
        }
    }
}

impl FromStr for FireTime {
    type Err = TimeFormatError;

    /// Parses strict `HH:MM` (24-hour) input.
    ///
    /// Exactly two `:`-separated segments, both plain decimal numbers,
    /// hour 0-23 and minute 0-59. Everything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TimeFormatError::Malformed(s.to_string());

        let mut parts = s.split(':');
        let (Some(hour_part), Some(minute_part), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let hour: u32 = hour_part.parse().map_err(|_| malformed())?;
        let minute: u32 = minute_part.parse().map_err(|_| malformed())?;

        Self::new(hour, minute)
    }
}

impl fmt::Display for FireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Truncates an instant to its minute, for duplicate-firing suppression.
#[must_use]
pub fn minute_stamp(now: &DateTime<Local>) -> NaiveDateTime {
    let time = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default();
    NaiveDateTime::new(now.date_naive(), time)
}

// ============================================================================
// AlarmId
// ============================================================================

/// Stable, opaque alarm identity.
///
/// Alarms are shown to the user by 1-based ordinal, but the engine always
/// addresses them by id so that concurrent insertion and deletion cannot
/// redirect an operation to the wrong alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmId(Uuid);

impl AlarmId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Alarm
// ============================================================================

/// Minimum snooze duration in minutes.
pub const SNOOZE_MINUTES_MIN: u32 = 1;
/// Maximum snooze duration in minutes.
pub const SNOOZE_MINUTES_MAX: u32 = 60;

/// A single scheduled alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    /// Stable identifier.
    pub id: AlarmId,
    /// Time of day at which the alarm rings.
    pub time: FireTime,
    /// Path to the tone played when ringing. Opaque to the engine.
    pub tone: PathBuf,
    /// Snooze duration in minutes (1-60).
    pub snooze_minutes: u32,
    /// Display label.
    pub label: String,
    /// Disabled alarms are never scanned as due.
    pub enabled: bool,
    /// True while a snoozed instance derived from this alarm is pending in
    /// an independent watch task; excludes the alarm from the main scan.
    pub snoozed: bool,
    /// Number of consecutive snoozes. Reset to 0 on dismiss.
    pub snooze_count: u32,
    /// Minute of the most recent firing, so a dismissed alarm does not
    /// ring again before the minute rolls over.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_fired: Option<NaiveDateTime>,
}

impl Alarm {
    /// Creates a new enabled alarm.
    ///
    /// When `label` is `None` a label of the form `Alarm at HH:MM` is
    /// derived from the fire time.
    pub fn new(
        time: FireTime,
        tone: impl Into<PathBuf>,
        snooze_minutes: u32,
        label: Option<String>,
    ) -> Self {
        let label = label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| format!("Alarm at {time}"));
        Self {
            id: AlarmId::generate(),
            time,
            tone: tone.into(),
            snooze_minutes,
            label,
            enabled: true,
            snoozed: false,
            snooze_count: 0,
            last_fired: None,
        }
    }

    /// Returns true if this alarm should ring at `now`: enabled, not
    /// parked behind a snoozed instance, matching the current minute, and
    /// not already fired within that minute.
    #[must_use]
    pub fn is_due(&self, now: &DateTime<Local>) -> bool {
        self.enabled
            && !self.snoozed
            && self.time.matches(now)
            && self.last_fired != Some(minute_stamp(now))
    }

    /// The tone's file name for display purposes.
    #[must_use]
    pub fn tone_name(&self) -> String {
        self.tone
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.tone.display().to_string())
    }
}

// ============================================================================
// AlarmConfig
// ============================================================================

/// Runtime configuration for the alarm clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Seconds between due-scans (1-3600).
    pub scan_interval_secs: u64,
    /// Seconds to wait for a dismiss/snooze decision before auto-snoozing
    /// (5-300).
    pub response_timeout_secs: u64,
    /// Whether tone playback is enabled.
    pub sound_enabled: bool,
    /// Directory holding the preset tone files.
    pub tone_dir: PathBuf,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 30,
            response_timeout_secs: 30,
            sound_enabled: true,
            tone_dir: default_tone_dir(),
        }
    }
}

impl AlarmConfig {
    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.scan_interval_secs < 1 || self.scan_interval_secs > 3600 {
            return Err("scan interval must be between 1 and 3600 seconds".to_string());
        }
        if self.response_timeout_secs < 5 || self.response_timeout_secs > 300 {
            return Err("response timeout must be between 5 and 300 seconds".to_string());
        }
        Ok(())
    }
}

/// The default tone directory, under the platform data directory.
#[must_use]
pub fn default_tone_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("alarm")
        .join("tones")
}

// ============================================================================
// Tests
// ============================================================================
