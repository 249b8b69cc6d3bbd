//! Alarm Clock Library
//!
//! This library provides the core functionality for the terminal alarm
//! clock. It includes:
//! - Alarm records with stable identifiers and `HH:MM` time handling
//! - An insertion-ordered alarm store shared between the menu and the
//!   background monitor
//! - A scheduler that scans for due alarms and watches snoozed instances
//! - A firing coordinator enforcing one ringing alarm at a time, with a
//!   deadline-bounded dismiss/snooze protocol
//! - Tone playback with preset management, custom-tone validation and
//!   graceful degradation to a simulated cue
//! - The interactive menu, input routing and display formatting

pub mod cli;
pub mod daemon;
pub mod sound;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    default_tone_dir, minute_stamp, Alarm, AlarmConfig, AlarmId, FireTime, TimeFormatError,
    SNOOZE_MINUTES_MAX, SNOOZE_MINUTES_MIN,
};

// Re-export store types
pub use store::{shared_store, AlarmStore, SharedStore, StoreError};

// Re-export engine types
pub use daemon::{
    parse_decision, snoozed_instance, watch_snoozed, AlarmEvent, Decision, FiringCoordinator,
    FiringOutcome, ResponseLine, Scheduler,
};

// Re-export sound types
pub use sound::{
    try_create_player, MockSoundPlayer, RodioSoundPlayer, SimulatedSoundPlayer, SoundError,
    SoundPlayer, ToneLibrary, PRESET_LABELS, PRESET_TONES, SUPPORTED_EXTENSIONS,
};

// Re-export CLI types
pub use cli::{spawn_input_router, spawn_signal_task, Cli, Commands, Display, Menu, RunArgs};
