//! Background engine for the alarm clock.
//!
//! This module contains the monitoring and firing machinery:
//! - `scheduler`: periodic due-scan plus per-snooze watch tasks
//! - `coordinator`: the single firing slot and the dismiss/snooze protocol
//! - `snooze`: pure computation of snoozed follow-up instances

pub mod coordinator;
pub mod scheduler;
pub mod snooze;

pub use coordinator::{
    parse_decision, AlarmEvent, Decision, FiringCoordinator, FiringOutcome, ResponseLine,
};
pub use scheduler::{watch_snoozed, Scheduler};
pub use snooze::snoozed_instance;
