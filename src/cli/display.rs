//! Display utilities for the alarm clock CLI.
//!
//! This module provides formatted output for:
//! - The main menu and management submenu
//! - Alarm listings
//! - Firing events (ringing banner, snooze/dismiss confirmations)
//! - Error messages and help text

use chrono::{DateTime, Local};

use crate::daemon::AlarmEvent;
use crate::store::AlarmStore;
use crate::types::Alarm;

/// Printed in place of audio when tone playback is unavailable.
const SIMULATED_CUE: &str = "* BEEP BEEP BEEP *";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the startup banner.
    pub fn show_welcome() {
        println!("Welcome to the alarm clock!");
        println!("Setting up alarm monitoring...");
    }

    /// Shows the main menu with the current time and alarm count.
    pub fn show_menu(now: &DateTime<Local>, enabled_count: usize) {
        println!();
        println!("{}", "=".repeat(50));
        println!("           ALARM CLOCK MENU");
        println!("{}", "=".repeat(50));
        println!("1. Set New Alarm");
        println!("2. View All Alarms");
        println!("3. Manage Alarms");
        println!("4. Help");
        println!("5. Exit");
        println!("{}", "=".repeat(50));
        println!("Current Time: {}", now.format("%H:%M:%S"));
        println!("Active Alarms: {enabled_count}");
    }

    /// Shows the header for the set-alarm flow.
    pub fn show_set_alarm_header() {
        println!();
        println!("{}", "=".repeat(50));
        println!("           SET NEW ALARM");
        println!("{}", "=".repeat(50));
    }

    /// Shows the tone selection menu.
    pub fn show_tone_menu() {
        println!();
        println!("Select Alarm Tone:");
        for (i, label) in crate::sound::PRESET_LABELS.iter().enumerate() {
            println!("{}. {label}", i + 1);
        }
        println!("5. Custom Tone File");
    }

    /// Shows the snooze duration selection menu.
    pub fn show_snooze_menu() {
        println!();
        println!("Select Snooze Duration:");
        println!("1. 5 minutes");
        println!("2. 10 minutes");
        println!("3. 15 minutes");
        println!("4. Custom duration");
    }

    /// Confirms a newly created alarm.
    pub fn show_alarm_set(alarm: &Alarm) {
        println!();
        println!("Alarm set successfully!");
        println!("   Time: {}", alarm.time);
        println!("   Tone: {}", alarm.tone_name());
        println!("   Snooze: {} minutes", alarm.snooze_minutes);
        println!("   Label: {}", alarm.label);
    }

    /// Lists all alarms with their status.
    pub fn show_alarm_list(store: &AlarmStore) {
        println!();
        println!("{}", "=".repeat(50));
        println!("           YOUR ALARMS");
        println!("{}", "=".repeat(50));

        if store.is_empty() {
            println!("No alarms set. Use option 1 to set an alarm.");
            return;
        }

        for (ordinal, alarm) in store.iter() {
            print!("{}", Self::alarm_summary(ordinal, alarm));
        }
    }

    /// Shows the alarm management submenu.
    pub fn show_manage_menu() {
        println!();
        println!("Alarm Management:");
        println!("1. Enable/Disable Alarm");
        println!("2. Delete Alarm");
        println!("3. Back to Main Menu");
    }

    /// Confirms an enable/disable toggle.
    pub fn show_toggled(ordinal: usize, alarm: &Alarm) {
        let status = if alarm.enabled { "enabled" } else { "disabled" };
        println!("Alarm {ordinal} {status}.");
    }

    /// Confirms a deletion.
    pub fn show_deleted(alarm: &Alarm) {
        println!("Alarm '{}' deleted.", alarm.label);
    }

    /// Shows a corrective message for an invalid menu choice.
    pub fn show_invalid_choice(range: &str) {
        println!("Invalid choice. Please select {range}.");
    }

    /// Shows an engine event.
    pub fn show_event(event: &AlarmEvent) {
        match event {
            AlarmEvent::Ringing {
                label,
                time,
                snooze_count,
            } => {
                println!();
                println!("{}", "=".repeat(50));
                println!("  ALARM RINGING: {label}");
                if *snooze_count > 0 {
                    println!("  Time: {time}   (Snoozed {snooze_count}x)");
                } else {
                    println!("  Time: {time}");
                }
                println!("{}", "=".repeat(50));
                println!("1. Dismiss Alarm");
                println!("2. Snooze Alarm");
                println!("Enter your choice (1-2) or press Enter to snooze:");
            }
            AlarmEvent::PlaybackFailed { reason } => {
                println!("(tone unavailable: {reason})");
                for _ in 0..3 {
                    println!("{SIMULATED_CUE}");
                }
            }
            AlarmEvent::InvalidResponse { input } => {
                println!("Invalid choice '{input}'. Please enter 1 (dismiss) or 2 (snooze).");
            }
            AlarmEvent::Snoozed {
                label,
                time,
                snooze_count,
                minutes,
            } => {
                println!("Alarm snoozed for {minutes} minutes.");
                println!("   Next ring: {time} ({label})");
                println!("   Snooze count: {snooze_count}");
            }
            AlarmEvent::Dismissed { label } => {
                println!("Alarm '{label}' dismissed.");
            }
        }
    }

    /// Shows help information.
    pub fn show_help() {
        println!(
            "
{line}
            ALARM CLOCK HELP
{line}

SETTING ALARMS:
  - Use 24-hour format (e.g., 14:30 for 2:30 PM)
  - Choose from 4 preset tones or point at your own audio file
  - Set a snooze duration from 1 to 60 minutes
  - Add a label to tell alarms apart

ALARM TONES:
  - Preset tones live in the tone directory (see --tone-dir)
  - Supported custom formats: .wav, .mp3, .ogg, .m4a
  - If a tone cannot be played, a text cue is shown instead

SNOOZE:
  - Snoozing reschedules the alarm after its snooze duration
  - Each alarm tracks how many times it has been snoozed
  - With no response, a ringing alarm snoozes automatically

ALARM MANAGEMENT:
  - View all alarms with their status
  - Enable or disable alarms without deleting them
  - Delete alarms you no longer need

SHORTCUTS:
  - Ctrl+C while an alarm rings: dismiss it
  - Ctrl+C at the menu: exit
  - Enter while an alarm rings: quick snooze

{line}",
            line = "=".repeat(50)
        );
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("Error: {message}");
    }

    /// Shows the exit message.
    pub fn show_goodbye() {
        println!("Goodbye! All alarms have been stopped.");
    }

    /// Formats one alarm for the listing.
    fn alarm_summary(ordinal: usize, alarm: &Alarm) -> String {
        let status = if alarm.enabled { "ENABLED" } else { "DISABLED" };
        let snooze_info = if alarm.snoozed {
            format!(" (Snoozed {}x)", alarm.snooze_count)
        } else {
            String::new()
        };

        format!(
            "{ordinal}. {label}\n   Time: {time} | Status: {status}{snooze_info}\n   Tone: {tone}\n   Snooze: {minutes} minutes\n{rule}\n",
            label = alarm.label,
            time = alarm.time,
            tone = alarm.tone_name(),
            minutes = alarm.snooze_minutes,
            rule = "-".repeat(40),
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
