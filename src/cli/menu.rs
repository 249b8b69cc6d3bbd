//! Interactive menu loop.
//!
//! The menu owns the routed stdin lines while no alarm is ringing and
//! drives every user-facing flow: creating alarms (time, tone and snooze
//! prompts with validation re-prompts), listing, toggling, deleting, help
//! and exit. Rejected input always produces a specific corrective message
//! before re-prompting; unexpected errors are reported and the loop keeps
//! running.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::sound::{SoundError, ToneLibrary};
use crate::store::SharedStore;
use crate::types::{Alarm, FireTime, SNOOZE_MINUTES_MAX, SNOOZE_MINUTES_MIN};

use super::display::Display;

/// Parses a 1-based alarm number into a zero-based index.
///
/// Distinguishes non-numeric input from numbers below 1 so the corrective
/// message can be specific.
fn parse_ordinal(input: &str) -> Result<usize, String> {
    let number: i64 = input
        .trim()
        .parse()
        .map_err(|_| "Please enter a valid number.".to_string())?;
    if number < 1 {
        return Err("Invalid alarm number.".to_string());
    }
    Ok((number - 1) as usize)
}

// ============================================================================
// Menu
// ============================================================================

/// The foreground interactive loop.
pub struct Menu {
    store: SharedStore,
    tones: ToneLibrary,
    lines: mpsc::UnboundedReceiver<String>,
    shutdown: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Menu {
    /// Creates the menu.
    ///
    /// `lines` carries input routed here while no alarm is ringing;
    /// `shutdown` is the process-wide running flag, flipped when the user
    /// exits.
    pub fn new(
        store: SharedStore,
        tones: ToneLibrary,
        lines: mpsc::UnboundedReceiver<String>,
        shutdown: Arc<watch::Sender<bool>>,
    ) -> Self {
        let shutdown_rx = shutdown.subscribe();
        Self {
            store,
            tones,
            lines,
            shutdown,
            shutdown_rx,
        }
    }

    /// Runs the menu until the user exits, input closes, or shutdown is
    /// signalled elsewhere. Clears the running flag on the way out.
    pub async fn run(mut self) {
        loop {
            {
                let store = self.store.lock().await;
                Display::show_menu(&Local::now(), store.enabled_count());
            }

            let Some(choice) = self.ask("\nEnter your choice (1-5): ").await else {
                break;
            };

            let choice = choice.trim().to_string();
            let result = match choice.as_str() {
                "1" => self.set_alarm().await,
                "2" => {
                    self.view_alarms().await;
                    Ok(())
                }
                "3" => self.manage_alarms().await,
                "4" => {
                    Display::show_help();
                    Ok(())
                }
                "5" => {
                    Display::show_goodbye();
                    break;
                }
                _ => {
                    Display::show_invalid_choice("1-5");
                    Ok(())
                }
            };

            if let Err(e) = result {
                Display::show_error(&format!("{e:#}"));
                println!("The program will continue running.");
            }

            if self.ask("\nPress Enter to continue...").await.is_none() {
                break;
            }
        }

        debug!("menu loop finished, clearing running flag");
        let _ = self.shutdown.send(true);
    }

    /// Prompts and waits for one line of input.
    ///
    /// Returns `None` when input is closed or shutdown was signalled.
    async fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        loop {
            tokio::select! {
                line = self.lines.recv() => return line,
                changed = self.shutdown_rx.changed() => {
                    if changed.is_err() || *self.shutdown_rx.borrow() {
                        return None;
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Set alarm flow
    // ------------------------------------------------------------------------

    async fn set_alarm(&mut self) -> Result<()> {
        Display::show_set_alarm_header();

        let Some(time) = self.prompt_time().await else {
            return Ok(());
        };
        let Some(tone) = self.prompt_tone().await else {
            return Ok(());
        };
        let Some(snooze_minutes) = self.prompt_snooze().await else {
            return Ok(());
        };

        let label = self
            .ask("Enter alarm label (optional): ")
            .await
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let alarm = Alarm::new(time, tone, snooze_minutes, label);
        self.store.lock().await.add(alarm.clone());
        Display::show_alarm_set(&alarm);
        Ok(())
    }

    async fn prompt_time(&mut self) -> Option<FireTime> {
        loop {
            let input = self.ask("Enter alarm time (HH:MM in 24-hour format): ").await?;
            match input.trim().parse::<FireTime>() {
                Ok(time) => return Some(time),
                Err(e) => println!("Invalid time ({e}). Please use HH:MM (e.g., 14:30)."),
            }
        }
    }

    async fn prompt_tone(&mut self) -> Option<PathBuf> {
        Display::show_tone_menu();
        loop {
            let choice = self.ask("Enter your choice (1-5): ").await?;
            match choice.trim().parse::<usize>() {
                Ok(number @ 1..=4) => match self.tones.preset(number) {
                    Some(path) => return Some(path),
                    None => Display::show_invalid_choice("1-5"),
                },
                Ok(5) => return self.prompt_custom_tone().await,
                _ => Display::show_invalid_choice("1-5"),
            }
        }
    }

    async fn prompt_custom_tone(&mut self) -> Option<PathBuf> {
        loop {
            let input = self
                .ask("Enter path to custom audio file (.wav, .mp3, .ogg, .m4a): ")
                .await?;
            match ToneLibrary::validate_custom(input.trim()) {
                Ok(path) => {
                    println!("Custom tone selected: {}", path.display());
                    return Some(path);
                }
                Err(e @ SoundError::FileNotFound(_)) => {
                    println!("{e}. Please check the path.");
                    if self.confirm_default_tone().await? {
                        return Some(self.tones.default_preset());
                    }
                }
                Err(e) => {
                    println!("{e}.");
                    if self.confirm_default_tone().await? {
                        return Some(self.tones.default_preset());
                    }
                }
            }
        }
    }

    /// Offers preset 1 as a fallback after a rejected custom tone.
    async fn confirm_default_tone(&mut self) -> Option<bool> {
        let answer = self.ask("Use default tone instead? (y/n): ").await?;
        Some(answer.trim().eq_ignore_ascii_case("y"))
    }

    async fn prompt_snooze(&mut self) -> Option<u32> {
        Display::show_snooze_menu();
        loop {
            let choice = self.ask("Enter your choice (1-4): ").await?;
            match choice.trim() {
                "1" => return Some(5),
                "2" => return Some(10),
                "3" => return Some(15),
                "4" => return self.prompt_custom_snooze().await,
                _ => Display::show_invalid_choice("1-4"),
            }
        }
    }

    async fn prompt_custom_snooze(&mut self) -> Option<u32> {
        loop {
            let input = self
                .ask("Enter custom snooze duration (1-60 minutes): ")
                .await?;
            match input.trim().parse::<u32>() {
                Ok(minutes) if (SNOOZE_MINUTES_MIN..=SNOOZE_MINUTES_MAX).contains(&minutes) => {
                    return Some(minutes);
                }
                Ok(_) => println!("Please enter a value between 1 and 60 minutes."),
                Err(_) => println!("Please enter a valid number."),
            }
        }
    }

    // ------------------------------------------------------------------------
    // View and manage flows
    // ------------------------------------------------------------------------

    async fn view_alarms(&self) {
        let store = self.store.lock().await;
        Display::show_alarm_list(&store);
    }

    async fn manage_alarms(&mut self) -> Result<()> {
        {
            let store = self.store.lock().await;
            if store.is_empty() {
                println!("No alarms to manage. Set an alarm first.");
                return Ok(());
            }
            Display::show_alarm_list(&store);
        }

        Display::show_manage_menu();
        let Some(choice) = self.ask("Enter your choice (1-3): ").await else {
            return Ok(());
        };
        match choice.trim() {
            "1" => self.toggle_alarm().await,
            "2" => self.delete_alarm().await,
            "3" => {}
            _ => Display::show_invalid_choice("1-3"),
        }
        Ok(())
    }

    async fn toggle_alarm(&mut self) {
        let Some(input) = self.ask("Enter alarm number to toggle: ").await else {
            return;
        };
        let index = match parse_ordinal(&input) {
            Ok(index) => index,
            Err(message) => {
                println!("{message}");
                return;
            }
        };

        let mut store = self.store.lock().await;
        match store.toggle_at(index) {
            Ok(alarm) => Display::show_toggled(index + 1, alarm),
            Err(e) => println!("Invalid alarm number ({e})."),
        }
    }

    async fn delete_alarm(&mut self) {
        let Some(input) = self.ask("Enter alarm number to delete: ").await else {
            return;
        };
        let index = match parse_ordinal(&input) {
            Ok(index) => index,
            Err(message) => {
                println!("{message}");
                return;
            }
        };

        let mut store = self.store.lock().await;
        match store.remove_at(index) {
            Ok(alarm) => Display::show_deleted(&alarm),
            Err(e) => println!("Invalid alarm number ({e})."),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
