//! Command definitions for the alarm clock CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::{default_tone_dir, AlarmConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// Terminal alarm clock with snooze and custom tones
#[derive(Parser, Debug)]
#[command(
    name = "alarm",
    version,
    about = "Terminal alarm clock with snooze and custom tones",
    long_about = "An interactive alarm clock for the terminal.\n\
                  Set alarms with preset or custom tones, snooze them for a\n\
                  configurable duration, and manage them from a simple menu\n\
                  while a background monitor watches the clock.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the interactive alarm clock (the default)
    Run(RunArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Directory holding the preset alarm tones
    #[arg(long)]
    pub tone_dir: Option<PathBuf>,

    /// Seconds between alarm scans (1-3600)
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(1..=3600)
    )]
    pub scan_interval: u64,

    /// Seconds to wait for a dismiss/snooze decision before auto-snoozing (5-300)
    #[arg(
        long,
        default_value = "30",
        value_parser = clap::value_parser!(u64).range(5..=300)
    )]
    pub response_timeout: u64,

    /// Disable tone playback
    #[arg(long)]
    pub no_sound: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            tone_dir: None,
            scan_interval: 30,
            response_timeout: 30,
            no_sound: false,
        }
    }
}

impl RunArgs {
    /// Builds the runtime configuration from these arguments.
    #[must_use]
    pub fn to_config(&self) -> AlarmConfig {
        AlarmConfig {
            scan_interval_secs: self.scan_interval,
            response_timeout_secs: self.response_timeout,
            sound_enabled: !self.no_sound,
            tone_dir: self.tone_dir.clone().unwrap_or_else(default_tone_dir),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
