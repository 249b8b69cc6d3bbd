//! CLI module for the alarm clock.
//!
//! This module provides the interactive surface:
//! - `commands`: command definitions using clap derive
//! - `display`: output formatting and display logic
//! - `menu`: the interactive menu loop and prompt flows
//! - `input`: stdin ownership, line routing and Ctrl-C handling

pub mod commands;
pub mod display;
pub mod input;
pub mod menu;

pub use commands::{Cli, Commands, RunArgs};
pub use display::Display;
pub use input::{spawn_input_router, spawn_signal_task};
pub use menu::Menu;
