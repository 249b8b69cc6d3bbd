//! Terminal alarm clock.
//!
//! An interactive alarm clock for the terminal:
//! - set alarms with preset or custom tones
//! - snooze ringing alarms for a configurable duration
//! - a background monitor scans the clock while the menu stays responsive

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::{mpsc, watch};

use alarm::cli::{spawn_input_router, spawn_signal_task, Cli, Commands, Display, Menu, RunArgs};
use alarm::daemon::{FiringCoordinator, Scheduler};
use alarm::sound::{try_create_player, SimulatedSoundPlayer, SoundPlayer, ToneLibrary};
use alarm::store::shared_store;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute command. Exit explicitly: the stdin reader may still hold a
    // blocking read that would stall runtime teardown otherwise.
    match execute(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            Display::show_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Run(args)) => run_clock(args).await,
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
            Ok(())
        }
        // No subcommand runs the interactive clock with defaults.
        None => run_clock(RunArgs::default()).await,
    }
}

/// Wires up and runs the interactive alarm clock.
async fn run_clock(args: RunArgs) -> Result<()> {
    let config = args.to_config();
    config
        .validate()
        .map_err(|message| anyhow::anyhow!(message))?;

    // Initialization failures are fatal; everything after this recovers.
    let tones = ToneLibrary::new(&config.tone_dir);
    tones
        .ensure_presets()
        .context("failed to prepare the tone directory")?;

    let player: Arc<dyn SoundPlayer> = match try_create_player(!config.sound_enabled) {
        Some(player) => player,
        None => Arc::new(SimulatedSoundPlayer),
    };

    let store = shared_store();
    let shutdown = Arc::new(watch::channel(false).0);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (response_tx, response_rx) = mpsc::unbounded_channel();
    let (menu_tx, menu_rx) = mpsc::unbounded_channel();

    let coordinator = Arc::new(FiringCoordinator::new(
        store.clone(),
        player,
        event_tx,
        response_rx,
        Duration::from_secs(config.response_timeout_secs),
    ));

    let scheduler = Scheduler::new(
        store.clone(),
        coordinator.clone(),
        Duration::from_secs(config.scan_interval_secs),
        shutdown.subscribe(),
    );
    let scheduler_task = tokio::spawn(scheduler.run());

    let router_task = spawn_input_router(
        coordinator.ringing_state(),
        menu_tx,
        response_tx.clone(),
    );
    let signal_task = spawn_signal_task(coordinator.ringing_state(), response_tx, shutdown.clone());

    // Prints engine events (ringing banner, snooze/dismiss confirmations).
    let printer_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            Display::show_event(&event);
        }
    });

    Display::show_welcome();
    Menu::new(store, tones, menu_rx, shutdown.clone()).run().await;

    // The menu cleared the running flag; wait for the scheduler to cancel
    // its watches, then stop the helper tasks.
    scheduler_task
        .await
        .context("alarm monitor ended abnormally")?;
    router_task.abort();
    signal_task.abort();
    printer_task.abort();

    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
