//! Stdin ownership and line routing.
//!
//! A single task reads stdin for the whole process. Each line goes either
//! to the menu loop or, while an alarm is ringing, to the firing
//! coordinator's decision protocol. Ctrl-C is routed the same way: it
//! dismisses a ringing alarm and otherwise shuts the process down.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::daemon::ResponseLine;

/// Routes one input line to its consumer.
///
/// Returns false when the target channel is closed, which means the
/// reader should stop.
fn route_line(
    ringing: bool,
    line: String,
    menu: &mpsc::UnboundedSender<String>,
    responses: &mpsc::UnboundedSender<ResponseLine>,
) -> bool {
    if ringing {
        responses.send(ResponseLine::Line(line)).is_ok()
    } else {
        menu.send(line).is_ok()
    }
}

/// Spawns the stdin reader task.
///
/// Lines are routed to `menu` normally and to `responses` while the
/// coordinator reports a ringing alarm. The task ends on EOF or when a
/// target channel closes.
pub fn spawn_input_router(
    ringing: watch::Receiver<bool>,
    menu: mpsc::UnboundedSender<String>,
    responses: mpsc::UnboundedSender<ResponseLine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if !route_line(*ringing.borrow(), line, &menu, &responses) {
                        return;
                    }
                }
                Ok(None) => {
                    debug!("stdin closed");
                    return;
                }
                Err(e) => {
                    debug!("stdin read failed: {e}");
                    return;
                }
            }
        }
    })
}

/// Spawns the Ctrl-C handler task.
///
/// An interrupt during a firing episode dismisses the ringing alarm; an
/// interrupt at the menu clears the running flag and ends the process.
pub fn spawn_signal_task(
    ringing: watch::Receiver<bool>,
    responses: mpsc::UnboundedSender<ResponseLine>,
    shutdown: Arc<watch::Sender<bool>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            if *ringing.borrow() {
                debug!("interrupt while ringing, dismissing");
                if responses.send(ResponseLine::Interrupt).is_err() {
                    return;
                }
            } else {
                info!("interrupt received, shutting down");
                let _ = shutdown.send(true);
                return;
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
