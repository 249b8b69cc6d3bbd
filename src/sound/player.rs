//! Sound player implementation using rodio.
//!
//! rodio's `OutputStream` is not `Send`, so the player runs a dedicated
//! playback thread that owns the stream for the life of the process.
//! Callers talk to it over a crossbeam channel; each play request gets a
//! result back once decoding has started, while the audio itself keeps
//! playing detached in the background.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::{debug, warn};

use super::error::SoundError;

/// How long to wait for the playback thread to acknowledge a request.
const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Request sent to the playback thread.
struct PlayRequest {
    path: PathBuf,
    reply: Sender<Result<(), SoundError>>,
}

/// A sound player that uses rodio for audio playback.
///
/// Thread-safe and shareable via `Arc`. Playback is non-blocking: a play
/// request returns once the file has been handed to the audio sink.
pub struct RodioSoundPlayer {
    requests: Sender<PlayRequest>,
    disabled: AtomicBool,
}

impl RodioSoundPlayer {
    /// Creates a new sound player and spawns its playback thread.
    ///
    /// # Arguments
    ///
    /// * `disabled` - If true, all play requests are silently skipped.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// can be opened.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (request_tx, request_rx) = unbounded::<PlayRequest>();
        let (init_tx, init_rx) = bounded::<Result<(), SoundError>>(1);

        std::thread::Builder::new()
            .name("alarm-playback".to_string())
            .spawn(move || playback_thread(&request_rx, &init_tx))
            .map_err(|e| SoundError::StreamError(format!("failed to spawn playback thread: {e}")))?;

        match init_rx.recv_timeout(REPLY_TIMEOUT) {
            Ok(Ok(())) => {
                debug!("audio output stream initialized");
                Ok(Self {
                    requests: request_tx,
                    disabled: AtomicBool::new(disabled),
                })
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(SoundError::StreamError(
                "playback thread did not initialize".to_string(),
            )),
        }
    }

    /// Creates a disabled player. Audio hardware is still probed, but all
    /// play requests are skipped.
    ///
    /// # Errors
    ///
    /// May still fail if the audio stream cannot be initialized.
    pub fn disabled() -> Result<Self, SoundError> {
        Self::new(true)
    }

    /// Plays the tone at `path` in the background.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded, or the
    /// playback thread is gone. Callers degrade to the simulated cue.
    pub fn play(&self, path: &Path) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("sound playback disabled, skipping");
            return Ok(());
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.requests
            .send(PlayRequest {
                path: path.to_path_buf(),
                reply: reply_tx,
            })
            .map_err(|_| SoundError::StreamError("playback thread is gone".to_string()))?;

        reply_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| SoundError::PlaybackError("no reply from playback thread".to_string()))?
    }

    /// Returns true if sound playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Enables sound playback.
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::Relaxed);
    }

    /// Disables sound playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for RodioSoundPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioSoundPlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Body of the playback thread: owns the output stream, serves requests
/// until every sender is dropped.
fn playback_thread(requests: &Receiver<PlayRequest>, init: &Sender<Result<(), SoundError>>) {
    let (stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init.send(Err(SoundError::DeviceNotAvailable(e.to_string())));
            return;
        }
    };
    let _ = init.send(Ok(()));

    // The stream must stay alive for detached sinks to keep playing.
    let _stream = stream;

    while let Ok(request) = requests.recv() {
        let result = play_file(&handle, &request.path);
        if let Err(ref e) = result {
            warn!(tone = %request.path.display(), "playback failed: {e}");
        }
        let _ = request.reply.send(result);
    }
}

fn play_file(handle: &OutputStreamHandle, path: &Path) -> Result<(), SoundError> {
    let file = File::open(path)
        .map_err(|e| SoundError::FileNotFound(format!("{}: {e}", path.display())))?;

    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| SoundError::DecodeError(format!("{}: {e}", path.display())))?;

    let sink = Sink::try_new(handle).map_err(|e| SoundError::StreamError(e.to_string()))?;
    sink.append(decoder);
    sink.detach();

    debug!(tone = %path.display(), "playback started");
    Ok(())
}

/// Creates a sound player, returning `None` if audio is unavailable.
///
/// When audio initialization fails a warning is logged and callers fall
/// back to [`super::SimulatedSoundPlayer`].
#[must_use]
pub fn try_create_player(disabled: bool) -> Option<Arc<RodioSoundPlayer>> {
    match RodioSoundPlayer::new(disabled) {
        Ok(player) => Some(Arc::new(player)),
        Err(e) => {
            warn!("audio not available, using simulated cue: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests may run in environments without audio hardware (CI
    // containers). Each one bails out if the device cannot be opened.

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = match RodioSoundPlayer::disabled() {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());
        // Even a nonexistent path succeeds silently while disabled.
        assert!(player.play(Path::new("/nonexistent/tone.wav")).is_ok());
    }

    #[test]
    fn test_enable_disable() {
        let player = match RodioSoundPlayer::disabled() {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());
        player.enable();
        assert!(!player.is_disabled());
        player.disable();
        assert!(player.is_disabled());
    }

    #[test]
    fn test_missing_file_reports_error() {
        let player = match RodioSoundPlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };

        let result = player.play(Path::new("/nonexistent/tone.wav"));
        assert!(matches!(result, Err(SoundError::FileNotFound(_))));
    }

    #[test]
    fn test_placeholder_file_fails_to_decode() {
        let player = match RodioSoundPlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("beep.wav");
        std::fs::write(&path, "Placeholder for beep.wav").unwrap();

        let result = player.play(&path);
        assert!(matches!(result, Err(SoundError::DecodeError(_))));
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioSoundPlayer::disabled() {
            Ok(p) => p,
            Err(_) => return,
        };
        assert!(format!("{player:?}").contains("RodioSoundPlayer"));
    }

    #[test]
    fn test_try_create_player_does_not_panic() {
        let _ = try_create_player(true);
    }
}
