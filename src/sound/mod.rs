//! Tone playback for alarm firings.
//!
//! This module provides:
//!
//! - Preset tone management and custom-tone validation (`source`)
//! - Non-blocking audio playback via rodio (`player`)
//! - Graceful degradation when audio is unavailable: a player that cannot
//!   play reports failure and the display layer shows a simulated cue
//!   instead; a firing never fails because of sound.

mod error;
mod player;
mod source;

pub use error::SoundError;
pub use player::{try_create_player, RodioSoundPlayer};
pub use source::{ToneLibrary, PRESET_LABELS, PRESET_TONES, SUPPORTED_EXTENSIONS};

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait for sound playback implementations.
///
/// Abstracts playback so the engine can run against the rodio player, the
/// simulated stand-in, or a mock in tests.
pub trait SoundPlayer: Send + Sync {
    /// Plays the tone at `path`. Non-blocking; the sound continues in the
    /// background.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails; callers degrade to the
    /// simulated cue and carry on.
    fn play(&self, path: &Path) -> Result<(), SoundError>;

    /// Returns true if the audio system is available.
    fn is_available(&self) -> bool;

    /// Returns true if sound playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Enables sound playback.
    fn enable(&self);

    /// Disables sound playback.
    fn disable(&self);
}

impl SoundPlayer for RodioSoundPlayer {
    fn play(&self, path: &Path) -> Result<(), SoundError> {
        RodioSoundPlayer::play(self, path)
    }

    fn is_available(&self) -> bool {
        true
    }

    fn is_disabled(&self) -> bool {
        RodioSoundPlayer::is_disabled(self)
    }

    fn enable(&self) {
        RodioSoundPlayer::enable(self);
    }

    fn disable(&self) {
        RodioSoundPlayer::disable(self);
    }
}

// ============================================================================
// SimulatedSoundPlayer
// ============================================================================

/// Stand-in player used when no audio device is available.
///
/// Every play request reports failure so the firing coordinator emits the
/// playback-failed event and the display layer prints the simulated cue.
#[derive(Debug, Default)]
pub struct SimulatedSoundPlayer;

impl SoundPlayer for SimulatedSoundPlayer {
    fn play(&self, _path: &Path) -> Result<(), SoundError> {
        Err(SoundError::DeviceNotAvailable(
            "audio playback is simulated".to_string(),
        ))
    }

    fn is_available(&self) -> bool {
        false
    }

    fn is_disabled(&self) -> bool {
        false
    }

    fn enable(&self) {}

    fn disable(&self) {}
}

// ============================================================================
// MockSoundPlayer
// ============================================================================

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_calls: Mutex<Vec<PathBuf>>,
    available: AtomicBool,
    disabled: AtomicBool,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    /// Creates an available, enabled mock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
            disabled: AtomicBool::new(false),
            should_fail: AtomicBool::new(false),
        }
    }

    /// Controls what `is_available` reports.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes subsequent play calls fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of recorded play calls.
    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// The recorded play calls, in order.
    #[must_use]
    pub fn play_calls(&self) -> Vec<PathBuf> {
        self.play_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clears the recorded calls.
    pub fn clear_calls(&self) {
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.clear();
        }
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play(&self, path: &Path) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("mock failure".to_string()));
        }
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Ok(mut calls) = self.play_calls.lock() {
            calls.push(path.to_path_buf());
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls_in_order() {
        let mock = MockSoundPlayer::new();
        mock.play(Path::new("a.wav")).unwrap();
        mock.play(Path::new("b.wav")).unwrap();

        assert_eq!(mock.play_count(), 2);
        assert_eq!(
            mock.play_calls(),
            vec![PathBuf::from("a.wav"), PathBuf::from("b.wav")]
        );
    }

    #[test]
    fn test_mock_failure_injection() {
        let mock = MockSoundPlayer::new();
        mock.set_should_fail(true);
        assert!(mock.play(Path::new("a.wav")).is_err());
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_mock_disabled_swallows_calls() {
        let mock = MockSoundPlayer::new();
        mock.disable();
        assert!(mock.play(Path::new("a.wav")).is_ok());
        assert_eq!(mock.play_count(), 0);

        mock.enable();
        assert!(mock.play(Path::new("a.wav")).is_ok());
        assert_eq!(mock.play_count(), 1);
    }

    #[test]
    fn test_mock_clear_calls() {
        let mock = MockSoundPlayer::new();
        mock.play(Path::new("a.wav")).unwrap();
        mock.clear_calls();
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_mock_availability_flag() {
        let mock = MockSoundPlayer::new();
        assert!(mock.is_available());
        mock.set_available(false);
        assert!(!mock.is_available());
    }

    #[test]
    fn test_simulated_player_always_fails() {
        let player = SimulatedSoundPlayer;
        assert!(!player.is_available());
        let result = player.play(Path::new("anything.wav"));
        assert!(matches!(result, Err(SoundError::DeviceNotAvailable(_))));
    }
}
