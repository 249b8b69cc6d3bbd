//! Sound system error types.
//!
//! All errors here are recoverable: tone playback failures degrade to the
//! simulated cue and invalid tone selections are re-prompted. Nothing in
//! this module ever aborts a firing episode.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no output device connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Tone file was not found at the specified path.
    #[error("tone file not found: {0}")]
    FileNotFound(String),

    /// The file exists but is not an allowed audio format.
    #[error("unsupported audio format '{0}' (allowed: wav, mp3, ogg, m4a)")]
    UnsupportedFormat(String),

    /// Failed to decode the audio file.
    #[error("failed to decode tone file: {0}")]
    DecodeError(String),

    /// Failed to create the audio output stream or sink.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Failed to create or populate the tone directory.
    #[error("tone directory error: {0}")]
    ToneDir(String),

    /// Generic playback error.
    #[error("playback error: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns true if this error is related to the tone file itself.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_) | Self::UnsupportedFormat(_) | Self::DecodeError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));

        let err = SoundError::FileNotFound("/path/to/tone.wav".to_string());
        assert!(err.to_string().contains("/path/to/tone.wav"));

        let err = SoundError::UnsupportedFormat("txt".to_string());
        assert!(err.to_string().contains("txt"));
        assert!(err.to_string().contains("wav"));

        let err = SoundError::DecodeError("bad header".to_string());
        assert!(err.to_string().contains("bad header"));
    }

    #[test]
    fn test_is_device_error() {
        assert!(SoundError::DeviceNotAvailable("x".into()).is_device_error());
        assert!(SoundError::StreamError("x".into()).is_device_error());
        assert!(!SoundError::FileNotFound("x".into()).is_device_error());
        assert!(!SoundError::PlaybackError("x".into()).is_device_error());
    }

    #[test]
    fn test_is_file_error() {
        assert!(SoundError::FileNotFound("x".into()).is_file_error());
        assert!(SoundError::UnsupportedFormat("x".into()).is_file_error());
        assert!(SoundError::DecodeError("x".into()).is_file_error());
        assert!(!SoundError::DeviceNotAvailable("x".into()).is_file_error());
        assert!(!SoundError::ToneDir("x".into()).is_file_error());
    }
}
