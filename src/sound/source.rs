//! Tone library management.
//!
//! Alarm tones live in a single tone directory. Four named presets are
//! created there on startup (with placeholder content when no real audio
//! has been installed), and users may point an alarm at any audio file of
//! an allowed format instead.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::SoundError;

/// Preset tone file names, in menu order (choice 1-4).
pub const PRESET_TONES: &[&str] = &["beep.wav", "bell.wav", "chime.wav", "buzzer.wav"];

/// Human-readable preset descriptions, matching [`PRESET_TONES`] order.
pub const PRESET_LABELS: &[&str] = &["Default Beep", "Bell Sound", "Chime", "Buzzer"];

/// Allowed extensions for user-supplied tone files.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "m4a"];

/// The preset tone directory and custom-tone validation.
#[derive(Debug, Clone)]
pub struct ToneLibrary {
    dir: PathBuf,
}

impl ToneLibrary {
    /// Creates a library rooted at `dir`. Nothing is touched on disk until
    /// [`ToneLibrary::ensure_presets`] runs.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The tone directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the tone directory and any missing preset files.
    ///
    /// Missing presets are written with placeholder content so the files
    /// exist for selection even when no real audio has been installed;
    /// playback of a placeholder fails and degrades to the simulated cue.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::ToneDir` if the directory or a preset file
    /// cannot be created.
    pub fn ensure_presets(&self) -> Result<(), SoundError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| SoundError::ToneDir(format!("{}: {e}", self.dir.display())))?;

        for name in PRESET_TONES {
            let path = self.dir.join(name);
            if path.exists() {
                continue;
            }
            fs::write(&path, format!("Placeholder for {name}"))
                .map_err(|e| SoundError::ToneDir(format!("{}: {e}", path.display())))?;
            debug!(tone = %path.display(), "created placeholder tone");
        }
        Ok(())
    }

    /// Path of the preset with the given 1-based number (1-4).
    #[must_use]
    pub fn preset(&self, number: usize) -> Option<PathBuf> {
        PRESET_TONES
            .get(number.checked_sub(1)?)
            .map(|name| self.dir.join(name))
    }

    /// Path of the default preset, used as the custom-tone fallback.
    #[must_use]
    pub fn default_preset(&self) -> PathBuf {
        self.dir.join(PRESET_TONES[0])
    }

    /// Validates a user-supplied tone path.
    ///
    /// The file must exist and carry one of the allowed audio extensions
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `SoundError::FileNotFound` for a missing file and
    /// `SoundError::UnsupportedFormat` for a disallowed extension.
    pub fn validate_custom(path: &str) -> Result<PathBuf, SoundError> {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(SoundError::FileNotFound(path.display().to_string()));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(SoundError::UnsupportedFormat(extension));
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_constants_line_up() {
        assert_eq!(PRESET_TONES.len(), 4);
        assert_eq!(PRESET_TONES.len(), PRESET_LABELS.len());
    }

    #[test]
    fn test_preset_numbering_is_one_based() {
        let library = ToneLibrary::new("/tmp/tones");
        assert!(library.preset(0).is_none());
        assert_eq!(
            library.preset(1).unwrap(),
            PathBuf::from("/tmp/tones/beep.wav")
        );
        assert_eq!(
            library.preset(4).unwrap(),
            PathBuf::from("/tmp/tones/buzzer.wav")
        );
        assert!(library.preset(5).is_none());
    }

    #[test]
    fn test_default_preset_is_beep() {
        let library = ToneLibrary::new("/tmp/tones");
        assert_eq!(library.default_preset(), PathBuf::from("/tmp/tones/beep.wav"));
    }

    #[test]
    fn test_ensure_presets_creates_dir_and_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tones");
        let library = ToneLibrary::new(&dir);

        library.ensure_presets().unwrap();

        assert!(dir.is_dir());
        for name in PRESET_TONES {
            let path = dir.join(name);
            assert!(path.is_file(), "missing preset {name}");
            let content = std::fs::read_to_string(&path).unwrap();
            assert!(content.contains(name));
        }
    }

    #[test]
    fn test_ensure_presets_keeps_existing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let library = ToneLibrary::new(tmp.path());

        let existing = tmp.path().join("beep.wav");
        std::fs::write(&existing, b"real audio bytes").unwrap();

        library.ensure_presets().unwrap();

        let content = std::fs::read(&existing).unwrap();
        assert_eq!(content, b"real audio bytes");
    }

    #[test]
    fn test_ensure_presets_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let library = ToneLibrary::new(tmp.path());
        library.ensure_presets().unwrap();
        library.ensure_presets().unwrap();
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 4);
    }

    #[test]
    fn test_validate_custom_accepts_allowed_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["tone.wav", "tone.mp3", "tone.ogg", "tone.m4a", "TONE.WAV"] {
            let path = tmp.path().join(name);
            std::fs::write(&path, b"x").unwrap();
            let validated = ToneLibrary::validate_custom(path.to_str().unwrap());
            assert!(validated.is_ok(), "expected {name} to validate");
        }
    }

    #[test]
    fn test_validate_custom_rejects_missing_file() {
        let result = ToneLibrary::validate_custom("/definitely/not/here.wav");
        assert!(matches!(result, Err(SoundError::FileNotFound(_))));
    }

    #[test]
    fn test_validate_custom_rejects_bad_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, b"x").unwrap();

        let result = ToneLibrary::validate_custom(path.to_str().unwrap());
        assert!(matches!(result, Err(SoundError::UnsupportedFormat(ext)) if ext == "txt"));
    }

    #[test]
    fn test_validate_custom_rejects_extensionless_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tone");
        std::fs::write(&path, b"x").unwrap();

        let result = ToneLibrary::validate_custom(path.to_str().unwrap());
        assert!(matches!(result, Err(SoundError::UnsupportedFormat(_))));
    }
}
