use crate::error::{CoreError, Result};
use crate::naming::sanitize_component;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fallback when the requested audio count is absent or unparseable.
pub const DEFAULT_AUDIO_COUNT: usize = 25;

/// Fallback when repeating is requested without a count.
pub const DEFAULT_REPEAT_COUNT: u32 = 4;

/// Everything one batch run needs, passed in explicitly. Nothing is read
/// from ambient process state such as the working directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchConfig {
    /// Directory scanned for video and audio files.
    pub source_dir: PathBuf,
    /// Directory receiving final outputs and per-video intermediates.
    pub output_dir: PathBuf,
    /// Name embedded in output filenames, sanitized before use.
    pub username: String,
    /// Requested audio files per video; clamped to the pool at selection.
    pub audio_count: usize,
    /// How many times the merged result is concatenated into the final
    /// artifact. 1 means the merged result is the final artifact.
    pub repeat_count: u32,
}

impl BatchConfig {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        username: impl Into<String>,
        audio_count: usize,
        repeat_count: u32,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            username: username.into(),
            audio_count,
            repeat_count: repeat_count.max(1),
        }
    }

    /// Reject configurations that cannot name an output file.
    pub fn validate(&self) -> Result<()> {
        if sanitize_component(&self.username).is_empty() {
            return Err(CoreError::InvalidConfig(
                "username is required and must contain filename-safe characters".into(),
            ));
        }
        Ok(())
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Load from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: BatchConfig = serde_json::from_str(&data)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
