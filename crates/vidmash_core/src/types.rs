use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

/// Extensions recognized as video containers, lowercase.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov"];

/// Extensions recognized as audio files, lowercase.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl MediaKind {
    /// Classify a path by its lowercase extension. Returns `None` for
    /// anything that is neither a known video nor audio extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// MediaFile
// ---------------------------------------------------------------------------

/// A media file on disk. Identity is the path; never mutated once
/// enumerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Build from a path alone, deriving the kind from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let kind = MediaKind::from_path(&path)?;
        Some(Self { path, kind })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Pipeline stage at which a per-video failure occurred.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stage {
    CombineAudio,
    MergeVideo,
    RepeatFinal,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CombineAudio => "combine-audio",
            Stage::MergeVideo => "merge-video",
            Stage::RepeatFinal => "repeat-final",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// PipelineResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VideoOutcome {
    /// The named output exists on disk and every intermediate for this
    /// video has been removed.
    Completed { output: PathBuf },
    /// Intermediates created up to the failure point have been removed.
    Failed { stage: Stage, reason: String },
}

/// Per-video outcome, produced by the pipeline and consumed by the batch
/// runner for summary reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineResult {
    pub video: PathBuf,
    pub outcome: VideoOutcome,
}

impl PipelineResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, VideoOutcome::Completed { .. })
    }

    pub fn output(&self) -> Option<&Path> {
        match &self.outcome {
            VideoOutcome::Completed { output } => Some(output),
            VideoOutcome::Failed { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// BatchSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub results: Vec<PipelineResult>,
}

impl BatchSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
