use chrono::Local;
use std::path::{Path, PathBuf};

/// Make a string safe for embedding in a filename: whitespace becomes
/// `_`, and anything outside ASCII alphanumerics, `_`, `-` and `.` is
/// stripped.
pub fn sanitize_component(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

/// Timestamp embedded in output names, captured once per video when the
/// merge stage starts and reused for the repeat-stage name so related
/// artifacts stay correlated.
pub fn merge_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// `{username}_{videoStem}_merged_{timestamp}.mp4`
pub fn merged_name(username: &str, video_stem: &str, timestamp: &str) -> String {
    format!(
        "{}_{}_merged_{}.mp4",
        sanitize_component(username),
        sanitize_component(video_stem),
        timestamp
    )
}

/// `{username}_{videoStem}_merged_{timestamp}_x{repeat}.mp4`
pub fn repeated_name(username: &str, video_stem: &str, timestamp: &str, repeat: u32) -> String {
    format!(
        "{}_{}_merged_{}_x{}.mp4",
        sanitize_component(username),
        sanitize_component(video_stem),
        timestamp,
        repeat
    )
}

// ---------------------------------------------------------------------------
// WorkPaths
// ---------------------------------------------------------------------------

/// Per-video intermediate artifact paths. Names carry the video's index
/// so pipelines running concurrently could never collide on a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPaths {
    /// Concat list of the selected audio files.
    pub audio_list: PathBuf,
    /// Output of the audio concat job.
    pub combined_audio: PathBuf,
    /// Concat list referencing the merged output N times.
    pub repeat_list: PathBuf,
}

impl WorkPaths {
    pub fn for_index(dir: &Path, index: usize) -> Self {
        Self {
            audio_list: dir.join(format!("audio_list_{index}.txt")),
            combined_audio: dir.join(format!("combined_audio_{index}.mp3")),
            repeat_list: dir.join(format!("concat_list_{index}.txt")),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
