use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One encoder invocation, described declaratively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub kind: JobKind,
    /// Expected output artifact. Pre-existing files at this path are
    /// unconditionally replaced (`-y`).
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum JobKind {
    /// Concat-demux a list of audio files into one stream-copied track.
    ConcatAudio { list: PathBuf },
    /// Loop the video input indefinitely under the combined audio track;
    /// `-shortest` bounds the output to the audio duration, which is how
    /// final length is tied to the total selected-audio duration.
    MergeVideoAudio { video: PathBuf, audio: PathBuf },
    /// Concat-demux a list whose entries all reference one merged file.
    ConcatRepeat { list: PathBuf },
}

impl Job {
    pub fn concat_audio(list: PathBuf, output: PathBuf) -> Self {
        Self {
            kind: JobKind::ConcatAudio { list },
            output,
        }
    }

    pub fn merge_video_audio(video: PathBuf, audio: PathBuf, output: PathBuf) -> Self {
        Self {
            kind: JobKind::MergeVideoAudio { video, audio },
            output,
        }
    }

    pub fn concat_repeat(list: PathBuf, output: PathBuf) -> Self {
        Self {
            kind: JobKind::ConcatRepeat { list },
            output,
        }
    }

    /// Render the encoder argument vector. Argument order is part of the
    /// tool contract; the overwrite flag stays last.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        fn arg(path: &std::path::Path) -> String {
            path.to_string_lossy().into_owned()
        }

        let mut args: Vec<String> = Vec::new();
        match &self.kind {
            JobKind::ConcatAudio { list } | JobKind::ConcatRepeat { list } => {
                args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
                args.push(arg(list));
                args.extend(["-c", "copy"].map(String::from));
                args.push(arg(&self.output));
            }
            JobKind::MergeVideoAudio { video, audio } => {
                args.extend(["-stream_loop", "-1", "-i"].map(String::from));
                args.push(arg(video));
                args.push("-i".to_string());
                args.push(arg(audio));
                args.extend(
                    ["-map", "0:v", "-map", "1:a", "-c:v", "copy", "-c:a", "copy", "-shortest"]
                        .map(String::from),
                );
                args.push(arg(&self.output));
            }
        }
        args.push("-y".to_string());
        args
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
