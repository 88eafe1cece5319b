use crate::error::{EncodeError, Result};
use crate::job::Job;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Outcome of one encoder invocation, judged by artifact existence
/// rather than exit status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Produced(PathBuf),
    NotProduced,
}

impl JobOutcome {
    pub fn is_produced(&self) -> bool {
        matches!(self, JobOutcome::Produced(_))
    }
}

/// Abstraction over the external encoder so the pipeline can be driven
/// by a scripted stand-in under test.
pub trait EncoderGateway {
    fn run(&self, job: &Job) -> Result<JobOutcome>;
}

/// Invokes `ffmpeg` as a blocking subprocess. The pipeline suspends
/// until the process exits; there is no timeout.
pub struct FfmpegGateway {
    program: PathBuf,
}

impl FfmpegGateway {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }

    /// Use a different encoder binary, mainly for tests.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check the encoder binary is runnable at all.
    pub fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl Default for FfmpegGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderGateway for FfmpegGateway {
    fn run(&self, job: &Job) -> Result<JobOutcome> {
        // A leftover artifact from an earlier run must not satisfy the
        // existence check below.
        if job.output.exists() {
            std::fs::remove_file(&job.output)?;
        }

        let args = job.ffmpeg_args();
        debug!(program = %self.program.display(), ?args, "invoking encoder");

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EncodeError::FfmpegNotFound
                } else {
                    EncodeError::FfmpegExec(e.to_string())
                }
            })?;

        let produced = job.output.is_file();
        if !output.status.success() {
            if produced {
                // The encoder exits non-zero on recoverable warnings, so
                // the artifact is the authoritative success signal.
                warn!(
                    status = %output.status,
                    output = %job.output.display(),
                    "encoder exited non-zero but produced its output; treating as success"
                );
            } else {
                debug!(
                    status = %output.status,
                    stderr = %String::from_utf8_lossy(&output.stderr),
                    "encoder produced no output"
                );
            }
        }

        if produced {
            Ok(JobOutcome::Produced(job.output.clone()))
        } else {
            Ok(JobOutcome::NotProduced)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
