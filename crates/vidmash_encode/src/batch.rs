use crate::error::Result;
use crate::gateway::EncoderGateway;
use crate::pipeline::process_video;
use tracing::{error, info};
use vidmash_core::{BatchConfig, BatchSummary, CoreError, MediaFile, VideoOutcome};

/// Run every video through the per-video pipeline, sequentially and in
/// enumerated order. One video's failure never stops the batch; results
/// are aggregated for the final summary.
///
/// Aborts before any pipeline runs if either pool is empty.
pub fn run_batch(
    videos: &[MediaFile],
    audio_pool: &[MediaFile],
    config: &BatchConfig,
    gateway: &dyn EncoderGateway,
) -> Result<BatchSummary> {
    if videos.is_empty() {
        return Err(CoreError::NoVideos(config.source_dir.clone()).into());
    }
    if audio_pool.is_empty() {
        return Err(CoreError::NoAudio(config.source_dir.clone()).into());
    }
    std::fs::create_dir_all(&config.output_dir)?;

    let total = videos.len();
    let mut results = Vec::with_capacity(total);
    for (i, video) in videos.iter().enumerate() {
        let index = i + 1;
        info!("===== Processing {index}/{total}: {} =====", video.file_name());

        let result = process_video(video, index, audio_pool, config, gateway);
        match &result.outcome {
            VideoOutcome::Completed { output } => {
                info!(video = %video.file_name(), output = %output.display(), "finished");
            }
            VideoOutcome::Failed { stage, reason } => {
                error!(video = %video.file_name(), %stage, %reason, "failed; skipping");
            }
        }
        results.push(result);
    }

    let summary = BatchSummary { results };
    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "all videos processed"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
