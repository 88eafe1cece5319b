use crate::concat::write_concat_list;
use crate::gateway::{EncoderGateway, JobOutcome};
use crate::job::Job;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vidmash_core::naming::{self, WorkPaths};
use vidmash_core::select::select_audio;
use vidmash_core::{BatchConfig, MediaFile, PipelineResult, Stage, VideoOutcome};

/// Remove a file if present. A missing file is a no-op, not an error, so
/// cleanup can run twice over the same paths and reach the same state.
fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            info!(file = %path.display(), "deleted temporary file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Delete the per-video intermediates that may remain after any stage:
/// the audio concat list and the combined-audio artifact. Runs on every
/// exit path, success or failure.
pub fn cleanup_intermediates(work: &WorkPaths) -> std::io::Result<()> {
    remove_if_present(&work.audio_list)?;
    remove_if_present(&work.combined_audio)?;
    Ok(())
}

/// Drive one video through select → combine → merge → (repeat) →
/// cleanup. Failures are local to this video; the caller decides what to
/// do with the result.
///
/// `index` is the video's 1-based position in the batch and namespaces
/// every intermediate filename.
pub fn process_video(
    video: &MediaFile,
    index: usize,
    audio_pool: &[MediaFile],
    config: &BatchConfig,
    gateway: &dyn EncoderGateway,
) -> PipelineResult {
    let work = WorkPaths::for_index(&config.output_dir, index);
    let staged = run_stages(video, &work, audio_pool, config, gateway);

    let outcome = match (staged, cleanup_intermediates(&work)) {
        (Ok(output), Ok(())) => VideoOutcome::Completed { output },
        (Ok(_), Err(e)) => VideoOutcome::Failed {
            stage: Stage::Cleanup,
            reason: format!("cannot delete intermediates: {e}"),
        },
        (Err((stage, reason)), cleanup) => {
            if let Err(e) = cleanup {
                warn!(video = %video.file_name(), error = %e, "cleanup after failure incomplete");
            }
            VideoOutcome::Failed { stage, reason }
        }
    };

    PipelineResult {
        video: video.path.clone(),
        outcome,
    }
}

fn run_stages(
    video: &MediaFile,
    work: &WorkPaths,
    audio_pool: &[MediaFile],
    config: &BatchConfig,
    gateway: &dyn EncoderGateway,
) -> std::result::Result<PathBuf, (Stage, String)> {
    // SelectingAudio: a fresh draw per video, never fails.
    let selection = select_audio(audio_pool, config.audio_count);
    info!(
        video = %video.file_name(),
        count = selection.len(),
        "selected audio files in a fresh order for this video"
    );

    // CombiningAudio: write the list, concat the selection.
    let audio_paths: Vec<PathBuf> = selection.iter().map(|a| a.path.clone()).collect();
    if let Err(e) = write_concat_list(&work.audio_list, &audio_paths) {
        return Err((
            Stage::CombineAudio,
            format!("cannot write audio list: {e}"),
        ));
    }
    info!(
        count = audio_paths.len(),
        output = %work.combined_audio.display(),
        "combining audio"
    );
    let combine = Job::concat_audio(work.audio_list.clone(), work.combined_audio.clone());
    run_job(gateway, &combine, Stage::CombineAudio, "combined audio")?;

    // MergingVideo: timestamp captured once here and reused below so the
    // merged and repeated names stay correlated.
    let timestamp = naming::merge_timestamp();
    let merged_path = config
        .output_dir
        .join(naming::merged_name(&config.username, &video.stem(), &timestamp));
    info!(
        video = %video.file_name(),
        audio = %work.combined_audio.display(),
        output = %merged_path.display(),
        "merging video with combined audio"
    );
    let merge = Job::merge_video_audio(
        video.path.clone(),
        work.combined_audio.clone(),
        merged_path.clone(),
    );
    run_job(gateway, &merge, Stage::MergeVideo, "merged output")?;

    if config.repeat_count <= 1 {
        // The merged artifact is the final artifact.
        return Ok(merged_path);
    }

    // RepeatingFinal: concat the merged result repeat_count times. The
    // repeat list and the pre-repeat merge are disposable once an attempt
    // has been made, whether or not it succeeded.
    let final_path = config.output_dir.join(naming::repeated_name(
        &config.username,
        &video.stem(),
        &timestamp,
        config.repeat_count,
    ));
    info!(
        input = %merged_path.display(),
        times = config.repeat_count,
        output = %final_path.display(),
        "concatenating merged result"
    );
    let entries = vec![merged_path.clone(); config.repeat_count as usize];
    let attempt = write_concat_list(&work.repeat_list, &entries)
        .map_err(|e| (Stage::RepeatFinal, format!("cannot write repeat list: {e}")))
        .and_then(|_| {
            let repeat = Job::concat_repeat(work.repeat_list.clone(), final_path.clone());
            run_job(gateway, &repeat, Stage::RepeatFinal, "repeated output")
        });

    for disposable in [&work.repeat_list, &merged_path] {
        if let Err(e) = remove_if_present(disposable) {
            return Err((
                Stage::RepeatFinal,
                format!("cannot delete intermediate {}: {e}", disposable.display()),
            ));
        }
    }

    attempt.map(|_| final_path)
}

/// Run one job and fold every failure mode into a stage-tagged reason.
fn run_job(
    gateway: &dyn EncoderGateway,
    job: &Job,
    stage: Stage,
    what: &str,
) -> std::result::Result<(), (Stage, String)> {
    match gateway.run(job) {
        Ok(JobOutcome::Produced(_)) => Ok(()),
        Ok(JobOutcome::NotProduced) => Err((stage, format!("{what} was not produced"))),
        Err(e) => Err((stage, e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::job::JobKind;
    use std::cell::RefCell;
    use tempfile::TempDir;
    use vidmash_core::MediaKind;

    /// Scripted encoder: succeeds by writing the job's output file, or
    /// reports the artifact missing for the stage it is told to fail.
    /// Snapshots the repeat list's contents, since the pipeline deletes
    /// the list before returning.
    struct FakeGateway {
        fail_at: Option<Stage>,
        calls: RefCell<Vec<Job>>,
        repeat_list_content: RefCell<Option<String>>,
    }

    impl FakeGateway {
        fn succeeding() -> Self {
            Self {
                fail_at: None,
                calls: RefCell::new(Vec::new()),
                repeat_list_content: RefCell::new(None),
            }
        }

        fn failing_at(stage: Stage) -> Self {
            Self {
                fail_at: Some(stage),
                ..Self::succeeding()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl EncoderGateway for FakeGateway {
        fn run(&self, job: &Job) -> Result<JobOutcome> {
            self.calls.borrow_mut().push(job.clone());
            let stage = match &job.kind {
                JobKind::ConcatAudio { .. } => Stage::CombineAudio,
                JobKind::MergeVideoAudio { .. } => Stage::MergeVideo,
                JobKind::ConcatRepeat { list } => {
                    *self.repeat_list_content.borrow_mut() =
                        Some(std::fs::read_to_string(list)?);
                    Stage::RepeatFinal
                }
            };
            if self.fail_at == Some(stage) {
                return Ok(JobOutcome::NotProduced);
            }
            std::fs::write(&job.output, b"artifact")?;
            Ok(JobOutcome::Produced(job.output.clone()))
        }
    }

    struct Fixture {
        dir: TempDir,
        video: MediaFile,
        pool: Vec<MediaFile>,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let video_path = dir.path().join("clip.mp4");
        std::fs::write(&video_path, b"video").unwrap();

        let pool = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("track_{i}.mp3"));
                std::fs::write(&path, b"audio").unwrap();
                MediaFile::new(path, MediaKind::Audio)
            })
            .collect();

        Fixture {
            video: MediaFile::new(video_path, MediaKind::Video),
            dir,
            pool,
        }
    }

    fn config(dir: &Path, repeat: u32) -> BatchConfig {
        BatchConfig::new(dir, dir, "tester", 4, repeat)
    }

    fn assert_no_intermediates(work: &WorkPaths) {
        assert!(!work.audio_list.exists());
        assert!(!work.combined_audio.exists());
        assert!(!work.repeat_list.exists());
    }

    #[test]
    fn single_merge_completes_and_cleans_up() {
        let fx = fixture();
        let config = config(fx.dir.path(), 1);
        let gateway = FakeGateway::succeeding();

        let result = process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        let output = result.output().expect("pipeline should succeed");
        assert!(output.is_file());
        let name = output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("tester_clip_merged_"));
        assert!(name.ends_with(".mp4"));
        assert!(!name.contains("_x"));

        // Combine + merge, no repeat job.
        assert_eq!(gateway.call_count(), 2);
        assert_no_intermediates(&WorkPaths::for_index(fx.dir.path(), 1));
    }

    #[test]
    fn repeat_produces_suffixed_final_and_drops_pre_repeat_merge() {
        let fx = fixture();
        let config = config(fx.dir.path(), 4);
        let gateway = FakeGateway::succeeding();

        let result = process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        let output = result.output().expect("pipeline should succeed");
        let name = output.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("_x4.mp4"));
        assert!(output.is_file());

        // The pre-repeat merged artifact must be gone; only the final
        // output remains as an mp4.
        let mp4s: Vec<_> = std::fs::read_dir(fx.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension().is_some_and(|x| x == "mp4")
                    && p != &fx.video.path
            })
            .collect();
        assert_eq!(mp4s, vec![output.to_path_buf()]);

        assert_eq!(gateway.call_count(), 3);
        assert_no_intermediates(&WorkPaths::for_index(fx.dir.path(), 1));
    }

    #[test]
    fn repeat_list_references_merged_output_n_times() {
        let fx = fixture();
        let config = config(fx.dir.path(), 3);
        let gateway = FakeGateway::succeeding();

        process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        let calls = gateway.calls.borrow();
        let merged = calls
            .iter()
            .find(|j| matches!(j.kind, JobKind::MergeVideoAudio { .. }))
            .expect("merge job should run")
            .output
            .clone();
        drop(calls);

        let content = gateway
            .repeat_list_content
            .borrow()
            .clone()
            .expect("repeat job should have seen its list");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        let expected = format!("file '{}'", merged.display());
        assert!(lines.iter().all(|line| *line == expected), "{content}");
    }

    #[test]
    fn combine_failure_skips_merge_and_leaves_nothing_behind() {
        let fx = fixture();
        let config = config(fx.dir.path(), 1);
        let gateway = FakeGateway::failing_at(Stage::CombineAudio);

        let result = process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        match &result.outcome {
            VideoOutcome::Failed { stage, .. } => assert_eq!(*stage, Stage::CombineAudio),
            other => panic!("expected combine failure, got {other:?}"),
        }
        // The merge job must never have been attempted.
        assert_eq!(gateway.call_count(), 1);
        assert_no_intermediates(&WorkPaths::for_index(fx.dir.path(), 1));
    }

    #[test]
    fn merge_failure_is_reported_and_intermediates_removed() {
        let fx = fixture();
        let config = config(fx.dir.path(), 1);
        let gateway = FakeGateway::failing_at(Stage::MergeVideo);

        let result = process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        match &result.outcome {
            VideoOutcome::Failed { stage, .. } => assert_eq!(*stage, Stage::MergeVideo),
            other => panic!("expected merge failure, got {other:?}"),
        }
        assert_eq!(gateway.call_count(), 2);
        assert_no_intermediates(&WorkPaths::for_index(fx.dir.path(), 1));
    }

    #[test]
    fn repeat_failure_still_disposes_of_merged_artifact() {
        let fx = fixture();
        let config = config(fx.dir.path(), 4);
        let gateway = FakeGateway::failing_at(Stage::RepeatFinal);

        let result = process_video(&fx.video, 1, &fx.pool, &config, &gateway);

        match &result.outcome {
            VideoOutcome::Failed { stage, .. } => assert_eq!(*stage, Stage::RepeatFinal),
            other => panic!("expected repeat failure, got {other:?}"),
        }

        // No mp4 other than the source video survives the failed attempt.
        let mp4s: Vec<_> = std::fs::read_dir(fx.dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|x| x == "mp4") && p != &fx.video.path)
            .collect();
        assert!(mp4s.is_empty(), "unexpected leftovers: {mp4s:?}");
        assert_no_intermediates(&WorkPaths::for_index(fx.dir.path(), 1));
    }

    #[test]
    fn cleanup_is_idempotent() {
        let fx = fixture();
        let work = WorkPaths::for_index(fx.dir.path(), 1);
        std::fs::write(&work.audio_list, b"file 'x'\n").unwrap();
        std::fs::write(&work.combined_audio, b"audio").unwrap();

        cleanup_intermediates(&work).unwrap();
        assert_no_intermediates(&work);
        // Second pass over the same, now absent, paths.
        cleanup_intermediates(&work).unwrap();
        assert_no_intermediates(&work);
    }
}
