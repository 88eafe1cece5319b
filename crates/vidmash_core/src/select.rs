use crate::types::MediaFile;
use rand::seq::SliceRandom;

/// Draw `k` distinct audio files uniformly at random from `pool`, then
/// shuffle the draw. The separate shuffle keeps the output order
/// independent of the pool's iteration order.
///
/// `k` is clamped into `[1, pool.len()]`; out-of-range requests are
/// corrected, never rejected. Each call draws fresh, so distinct videos
/// get independently ordered selections.
pub fn select_audio(pool: &[MediaFile], k: usize) -> Vec<MediaFile> {
    if pool.is_empty() {
        return Vec::new();
    }
    let k = k.clamp(1, pool.len());
    let mut rng = rand::thread_rng();
    let mut picked: Vec<MediaFile> = pool.choose_multiple(&mut rng, k).cloned().collect();
    picked.shuffle(&mut rng);
    picked
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
