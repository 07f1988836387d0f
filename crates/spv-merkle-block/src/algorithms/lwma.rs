//! # LWMA Retarget
//!
//! Linearly weighted moving average difficulty, applied every block.
//!
//! Over the last `N = lwma_blocks` ancestors (oldest first), with solve
//! times clamped to `[1, 6 * T]` and weights `1..=N` by recency:
//!
//! ```text
//! next = (sum(targets) / N) * sum(solve_i * i) / (N*(N+1)/2 * T)
//! ```
//!
//! clamped to `[1, max_target]`. Steady blocks at spacing `T` reproduce the
//! average target.

use primitive_types::{U256, U512};

use super::pow::{compact_to_target, target_to_compact};
use super::retarget::clamp_target;
use crate::config::ChainParams;
use crate::domain::{BlockHeader, RetargetError};

/// Solve-time ceiling, in multiples of the block interval.
const MAX_SOLVE_FACTOR: i64 = 6;

/// Timestamp of the header just before the averaging window.
///
/// A window longer than `N` carries it; otherwise `transition_time` must.
fn window_start_time(
    window: &[BlockHeader],
    n: usize,
    transition_time: u32,
) -> Result<u32, RetargetError> {
    let oldest = &window[window.len() - n];
    let bad = RetargetError::BadTransitionTime {
        height: oldest.height(),
        transition_time,
    };

    let start = if window.len() > n {
        let carried = window[window.len() - n - 1].timestamp();
        if transition_time != 0 && transition_time != carried {
            return Err(bad);
        }
        carried
    } else {
        transition_time
    };

    if start == 0 {
        return Err(bad);
    }
    Ok(start)
}

/// Target the LWMA rule expects for the block after `window`.
pub fn lwma_next_target(
    window: &[BlockHeader],
    transition_time: u32,
    params: &ChainParams,
) -> Result<U256, RetargetError> {
    let n = params.lwma_blocks;
    if n == 0 || window.len() < n {
        return Err(RetargetError::InsufficientWindow {
            got: window.len(),
            required: n,
        });
    }

    let spacing = i64::from(params.block_interval_secs.max(1));
    let mut previous_time = i64::from(window_start_time(window, n, transition_time)?);
    let mut weighted_solve_time = U512::zero();
    let mut target_sum = U512::zero();

    for (i, header) in window[window.len() - n..].iter().enumerate() {
        let target = compact_to_target(header.target());
        if !target.is_usable() {
            return Err(RetargetError::UnusableTarget {
                height: header.height(),
                bits: header.target(),
            });
        }

        let time = i64::from(header.timestamp());
        let solve_time = (time - previous_time).clamp(1, MAX_SOLVE_FACTOR * spacing) as u64;
        weighted_solve_time += U512::from(solve_time) * U512::from(i as u64 + 1);
        target_sum += U512::from(target.value);
        previous_time = time;
    }

    let n = U512::from(n as u64);
    let normalizer = n * (n + U512::one()) / U512::from(2u8);
    let average_target = target_sum / n;
    let next = average_target * weighted_solve_time / (normalizer * U512::from(spacing as u64));

    Ok(clamp_target(next, params.max_target()))
}

/// Check that `header.target` matches the LWMA expectation.
///
/// `window` holds at least `lwma_blocks` ancestors, oldest first, ending
/// with the header's parent. `transition_time` is the timestamp of the
/// header just before the window; pass 0 when the window is longer than
/// `lwma_blocks` and already contains it.
pub fn verify_lwma(
    header: &BlockHeader,
    window: &[BlockHeader],
    transition_time: u32,
    params: &ChainParams,
) -> Result<bool, RetargetError> {
    let next = match lwma_next_target(window, transition_time, params) {
        Ok(next) => next,
        Err(RetargetError::UnusableTarget { height, bits }) => {
            tracing::debug!(height, bits, "lwma window holds an unusable target");
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    let expected = target_to_compact(next);
    let ok = expected == header.target();
    if !ok {
        tracing::debug!(
            block_hash = %header.block_hash(),
            height = header.height(),
            expected,
            actual = header.target(),
            "lwma retarget mismatch"
        );
    }
    Ok(ok)
}
