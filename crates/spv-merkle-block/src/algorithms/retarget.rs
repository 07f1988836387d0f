//! # Periodic Retarget
//!
//! Bitcoin-style difficulty adjustment every `difficulty_interval` blocks.
//!
//! Off a boundary the target must carry over unchanged. On a boundary:
//!
//! ```text
//! timespan   = clamp(header.timestamp - transition_time, T/4, T*4)
//! new_target = clamp(prev_target * timespan / T, 1, max_target)
//! ```
//!
//! where `T = difficulty_interval * block_interval_secs`. The clamp keeps a
//! timestamp-manipulating miner within a 4x swing per interval.

use primitive_types::{U256, U512};

use super::pow::{compact_to_target, target_to_compact};
use crate::config::ChainParams;
use crate::domain::{is_retarget_boundary, BlockHeader, RetargetError, UNKNOWN_HEIGHT};

/// Clamp a wide intermediate target into `[1, max_target]`.
pub(crate) fn clamp_target(value: U512, max_target: U256) -> U256 {
    if value > U512::from(max_target) {
        return max_target;
    }
    let narrowed = U256::try_from(value).unwrap_or(max_target);
    if narrowed.is_zero() {
        U256::one()
    } else {
        narrowed
    }
}

/// Target expected after an interval that took `timespan` seconds.
pub fn periodic_next_target(previous_target: U256, timespan: i64, params: &ChainParams) -> U256 {
    let target_timespan = params.target_timespan() as i64;
    let actual = timespan.clamp(target_timespan / 4, target_timespan * 4);

    let next = previous_target.full_mul(U256::from(actual as u64))
        / U512::from(target_timespan.max(1) as u64);
    clamp_target(next, params.max_target())
}

/// Resolve the interval start time from the caller's two sources.
fn interval_start_time(
    height: u32,
    interval_start: Option<&BlockHeader>,
    transition_time: u32,
) -> Result<u32, RetargetError> {
    let bad = RetargetError::BadTransitionTime {
        height,
        transition_time,
    };
    let start = match (transition_time, interval_start) {
        (0, Some(ancestor)) => ancestor.timestamp(),
        (t, Some(ancestor)) if t != ancestor.timestamp() => return Err(bad),
        (t, _) => t,
    };
    if start == 0 {
        return Err(bad);
    }
    Ok(start)
}

/// Check that `header.target` follows the periodic retarget rule.
///
/// `transition_time` is the timestamp of the first block of the interval
/// and must be 0 off a boundary. `interval_start`, when given, is that
/// first block and can stand in for a zero `transition_time`.
pub fn verify_periodic_retarget(
    header: &BlockHeader,
    previous: &BlockHeader,
    interval_start: Option<&BlockHeader>,
    transition_time: u32,
    params: &ChainParams,
) -> Result<bool, RetargetError> {
    let height = header.height();
    if height == UNKNOWN_HEIGHT {
        return Err(RetargetError::UnknownHeight);
    }

    if !is_retarget_boundary(height, params.difficulty_interval) {
        if transition_time != 0 {
            return Err(RetargetError::BadTransitionTime {
                height,
                transition_time,
            });
        }
        let ok = header.target() == previous.target();
        if !ok {
            tracing::debug!(
                height,
                expected = previous.target(),
                actual = header.target(),
                "target changed off a retarget boundary"
            );
        }
        return Ok(ok);
    }

    let start = interval_start_time(height, interval_start, transition_time)?;
    let previous_target = compact_to_target(previous.target());
    if !previous_target.is_usable() {
        tracing::debug!(height, bits = previous.target(), "previous target unusable");
        return Ok(false);
    }

    let timespan = i64::from(header.timestamp()) - i64::from(start);
    let expected = target_to_compact(periodic_next_target(previous_target.value, timespan, params));
    let ok = expected == header.target();
    if !ok {
        tracing::debug!(
            height,
            expected,
            actual = header.target(),
            timespan,
            "periodic retarget mismatch"
        );
    }
    Ok(ok)
}
