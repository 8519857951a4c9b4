//! Non-crossing constraint for a single marker move.
//!
//! A marker may move anywhere strictly between its neighbours, keeping at
//! least `min_gap` percentile points from each. Positions are whole
//! percentiles clamped to `[0, 100]`. The function is total: it never
//! fails, because it runs on every pointer-move event.

/// Default minimum separation between adjacent markers, in percentile points.
pub const DEFAULT_MIN_GAP: f64 = 1.0;

/// Constrain a proposed percentile for the marker currently at `current`.
///
/// `others` are the positions of every other marker, in any order. The
/// nearest neighbour below (`lower`) and above (`upper`) bound the move:
/// a proposal closer than `min_gap` to `lower` (or past it) snaps to
/// `lower + min_gap`, and likewise below `upper`. The result is rounded
/// to a whole percentile and clamped to `[0, 100]`.
///
/// If no whole percentile fits between the neighbours, or the proposal is
/// NaN, the marker stays at `current`.
pub fn constrain_move(proposed: f64, current: f64, others: &[f64], min_gap: f64) -> f64 {
    if proposed.is_nan() {
        return current;
    }

    let lower = others
        .iter()
        .copied()
        .filter(|&o| o < current)
        .fold(f64::NEG_INFINITY, f64::max);
    let upper = others
        .iter()
        .copied()
        .filter(|&o| o > current)
        .fold(f64::INFINITY, f64::min);

    let mut next = proposed;
    if next < lower + min_gap {
        next = lower + min_gap;
    }
    if next > upper - min_gap {
        next = upper - min_gap;
    }
    let next = next.round().clamp(0.0, 100.0);

    if next > lower && next < upper {
        next
    } else {
        current
    }
}

/// True if `position` sits strictly between its neighbours in `others`,
/// keeping `min_gap` from each.
pub fn fits_between(position: f64, current: f64, others: &[f64], min_gap: f64) -> bool {
    let below = others.iter().copied().filter(|&o| o < current);
    let above = others.iter().copied().filter(|&o| o > current);
    let clear_below = below.fold(true, |ok, o| ok && position - o >= min_gap);
    let clear_above = above.fold(true, |ok, o| ok && o - position >= min_gap);
    clear_below && clear_above
}
