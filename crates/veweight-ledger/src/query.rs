//! Historical lookups over recorded points.

use veweight_core::Point;

/// The latest point in `points` with `ts <= t`, by binary search.
///
/// `points` must be ordered by `ts`. Several points may share a timestamp;
/// the last one recorded wins.
pub fn latest_at(points: &[Point], t: u64) -> Option<&Point> {
    let idx = points.partition_point(|p| p.ts <= t);
    idx.checked_sub(1).map(|i| &points[i])
}
