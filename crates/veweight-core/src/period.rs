//! Period ("week") alignment helpers.

/// Round `t` down to the start of its period.
pub fn period_floor(t: u64, period: u64) -> u64 {
    (t / period) * period
}

/// First period boundary strictly after `t`.
pub fn next_period(t: u64, period: u64) -> u64 {
    period_floor(t, period) + period
}

/// Number of period boundaries in `(from, to]`.
pub fn boundaries_between(from: u64, to: u64, period: u64) -> u64 {
    if to <= from {
        return 0;
    }
    to / period - from / period
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WEEK;

    #[test]
    fn floor_and_next_align_to_week() {
        let t = 3 * WEEK + 17;
        assert_eq!(period_floor(t, WEEK), 3 * WEEK);
        assert_eq!(next_period(t, WEEK), 4 * WEEK);
        // An aligned timestamp still moves to the following boundary.
        assert_eq!(next_period(3 * WEEK, WEEK), 4 * WEEK);
    }

    #[test]
    fn boundaries_counts_half_open_interval() {
        assert_eq!(boundaries_between(WEEK, WEEK, WEEK), 0);
        assert_eq!(boundaries_between(WEEK, 2 * WEEK, WEEK), 1);
        assert_eq!(boundaries_between(WEEK + 1, 2 * WEEK - 1, WEEK), 0);
        assert_eq!(boundaries_between(WEEK - 1, 3 * WEEK, WEEK), 3);
    }
}
