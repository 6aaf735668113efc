//! Structured log events for key ledger operations.
//!
//! Each function emits a `tracing` event with structured fields.

use crate::clock::to_datetime;

/// Log a committed lock checkpoint.
pub fn lock_checkpointed(account: &str, amount: u128, end: u64, epoch: usize) {
    ::tracing::info!(
        event = "lock_checkpointed",
        account = %account,
        amount = %amount,
        end = end,
        end_at = ?to_datetime(end),
        epoch = epoch,
        "lock checkpointed"
    );
}

/// Log a global replay that crossed period boundaries.
pub fn timeline_replayed(timeline: &str, from: u64, to: u64, steps: usize) {
    ::tracing::debug!(
        event = "timeline_replayed",
        timeline = %timeline,
        from = from,
        to = to,
        steps = steps,
        "timeline replayed"
    );
}

/// Log a committed vote.
pub fn vote_recorded(account: &str, target: &str, weight_bps: u16, used_bps: u16) {
    ::tracing::info!(
        event = "vote_recorded",
        account = %account,
        target = %target,
        weight_bps = weight_bps,
        used_bps = used_bps,
        "vote recorded"
    );
}

/// Log an operation rejected by validation.
pub fn operation_rejected(operation: &str, code: &str, reason: &str) {
    ::tracing::warn!(
        event = "operation_rejected",
        operation = %operation,
        code = %code,
        reason = %reason,
        "operation rejected"
    );
}
