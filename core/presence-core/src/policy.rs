//! Observation merge policy.
//!
//! Earlier revisions of the tracker disagreed on when a repeated observation
//! should touch history: one shifted unconditionally, one gated on a 1-minute
//! window, one on 5 minutes. This module unifies them as a single policy with
//! two externally configured intervals; callers pick the variant they want.
//!
//! The one rule that never varies: history grows only on a *name* change (or a
//! same-name re-occurrence after `gap_threshold`). Detail-only changes always
//! overwrite slot 0 in place. This is what keeps the four slots recording
//! distinct activities instead of thrashing on detail noise.

use chrono::{DateTime, Duration, Utc};

use crate::types::{Activity, HistoryRecord};

/// Time gates for the observation policy.
///
/// `min_change_interval` suppresses repeated identical observations that
/// arrive too soon after the last accepted change. `gap_threshold` promotes a
/// same-name observation to a fresh history entry once the subject has been
/// at it long enough that a re-report counts as a new occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservePolicy {
    pub min_change_interval: Duration,
    pub gap_threshold: Duration,
}

impl Default for ObservePolicy {
    fn default() -> Self {
        ObservePolicy {
            min_change_interval: Duration::seconds(60),
            gap_threshold: Duration::minutes(30),
        }
    }
}

impl ObservePolicy {
    pub fn new(min_change_interval: Duration, gap_threshold: Duration) -> Self {
        ObservePolicy {
            min_change_interval,
            gap_threshold,
        }
    }

    /// Accepts every observation immediately (the ungated source variant).
    pub fn no_debounce() -> Self {
        ObservePolicy {
            min_change_interval: Duration::zero(),
            ..ObservePolicy::default()
        }
    }
}

/// What the engine should do with one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do: no record and nothing observed, or already cleared.
    Skip,
    /// Debounce gate hit: drop the observation entirely, no persist.
    Suppress,
    /// Shift a sentinel into slot 0 (activity cleared). Does not count as a
    /// change for `last_change_at`.
    Clear,
    /// Replace slot 0 in place; older slots untouched.
    Overwrite,
    /// Push into slot 0, dropping the oldest entry.
    Shift,
}

/// Decides how an observation merges into a subject's record.
///
/// `current` is the first well-formed activity reported by the source, or
/// `None` when the source reports the subject as cleared.
pub fn decide(
    policy: &ObservePolicy,
    record: Option<&HistoryRecord>,
    current: Option<&Activity>,
    now: DateTime<Utc>,
) -> Decision {
    let current = match current {
        Some(activity) => activity,
        None => {
            // Cleared. Only shift a sentinel in over a real slot 0; an
            // untracked or already-cleared subject stays as it is.
            return match record {
                Some(record) if !record.current().is_sentinel() => Decision::Clear,
                _ => Decision::Skip,
            };
        }
    };

    let record = match record {
        // First observation for a lazily created record lands in slot 0.
        None => return Decision::Overwrite,
        Some(record) => record,
    };

    // Slot 0 sentinel must be overwritten, never shifted down: a sentinel in
    // the middle of the slots would break front-contiguity.
    if record.current().is_sentinel() {
        return Decision::Overwrite;
    }

    let elapsed = record
        .last_change_at
        .map(|at| now.signed_duration_since(at));

    if current.name == record.current().name {
        match elapsed {
            Some(dt) if dt < policy.min_change_interval => Decision::Suppress,
            Some(dt) if dt >= policy.gap_threshold => Decision::Shift,
            // No recorded change time is treated as infinitely stale.
            None => Decision::Shift,
            Some(_) => Decision::Overwrite,
        }
    } else {
        Decision::Shift
    }
}
