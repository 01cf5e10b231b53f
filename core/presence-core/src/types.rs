//! Serialized data model for per-subject activity history.
//!
//! **Breaking changes are allowed** (single-user project). Current on-disk format is v1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed number of history slots per subject. Never grows or shrinks.
pub const HISTORY_SLOTS: usize = 4;

/// Placeholder value for an unused slot.
pub const SENTINEL_NAME: &str = "No data";

/// A single observed activity. Value object; equality on `name` is the
/// engine's dedup key, `kind` and `details` are free-text decoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub details: String,
}

impl Activity {
    pub fn new(name: &str, kind: &str, details: &str) -> Self {
        Activity {
            name: name.to_string(),
            kind: kind.to_string(),
            details: details.to_string(),
        }
    }

    /// The "No data" placeholder that fills unused slots.
    pub fn sentinel() -> Self {
        Activity::new(SENTINEL_NAME, SENTINEL_NAME, SENTINEL_NAME)
    }

    pub fn is_sentinel(&self) -> bool {
        self.name == SENTINEL_NAME
    }
}

/// Per-subject bounded history.
///
/// Slot 0 is the current activity; slots 1-3 are strictly older, most recent
/// first. Real entries are contiguous at the front, sentinels fill the rest.
/// An all-sentinel record is observably identical to "never tracked".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub display_name: String,
    pub slots: [Activity; HISTORY_SLOTS],
    /// Timestamp of the last accepted slot-0 change. `None` until the first
    /// accepted observation; clears never update it.
    #[serde(default)]
    pub last_change_at: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    /// Fresh record with all four slots set to the sentinel.
    pub fn untracked(display_name: &str) -> Self {
        HistoryRecord {
            display_name: display_name.to_string(),
            slots: std::array::from_fn(|_| Activity::sentinel()),
            last_change_at: None,
        }
    }

    /// Replaces slot 0 in place. Slots 1-3 are untouched.
    pub fn overwrite_current(&mut self, activity: Activity) {
        self.slots[0] = activity;
    }

    /// Pushes `activity` into slot 0, moving slots 0-2 down to 1-3.
    /// The previous slot 3 is dropped.
    pub fn shift_in(&mut self, activity: Activity) {
        self.slots.rotate_right(1);
        self.slots[0] = activity;
    }

    /// The current activity (slot 0).
    pub fn current(&self) -> &Activity {
        &self.slots[0]
    }
}
