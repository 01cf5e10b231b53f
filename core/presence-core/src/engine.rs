//! The activity history engine.
//!
//! Sole owner of the subject→record mapping. Collaborators (the presence
//! gateway, member-join handler, bulk scan at startup, query surfaces) only
//! reach the mapping through [`HistoryEngine::ensure_tracked`],
//! [`HistoryEngine::observe`], and [`HistoryEngine::query`].
//!
//! Every accepted mutation writes the full mapping back through the store
//! (write-through). There is no batching or async flush: after any successful
//! call, memory and disk agree. A failed save is logged and the in-memory
//! mapping stays authoritative; the next mutation re-attempts a full save.
//!
//! Not thread-safe by design: mutation goes through `&mut self`, and hosts
//! that dispatch events concurrently wrap the engine in their own lock.
//! `query` hands back an owned clone, so readers never see a torn record.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::policy::{decide, Decision, ObservePolicy};
use crate::store::HistoryStore;
use crate::types::{Activity, HistoryRecord};

/// Display name reported for subjects that were never tracked.
const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

pub struct HistoryEngine {
    records: HashMap<String, HistoryRecord>,
    store: HistoryStore,
    policy: ObservePolicy,
}

impl HistoryEngine {
    /// Loads the persisted mapping through `store`. A missing or corrupt
    /// snapshot degrades to an empty mapping inside the store; only an I/O
    /// failure surfaces here.
    pub fn load(store: HistoryStore, policy: ObservePolicy) -> Result<Self> {
        let records = store.load()?;
        Ok(HistoryEngine {
            records,
            store,
            policy,
        })
    }

    /// Engine with no backing file, for tests and embedding.
    pub fn new_in_memory(policy: ObservePolicy) -> Self {
        HistoryEngine {
            records: HashMap::new(),
            store: HistoryStore::new_in_memory(),
            policy,
        }
    }

    /// Guarantees a record exists for `subject_id`.
    ///
    /// Creates an all-sentinel record with the given display name and
    /// persists; if the subject is already tracked this is a no-op and the
    /// stored display name wins. Idempotent.
    pub fn ensure_tracked(&mut self, subject_id: &str, display_name: &str) {
        if self.records.contains_key(subject_id) {
            return;
        }
        self.records.insert(
            subject_id.to_string(),
            HistoryRecord::untracked(display_name),
        );
        self.persist();
    }

    /// Merges one presence observation into the subject's history.
    ///
    /// `activities` is the full list reported by the source; only the first
    /// well-formed entry matters. An empty list signals "activity cleared".
    /// Entries with an empty name are rejected individually; a non-empty list
    /// with no well-formed entry is ignored outright rather than treated as a
    /// clear, so source noise cannot push real history out.
    pub fn observe(
        &mut self,
        subject_id: &str,
        display_name: &str,
        activities: &[Activity],
        now: DateTime<Utc>,
    ) {
        let current = activities.iter().find(|a| !a.name.is_empty());
        if current.is_none() && !activities.is_empty() {
            debug!(subject_id, "Dropping observation with no well-formed activity");
            return;
        }

        let decision = decide(&self.policy, self.records.get(subject_id), current, now);
        match decision {
            Decision::Skip => {}
            Decision::Suppress => {
                debug!(subject_id, "Suppressed repeat observation inside debounce window");
            }
            Decision::Clear => {
                // Untracked subjects never reach Clear, so the record exists.
                if let Some(record) = self.records.get_mut(subject_id) {
                    record.shift_in(Activity::sentinel());
                    self.persist();
                }
            }
            Decision::Overwrite | Decision::Shift => {
                // Active decisions only come back for a present activity.
                if let Some(current) = current {
                    let record = self
                        .records
                        .entry(subject_id.to_string())
                        .or_insert_with(|| HistoryRecord::untracked(display_name));

                    match decision {
                        Decision::Overwrite => record.overwrite_current(current.clone()),
                        _ => record.shift_in(current.clone()),
                    }
                    record.display_name = display_name.to_string();
                    record.last_change_at = Some(now);
                    self.persist();
                }
            }
        }
    }

    /// Read-only projection of a subject's history.
    ///
    /// Untracked subjects get a transient all-sentinel record with display
    /// name "Unknown"; no record is created as a side effect.
    pub fn query(&self, subject_id: &str) -> HistoryRecord {
        self.records
            .get(subject_id)
            .cloned()
            .unwrap_or_else(|| HistoryRecord::untracked(UNKNOWN_DISPLAY_NAME))
    }

    /// Number of tracked subjects.
    pub fn subject_count(&self) -> usize {
        self.records.len()
    }

    /// Iterates over all tracked subjects.
    pub fn all_subjects(&self) -> impl Iterator<Item = (&str, &HistoryRecord)> {
        self.records
            .iter()
            .map(|(id, record)| (id.as_str(), record))
    }

    // Write-through persist. Failure degrades durability, not correctness:
    // the in-memory mapping stays authoritative and the next mutation
    // re-attempts the full save.
    fn persist(&self) {
        if let Err(err) = self.store.save(&self.records) {
            warn!(error = %err, "Failed to persist history snapshot");
        }
    }
}
