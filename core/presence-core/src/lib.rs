//! # presence-core
//!
//! Core library for the presence tracker: a bounded, per-subject history of
//! recent distinct activities, durable across restarts.
//!
//! ## Design Principles
//!
//! - **Synchronous**: No async runtime dependency. Hosts can wrap with async if needed.
//! - **Not thread-safe**: Hosts provide their own synchronization (`Mutex`, `RwLock`).
//! - **Graceful degradation**: Missing or corrupt files return empty/default values, not errors.
//! - **Single writer**: The engine owns the subject mapping; everything goes
//!   through [`HistoryEngine::ensure_tracked`], [`HistoryEngine::observe`],
//!   and [`HistoryEngine::query`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use presence_core::{HistoryEngine, HistoryStore, ObservePolicy, StorageConfig};
//!
//! let storage = StorageConfig::default();
//! let store = HistoryStore::new(&storage.history_file());
//! let mut engine = HistoryEngine::load(store, ObservePolicy::default())?;
//! engine.observe("u1", "Alice", &activities, chrono::Utc::now());
//! let record = engine.query("u1");
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod store;
pub mod types;

pub use config::{load_policy_config, save_policy_config, PolicyConfig, StorageConfig};
pub use engine::HistoryEngine;
pub use error::{HistoryError, Result};
pub use policy::{decide, Decision, ObservePolicy};
pub use store::HistoryStore;
pub use types::{Activity, HistoryRecord, HISTORY_SLOTS, SENTINEL_NAME};
