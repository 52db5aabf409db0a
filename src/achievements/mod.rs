//! Achievement system module.
//!
//! The engine keeps one record per achievement, unlocks them at most once,
//! runs the cascade rules (first visit, secret reset, 100% completion, speed
//! run) and mirrors its state into a single-key store. By default that store is
//! `~/.portfolio/achievements.json`.

pub mod clock;
pub mod data;
pub mod engine;
pub mod persistence;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use data::Catalog;
pub use engine::{AchievementEngine, AchievementSnapshot};
pub use persistence::{AchievementStore, FileStore, MemoryStore, StoredState};
pub use types::{
    AchievementDef, AchievementRecord, Rarity, RarityCounts, ResetOutcome, UnlockOutcome,
    UnlockRequest,
};
