//! Trophies - the achievement engine behind the portfolio site.
//!
//! UI code reports events, the engine unlocks achievements at most once,
//! runs its cascade rules and keeps a single JSON store in sync. The console
//! module exposes the same engine to a command line.

pub mod achievements;
pub mod build_info;
pub mod config;
pub mod console;
pub mod constants;
pub mod error;
pub mod events;
pub mod utils;

pub use achievements::{
    AchievementEngine, AchievementRecord, Catalog, Rarity, UnlockOutcome, UnlockRequest,
};
pub use config::EngineConfig;
pub use console::{Console, ConsoleCommand, ConsoleEffect, ConsoleReply, SearchFilter};
pub use error::{Result, TrophyError};
pub use events::{Theme, UiEvent};
