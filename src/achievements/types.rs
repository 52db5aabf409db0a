//! Achievement types and data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordinal rarity tier, used for display styling and the trophy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All rarities in ascending order.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Display name for the rarity.
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }

    /// Parse a rarity name, ignoring case.
    pub fn parse(name: &str) -> Option<Rarity> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Trophy glyph shown next to the counters.
    pub fn trophy(&self) -> &'static str {
        match self {
            Rarity::Common => "🏆",
            Rarity::Uncommon => "🎖️",
            Rarity::Rare => "🥇",
            Rarity::Legendary => "🌟",
            Rarity::Mythic => "💎",
        }
    }
}

/// Static definition of an achievement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: i32,
    pub title: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    /// Number of unlocked achievements required before this one can be
    /// earned through its cascade (only set on the reset-cascade achievement).
    pub cascade_threshold: Option<usize>,
}

/// Runtime state of one achievement.
///
/// The unlock timestamp is private so that "unlocked" and "has a timestamp"
/// can never disagree; only the engine moves a record to unlocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecordWire", into = "RecordWire")]
pub struct AchievementRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub rarity: Rarity,
    pub cascade_threshold: Option<usize>,
    unlocked_at: Option<DateTime<Utc>>,
    split: Option<u64>,
}

impl AchievementRecord {
    /// Fresh, locked record for a definition.
    pub fn locked(def: &AchievementDef) -> Self {
        Self {
            id: def.id,
            title: def.title.to_string(),
            description: def.description.to_string(),
            rarity: def.rarity,
            cascade_threshold: def.cascade_threshold,
            unlocked_at: None,
            split: None,
        }
    }

    /// Record for `def` carrying over the unlock state of a stored record.
    /// Static fields always come from the definition; the split is only kept
    /// when `keep_split` is set.
    pub(crate) fn restored(
        def: &AchievementDef,
        stored: &AchievementRecord,
        keep_split: bool,
    ) -> Self {
        let mut record = Self::locked(def);
        record.unlocked_at = stored.unlocked_at;
        if keep_split {
            record.split = stored.unlocked_at.and(stored.split);
        }
        record
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    pub fn unlocked_at(&self) -> Option<DateTime<Utc>> {
        self.unlocked_at
    }

    /// Elapsed milliseconds recorded by the speed-run cascade.
    pub fn split(&self) -> Option<u64> {
        self.split
    }

    /// Gallery search: the title contains `term` (case-insensitive, blank
    /// matches everything) and, if any rarities are given, the rarity is one
    /// of them.
    pub fn matches(&self, term: &str, rarities: &[Rarity]) -> bool {
        let term = term.trim().to_lowercase();
        let title_matches = term.is_empty() || self.title.to_lowercase().contains(&term);
        title_matches && (rarities.is_empty() || rarities.contains(&self.rarity))
    }

    pub(crate) fn mark_unlocked(&mut self, at: DateTime<Utc>, split: Option<u64>) {
        self.unlocked_at = Some(at);
        self.split = split;
    }
}

impl From<&AchievementDef> for AchievementRecord {
    fn from(def: &AchievementDef) -> Self {
        Self::locked(def)
    }
}

/// On-disk shape of a record. Field names follow the site's storage layout,
/// including the legacy spellings it used to write.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordWire {
    id: i32,
    title: String,
    #[serde(default)]
    description: String,
    rarity: Rarity,
    #[serde(default)]
    is_unlocked: bool,
    #[serde(default, alias = "UnlockedAt", skip_serializing_if = "Option::is_none")]
    unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    split: Option<u64>,
    #[serde(
        default,
        alias = "noOfAchievementsRequiredToUnlock",
        skip_serializing_if = "Option::is_none"
    )]
    cascade_threshold: Option<usize>,
}

impl From<RecordWire> for AchievementRecord {
    fn from(wire: RecordWire) -> Self {
        // An unlocked flag without a timestamp cannot honor the record
        // invariant, so it loads as locked.
        let unlocked_at = if wire.is_unlocked {
            wire.unlocked_at
        } else {
            None
        };
        Self {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            rarity: wire.rarity,
            cascade_threshold: wire.cascade_threshold,
            unlocked_at,
            split: unlocked_at.and(wire.split),
        }
    }
}

impl From<AchievementRecord> for RecordWire {
    fn from(record: AchievementRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            rarity: record.rarity,
            is_unlocked: record.unlocked_at.is_some(),
            unlocked_at: record.unlocked_at,
            split: record.split,
            cascade_threshold: record.cascade_threshold,
        }
    }
}

/// A request to unlock one achievement.
///
/// The speed-run achievement is the only one that carries a split, so it gets
/// its own variant instead of an optional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockRequest {
    Standard(String),
    SpeedRun { title: String, split_ms: u64 },
}

impl UnlockRequest {
    pub fn standard(title: impl Into<String>) -> Self {
        UnlockRequest::Standard(title.into())
    }

    pub fn speed_run(title: impl Into<String>, split_ms: u64) -> Self {
        UnlockRequest::SpeedRun {
            title: title.into(),
            split_ms,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            UnlockRequest::Standard(title) => title,
            UnlockRequest::SpeedRun { title, .. } => title,
        }
    }
}

/// What an unlock request did. Callers are free to ignore it; none of the
/// non-`Unlocked` variants is an error for the end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// The record moved from locked to unlocked.
    Unlocked,
    /// The record was already unlocked; nothing changed.
    AlreadyUnlocked,
    /// No record has this title.
    UnknownTitle,
    /// The request variant does not match the title (a split for an ordinary
    /// achievement, or a speed-run title without one).
    Rejected,
    /// A reset happened and the state has not been reloaded yet.
    AwaitingReload,
}

impl UnlockOutcome {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, UnlockOutcome::Unlocked)
    }
}

/// What a reset did to durable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Storage was cleared; the next load starts from scratch.
    Cleared,
    /// Enough achievements were unlocked: the sentinel was stored and the next
    /// load unlocks the reset-cascade achievement.
    SecretQueued,
    /// The sentinel is already stored; nothing was changed.
    ReloadPending,
}

/// Unlocked achievement counts grouped by rarity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarityCounts {
    counts: BTreeMap<Rarity, usize>,
}

impl RarityCounts {
    /// Count the unlocked records, with every rarity present (possibly zero).
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AchievementRecord>) -> Self {
        let mut counts: BTreeMap<Rarity, usize> = Rarity::ALL.iter().map(|r| (*r, 0)).collect();
        for record in records.into_iter().filter(|r| r.is_unlocked()) {
            *counts.entry(record.rarity).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, rarity: Rarity) -> usize {
        self.counts.get(&rarity).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Counts in ascending rarity order.
    pub fn iter(&self) -> impl Iterator<Item = (Rarity, usize)> + '_ {
        self.counts.iter().map(|(rarity, count)| (*rarity, *count))
    }
}

impl Default for RarityCounts {
    fn default() -> Self {
        Self::from_records(std::iter::empty())
    }
}
