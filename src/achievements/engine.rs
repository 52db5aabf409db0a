//! The achievement engine: owns the record list, applies unlocks, runs the
//! cascade rules and keeps durable storage in sync.
//!
//! All mutation goes through [`AchievementEngine::unlock`],
//! [`AchievementEngine::reset`] and [`AchievementEngine::reload`]. The engine
//! is single-threaded; callers serialize access the way a UI event loop does.

use super::clock::{Clock, SystemClock};
use super::data::{hidden_secret, Catalog};
use super::persistence::{encode_records, AchievementStore, StoredState};
use super::types::{
    AchievementDef, AchievementRecord, Rarity, RarityCounts, ResetOutcome, UnlockOutcome,
    UnlockRequest,
};
use crate::constants::SECRET_RESET_SENTINEL;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use tracing::{debug, info, warn};

/// Read-only view handed to display code.
#[derive(Debug, Clone)]
pub struct AchievementSnapshot<'a> {
    /// Visible records: the main list, plus the secret once revealed.
    pub records: &'a [AchievementRecord],
    /// Unlocked records grouped by rarity.
    pub counts: RarityCounts,
}

pub struct AchievementEngine<S, C = SystemClock> {
    catalog: Catalog,
    records: Vec<AchievementRecord>,
    /// Set when the sentinel was found on load; consumed by the cascade.
    pending_secret_reset: bool,
    /// Set by `reset`; storage must not be overwritten until the next load.
    awaiting_reload: bool,
    latest: Option<AchievementRecord>,
    store: S,
    clock: C,
    sentinel: String,
}

impl<S: AchievementStore, C: Clock> AchievementEngine<S, C> {
    /// Load state from `store` (reseeding if it is missing or unreadable), run
    /// the startup cascade and persist the result.
    pub fn load(catalog: Catalog, store: S, clock: C) -> Self {
        Self::load_with_sentinel(catalog, store, clock, SECRET_RESET_SENTINEL)
    }

    pub fn load_with_sentinel(
        catalog: Catalog,
        store: S,
        clock: C,
        sentinel: impl Into<String>,
    ) -> Self {
        let mut engine = Self {
            catalog,
            records: Vec::new(),
            pending_secret_reset: false,
            awaiting_reload: false,
            latest: None,
            store,
            clock,
            sentinel: sentinel.into(),
        };
        engine.rehydrate();
        engine
    }

    /// Throw away in-memory state and load again from storage.
    pub fn reload(&mut self) {
        self.rehydrate();
    }

    /// Unlock one achievement and run the cascade rules.
    ///
    /// Unknown titles, repeated unlocks and mismatched request variants are
    /// silent no-ops; the returned outcome says which one happened.
    pub fn unlock(&mut self, request: UnlockRequest) -> UnlockOutcome {
        if self.awaiting_reload {
            debug!(title = request.title(), "unlock ignored until reload");
            return UnlockOutcome::AwaitingReload;
        }
        let now = self.clock.now();
        let outcome = self.apply_unlock(&request, now);
        if outcome.is_unlocked() {
            self.run_cascades(now);
            self.persist();
        }
        outcome
    }

    /// Shorthand for a standard unlock.
    pub fn unlock_title(&mut self, title: &str) -> UnlockOutcome {
        self.unlock(UnlockRequest::standard(title))
    }

    /// Clear all unlock state.
    ///
    /// With enough achievements unlocked, storage receives the sentinel
    /// instead of being cleared, and the next load unlocks the reset-cascade
    /// achievement. Either way the new state only takes effect after
    /// [`reload`](Self::reload); until then unlocks are ignored.
    pub fn reset(&mut self) -> ResetOutcome {
        if self.stored_state() == StoredState::PendingSecretReset {
            info!("reset skipped, a secret reset is already waiting for reload");
            return ResetOutcome::ReloadPending;
        }

        let unlocked = self.unlocked_count();
        let threshold = self.catalog.reset_threshold();
        let outcome = if unlocked >= threshold {
            if let Err(e) = self.store.write(&self.sentinel) {
                warn!(error = %e, "failed to store the reset sentinel");
            }
            info!(unlocked, threshold, "achievements reset under mysterious conditions");
            ResetOutcome::SecretQueued
        } else {
            if let Err(e) = self.store.remove() {
                warn!(error = %e, "failed to clear stored achievements");
            }
            info!(unlocked, "achievements reset");
            ResetOutcome::Cleared
        };

        self.records = self.seed();
        self.latest = None;
        self.pending_secret_reset = false;
        self.awaiting_reload = true;
        outcome
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Visible records: the main list, plus the secret once revealed.
    pub fn achievements(&self) -> &[AchievementRecord] {
        &self.records
    }

    pub fn snapshot(&self) -> AchievementSnapshot<'_> {
        AchievementSnapshot {
            records: &self.records,
            counts: self.counts_by_rarity(),
        }
    }

    pub fn counts_by_rarity(&self) -> RarityCounts {
        RarityCounts::from_records(&self.records)
    }

    /// Visible records whose title contains `term` (case-insensitive) and,
    /// when `rarities` is non-empty, whose rarity is one of them.
    pub fn search(&self, term: &str, rarities: &[Rarity]) -> Vec<&AchievementRecord> {
        self.records
            .iter()
            .filter(|r| r.matches(term, rarities))
            .collect()
    }

    /// Records as the achievements page lays them out: the visible records,
    /// followed by a locked `???` placeholder while the secret is hidden.
    pub fn gallery(&self) -> Vec<Cow<'_, AchievementRecord>> {
        let mut entries: Vec<_> = self.records.iter().map(Cow::Borrowed).collect();
        if !self.is_secret_revealed() {
            entries.push(Cow::Owned(AchievementRecord::locked(&hidden_secret())));
        }
        entries
    }

    pub fn find(&self, title: &str) -> Option<&AchievementRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    pub fn is_unlocked(&self, title: &str) -> bool {
        self.find(title).is_some_and(|r| r.is_unlocked())
    }

    /// Unlocked visible records, secret included once revealed.
    pub fn unlocked_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_unlocked()).count()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Completion over the main list (0.0 - 100.0). The secret never counts.
    pub fn completion_percentage(&self) -> f32 {
        let total = self.main_records().count();
        if total == 0 {
            return 0.0;
        }
        let unlocked = self.main_records().filter(|r| r.is_unlocked()).count();
        (unlocked as f32 / total as f32) * 100.0
    }

    pub fn is_secret_revealed(&self) -> bool {
        let secret = self.catalog.speed_run_title();
        self.records.iter().any(|r| r.title == secret)
    }

    pub fn is_awaiting_reload(&self) -> bool {
        self.awaiting_reload
    }

    /// Most recent unlock, for the notification toast.
    pub fn latest_unlock(&self) -> Option<&AchievementRecord> {
        self.latest.as_ref()
    }

    /// Clear the notification slot, returning what it held.
    pub fn dismiss_latest(&mut self) -> Option<AchievementRecord> {
        self.latest.take()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn rehydrate(&mut self) {
        self.pending_secret_reset = false;
        self.awaiting_reload = false;
        self.latest = None;

        self.records = match self.stored_state() {
            StoredState::Empty => self.seed(),
            StoredState::PendingSecretReset => {
                debug!("found reset sentinel");
                self.pending_secret_reset = true;
                self.seed()
            }
            StoredState::Records(stored) => self.merge(&stored),
        };

        let now = self.clock.now();
        self.run_cascades(now);
        self.persist();
    }

    fn stored_state(&self) -> StoredState {
        let raw = self.store.read().unwrap_or_else(|e| {
            warn!(error = %e, "failed to read stored achievements");
            None
        });
        StoredState::decode(raw.as_deref(), &self.sentinel)
    }

    fn seed(&self) -> Vec<AchievementRecord> {
        self.catalog
            .definitions()
            .iter()
            .map(AchievementRecord::locked)
            .collect()
    }

    /// One record per definition, taking unlock state from the first stored
    /// record with the same title. The secret comes back only if it was
    /// stored, i.e. already revealed.
    fn merge(&self, stored: &[AchievementRecord]) -> Vec<AchievementRecord> {
        let restore = |def: &AchievementDef| {
            match stored.iter().find(|r| r.title == def.title) {
                Some(record) => AchievementRecord::restored(def, record, false),
                None => AchievementRecord::locked(def),
            }
        };
        let mut records: Vec<_> = self.catalog.definitions().iter().map(restore).collect();

        let secret = self.catalog.secret();
        if let Some(record) = stored.iter().find(|r| r.title == secret.title) {
            records.push(AchievementRecord::restored(secret, record, true));
        }

        let unknown = stored
            .iter()
            .filter(|r| self.catalog.find(&r.title).is_none())
            .count();
        if unknown > 0 {
            debug!(unknown, "dropping stored achievements with unknown titles");
        }
        records
    }

    fn main_records(&self) -> impl Iterator<Item = &AchievementRecord> {
        let secret = self.catalog.speed_run_title();
        self.records.iter().filter(move |r| r.title != secret)
    }

    /// Apply a single unlock without cascading or persisting.
    fn apply_unlock(&mut self, request: &UnlockRequest, now: DateTime<Utc>) -> UnlockOutcome {
        let speed_run_title = self.catalog.speed_run_title();
        let split = match request {
            UnlockRequest::Standard(title) if title == speed_run_title => {
                debug!(title = %title, "speed-run achievement needs a split");
                return UnlockOutcome::Rejected;
            }
            UnlockRequest::Standard(_) => None,
            UnlockRequest::SpeedRun { title, split_ms } if title == speed_run_title => {
                Some(*split_ms)
            }
            UnlockRequest::SpeedRun { title, .. } => {
                debug!(title = %title, "only the speed-run achievement takes a split");
                return UnlockOutcome::Rejected;
            }
        };

        let title = request.title();
        let Some(record) = self.records.iter_mut().find(|r| r.title == title) else {
            debug!(title, "no achievement with this title");
            return UnlockOutcome::UnknownTitle;
        };
        if record.is_unlocked() {
            return UnlockOutcome::AlreadyUnlocked;
        }

        record.mark_unlocked(now, split);
        info!(title, rarity = record.rarity.name(), "achievement unlocked");
        self.latest = Some(record.clone());
        UnlockOutcome::Unlocked
    }

    /// Cascade rules, evaluated against the current state. Each rule is an
    /// idempotent unlock of a fixed title, so running them again is harmless.
    fn run_cascades(&mut self, now: DateTime<Utc>) {
        if let Some(first_visit) = self.catalog.first_visit().map(|d| d.title) {
            self.apply_unlock(&UnlockRequest::standard(first_visit), now);
        }

        if self.pending_secret_reset {
            self.pending_secret_reset = false;
            let title = self.catalog.reset_cascade_title();
            self.apply_unlock(&UnlockRequest::standard(title), now);
        }

        if self.completion_due() {
            let title = self.catalog.completion_title();
            self.apply_unlock(&UnlockRequest::standard(title), now);
            self.reveal_secret();
            self.check_speed_run(now);
        }
    }

    /// Every main achievement except the completion one is unlocked.
    fn completion_due(&self) -> bool {
        let completion = self.catalog.completion_title();
        let total = self.main_records().count();
        let unlocked = self.main_records().filter(|r| r.is_unlocked()).count();
        let completion_locked = self
            .main_records()
            .any(|r| r.title == completion && !r.is_unlocked());
        completion_locked && unlocked + 1 == total
    }

    fn reveal_secret(&mut self) {
        if !self.is_secret_revealed() {
            self.records
                .push(AchievementRecord::locked(self.catalog.secret()));
            info!(title = self.catalog.speed_run_title(), "secret achievement revealed");
        }
    }

    fn check_speed_run(&mut self, now: DateTime<Utc>) {
        let Some(earliest) = self.records.iter().filter_map(|r| r.unlocked_at()).min() else {
            return;
        };
        // Timestamps from the future (clock moved back) give no usable time
        let Ok(elapsed_ms) = u64::try_from((now - earliest).num_milliseconds()) else {
            debug!(%earliest, %now, "earliest unlock is in the future, no speed run");
            return;
        };
        let window_ms = u64::try_from(self.catalog.speed_run_window().as_millis())
            .unwrap_or(u64::MAX);

        if elapsed_ms < window_ms {
            let title = self.catalog.speed_run_title();
            self.apply_unlock(&UnlockRequest::speed_run(title, elapsed_ms), now);
        } else {
            debug!(elapsed_ms, window_ms, "completed outside the speed-run window");
        }
    }

    fn persist(&mut self) {
        let result = encode_records(&self.records).and_then(|raw| self.store.write(&raw));
        if let Err(e) = result {
            warn!(error = %e, "failed to persist achievements");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::clock::ManualClock;
    use crate::achievements::data::{
        EOS, GO_TOUCH_GRASS, HIDDEN_TITLE, NEW_BEGINNINGS, OUT_OF_BOUNDS, SAND_MANDALA,
        SPEEDOPHILE,
    };
    use crate::achievements::persistence::MemoryStore;
    use chrono::Duration;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn fresh() -> (AchievementEngine<MemoryStore, ManualClock>, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::new(start());
        let engine = AchievementEngine::load(Catalog::portfolio(), store.clone(), clock.clone());
        (engine, store, clock)
    }

    #[test]
    fn test_fresh_load_unlocks_first_visit_only() {
        let (engine, store, _) = fresh();
        assert_eq!(engine.unlocked_count(), 1);
        assert!(engine.is_unlocked(NEW_BEGINNINGS));
        assert_eq!(engine.total_count(), engine.catalog().definitions().len());
        assert!(!engine.is_secret_revealed());
        assert!(store.value().is_some(), "load should persist the seeded list");
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let (mut engine, _, clock) = fresh();

        assert_eq!(engine.unlock_title(EOS), UnlockOutcome::Unlocked);
        let first_at = engine.find(EOS).and_then(|r| r.unlocked_at());

        clock.advance_ms(5_000);
        assert_eq!(engine.unlock_title(EOS), UnlockOutcome::AlreadyUnlocked);
        assert_eq!(engine.find(EOS).and_then(|r| r.unlocked_at()), first_at);
        assert_eq!(engine.unlocked_count(), 2);
    }

    #[test]
    fn test_unknown_title_is_silent_noop() {
        let (mut engine, store, _) = fresh();
        let before = store.value();
        assert_eq!(engine.unlock_title("Nope"), UnlockOutcome::UnknownTitle);
        assert_eq!(store.value(), before);
        assert_eq!(engine.unlocked_count(), 1);
    }

    #[test]
    fn test_speed_run_title_requires_split() {
        let (mut engine, _, _) = fresh();
        assert_eq!(engine.unlock_title(SPEEDOPHILE), UnlockOutcome::Rejected);
        assert_eq!(
            engine.unlock(UnlockRequest::speed_run(EOS, 10)),
            UnlockOutcome::Rejected
        );
        assert!(!engine.is_unlocked(EOS));
    }

    #[test]
    fn test_speed_run_before_reveal_is_unknown() {
        let (mut engine, _, _) = fresh();
        assert_eq!(
            engine.unlock(UnlockRequest::speed_run(SPEEDOPHILE, 10)),
            UnlockOutcome::UnknownTitle
        );
    }

    #[test]
    fn test_latest_unlock_slot() {
        let (mut engine, _, _) = fresh();
        assert_eq!(engine.latest_unlock().map(|r| r.title.as_str()), Some(NEW_BEGINNINGS));

        engine.unlock_title(OUT_OF_BOUNDS);
        let latest = engine.latest_unlock().unwrap();
        assert_eq!(latest.title, OUT_OF_BOUNDS);
        assert!(latest.is_unlocked());

        assert!(engine.dismiss_latest().is_some());
        assert!(engine.latest_unlock().is_none());

        // A repeated unlock does not notify again
        engine.unlock_title(OUT_OF_BOUNDS);
        assert!(engine.latest_unlock().is_none());
    }

    #[test]
    fn test_completion_cascade_fires_once() {
        let (mut engine, _, clock) = fresh();
        let titles: Vec<_> = engine
            .catalog()
            .definitions()
            .iter()
            .map(|d| d.title)
            .filter(|t| *t != GO_TOUCH_GRASS)
            .collect();

        for title in titles {
            clock.advance_ms(20_000);
            engine.unlock_title(title);
        }

        assert!(engine.is_unlocked(GO_TOUCH_GRASS));
        assert!(engine.is_secret_revealed());
        assert!(!engine.is_unlocked(SPEEDOPHILE), "took far longer than 67s");
        assert_eq!(engine.completion_percentage(), 100.0);
        assert_eq!(
            engine.achievements().last().map(|r| r.title.as_str()),
            Some(SPEEDOPHILE)
        );

        let revealed = engine
            .achievements()
            .iter()
            .filter(|r| r.title == SPEEDOPHILE)
            .count();
        assert_eq!(revealed, 1);
    }

    #[test]
    fn test_counts_by_rarity() {
        let (mut engine, _, _) = fresh();
        engine.unlock_title(EOS);
        engine.unlock_title(OUT_OF_BOUNDS);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.counts.get(Rarity::Common), 2);
        assert_eq!(snapshot.counts.get(Rarity::Rare), 1);
        assert_eq!(snapshot.counts.get(Rarity::Mythic), 0);
        assert_eq!(snapshot.counts.total(), 3);
        assert_eq!(snapshot.records.len(), engine.total_count());
    }

    #[test]
    fn test_search_by_term_and_rarity() {
        let (engine, _, _) = fresh();
        assert_eq!(engine.search("", &[]).len(), engine.total_count());

        let titles = |found: Vec<&AchievementRecord>| -> Vec<String> {
            found.into_iter().map(|r| r.title.clone()).collect()
        };
        assert_eq!(titles(engine.search("SAND", &[])), vec![SAND_MANDALA]);
        assert_eq!(
            titles(engine.search("o", &[Rarity::Uncommon])),
            vec!["Snoopy Detective", "Social Stalker"]
        );
        assert_eq!(engine.search("s", &[Rarity::Rare]).len(), 3);
        assert!(engine.search("speedophile", &[]).is_empty());
    }

    #[test]
    fn test_gallery_hides_secret_until_revealed() {
        let (mut engine, _, clock) = fresh();
        let gallery = engine.gallery();
        assert_eq!(gallery.len(), engine.total_count() + 1);
        let placeholder = gallery.last().unwrap();
        assert_eq!(placeholder.title, HIDDEN_TITLE);
        assert_eq!(placeholder.id, -99);
        assert_eq!(placeholder.rarity, Rarity::Mythic);
        assert!(!placeholder.is_unlocked());

        let titles: Vec<_> = engine
            .catalog()
            .definitions()
            .iter()
            .map(|d| d.title)
            .filter(|t| *t != GO_TOUCH_GRASS)
            .collect();
        for title in titles {
            clock.advance_ms(20_000);
            engine.unlock_title(title);
        }

        let gallery = engine.gallery();
        assert_eq!(gallery.len(), engine.total_count());
        assert!(gallery.iter().all(|r| r.title != HIDDEN_TITLE));
        assert_eq!(gallery.last().map(|r| r.title.as_str()), Some(SPEEDOPHILE));
    }

    #[test]
    fn test_future_timestamps_never_earn_speed_run() {
        let (mut engine, _, clock) = fresh();
        // The device clock moves back 30s after the first visit was stamped
        clock.set(start() - Duration::seconds(30));

        let titles: Vec<_> = engine
            .catalog()
            .definitions()
            .iter()
            .map(|d| d.title)
            .filter(|t| *t != GO_TOUCH_GRASS && *t != NEW_BEGINNINGS)
            .collect();
        for title in titles {
            clock.advance_ms(1_000);
            engine.unlock_title(title);
        }

        assert!(engine.is_unlocked(GO_TOUCH_GRASS));
        assert!(engine.is_secret_revealed());
        let speed_run = engine.find(SPEEDOPHILE).unwrap();
        assert!(!speed_run.is_unlocked());
        assert!(speed_run.split().is_none());
    }

    #[test]
    fn test_reset_blocks_unlocks_until_reload() {
        let (mut engine, store, _) = fresh();
        assert_eq!(engine.reset(), ResetOutcome::Cleared);
        assert!(store.value().is_none());
        assert_eq!(engine.unlocked_count(), 0);
        assert!(engine.is_awaiting_reload());

        assert_eq!(engine.unlock_title(EOS), UnlockOutcome::AwaitingReload);
        assert!(store.value().is_none());

        engine.reload();
        assert!(!engine.is_awaiting_reload());
        assert_eq!(engine.unlocked_count(), 1);
    }

    #[test]
    fn test_reset_with_pending_sentinel_does_nothing() {
        let (mut engine, store, _) = fresh();
        for title in [EOS, OUT_OF_BOUNDS, "Test"] {
            engine.unlock_title(title);
        }
        assert_eq!(engine.reset(), ResetOutcome::SecretQueued);
        assert_eq!(engine.reset(), ResetOutcome::ReloadPending);
        assert_eq!(store.value().as_deref(), Some(SECRET_RESET_SENTINEL));

        engine.reload();
        assert!(engine.is_unlocked(SAND_MANDALA));
        assert!(engine.is_unlocked(NEW_BEGINNINGS));
        assert_eq!(engine.unlocked_count(), 2);
        assert_ne!(store.value().as_deref(), Some(SECRET_RESET_SENTINEL));
    }

    #[test]
    fn test_custom_sentinel() {
        let store = MemoryStore::with_value("pending!");
        let engine = AchievementEngine::load_with_sentinel(
            Catalog::portfolio(),
            store,
            ManualClock::new(start()),
            "pending!",
        );
        assert!(engine.is_unlocked(SAND_MANDALA));
    }
}
