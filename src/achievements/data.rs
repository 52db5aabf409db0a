//! Static achievement definitions for the portfolio site.

use super::types::{AchievementDef, Rarity};
use crate::constants::{RESET_CASCADE_OFFSET, SPEED_RUN_WINDOW_SECONDS};
use std::time::Duration;

pub const NEW_BEGINNINGS: &str = "New Beginnings";
pub const EOS: &str = "Eos";
pub const FASHION_POLICE: &str = "Fashion Police";
pub const SNOOPY_DETECTIVE: &str = "Snoopy Detective";
pub const SOCIAL_STALKER: &str = "Social Stalker";
pub const TEST: &str = "Test";
pub const PUZZLE_MASTER: &str = "Puzzle Master";
pub const OUT_OF_BOUNDS: &str = "Out of Bounds";
pub const SAND_MANDALA: &str = "Sand Mandala";
pub const GO_TOUCH_GRASS: &str = "Go Touch Grass";
pub const SPEEDOPHILE: &str = "Speedophile";
/// Gallery placeholder title for the unrevealed secret.
pub const HIDDEN_TITLE: &str = "???";
/// Unlocked by the console's master login. Not part of the seed list.
pub const WOAH_HACKER: &str = "Woah! Hacker";

/// The portfolio's achievements in display order.
///
/// Sand Mandala's threshold is filled in from the list length: everything
/// except the five achievements that are still expected to be locked when a
/// committed visitor resets, and Sand Mandala itself.
pub fn portfolio_definitions() -> Vec<AchievementDef> {
    let mut defs = vec![
        AchievementDef {
            id: 1,
            title: NEW_BEGINNINGS,
            description: "Entered the page for the first time",
            rarity: Rarity::Common,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 2,
            title: EOS,
            description: "Changed the theme of the page",
            rarity: Rarity::Common,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 3,
            title: FASHION_POLICE,
            description: "Changed the style overlay of the page",
            rarity: Rarity::Common,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 4,
            title: SNOOPY_DETECTIVE,
            description: "Found the creator's workplace",
            rarity: Rarity::Uncommon,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 5,
            title: SOCIAL_STALKER,
            description: "Looked at all of the creator's socials",
            rarity: Rarity::Uncommon,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 6,
            title: TEST,
            description: "Test achievement for development purposes",
            rarity: Rarity::Uncommon,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 7,
            title: PUZZLE_MASTER,
            description: "Solved the most difficult puzzle ever created",
            rarity: Rarity::Rare,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 8,
            title: OUT_OF_BOUNDS,
            description: "Went to the backdoors",
            rarity: Rarity::Rare,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 19,
            title: SAND_MANDALA,
            description: "Reset achievements under mysterious conditions",
            rarity: Rarity::Rare,
            cascade_threshold: None,
        },
        AchievementDef {
            id: 21,
            title: GO_TOUCH_GRASS,
            description: "Unlocked all achievements",
            rarity: Rarity::Legendary,
            cascade_threshold: None,
        },
    ];

    let threshold = defs.len().saturating_sub(RESET_CASCADE_OFFSET);
    if let Some(sand_mandala) = defs.iter_mut().find(|d| d.title == SAND_MANDALA) {
        sand_mandala.cascade_threshold = Some(threshold);
    }
    defs
}

/// Stand-in shown in the gallery while the secret is still hidden.
pub fn hidden_secret() -> AchievementDef {
    AchievementDef {
        id: -99,
        title: HIDDEN_TITLE,
        description: "??????",
        rarity: Rarity::Mythic,
        cascade_threshold: None,
    }
}

/// The secret achievement. Revealed by the completion cascade and never
/// counted toward completion.
pub fn speedophile() -> AchievementDef {
    AchievementDef {
        id: -1,
        title: SPEEDOPHILE,
        description: "Unlocked all achievements in less than 67 seconds",
        rarity: Rarity::Mythic,
        cascade_threshold: None,
    }
}

/// A set of achievement definitions plus the titles that the cascade rules
/// treat specially.
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<AchievementDef>,
    secret: AchievementDef,
    completion_title: &'static str,
    reset_cascade_title: &'static str,
    speed_run_window: Duration,
}

impl Catalog {
    /// Build a catalog. The secret definition doubles as the speed-run target.
    pub fn new(
        definitions: Vec<AchievementDef>,
        secret: AchievementDef,
        completion_title: &'static str,
        reset_cascade_title: &'static str,
    ) -> Self {
        Self {
            definitions,
            secret,
            completion_title,
            reset_cascade_title,
            speed_run_window: Duration::from_secs(SPEED_RUN_WINDOW_SECONDS),
        }
    }

    /// The portfolio site's catalog.
    pub fn portfolio() -> Self {
        Self::new(
            portfolio_definitions(),
            speedophile(),
            GO_TOUCH_GRASS,
            SAND_MANDALA,
        )
    }

    pub fn with_speed_run_window(mut self, window: Duration) -> Self {
        self.speed_run_window = window;
        self
    }

    /// Main definitions, excluding the secret one.
    pub fn definitions(&self) -> &[AchievementDef] {
        &self.definitions
    }

    pub fn secret(&self) -> &AchievementDef {
        &self.secret
    }

    /// Look up a definition by title, secret included.
    pub fn find(&self, title: &str) -> Option<&AchievementDef> {
        self.definitions
            .iter()
            .chain(std::iter::once(&self.secret))
            .find(|d| d.title == title)
    }

    /// The lowest-id definition: the first-visit achievement.
    pub fn first_visit(&self) -> Option<&AchievementDef> {
        self.definitions.iter().min_by_key(|d| d.id)
    }

    pub fn completion_title(&self) -> &'static str {
        self.completion_title
    }

    pub fn reset_cascade_title(&self) -> &'static str {
        self.reset_cascade_title
    }

    pub fn speed_run_title(&self) -> &'static str {
        self.secret.title
    }

    pub fn speed_run_window(&self) -> Duration {
        self.speed_run_window
    }

    /// Unlocks needed at reset time for the reset cascade to qualify.
    /// Without a threshold on that definition the cascade can never fire.
    pub fn reset_threshold(&self) -> usize {
        self.find(self.reset_cascade_title)
            .and_then(|d| d.cascade_threshold)
            .unwrap_or(usize::MAX)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::portfolio()
    }
}
