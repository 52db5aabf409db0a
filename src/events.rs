//! UI events that earn achievements.
//!
//! Display code reports what happened; this module decides which unlock, if
//! any, that event is worth.

use crate::achievements::data::{
    EOS, FASHION_POLICE, OUT_OF_BOUNDS, PUZZLE_MASTER, SNOOPY_DETECTIVE, SOCIAL_STALKER, TEST,
    WOAH_HACKER,
};
use crate::achievements::{
    AchievementEngine, AchievementStore, Clock, UnlockOutcome, UnlockRequest,
};
use crate::error::{Result, TrophyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn parse(name: &str) -> Option<Theme> {
        match name {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A theme button was pressed. `active` is the theme setting in effect,
    /// `document` the theme the page is actually rendered with.
    ThemeSelected {
        requested: Theme,
        active: Theme,
        document: Theme,
    },
    StyleOverlayChanged,
    /// Hovered or touched the workplace on the location widget.
    WorkplaceFound,
    AllSocialsViewed,
    WorkplaceTitleClicked,
    PuzzleSolved,
    /// The route guard turned a visitor away from a disabled page.
    RouteRejected,
    MasterLoginSucceeded,
}

impl UiEvent {
    /// The unlock this event earns, if any.
    pub fn unlock_request(&self) -> Option<UnlockRequest> {
        let title = match self {
            UiEvent::ThemeSelected {
                requested,
                active,
                document,
            } => {
                // Re-selecting the current setting, or the theme the page is
                // already rendered with, changes nothing visible
                if requested == active || requested == document {
                    return None;
                }
                EOS
            }
            UiEvent::StyleOverlayChanged => FASHION_POLICE,
            UiEvent::WorkplaceFound => SNOOPY_DETECTIVE,
            UiEvent::AllSocialsViewed => SOCIAL_STALKER,
            UiEvent::WorkplaceTitleClicked => TEST,
            UiEvent::PuzzleSolved => PUZZLE_MASTER,
            UiEvent::RouteRejected => OUT_OF_BOUNDS,
            UiEvent::MasterLoginSucceeded => WOAH_HACKER,
        };
        Some(UnlockRequest::standard(title))
    }

    /// Parse an event from its kebab-case name and arguments, as typed in the
    /// console: `theme-selected <requested> <active> <document>`,
    /// `route-rejected`, ...
    pub fn parse(words: &[&str]) -> Result<UiEvent> {
        let Some((name, args)) = words.split_first() else {
            return Err(TrophyError::MissingArgument {
                command: "event",
                expected: "an event name",
            });
        };
        let event = match *name {
            "theme-selected" => {
                let themes: Vec<Theme> = args.iter().filter_map(|a| Theme::parse(a)).collect();
                match themes.as_slice() {
                    [requested, active, document] => UiEvent::ThemeSelected {
                        requested: *requested,
                        active: *active,
                        document: *document,
                    },
                    _ => {
                        return Err(TrophyError::MissingArgument {
                            command: "theme-selected",
                            expected: "<requested> <active> <document> themes",
                        })
                    }
                }
            }
            "style-overlay-changed" => UiEvent::StyleOverlayChanged,
            "workplace-found" => UiEvent::WorkplaceFound,
            "all-socials-viewed" => UiEvent::AllSocialsViewed,
            "workplace-title-clicked" => UiEvent::WorkplaceTitleClicked,
            "puzzle-solved" => UiEvent::PuzzleSolved,
            "route-rejected" => UiEvent::RouteRejected,
            other => return Err(TrophyError::UnknownEvent(other.to_string())),
        };
        Ok(event)
    }
}

impl<S: AchievementStore, C: Clock> AchievementEngine<S, C> {
    /// Apply the unlock an event earns. `None` when the event earns nothing.
    pub fn handle(&mut self, event: &UiEvent) -> Option<UnlockOutcome> {
        let request = event.unlock_request()?;
        Some(self.unlock(request))
    }
}
