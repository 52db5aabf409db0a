//! Integration test: console commands against a live engine

use chrono::{TimeZone, Utc};
use trophies::achievements::data::{
    portfolio_definitions, speedophile, EOS, GO_TOUCH_GRASS, HIDDEN_TITLE, NEW_BEGINNINGS,
    OUT_OF_BOUNDS, PUZZLE_MASTER, SAND_MANDALA, TEST, WOAH_HACKER,
};
use trophies::achievements::{
    AchievementDef, AchievementEngine, Catalog, ManualClock, MemoryStore, Rarity,
};
use trophies::constants::SECRET_RESET_SENTINEL;
use trophies::{Console, ConsoleCommand, ConsoleEffect, ConsoleReply, TrophyError};

type Engine = AchievementEngine<MemoryStore, ManualClock>;

fn setup() -> (Console, Engine, MemoryStore) {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let engine = AchievementEngine::load(Catalog::portfolio(), store.clone(), clock);
    (Console::new("password123"), engine, store)
}

fn run(console: &Console, engine: &mut Engine, line: &str) -> ConsoleReply {
    let command = ConsoleCommand::parse(line)
        .expect("command should parse")
        .expect("line should not be blank");
    console.execute(engine, command)
}

#[test]
fn test_master_login_wrong_password() {
    let (console, mut engine, store) = setup();
    let before = store.value();

    let reply = run(&console, &mut engine, "portfolio.masterLogin('hunter2')");
    assert_eq!(reply.lines, vec!["Incorrect password. Try again!".to_string()]);
    assert_eq!(store.value(), before);
}

#[test]
fn test_master_login_without_catalog_entry_only_greets() {
    let (console, mut engine, store) = setup();
    let before = store.value();

    let reply = run(&console, &mut engine, "masterLogin password123");
    assert!(reply.lines[0].starts_with("Master login successful!"));
    assert_eq!(engine.unlocked_count(), 1);
    assert_eq!(store.value(), before);
}

#[test]
fn test_master_login_unlocks_when_catalog_has_it() {
    let mut defs = portfolio_definitions();
    defs.push(AchievementDef {
        id: 22,
        title: WOAH_HACKER,
        description: "Logged in as the site owner",
        rarity: Rarity::Legendary,
        cascade_threshold: None,
    });
    let catalog = Catalog::new(defs, speedophile(), GO_TOUCH_GRASS, SAND_MANDALA);
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let mut engine = AchievementEngine::load(catalog, MemoryStore::new(), clock);
    let console = Console::new("open sesame");

    run(&console, &mut engine, "masterLogin password123");
    run(&console, &mut engine, "masterLogin open");
    assert!(!engine.is_unlocked(WOAH_HACKER));

    run(&console, &mut engine, "masterLogin open sesame");
    assert!(engine.is_unlocked(WOAH_HACKER));
}

#[test]
fn test_browser_spelling_keeps_commas_in_password() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap());
    let mut engine = AchievementEngine::load(Catalog::portfolio(), store, clock);
    let console = Console::new("a,b c");

    let reply = run(&console, &mut engine, "portfolio.masterLogin('a,b c')");
    assert!(reply.lines[0].starts_with("Master login successful!"));
}

#[test]
fn test_navigate_and_clear_return_effects() {
    let (console, mut engine, _) = setup();

    let reply = run(&console, &mut engine, "portfolio.navigate('/about')");
    assert_eq!(reply.effect, Some(ConsoleEffect::Navigate("/about".to_string())));

    let reply = run(&console, &mut engine, "clear");
    assert_eq!(reply.effect, Some(ConsoleEffect::ClearScreen));

    let reply = run(&console, &mut engine, "about");
    assert!(reply.effect.is_none());
}

#[test]
fn test_list_shows_only_unlocked() {
    let (console, mut engine, _) = setup();
    engine.unlock_title(EOS);

    let reply = run(&console, &mut engine, "list");
    let body = reply.lines.join("\n");
    assert!(body.contains(NEW_BEGINNINGS));
    assert!(body.contains(EOS));
    assert!(!body.contains(TEST));
    assert_eq!(reply.lines.len(), 3);
}

#[test]
fn test_list_filters_by_term_and_rarity() {
    let (console, mut engine, _) = setup();
    engine.unlock_title(EOS);
    engine.unlock_title(OUT_OF_BOUNDS);
    engine.unlock_title(PUZZLE_MASTER);

    let reply = run(&console, &mut engine, "list rare");
    let body = reply.lines.join("\n");
    assert!(body.contains(OUT_OF_BOUNDS));
    assert!(body.contains(PUZZLE_MASTER));
    assert!(!body.contains(EOS));

    let reply = run(&console, &mut engine, "portfolio.list('bounds', 'rare')");
    assert_eq!(reply.lines.len(), 2);
    assert!(reply.lines[1].contains(OUT_OF_BOUNDS));

    // Locked records never show up in the list, even when they match
    let reply = run(&console, &mut engine, "list sand");
    assert_eq!(
        reply.lines,
        vec!["📜 No unlocked achievements match that search.".to_string()]
    );
}

#[test]
fn test_gallery_shows_locked_and_placeholder() {
    let (console, mut engine, _) = setup();

    let reply = run(&console, &mut engine, "gallery");
    assert_eq!(reply.lines.len(), engine.total_count() + 2);
    assert!(reply.lines.iter().any(|l| l.contains(HIDDEN_TITLE)));
    assert_eq!(
        reply.lines.last().unwrap(),
        &format!("{} result(s) found.", engine.total_count() + 1)
    );

    let reply = run(&console, &mut engine, "gallery mythic");
    assert_eq!(reply.lines.len(), 2);
    assert!(reply.lines[0].contains(HIDDEN_TITLE));

    let reply = run(&console, &mut engine, "gallery nothing-like-this");
    assert_eq!(reply.lines, vec!["No results found.".to_string()]);
}

#[test]
fn test_trophies_filtered_by_rarity() {
    let (console, mut engine, _) = setup();
    engine.unlock_title(OUT_OF_BOUNDS);

    let reply = run(&console, &mut engine, "trophies rare mythic");
    assert_eq!(reply.lines[0], "🏆 1 trophies");
    assert_eq!(reply.lines.len(), 4);
}

#[test]
fn test_trophies_counts_by_rarity() {
    let (console, mut engine, _) = setup();
    engine.unlock_title(OUT_OF_BOUNDS);

    let reply = run(&console, &mut engine, "trophies");
    assert_eq!(reply.lines[0], "🏆 2 trophies");
    assert!(reply.lines.last().unwrap().ends_with("% complete"));
}

#[test]
fn test_reset_messages_and_reload() {
    let (console, mut engine, store) = setup();
    for title in [EOS, TEST, OUT_OF_BOUNDS] {
        engine.unlock_title(title);
    }

    let reply = run(&console, &mut engine, "reset");
    assert!(reply.lines[0].contains("secret achievement"));
    assert_eq!(store.value().as_deref(), Some(SECRET_RESET_SENTINEL));

    let reply = run(&console, &mut engine, "reset");
    assert_eq!(
        reply.lines,
        vec!["Reload first! You have a pending achievement to unlock.".to_string()]
    );

    let reply = run(&console, &mut engine, "event route-rejected");
    assert!(reply.lines[0].starts_with("Reload first"));

    let reply = run(&console, &mut engine, "reload");
    assert_eq!(reply.lines[0], "Reloaded. 2 of 10 achievements unlocked.");
    assert!(engine.is_unlocked(SAND_MANDALA));

    let reply = run(&console, &mut engine, "reset");
    assert_eq!(
        reply.lines,
        vec!["🔄 Achievements reset! Reload to see changes.".to_string()]
    );
    assert!(store.value().is_none());
}

#[test]
fn test_theme_event_gating() {
    let (console, mut engine, _) = setup();

    let reply = run(&console, &mut engine, "event theme-selected dark dark light");
    assert_eq!(reply.lines, vec!["Nothing to unlock.".to_string()]);
    assert!(!engine.is_unlocked(EOS));

    let reply = run(&console, &mut engine, "event theme-selected dark light light");
    assert_eq!(reply.lines, vec![format!("🏆 Unlocked \"{}\"", EOS)]);

    let reply = run(&console, &mut engine, "event theme-selected light dark dark");
    assert_eq!(reply.lines, vec![format!("\"{}\" is already unlocked.", EOS)]);
}

#[test]
fn test_event_errors() {
    assert!(matches!(
        ConsoleCommand::parse("event dance-party"),
        Err(TrophyError::UnknownEvent(name)) if name == "dance-party"
    ));
    assert!(matches!(
        ConsoleCommand::parse("event theme-selected dark"),
        Err(TrophyError::MissingArgument { .. })
    ));
    // Only a real login can earn the hacker trophy
    assert!(ConsoleCommand::parse("event master-login-succeeded").is_err());
}
