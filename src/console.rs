//! The portfolio console: a small command table for poking at achievements.
//!
//! The console owns no state of its own. Whoever owns the engine (the CLI
//! here, a UI root elsewhere) holds a [`Console`] and passes the engine in
//! for each command. Side effects outside the engine, such as navigation or
//! clearing the screen, come back as a [`ConsoleEffect`] for the owner to
//! perform.

use crate::achievements::{
    AchievementEngine, AchievementRecord, AchievementStore, Clock, Rarity, ResetOutcome,
    UnlockOutcome,
};
use crate::config::EngineConfig;
use crate::error::{Result, TrophyError};
use crate::events::UiEvent;

/// Commands in help order: (usage, description)
pub const COMMANDS: &[(&str, &str)] = &[
    ("help", "Display this help message"),
    ("list [term] [rarity..]", "List unlocked achievements"),
    ("gallery [term] [rarity..]", "Show every achievement, locked ones too"),
    ("trophies [rarity..]", "Show trophy counts by rarity"),
    ("navigate <path>", "Navigate to a page (e.g. /about)"),
    ("clear", "Clear the console"),
    ("reset", "Reset all achievements"),
    ("reload", "Reload achievements from storage"),
    ("about", "Learn about this portfolio"),
    ("masterLogin <password>", "Log in as the site owner"),
    ("event <name> [args]", "Simulate a UI event (dev only)"),
];

/// Title search plus rarity filters, as typed after `list` or `gallery`.
///
/// Words naming a rarity become filters; the rest form the search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub term: String,
    pub rarities: Vec<Rarity>,
}

impl SearchFilter {
    pub fn from_words(words: &[String]) -> Self {
        let mut filter = SearchFilter::default();
        let mut term = Vec::new();
        for word in words {
            match Rarity::parse(word) {
                Some(rarity) if !filter.rarities.contains(&rarity) => filter.rarities.push(rarity),
                Some(_) => {}
                None => term.push(word.as_str()),
            }
        }
        filter.term = term.join(" ");
        filter
    }

    pub fn is_empty(&self) -> bool {
        self.term.trim().is_empty() && self.rarities.is_empty()
    }

    pub fn matches(&self, record: &AchievementRecord) -> bool {
        record.matches(&self.term, &self.rarities)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Help,
    List(SearchFilter),
    Gallery(SearchFilter),
    Trophies(Vec<Rarity>),
    Navigate(String),
    Clear,
    Reset,
    Reload,
    About,
    MasterLogin(String),
    Event(UiEvent),
}

impl ConsoleCommand {
    /// Parse a console line. Accepts both `navigate /about` and the browser
    /// console spelling `portfolio.navigate('/about')`. Blank lines parse to
    /// `None`.
    pub fn parse(line: &str) -> Result<Option<ConsoleCommand>> {
        let line = line.trim();
        let line = line.strip_prefix("portfolio.").unwrap_or(line);
        if line.is_empty() {
            return Ok(None);
        }

        let (name, args) = split_call(line);
        let command = match name {
            "help" => ConsoleCommand::Help,
            "list" => ConsoleCommand::List(SearchFilter::from_words(&words(args))),
            "gallery" => ConsoleCommand::Gallery(SearchFilter::from_words(&words(args))),
            "trophies" => ConsoleCommand::Trophies(rarities(args)?),
            "navigate" => ConsoleCommand::Navigate(single_arg(args, "navigate", "a path")?),
            "clear" => ConsoleCommand::Clear,
            "reset" => ConsoleCommand::Reset,
            "reload" => ConsoleCommand::Reload,
            "about" => ConsoleCommand::About,
            "masterLogin" | "master-login" => {
                ConsoleCommand::MasterLogin(single_arg(args, "masterLogin", "a password")?)
            }
            "event" => {
                let words = words(args);
                let words: Vec<&str> = words.iter().map(String::as_str).collect();
                ConsoleCommand::Event(UiEvent::parse(&words)?)
            }
            other => return Err(TrophyError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Split `name(args)` or `name args` into the name and the raw argument
/// text.
fn split_call(line: &str) -> (&str, &str) {
    let call = line
        .split_once('(')
        .filter(|(name, _)| !name.trim().contains(char::is_whitespace));
    if let Some((name, rest)) = call {
        let rest = rest.trim_end().trim_end_matches(';');
        let inner = rest.strip_suffix(')').unwrap_or(rest);
        return (name.trim(), inner.trim());
    }

    match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    }
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c: char| c == '\'' || c == '"')
}

/// The whole argument text as one value, so passwords and paths may contain
/// spaces or commas.
fn single_arg(args: &str, command: &'static str, expected: &'static str) -> Result<String> {
    let arg = unquote(args);
    if arg.is_empty() {
        return Err(TrophyError::MissingArgument { command, expected });
    }
    Ok(arg.to_string())
}

/// Argument text split into words on whitespace and commas.
fn words(args: &str) -> Vec<String> {
    args.split(|c: char| c.is_whitespace() || c == ',')
        .map(unquote)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn rarities(args: &str) -> Result<Vec<Rarity>> {
    words(args)
        .iter()
        .map(|word| {
            Rarity::parse(word).ok_or(TrophyError::MissingArgument {
                command: "trophies",
                expected: "rarity names (common, uncommon, rare, legendary, mythic)",
            })
        })
        .collect()
}

/// Something the console's owner should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEffect {
    Navigate(String),
    ClearScreen,
}

/// Output of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleReply {
    pub lines: Vec<String>,
    pub effect: Option<ConsoleEffect>,
}

impl ConsoleReply {
    fn from_lines<I, L>(lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            effect: None,
        }
    }

    fn with_effect(mut self, effect: ConsoleEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Command dispatcher.
#[derive(Debug, Clone)]
pub struct Console {
    master_password: String,
}

impl Console {
    pub fn new(master_password: impl Into<String>) -> Self {
        Self {
            master_password: master_password.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.master_password.clone())
    }

    pub fn welcome(&self) -> Vec<String> {
        vec![
            "🎉 Welcome to the Portfolio Console! 🎉".to_string(),
            "Type help to see available commands.".to_string(),
        ]
    }

    pub fn execute<S: AchievementStore, C: Clock>(
        &self,
        engine: &mut AchievementEngine<S, C>,
        command: ConsoleCommand,
    ) -> ConsoleReply {
        match command {
            ConsoleCommand::Help => help(),
            ConsoleCommand::List(filter) => list(engine.achievements(), &filter),
            ConsoleCommand::Gallery(filter) => gallery(engine, &filter),
            ConsoleCommand::Trophies(rarities) => trophies(engine, &rarities),
            ConsoleCommand::Navigate(path) => {
                ConsoleReply::from_lines([format!("🧭 Navigating to {}...", path)])
                    .with_effect(ConsoleEffect::Navigate(path))
            }
            ConsoleCommand::Clear => {
                ConsoleReply::from_lines(["🧹 Console cleared! Type help for available commands."])
                    .with_effect(ConsoleEffect::ClearScreen)
            }
            ConsoleCommand::Reset => reset(engine),
            ConsoleCommand::Reload => {
                engine.reload();
                ConsoleReply::from_lines([format!(
                    "Reloaded. {} of {} achievements unlocked.",
                    engine.unlocked_count(),
                    engine.total_count()
                )])
            }
            ConsoleCommand::About => ConsoleReply::from_lines([
                "💼 About This Portfolio",
                "This is an interactive portfolio with hidden achievements!",
                "Explore the site, use console commands, and unlock them all! 🎮",
            ]),
            ConsoleCommand::MasterLogin(password) => self.master_login(engine, &password),
            ConsoleCommand::Event(event) => {
                let line = describe_event(engine, &event);
                ConsoleReply::from_lines([line])
            }
        }
    }

    fn master_login<S: AchievementStore, C: Clock>(
        &self,
        engine: &mut AchievementEngine<S, C>,
        password: &str,
    ) -> ConsoleReply {
        if password != self.master_password {
            tracing::debug!("master login rejected");
            return ConsoleReply::from_lines(["Incorrect password. Try again!"]);
        }
        engine.handle(&UiEvent::MasterLoginSucceeded);
        ConsoleReply::from_lines(["Master login successful! 🎉", "Welcome back, master."])
    }
}

fn help() -> ConsoleReply {
    let mut lines = vec![
        "🚀 Portfolio Console Commands 🚀".to_string(),
        "Available commands:".to_string(),
    ];
    lines.extend(
        COMMANDS
            .iter()
            .map(|(usage, description)| format!("  {:<28} {}", usage, description)),
    );
    lines.push("Tip: some achievements can only be earned from here 👀".to_string());
    ConsoleReply::from_lines(lines)
}

fn list(records: &[AchievementRecord], filter: &SearchFilter) -> ConsoleReply {
    let unlocked: Vec<_> = records
        .iter()
        .filter(|r| r.is_unlocked() && filter.matches(r))
        .collect();
    if unlocked.is_empty() {
        let line = if filter.is_empty() {
            "📜 No achievements unlocked yet."
        } else {
            "📜 No unlocked achievements match that search."
        };
        return ConsoleReply::from_lines([line]);
    }

    let mut lines = vec!["📜 Achievements List".to_string()];
    for record in unlocked {
        let unlocked_at = record
            .unlocked_at()
            .map(|at| at.format("%b %-d, %Y %H:%M").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let mut line = format!(
            "{} #{} {} - {} [{}] {}",
            record.rarity.trophy(),
            record.id,
            record.title,
            record.description,
            record.rarity.name(),
            unlocked_at
        );
        if let Some(split) = record.split() {
            line.push_str(&format!(" ({:.1}s)", split as f64 / 1000.0));
        }
        lines.push(line);
    }
    ConsoleReply::from_lines(lines)
}

fn gallery<S: AchievementStore, C: Clock>(
    engine: &AchievementEngine<S, C>,
    filter: &SearchFilter,
) -> ConsoleReply {
    let entries = engine.gallery();
    let shown: Vec<_> = entries.iter().filter(|r| filter.matches(r)).collect();
    if shown.is_empty() {
        return ConsoleReply::from_lines(["No results found."]);
    }

    let mut lines = Vec::with_capacity(shown.len() + 1);
    for record in &shown {
        let status = if record.is_unlocked() { "✔" } else { "🔒" };
        lines.push(format!(
            "{} {} {} [{}]",
            status,
            record.rarity.trophy(),
            record.title,
            record.rarity.name()
        ));
    }
    lines.push(format!("{} result(s) found.", shown.len()));
    ConsoleReply::from_lines(lines)
}

/// Trophy counts, limited to `rarities` when any are given.
fn trophies<S: AchievementStore, C: Clock>(
    engine: &AchievementEngine<S, C>,
    rarities: &[Rarity],
) -> ConsoleReply {
    let counts: Vec<_> = engine
        .counts_by_rarity()
        .iter()
        .filter(|(rarity, _)| rarities.is_empty() || rarities.contains(rarity))
        .collect();
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    let mut lines = vec![format!("🏆 {} trophies", total)];
    for (rarity, count) in counts {
        lines.push(format!("  {} {:<10} {}", rarity.trophy(), rarity.name(), count));
    }
    lines.push(format!("{:.0}% complete", engine.completion_percentage()));
    ConsoleReply::from_lines(lines)
}

fn reset<S: AchievementStore, C: Clock>(engine: &mut AchievementEngine<S, C>) -> ConsoleReply {
    match engine.reset() {
        ResetOutcome::ReloadPending => {
            ConsoleReply::from_lines(["Reload first! You have a pending achievement to unlock."])
        }
        ResetOutcome::SecretQueued => ConsoleReply::from_lines([
            "You who fears nothing, you have unlocked the secret achievement!",
            "🔄 Achievements reset! Reload to see changes.",
        ]),
        ResetOutcome::Cleared => {
            ConsoleReply::from_lines(["🔄 Achievements reset! Reload to see changes."])
        }
    }
}

fn describe_event<S: AchievementStore, C: Clock>(
    engine: &mut AchievementEngine<S, C>,
    event: &UiEvent,
) -> String {
    let Some(request) = event.unlock_request() else {
        return "Nothing to unlock.".to_string();
    };
    let title = request.title().to_string();
    match engine.unlock(request) {
        UnlockOutcome::Unlocked => format!("🏆 Unlocked \"{}\"", title),
        UnlockOutcome::AlreadyUnlocked => format!("\"{}\" is already unlocked.", title),
        UnlockOutcome::UnknownTitle => format!("No achievement called \"{}\".", title),
        UnlockOutcome::Rejected => format!("\"{}\" cannot be unlocked this way.", title),
        UnlockOutcome::AwaitingReload => "Reload first to see your reset take effect.".to_string(),
    }
}
