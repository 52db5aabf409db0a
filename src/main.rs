use std::io::{self, BufRead, Write};
use trophies::achievements::{AchievementStore, Clock};
use trophies::{
    build_info, config, AchievementEngine, Console, ConsoleCommand, ConsoleEffect, EngineConfig,
};

fn print_usage() {
    println!("Trophies - the portfolio's achievement console\n");
    println!("Usage: trophies [options] [command [args]]\n");
    println!("Without a command, starts an interactive console.\n");
    println!("Options:");
    println!("  --data-dir <path>  Store achievements in <path> (default ~/.portfolio)");
    println!("  --verbose          Log engine activity to stderr");
    println!("  --version          Show version information");
    println!("  --help             Show this help message\n");
    println!("Console commands:");
    for (usage, description) in trophies::console::COMMANDS {
        println!("  {:<28} {}", usage, description);
    }
}

fn init_logging(verbose: bool) {
    let log_level = config::default_log_filter(verbose);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> trophies::Result<()> {
    let mut config = EngineConfig::from_env();
    let mut verbose = false;
    let mut command_words: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("{}", build_info::version_line());
                return Ok(());
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--verbose" => verbose = true,
            "--data-dir" => match args.next() {
                Some(dir) => config.data_dir = Some(dir.into()),
                None => {
                    eprintln!("--data-dir needs a path");
                    eprintln!("Run 'trophies --help' for usage.");
                    std::process::exit(1);
                }
            },
            _ => {
                command_words.push(arg);
                command_words.extend(args.by_ref());
            }
        }
    }

    init_logging(verbose);

    let mut engine = config.open()?;
    let console = Console::from_config(&config);

    if command_words.is_empty() {
        return run_interactive(&console, &mut engine);
    }

    match ConsoleCommand::parse(&command_words.join(" ")) {
        Ok(Some(command)) => run_command(&console, &mut engine, command),
        Ok(None) => {}
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Run 'trophies help' for available commands.");
            std::process::exit(1);
        }
    }
    Ok(())
}

fn run_interactive<S: AchievementStore, C: Clock>(
    console: &Console,
    engine: &mut AchievementEngine<S, C>,
) -> trophies::Result<()> {
    for line in console.welcome() {
        println!("{}", line);
    }
    show_toast(engine);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("portfolio> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }
        match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => run_command(console, engine, command),
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    }

    println!("Goodbye!");
    Ok(())
}

fn run_command<S: AchievementStore, C: Clock>(
    console: &Console,
    engine: &mut AchievementEngine<S, C>,
    command: ConsoleCommand,
) {
    let reply = console.execute(engine, command);
    match reply.effect {
        // ANSI: clear screen, cursor home
        Some(ConsoleEffect::ClearScreen) => print!("\x1B[2J\x1B[H"),
        // No router behind a terminal; the reply already announces the path
        Some(ConsoleEffect::Navigate(_)) | None => {}
    }
    for line in &reply.lines {
        println!("{}", line);
    }
    show_toast(engine);
}

/// Print and dismiss the pending unlock notification, if any.
fn show_toast<S: AchievementStore, C: Clock>(engine: &mut AchievementEngine<S, C>) {
    if let Some(record) = engine.dismiss_latest() {
        println!(
            "✨ Achievement unlocked: {} {} ({})",
            record.rarity.trophy(),
            record.title,
            record.description
        );
    }
}
