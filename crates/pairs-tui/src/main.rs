mod app;
mod game;
mod render;
mod settings;
mod stats;
mod theme;

use anyhow::{Context, Result};
use app::{App, AppAction};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::{Env, Target};
use pairs_core::Difficulty;
use settings::Settings;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Parser)]
#[command(name = "pairs", version)]
#[command(about = "Timed memory pairs game for the terminal")]
struct Args {
    /// Start a game right away at this level (casual, medium, hard)
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Custom board size in tiles
    #[arg(long)]
    tiles: Option<usize>,

    /// Custom time limit in seconds
    #[arg(long = "time", value_name = "SECS")]
    time_secs: Option<u64>,

    /// Page to offer after a win
    #[arg(long)]
    redirect: Option<String>,

    /// Stats file location
    #[arg(long)]
    stats_file: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Settings file location
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Fixed deck seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    /// Store the effective settings as the new defaults
    #[arg(long)]
    save_settings: bool,
}

impl Args {
    /// Whether the command line asks for a game instead of the menu
    fn starts_game(&self) -> bool {
        self.difficulty.is_some() || self.tiles.is_some() || self.time_secs.is_some()
    }

    /// Command-line flags override the settings file
    fn apply(&self, settings: &mut Settings) {
        if let Some(difficulty) = self.difficulty {
            settings.difficulty = difficulty;
            settings.tiles = None;
            settings.time_secs = None;
        }
        if self.tiles.is_some() {
            settings.tiles = self.tiles;
        }
        if self.time_secs.is_some() {
            settings.time_secs = self.time_secs;
        }
        if self.redirect.is_some() {
            settings.redirect = self.redirect.clone();
        }
        if self.stats_file.is_some() {
            settings.stats_file = self.stats_file.clone();
        }
    }
}

/// The terminal is in raw mode, so logs only go to a file
fn init_logging(log_file: Option<PathBuf>) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None if std::env::var_os("RUST_LOG").is_some() => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pairs")
            .join("pairs.log"),
        None => return Ok(()),
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.clone())?;

    let settings_path = args.settings.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_or_default(&settings_path);
    args.apply(&mut settings);
    if args.save_settings {
        settings.save(&settings_path)?;
        log::info!("settings saved to {}", settings_path.display());
    }

    // Reject a bad board before touching the terminal
    let first_game = if args.starts_game() {
        Some(settings.start_config().context("invalid board")?)
    } else {
        None
    };

    let store = stats::open_store(settings.stats_file.clone());
    let mut app = App::new(settings, store, args.seed);
    if let Some(config) = first_game {
        app.start_game(config);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Run the app
    let result = run_app(&mut stdout, &mut app);
    app.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen)?;

    result
}

fn run_app(stdout: &mut io::Stdout, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        let tick_rate = app.get_tick_rate();

        render::render(stdout, app)?;
        stdout.flush()?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(33)))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Handle Ctrl+C
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break;
                }

                match app.handle_key(key) {
                    AppAction::Continue => {}
                    AppAction::Quit => break,
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from([
            "pairs",
            "--difficulty",
            "hard",
            "--redirect",
            "https://example.org",
        ]);
        assert!(args.starts_game());

        let mut settings = Settings {
            redirect: Some("https://old.example".to_string()),
            ..Settings::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.difficulty, Difficulty::Hard);
        assert_eq!(settings.redirect.as_deref(), Some("https://example.org"));
        assert_eq!(settings.start_config().unwrap().tile_count(), 64);
    }

    #[test]
    fn test_custom_board_flags() {
        let args = Args::parse_from(["pairs", "--tiles", "12", "--time", "40", "--seed", "3"]);
        let mut settings = Settings::default();
        args.apply(&mut settings);
        let config = settings.start_config().unwrap();
        assert_eq!(config.tile_count(), 12);
        assert_eq!(config.time_limit(), Duration::from_secs(40));
        assert_eq!(args.seed, Some(3));
    }

    #[test]
    fn test_no_flags_opens_menu() {
        let args = Args::parse_from(["pairs"]);
        assert!(!args.starts_game());
        assert!(Args::try_parse_from(["pairs", "--difficulty", "impossible"]).is_err());
    }
}
