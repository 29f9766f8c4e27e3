use crate::game::Game;
use crate::settings::Settings;
use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pairs_core::{
    Difficulty, IgnoreReason, Outcome, SelectOutcome, StartConfig, StatsRecord, StatsStore,
};
use std::time::{Duration, Instant};

/// How long a status message stays on screen
const MESSAGE_DURATION: Duration = Duration::from_secs(3);

/// Result of handling a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Difficulty selection
    Menu,
    /// Normal gameplay
    Playing,
    /// Board cleared in time
    Win,
    /// Countdown ran out
    Lose,
    /// Statistics screen
    Stats,
}

/// Entries of the start menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Level(Difficulty),
    /// Board size and time taken from settings
    Custom,
    Stats,
    Quit,
}

/// The main application state
pub struct App {
    /// Current game, if one was dealt
    pub game: Option<Game>,
    /// Current screen state
    pub screen_state: ScreenState,
    /// Screen to return to from the stats screen
    stats_return: ScreenState,
    /// Selected menu item
    pub menu_selection: usize,
    pub settings: Settings,
    /// Color theme
    pub theme: Theme,
    stats: StatsStore,
    /// Stats snapshot shown on the stats screen
    pub record: StatsRecord,
    /// Configuration of the last dealt board, for quick restarts
    last_config: Option<StartConfig>,
    /// Fixed deck seed from the command line
    seed: Option<u64>,
    /// Message to display
    pub message: Option<String>,
    /// When the current message goes away
    message_until: Option<Instant>,
}

impl App {
    pub fn new(settings: Settings, stats: StatsStore, seed: Option<u64>) -> Self {
        let mut app = Self {
            game: None,
            screen_state: ScreenState::Menu,
            stats_return: ScreenState::Menu,
            menu_selection: 0,
            theme: Theme::from_name(settings.theme),
            settings,
            stats,
            record: StatsRecord::default(),
            last_config: None,
            seed,
            message: None,
            message_until: None,
        };
        app.menu_selection = app.default_menu_selection();
        app
    }

    /// Get the tick rate based on current screen
    pub fn get_tick_rate(&self) -> Duration {
        match self.screen_state {
            // fine enough to catch the flip-back delay promptly
            ScreenState::Playing => Duration::from_millis(50),
            ScreenState::Menu | ScreenState::Win | ScreenState::Lose | ScreenState::Stats => {
                Duration::from_millis(100)
            }
        }
    }

    /// Update timers (called every tick)
    pub fn tick(&mut self) {
        if self.message_until.is_some_and(|until| Instant::now() >= until) {
            self.message = None;
            self.message_until = None;
        }

        if self.screen_state != ScreenState::Playing {
            return;
        }
        let Some(game) = self.game.as_mut() else {
            return;
        };
        // a key press may already have ended the board, so read the outcome
        game.tick();
        let outcome = game.outcome();
        let new_best = game.board().is_new_best();
        self.report_storage_warnings();

        match outcome {
            Outcome::Won => {
                self.screen_state = ScreenState::Win;
                if new_best {
                    self.show_message("New best time!");
                }
            }
            Outcome::Lost => self.screen_state = ScreenState::Lose,
            _ => {}
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_until = Some(Instant::now() + MESSAGE_DURATION);
    }

    fn report_storage_warnings(&mut self) {
        let warnings = match self.game.as_mut() {
            Some(game) => game.take_warnings(),
            None => return,
        };
        if let Some(err) = warnings.first() {
            self.show_message(&format!("Stats kept in memory only: {}", err));
        }
    }

    /// Deal a new board and switch to it
    pub fn start_game(&mut self, config: StartConfig) {
        self.abandon_current();
        self.game = Some(Game::new(config.clone(), self.seed, self.stats.clone()));
        self.last_config = Some(config);
        self.screen_state = ScreenState::Playing;
        self.report_storage_warnings();
    }

    /// Abandon the running game, if any, so the in-flight counter balances
    fn abandon_current(&mut self) {
        if let Some(game) = self.game.as_mut() {
            if game.abandon().is_some() {
                log::info!("abandoned running game");
            }
        }
        self.report_storage_warnings();
    }

    /// Called once before the process exits
    pub fn shutdown(&mut self) {
        self.abandon_current();
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = Difficulty::all()
            .iter()
            .map(|&d| MenuItem::Level(d))
            .collect();
        if self.settings.is_custom() {
            items.push(MenuItem::Custom);
        }
        items.push(MenuItem::Stats);
        items.push(MenuItem::Quit);
        items
    }

    fn default_menu_selection(&self) -> usize {
        let wanted = if self.settings.is_custom() {
            MenuItem::Custom
        } else {
            MenuItem::Level(self.settings.difficulty)
        };
        self.menu_items()
            .iter()
            .position(|&item| item == wanted)
            .unwrap_or(0)
    }

    /// Redirect offered after a win
    pub fn redirect(&self) -> Option<&str> {
        self.settings.redirect.as_deref()
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::Menu => self.handle_menu_key(key),
            ScreenState::Playing => self.handle_game_key(key),
            ScreenState::Win | ScreenState::Lose => self.handle_endgame_key(key),
            ScreenState::Stats => self.handle_stats_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> AppAction {
        let items = self.menu_items();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_selection = self.menu_selection.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.menu_selection + 1 < items.len() {
                    self.menu_selection += 1;
                }
            }
            KeyCode::Char('i') => self.open_stats(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                match items.get(self.menu_selection) {
                    Some(MenuItem::Level(difficulty)) => {
                        self.start_game(StartConfig::for_difficulty(*difficulty));
                        self.show_message(&format!("New {} game", difficulty));
                    }
                    Some(MenuItem::Custom) => match self.settings.start_config() {
                        Ok(config) => self.start_game(config),
                        Err(e) => self.show_message(&format!("Custom board rejected: {}", e)),
                    },
                    Some(MenuItem::Stats) => self.open_stats(),
                    Some(MenuItem::Quit) => return AppAction::Quit,
                    None => {}
                }
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        let Some(game) = self.game.as_mut() else {
            self.screen_state = ScreenState::Menu;
            return AppAction::Continue;
        };

        match key.code {
            // Quit - abandon the game in progress
            KeyCode::Char('q') => {
                self.shutdown();
                return AppAction::Quit;
            }
            // Navigation
            KeyCode::Up | KeyCode::Char('k') => game.move_cursor(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => game.move_cursor(1, 0),
            KeyCode::Left | KeyCode::Char('h') => game.move_cursor(0, -1),
            KeyCode::Right | KeyCode::Char('l') => game.move_cursor(0, 1),
            // Flip
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let SelectOutcome::Ignored(IgnoreReason::Paused) = game.select() {
                    self.show_message("Paused - press p to resume");
                }
            }
            // Pause
            KeyCode::Char('p') => {
                let paused = game.toggle_pause();
                if !game.is_finished() {
                    self.show_message(if paused { "Paused" } else { "Resumed" });
                }
            }
            // Give up and go back to the menu
            KeyCode::Esc | KeyCode::Char('n') => {
                self.abandon_current();
                self.screen_state = ScreenState::Menu;
                self.show_message("Game abandoned");
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_endgame_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => {
                // Quick restart with the same board size
                if let Some(config) = self.last_config.clone() {
                    self.start_game(config);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.screen_state = ScreenState::Menu;
            }
            KeyCode::Char('i') => self.open_stats(),
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_stats_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.screen_state = self.stats_return;
            }
            KeyCode::Char('R') if key.modifiers.contains(KeyModifiers::SHIFT) => {
                let report = self.stats.reset();
                if let Some(err) = report.warning {
                    self.show_message(&format!("Stats kept in memory only: {}", err));
                } else {
                    self.show_message("Stats reset");
                }
                self.refresh_record();
            }
            _ => {}
        }
        AppAction::Continue
    }

    fn open_stats(&mut self) {
        self.stats_return = self.screen_state;
        self.refresh_record();
        self.screen_state = ScreenState::Stats;
    }

    fn refresh_record(&mut self) {
        let report = self.stats.read();
        if let Some(err) = report.warning {
            self.show_message(&format!("Stats kept in memory only: {}", err));
        }
        self.record = report.value;
    }

    /// Name of the storage currently holding stats
    pub fn stats_backend(&self) -> &'static str {
        self.stats.backend_name()
    }
}
