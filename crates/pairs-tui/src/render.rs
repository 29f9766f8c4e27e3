use crate::app::{App, MenuItem, ScreenState};
use crate::stats::format_clock;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use pairs_core::{BestTime, Difficulty, Outcome};
use std::io;

/// Width of one tile cell, label included
const TILE_WIDTH: u16 = 5;

pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    let (term_width, term_height) = terminal::size()?;

    execute!(stdout, Hide, SetBackgroundColor(app.theme.bg), Clear(ClearType::All))?;

    match app.screen_state {
        ScreenState::Menu => render_menu(stdout, app, term_width, term_height)?,
        ScreenState::Playing => render_game_screen(stdout, app, term_width)?,
        ScreenState::Win | ScreenState::Lose => {
            render_game_screen(stdout, app, term_width)?;
            render_endgame(stdout, app, term_width, term_height)?;
        }
        ScreenState::Stats => render_stats_screen(stdout, app, term_width)?,
    }

    if let Some(ref msg) = app.message {
        render_message(stdout, app, msg, term_width)?;
    }

    execute!(stdout, Show)?;
    Ok(())
}

fn render_menu(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let title = "=== PAIRS ===";
    let items = app.menu_items();
    let start_y = term_height.saturating_sub(items.len() as u16 + 4) / 2;

    execute!(
        stdout,
        MoveTo(term_width.saturating_sub(title.len() as u16) / 2, start_y),
        SetForegroundColor(theme.key),
        Print(title)
    )?;

    for (i, item) in items.iter().enumerate() {
        let label = match item {
            MenuItem::Level(d) => format!(
                "{:<8} {:>2} tiles  {:>3}s",
                d.to_string(),
                d.tile_count(),
                d.time_limit_secs()
            ),
            MenuItem::Custom => match app.settings.start_config() {
                Ok(config) => format!(
                    "{:<8} {:>2} tiles  {:>3}s",
                    "Custom",
                    config.tile_count(),
                    config.time_limit().as_secs()
                ),
                Err(_) => "Custom   (invalid)".to_string(),
            },
            MenuItem::Stats => "Statistics".to_string(),
            MenuItem::Quit => "Quit".to_string(),
        };
        let selected = i == app.menu_selection;
        let x = term_width.saturating_sub(label.len() as u16 + 4) / 2;
        let (bg, marker) = if selected {
            (theme.selected_bg, "> ")
        } else {
            (theme.bg, "  ")
        };
        execute!(
            stdout,
            MoveTo(x, start_y + 2 + i as u16),
            SetBackgroundColor(bg),
            SetForegroundColor(theme.fg),
            Print(format!("{}{}  ", marker, label)),
            SetBackgroundColor(theme.bg)
        )?;
    }

    let hint = "j/k move   Enter start   i stats   q quit";
    execute!(
        stdout,
        MoveTo(
            term_width.saturating_sub(hint.len() as u16) / 2,
            start_y + 3 + items.len() as u16
        ),
        SetForegroundColor(theme.info),
        Print(hint)
    )?;
    Ok(())
}

fn render_game_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let Some(game) = app.game.as_ref() else {
        return Ok(());
    };
    let side = game.side() as u16;
    let grid_width = side * TILE_WIDTH + 2;
    let total_width = grid_width + 24; // grid + gap + info panel
    let start_x = if term_width > total_width {
        (term_width - total_width) / 2
    } else {
        1
    };
    let start_y = 2;

    render_board(stdout, app, start_x, start_y)?;
    render_info_panel(stdout, app, start_x + grid_width + 3, start_y)?;
    render_controls(stdout, app, start_x, start_y + game.rows() as u16 + 3)?;
    Ok(())
}

fn render_board(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let Some(game) = app.game.as_ref() else {
        return Ok(());
    };
    let board = game.board();
    let side = game.side();
    let rule = format!("+{}+", "-".repeat(side * TILE_WIDTH as usize));

    execute!(stdout, MoveTo(x, y), SetForegroundColor(theme.border), Print(&rule))?;

    for row in 0..game.rows() {
        let row_y = y + 1 + row as u16;
        execute!(stdout, MoveTo(x, row_y), SetForegroundColor(theme.border), Print("|"))?;
        for col in 0..side {
            let index = row * side + col;
            if index >= board.tiles().len() {
                execute!(stdout, Print(" ".repeat(TILE_WIDTH as usize)))?;
                continue;
            }

            let fg = if board.is_matched(index) {
                theme.matched
            } else if board.is_face_up(index) {
                theme.face_up
            } else if game.is_finished() {
                theme.info
            } else {
                theme.tile_back
            };
            let bg = if index == game.cursor() && !game.is_finished() {
                theme.selected_bg
            } else {
                theme.bg
            };
            let label = game.tile_label(index).unwrap_or_else(|| "##".to_string());
            execute!(
                stdout,
                SetBackgroundColor(bg),
                SetForegroundColor(fg),
                Print(format!("{:^width$}", label, width = TILE_WIDTH as usize)),
                SetBackgroundColor(theme.bg)
            )?;
        }
        execute!(stdout, SetForegroundColor(theme.border), Print("|"))?;
    }

    execute!(
        stdout,
        MoveTo(x, y + 1 + game.rows() as u16),
        SetForegroundColor(theme.border),
        Print(&rule)
    )?;
    Ok(())
}

fn render_info_panel(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;
    let Some(game) = app.game.as_ref() else {
        return Ok(());
    };
    let board = game.board();

    execute!(
        stdout,
        MoveTo(x, y),
        SetForegroundColor(theme.key),
        Print("=== PAIRS ===")
    )?;

    // Countdown turns red in the last tenth of the budget
    let remaining = board.remaining();
    let time_color = if remaining * 10 <= board.config().time_limit() {
        theme.error
    } else {
        theme.info
    };
    execute!(
        stdout,
        MoveTo(x, y + 2),
        SetForegroundColor(theme.info),
        Print("Time left: "),
        SetForegroundColor(time_color),
        Print(format!("{:>6}", format_clock(remaining.as_millis() as u64)))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 3),
        SetForegroundColor(theme.info),
        Print(format!(
            "Pairs: {:>9}",
            format!("{}/{}", board.matched_pairs(), board.config().pair_count())
        ))
    )?;

    execute!(
        stdout,
        MoveTo(x, y + 4),
        SetForegroundColor(theme.info),
        Print(format!("Level: {:>9}", board.config().difficulty_key()))
    )?;

    if game.is_paused() {
        execute!(
            stdout,
            MoveTo(x, y + 6),
            SetForegroundColor(theme.key),
            Print("** PAUSED **")
        )?;
    }
    Ok(())
}

fn render_controls(stdout: &mut io::Stdout, app: &App, x: u16, y: u16) -> io::Result<()> {
    let theme = &app.theme;

    let controls = [
        ("hjkl/Arrows", "Move"),
        ("Enter/Space", "Flip"),
        ("p", "Pause"),
        ("Esc", "Abandon"),
        ("q", "Quit"),
    ];

    for (i, (key, desc)) in controls.iter().enumerate() {
        let col = i / 3;
        let row = i % 3;
        execute!(
            stdout,
            MoveTo(x + (col as u16) * 24, y + row as u16),
            SetForegroundColor(theme.key),
            Print(format!("{:>11}", key)),
            SetForegroundColor(theme.info),
            Print(format!(" {}", desc))
        )?;
    }
    Ok(())
}

fn render_endgame(
    stdout: &mut io::Stdout,
    app: &App,
    term_width: u16,
    term_height: u16,
) -> io::Result<()> {
    let theme = &app.theme;
    let Some(game) = app.game.as_ref() else {
        return Ok(());
    };
    let board = game.board();

    let mut lines: Vec<(String, Color)> = Vec::new();
    match game.outcome() {
        Outcome::Won => {
            lines.push(("YOU WIN!".to_string(), theme.success));
            let time = BestTime::Millis(board.elapsed().as_millis() as u64);
            let best = if board.is_new_best() { "  (new best)" } else { "" };
            lines.push((format!("Time: {}{}", time, best), theme.fg));
            if let Some(url) = app.redirect() {
                lines.push((format!("Continue at {}", url), theme.key));
            }
        }
        _ => {
            lines.push(("TIME'S UP".to_string(), theme.error));
            lines.push((
                format!(
                    "Matched {} of {} pairs",
                    board.matched_pairs(),
                    board.config().pair_count()
                ),
                theme.fg,
            ));
        }
    }
    lines.push((
        "Enter: again   n: menu   i: stats   q: quit".to_string(),
        theme.info,
    ));

    let width = lines.iter().map(|(l, _)| l.len()).max().unwrap_or(0) as u16 + 4;
    let x = term_width.saturating_sub(width) / 2;
    let y = term_height.saturating_sub(lines.len() as u16 + 2) / 2;

    for (i, (line, color)) in lines.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(x, y + i as u16),
            SetBackgroundColor(theme.selected_bg),
            SetForegroundColor(*color),
            Print(format!("{:^width$}", line, width = width as usize))
        )?;
    }
    execute!(stdout, SetBackgroundColor(theme.bg))?;
    Ok(())
}

fn render_stats_screen(stdout: &mut io::Stdout, app: &App, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let record = &app.record;

    let title = "=== STATISTICS ===";
    execute!(
        stdout,
        MoveTo(term_width.saturating_sub(title.len() as u16) / 2, 1),
        SetForegroundColor(theme.key),
        Print(title)
    )?;

    let start_y = 3;
    let col1_x = 4u16;
    let col2_x = term_width / 2;

    let rows = [
        (format!("Games: {}", record.games_concluded()), theme.info),
        (format!("Wins: {}", record.won), theme.success),
        (format!("Losses: {}", record.lost), theme.error),
        (format!("Unfinished: {}", record.in_flight), theme.border),
        (String::new(), theme.info),
        (format!("Matched flips: {}", record.matched), theme.info),
        (format!("Wrong flips: {}", record.wrong), theme.info),
        (format!("Total flips: {}", record.total_flips()), theme.info),
        (format!("Accuracy: {:.1}%", record.accuracy()), theme.fg),
    ];
    for (i, (text, color)) in rows.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(col1_x, start_y + i as u16),
            SetForegroundColor(*color),
            Print(text)
        )?;
    }

    execute!(
        stdout,
        MoveTo(col2_x, start_y),
        SetForegroundColor(theme.fg),
        Print("Best times:")
    )?;
    // built-in levels first, then custom boards by key
    let best_rows: Vec<(String, _)> = Difficulty::all()
        .iter()
        .map(|d| (d.to_string(), record.best_time(d.key())))
        .chain(record.best_times.iter().filter_map(|(key, best)| {
            let tiles = key.strip_prefix("custom_")?;
            Some((format!("{} tiles", tiles), *best))
        }))
        .collect();
    for (i, (label, best)) in best_rows.iter().enumerate() {
        execute!(
            stdout,
            MoveTo(col2_x, start_y + 2 + i as u16),
            SetForegroundColor(theme.info),
            Print(format!("{:<10}", label)),
            SetForegroundColor(theme.key),
            Print(format!("{:>8}", best.to_string()))
        )?;
    }

    let footer_y = start_y + rows.len().max(best_rows.len() + 2) as u16 + 2;
    execute!(
        stdout,
        MoveTo(col1_x, footer_y),
        SetForegroundColor(theme.info),
        Print(format!(
            "Storage: {}    Shift+R reset    Esc back",
            app.stats_backend()
        ))
    )?;
    Ok(())
}

fn render_message(stdout: &mut io::Stdout, app: &App, msg: &str, term_width: u16) -> io::Result<()> {
    let theme = &app.theme;
    let padded = format!("  {}  ", msg);
    let x = term_width.saturating_sub(padded.len() as u16) / 2;

    execute!(
        stdout,
        MoveTo(x, 0),
        SetForegroundColor(theme.fg),
        SetBackgroundColor(theme.selected_bg),
        Print(&padded),
        SetBackgroundColor(theme.bg)
    )?;
    Ok(())
}
