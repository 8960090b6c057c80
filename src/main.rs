use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap};

use sports_showtime::api::{HttpApi, VoteError};
use sports_showtime::config::AppConfig;
use sports_showtime::feed;
use sports_showtime::games::{Game, GamesView, TEAMS_TBD};
use sports_showtime::state::{self, AppState, Delta, ProviderCommand, apply_delta};
use sports_showtime::tally::VoteTeam;
use sports_showtime::vote_flag::{FileVoteFlag, MemoryVoteFlag, VoteFlagStore};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    delta_tx: mpsc::Sender<Delta>,
}

impl App {
    fn new(
        state: AppState,
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        delta_tx: mpsc::Sender<Delta>,
    ) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
            delta_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.alert.is_some() {
            // The alert is modal: only dismissal keys get through.
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.dismiss_alert();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                self.state.selected_team = idx;
                self.vote(VoteTeam::ALL[idx]);
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
                self.state.select_prev()
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
                self.state.select_next()
            }
            KeyCode::Enter => self.vote(self.state.selected()),
            KeyCode::PageDown => {
                self.state.games_scroll = self.state.games_scroll.saturating_add(5)
            }
            KeyCode::PageUp => {
                self.state.games_scroll = self.state.games_scroll.saturating_sub(5)
            }
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn vote(&mut self, team: VoteTeam) {
        let Some(ticket) = self.state.request_vote(team) else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            let _ = self.delta_tx.send(Delta::VoteFinished {
                ticket,
                result: Err(VoteError::Transport("vote worker unavailable".to_string())),
            });
            return;
        };
        if let Err(mpsc::SendError(ProviderCommand::CastVote(ticket))) =
            tx.send(ProviderCommand::CastVote(ticket))
        {
            let _ = self.delta_tx.send(Delta::VoteFinished {
                ticket,
                result: Err(VoteError::Transport("vote worker stopped".to_string())),
            });
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    init_file_logger(&config);

    let flag: Box<dyn VoteFlagStore> = match config
        .vote_flag_path
        .clone()
        .map(FileVoteFlag::new)
        .or_else(FileVoteFlag::at_default_location)
    {
        Some(flag) => {
            log::info!("vote flag at {}", flag.path().display());
            Box::new(flag)
        }
        None => {
            log::warn!("no location for the vote flag, keeping it in memory");
            Box::new(MemoryVoteFlag::default())
        }
    };
    let mut app_state = AppState::new(flag);

    let (tx, rx) = mpsc::channel();
    let cmd_tx = match HttpApi::new(&config) {
        Ok(api) => {
            let (cmd_tx, cmd_rx) = mpsc::channel();
            feed::spawn_provider(Arc::new(api), tx.clone(), cmd_rx);
            Some(cmd_tx)
        }
        Err(err) => {
            log::error!("http client unavailable: {err:#}");
            app_state.push_log(format!("[WARN] HTTP client unavailable: {err:#}"));
            None
        }
    };
    if cmd_tx.is_none() {
        let _ = tx.send(Delta::GamesLoaded(Err(anyhow::anyhow!("no http client"))));
        let _ = tx.send(Delta::VotesLoaded(Err(anyhow::anyhow!("no http client"))));
    }
    app_state.push_log(format!("[INFO] API {}", config.api_domain));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(app_state, cmd_tx, tx);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_file_logger(config: &AppConfig) {
    let Some(path) = config.log_path.clone().or_else(default_log_path) else {
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn default_log_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join("sports_showtime").join("showtime.log"));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join("sports_showtime")
            .join("showtime.log"),
    )
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_games(frame, body[0], &app.state);
    render_votes(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state, chunks[2].height))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "1-4 Vote | ←/→ Select | Enter Vote | PgUp/PgDn Scroll games | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
    if let Some(alert) = app.state.alert.as_deref() {
        render_alert(frame, frame.size(), alert);
    }
}

fn header_text(state: &AppState) -> String {
    format!(
        "SPORTS SHOWTIME | Total votes: {}",
        state.page.view().total_votes
    )
}

fn render_games(frame: &mut Frame, area: Rect, state: &AppState) {
    let view = state.page.view();
    let block = Block::default().title("Games").borders(Borders::ALL);

    if view.loading_visible {
        let loading = Paragraph::new("Loading games...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let lines: Vec<Line> = match &view.games {
        GamesView::Cards(games) => games.iter().flat_map(card_lines).collect(),
        other => {
            let msg = other.placeholder().unwrap_or_default();
            let color = if matches!(other, GamesView::Failed) {
                Color::Red
            } else {
                Color::DarkGray
            };
            vec![Line::from(Span::styled(msg, Style::default().fg(color)))]
        }
    };

    let games = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.games_scroll, 0));
    frame.render_widget(games, area);
}

fn card_lines(game: &Game) -> Vec<Line<'_>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(game.date.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw(game.time.as_str()),
    ])];
    match game.matchup() {
        Some((home, away)) => {
            lines.push(Line::from(vec![
                Span::styled(home.name.as_str(), Style::default().fg(Color::Cyan)),
                Span::raw("  VS  "),
                Span::styled(away.name.as_str(), Style::default().fg(Color::Cyan)),
            ]));
            lines.push(Line::from(Span::raw(game.venue.as_str())));
        }
        None => lines.push(Line::from(Span::styled(
            TEAMS_TBD,
            Style::default().fg(Color::DarkGray),
        ))),
    }
    if let Some(label) = game.tournament_label() {
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(Color::Yellow),
        )));
    }
    lines.push(Line::default());
    lines
}

fn render_votes(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Vote").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(inner);

    let view = state.page.view();
    for (i, row) in view.teams.iter().enumerate() {
        let selected = i == state.selected_team;
        let title_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let button_style = if row.button.enabled {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let cells = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(rows[i]);

        let title = Line::from(vec![
            Span::styled(format!("{} {}", i + 1, row.team), title_style),
            Span::raw("  "),
            Span::styled(format!("[{}]", row.button.label), button_style),
        ]);
        frame.render_widget(Paragraph::new(title), cells[0]);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
            .percent(u16::from(row.bar_width.min(100)))
            .label(row.percentage_label.clone());
        frame.render_widget(gauge, cells[1]);
    }
}

fn console_text(state: &AppState, height: u16) -> String {
    let visible = height.saturating_sub(2) as usize;
    let skip = state.logs.len().saturating_sub(visible);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let text = format!("{message}\n\nEnter / Esc to dismiss");
    let alert = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .block(Block::default().title("Alert").borders(Borders::ALL));
    frame.render_widget(alert, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Sports Showtime - Help",
        "",
        "  1-4          Vote for Chiefs / Bills / Eagles / Commanders",
        "  ←/→ or h/l   Select team",
        "  Enter        Vote for the selected team",
        "  PgUp/PgDn    Scroll the games list",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "One vote per machine. The marker lives in VOTE_FLAG_PATH",
        "or the XDG data dir.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
