//! Main UI Application
//!
//! Coordinates rendering and input handling. All game decisions go through
//! the [`Session`]; the app only owns the cursor and the login popup.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::dungeon::{Category, Grid, Room, Severity, GRID_CELLS, GRID_WIDTH, MAX_LIVES};
use crate::game::{LoginStatus, RunEnd, RunState, Session};
use crate::leaderboard::LeaderboardStatus;

/// Longest username the login popup accepts
const MAX_USERNAME_LEN: usize = 24;

/// Main UI application
pub struct App {
    /// Selected room index
    cursor: usize,
    /// Whether the login popup is showing
    login_open: bool,
    /// Username typed so far
    login_input: String,
    /// Error shown under the username field
    login_error: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            login_open: false,
            login_input: String::new(),
            login_error: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn login_open(&self) -> bool {
        self.login_open
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_input(&mut self, key: KeyEvent, session: &mut Session) -> Result<bool> {
        // Global quit shortcut
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        if self.login_open {
            self.handle_login_input(key, session);
            return Ok(false);
        }
        Ok(self.handle_game_input(key, session))
    }

    fn handle_game_input(&mut self, key: KeyEvent, session: &mut Session) -> bool {
        let (x, y) = Grid::idx_to_xy(self.cursor);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(x, y.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(x, (y + 1).min(GRID_WIDTH - 1)),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(x.saturating_sub(1), y),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor((x + 1).min(GRID_WIDTH - 1), y),
            KeyCode::Enter | KeyCode::Char(' ') => {
                session.reveal(self.cursor, Instant::now());
            }
            KeyCode::Char('n') => {
                if session.start_run(Instant::now()) {
                    self.cursor = 0;
                } else {
                    self.open_login(session);
                }
            }
            KeyCode::Char('u') => self.open_login(session),
            KeyCode::Char('b') => session.toggle_leaderboard(),
            _ => {}
        }
        false
    }

    fn handle_login_input(&mut self, key: KeyEvent, session: &mut Session) {
        match key.code {
            KeyCode::Esc => self.close_login(session),
            KeyCode::Enter => {
                self.login_error = match session.login(&self.login_input) {
                    Ok(()) => None,
                    Err(e) => Some(e.to_string()),
                };
            }
            KeyCode::Backspace => {
                self.login_input.pop();
            }
            KeyCode::Char(c) if !c.is_control() && self.login_input.chars().count() < MAX_USERNAME_LEN => {
                self.login_input.push(c);
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, x: usize, y: usize) {
        self.cursor = Grid::xy_to_idx(x, y);
    }

    fn open_login(&mut self, session: &mut Session) {
        session.reset_login();
        self.login_open = true;
        self.login_input.clear();
        self.login_error = None;
    }

    fn close_login(&mut self, session: &mut Session) {
        session.reset_login();
        self.login_open = false;
        self.login_input.clear();
        self.login_error = None;
    }

    /// Per-frame update: let the session settle, then react to login results
    pub fn update(&mut self, session: &mut Session, now: Instant) {
        session.tick(now);

        if !self.login_open {
            return;
        }
        match session.login_status().clone() {
            LoginStatus::Succeeded => self.close_login(session),
            LoginStatus::Failed(message) => {
                self.login_error = Some(message);
                session.reset_login();
            }
            LoginStatus::Idle | LoginStatus::Pending => {}
        }
    }

    /// Render the current game state
    pub fn render(&self, frame: &mut Frame, session: &Session) {
        frame.render_widget(Clear, frame.area());

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(28)])
            .split(frame.area());

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(12), Constraint::Length(9)])
            .split(chunks[0]);

        self.render_banner(frame, session, left[0]);
        self.render_grid(frame, session, left[1]);
        self.render_messages(frame, session, left[2]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(13), Constraint::Min(6)])
            .split(chunks[1]);

        self.render_sidebar(frame, session, right[0]);
        if session.leaderboard_open() {
            self.render_leaderboard(frame, session, right[1]);
        } else {
            self.render_help(frame, right[1]);
        }

        if self.login_open {
            self.render_login_popup(frame, session);
        }
    }

    fn render_banner(&self, frame: &mut Frame, session: &Session, area: Rect) {
        let text = session.messages().banner().unwrap_or("");
        let para = Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        frame.render_widget(para, area);
    }

    fn render_grid(&self, frame: &mut Frame, session: &Session, area: Rect) {
        let run = session.run();
        let (title, title_style) = match run.state() {
            RunState::Idle => (" Victor's Descent ".to_string(), Style::default().fg(Color::Gray)),
            RunState::Active => (" The Dungeon ".to_string(), Style::default().fg(Color::Gray)),
            RunState::Ended(end) => {
                let score = run.outcome().map(|o| o.score()).unwrap_or(0);
                match end {
                    RunEnd::Victory => (
                        format!(" VICTORY - score {} ", score),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    RunEnd::Defeat => (
                        format!(" YOU HAVE FALLEN - score {} ", score),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                }
            }
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, title_style))
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(grid) = run.grid() else {
            let text = vec![
                Line::from(""),
                Line::from(Span::styled(
                    "VICTOR'S DESCENT",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(format!("{} rooms. Ogres and goblins lurk within.", GRID_CELLS)),
                Line::from(""),
                Line::from(Span::styled("Press [n] to begin", Style::default().fg(Color::Gray))),
            ];
            let para = Paragraph::new(text).alignment(Alignment::Center).block(block);
            frame.render_widget(para, area);
            return;
        };

        let mut lines = vec![Line::from("")];
        for y in 0..GRID_WIDTH {
            let mut spans = Vec::with_capacity(GRID_WIDTH);
            for x in 0..GRID_WIDTH {
                let idx = Grid::xy_to_idx(x, y);
                if let Some(room) = grid.get(idx) {
                    spans.push(self.room_span(room, idx == self.cursor));
                }
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }

        let para = Paragraph::new(lines).alignment(Alignment::Center).block(block);
        frame.render_widget(para, area);
    }

    fn room_span(&self, room: &Room, selected: bool) -> Span<'static> {
        let (text, mut style) = if room.is_revealed() {
            let color = match room.category() {
                Category::Safe => kind_color(room),
                Category::Danger => Color::Red,
            };
            (format!(" {} ", room.kind().glyph()), Style::default().fg(color))
        } else {
            (" # ".to_string(), Style::default().fg(Color::DarkGray))
        };
        if selected {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Span::styled(text, style)
    }

    fn render_messages(&self, frame: &mut Frame, session: &Session, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Log ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);

        // Newest first
        let lines: Vec<Line> = session
            .messages()
            .recent()
            .take(inner.height as usize)
            .map(|entry| {
                Line::from(Span::styled(
                    entry.text.as_str(),
                    Style::default().fg(severity_color(entry.severity)),
                ))
            })
            .collect();

        let para = Paragraph::new(lines).block(block);
        frame.render_widget(para, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, session: &Session, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Party ")
            .border_style(Style::default().fg(Color::DarkGray));

        let run = session.run();
        let hero = run.hero();
        let max_lives = MAX_LIVES as usize;
        let lives = (hero.display_lives() as usize).min(max_lives);
        let hearts = format!("{}{}", "♥".repeat(lives), "♡".repeat(max_lives - lives));

        let stat = |label: &'static str, value: String, color: Color| {
            Line::from(vec![
                Span::styled(format!("{:<11}", label), Style::default().fg(Color::Gray)),
                Span::styled(value, Style::default().fg(color)),
            ])
        };

        let lines = vec![
            Line::from(Span::styled("Victor", Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
            Line::from(""),
            stat("Lives", hearts, Color::Red),
            stat("Party", hero.party_size.to_string(), Color::White),
            stat("Allies", hero.allies.to_string(), Color::Cyan),
            stat("Potions", hero.potions.to_string(), Color::Magenta),
            stat("Armour", hero.armour.to_string(), Color::Blue),
            stat("Weapons", hero.weapons.to_string(), Color::Yellow),
            stat("Rooms left", run.rooms_left().to_string(), Color::White),
            Line::from(""),
            stat(
                "User",
                session.username().unwrap_or("Not logged in").to_string(),
                Color::Green,
            ),
        ];

        let para = Paragraph::new(lines).block(block);
        frame.render_widget(para, area);
    }

    fn render_leaderboard(&self, frame: &mut Frame, session: &Session, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Leaderboard ")
            .border_style(Style::default().fg(Color::DarkGray));

        let inner = block.inner(area);
        let muted = Style::default().fg(Color::DarkGray);

        let lines: Vec<Line> = match session.leaderboard() {
            LeaderboardStatus::NotLoaded | LeaderboardStatus::Loading => {
                vec![Line::from(Span::styled("Loading...", muted))]
            }
            LeaderboardStatus::Failed(_) => {
                vec![Line::from(Span::styled("Leaderboard error", Style::default().fg(Color::Red)))]
            }
            LeaderboardStatus::Loaded(rows) if rows.is_empty() => {
                vec![Line::from(Span::styled("No data", muted))]
            }
            LeaderboardStatus::Loaded(rows) => {
                let name_width = (inner.width as usize).saturating_sub(10).max(4);
                rows.iter()
                    .take(inner.height as usize)
                    .enumerate()
                    .map(|(i, row)| {
                        let name = truncate_name(&row.username, name_width);
                        let style = if session.username() == Some(row.username.as_str()) {
                            Style::default().fg(Color::Yellow)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        Line::from(vec![
                            Span::styled(format!("{:>2}. {:<w$}", i + 1, name, w = name_width), style),
                            Span::styled(format!("{:>5}", row.score), style),
                        ])
                    })
                    .collect()
            }
        };

        let para = Paragraph::new(lines).block(block);
        frame.render_widget(para, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Keys ")
            .border_style(Style::default().fg(Color::DarkGray));

        let key = |k: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("{:<8}", k), Style::default().fg(Color::Yellow)),
                Span::raw(what),
            ])
        };

        let lines = vec![
            key("arrows", "move"),
            key("enter", "reveal room"),
            key("n", "new run"),
            key("u", "login"),
            key("b", "leaderboard"),
            key("q", "quit"),
        ];

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_login_popup(&self, frame: &mut Frame, session: &Session) {
        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);

        let status = match (session.login_status(), &self.login_error) {
            (LoginStatus::Pending, _) => Line::from(Span::styled("Registering...", Style::default().fg(Color::Gray))),
            (_, Some(error)) => Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))),
            _ => Line::from(""),
        };

        let text = vec![
            Line::from(""),
            Line::from(vec![
                Span::raw("Username: "),
                Span::styled(format!("{}_", self.login_input), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(""),
            status,
            Line::from(""),
            Line::from(Span::styled("[Enter] login   [Esc] cancel", Style::default().fg(Color::Gray))),
        ];

        let para = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Login "));
        frame.render_widget(para, area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Safe => Color::Green,
        Severity::Battle => Color::Yellow,
        Severity::Death => Color::Red,
        Severity::Info => Color::Cyan,
    }
}

fn kind_color(room: &Room) -> Color {
    use crate::dungeon::RoomKind;

    match room.kind() {
        RoomKind::Empty => Color::DarkGray,
        RoomKind::Potion => Color::Magenta,
        RoomKind::Armour => Color::Blue,
        RoomKind::Weapon => Color::Yellow,
        RoomKind::Teammate => Color::Cyan,
        RoomKind::Ogre | RoomKind::Goblin => Color::Red,
    }
}

/// Truncate a string to fit within max_len characters, adding "…" if truncated
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else if max_len <= 1 {
        "…".to_string()
    } else {
        let truncated: String = name.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}

/// Create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
