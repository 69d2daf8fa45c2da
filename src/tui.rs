use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use std::io::stdout;
use std::time::Duration;

use crate::catalog::{resolve_source, CatalogLoader};
use crate::filter::{visible_jobs, FilterState, RoleFilter};
use crate::models::Job;
use crate::tags::dropdown_options;

const TICK: Duration = Duration::from_millis(100);

struct AppState {
    source: String,
    loader: CatalogLoader,
    filters: FilterState,
    selected: usize,
    tag_cursor: usize,
    chip_cursor: usize,
    /// Highlighted option while the role dropdown is open.
    dropdown: Option<usize>,
}

impl AppState {
    fn new(source: String, loader: CatalogLoader) -> Self {
        Self {
            source,
            loader,
            filters: FilterState::new(),
            selected: 0,
            tag_cursor: 0,
            chip_cursor: 0,
            dropdown: None,
        }
    }

    fn jobs(&self) -> &[Job] {
        self.loader.status().jobs()
    }

    fn visible(&self) -> Vec<&Job> {
        visible_jobs(self.jobs(), &self.filters)
    }

    fn current_job(&self) -> Option<&Job> {
        self.visible().get(self.selected).copied()
    }

    fn current_tag(&self) -> Option<String> {
        let job = self.current_job()?;
        job.tags().nth(self.tag_cursor).map(str::to_string)
    }

    fn options(&self) -> Vec<String> {
        dropdown_options(self.jobs())
    }

    /// Keeps cursors inside the current visible set and chip bar.
    fn clamp(&mut self) {
        let count = self.visible().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
            self.tag_cursor = 0;
        }
        let tag_count = self.current_job().map(|job| job.tags().count()).unwrap_or(0);
        if self.tag_cursor >= tag_count {
            self.tag_cursor = tag_count.saturating_sub(1);
        }
        let chips = self.filters.sticky().len();
        if self.chip_cursor >= chips {
            self.chip_cursor = chips.saturating_sub(1);
        }
    }

    fn next(&mut self) {
        let count = self.visible().len();
        if count > 0 && self.selected < count - 1 {
            self.selected += 1;
            self.tag_cursor = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.tag_cursor = 0;
        }
    }

    fn tag_right(&mut self) {
        let tag_count = self.current_job().map(|job| job.tags().count()).unwrap_or(0);
        if tag_count > 0 && self.tag_cursor < tag_count - 1 {
            self.tag_cursor += 1;
        }
    }

    fn tag_left(&mut self) {
        self.tag_cursor = self.tag_cursor.saturating_sub(1);
    }

    fn add_current_tag(&mut self) {
        if let Some(tag) = self.current_tag() {
            if self.filters.add_tag(&tag) {
                log::debug!("Added filter {}", tag);
            }
            self.clamp();
        }
    }

    fn chip_right(&mut self) {
        let chips = self.filters.sticky().len();
        if chips > 0 && self.chip_cursor < chips - 1 {
            self.chip_cursor += 1;
        }
    }

    fn chip_left(&mut self) {
        self.chip_cursor = self.chip_cursor.saturating_sub(1);
    }

    fn remove_current_chip(&mut self) {
        let Some(tag) = self.filters.sticky().get(self.chip_cursor).cloned() else {
            return;
        };
        self.filters.remove_tag(&tag);
        log::debug!("Removed filter {}", tag);
        self.clamp();
    }

    fn clear_filters(&mut self) {
        if self.filters.can_clear() {
            self.filters.clear();
            self.chip_cursor = 0;
            self.clamp();
        }
    }

    fn open_dropdown(&mut self) {
        let current = self.filters.role().as_option();
        let index = self
            .options()
            .iter()
            .position(|option| option == current)
            .unwrap_or(0);
        self.dropdown = Some(index);
    }

    fn dropdown_move(&mut self, down: bool) {
        let count = self.options().len();
        if let Some(index) = self.dropdown.as_mut() {
            if down && *index + 1 < count {
                *index += 1;
            } else if !down && *index > 0 {
                *index -= 1;
            }
        }
    }

    fn confirm_dropdown(&mut self) {
        let Some(index) = self.dropdown.take() else {
            return;
        };
        if let Some(option) = self.options().get(index) {
            self.filters.select_role(RoleFilter::from_option(option));
            log::debug!("Role filter set to {}", option);
        }
        self.selected = 0;
        self.tag_cursor = 0;
        self.clamp();
    }

    fn reload(&mut self) {
        log::info!("Reloading catalog from {}", self.source);
        self.loader.start(resolve_source(&self.source));
        self.selected = 0;
        self.tag_cursor = 0;
    }

    fn tick(&mut self) {
        if self.loader.poll() {
            self.catalog_loaded();
        }
    }

    /// A replaced catalog may no longer offer the selected role.
    fn catalog_loaded(&mut self) {
        let role = self.filters.role().as_option().to_string();
        if !self.options().contains(&role) {
            log::info!("Role filter {} is gone from the catalog, resetting to all", role);
            self.filters.select_role(RoleFilter::All);
        }
        self.clamp();
    }

    /// Applies one key press. Returns true when the view should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.dropdown.is_some() {
            match code {
                KeyCode::Down | KeyCode::Char('j') => self.dropdown_move(true),
                KeyCode::Up | KeyCode::Char('k') => self.dropdown_move(false),
                KeyCode::Enter => self.confirm_dropdown(),
                KeyCode::Esc | KeyCode::Char('q') => self.dropdown = None,
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.prev(),
            KeyCode::Right | KeyCode::Char('l') => self.tag_right(),
            KeyCode::Left | KeyCode::Char('h') => self.tag_left(),
            KeyCode::Enter => self.add_current_tag(),
            KeyCode::Char(']') => self.chip_right(),
            KeyCode::Char('[') => self.chip_left(),
            KeyCode::Char('x') | KeyCode::Delete | KeyCode::Backspace => self.remove_current_chip(),
            KeyCode::Char('c') => self.clear_filters(),
            KeyCode::Char('r') => {
                if self.loader.status().is_finished() {
                    self.open_dropdown();
                }
            }
            KeyCode::Char('R') => self.reload(),
            _ => {}
        }
        false
    }
}

pub fn run_browse(source: String) -> Result<()> {
    let loader = CatalogLoader::spawn(resolve_source(&source));
    let mut state = AppState::new(source, loader);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        state.tick();
        list_state.select(if state.visible().is_empty() {
            None
        } else {
            Some(state.selected)
        });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if state.handle_key(key.code) {
                break;
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let chip_height = if state.filters.sticky().is_empty() { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(chip_height),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    // Banner
    let banner = if state.loader.status().is_finished() {
        let filtered = if state.filters.is_identity() { "" } else { "  (filtered)" };
        format!(
            " Job Board  {} of {} jobs{}",
            state.visible().len(),
            state.jobs().len(),
            filtered
        )
    } else {
        " Job Board".to_string()
    };
    frame.render_widget(
        Paragraph::new(banner).style(Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
        chunks[0],
    );

    // Filter chips, only when something is active
    if chip_height > 0 {
        frame.render_widget(build_chip_bar(state), chunks[1]);
    }

    let role_line = Line::from(vec![
        Span::styled(" Filter by: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            state.filters.role().to_string(),
            Style::default().fg(Color::Cyan),
        ),
    ]);
    frame.render_widget(Paragraph::new(role_line), chunks[2]);

    draw_cards(frame, state, list_state, chunks[3]);

    let help = Paragraph::new(
        " j/k:job  h/l:tag  enter:filter  [/]:chip  x:remove  c:clear  r:role  R:reload  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);

    if let Some(index) = state.dropdown {
        draw_dropdown(frame, state, index);
    }
}

fn build_chip_bar(state: &AppState) -> Paragraph<'_> {
    let mut spans: Vec<Span> = Vec::new();
    for (i, tag) in state.filters.sticky().iter().enumerate() {
        let style = if i == state.chip_cursor {
            Style::default().fg(Color::White).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Cyan).bold()
        };
        spans.push(Span::styled(format!(" {} ×", tag), style));
        spans.push(Span::raw("  "));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Filters ")
        .title_bottom(Line::from(Span::styled(" Clear (c) ", clear_style(state.filters.can_clear()))).right_aligned());

    Paragraph::new(Line::from(spans)).block(block)
}

fn clear_style(enabled: bool) -> Style {
    if enabled {
        Style::default().add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_cards(frame: &mut Frame, state: &AppState, list_state: &mut ListState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Jobs ");

    if !state.loader.status().is_finished() {
        let loading = Paragraph::new("Loading jobs...")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(loading, area);
        return;
    }

    let visible = state.visible();
    if visible.is_empty() {
        let message = if state.jobs().is_empty() {
            "No jobs found."
        } else {
            "No jobs match the current filters."
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(i, job)| {
            let tag_cursor = (i == state.selected).then_some(state.tag_cursor);
            ListItem::new(build_card(job, tag_cursor))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Rgb(30, 40, 40)))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, list_state);
}

fn build_card(job: &Job, tag_cursor: Option<usize>) -> Text<'_> {
    let marker = if job.featured {
        Span::styled("▌", Style::default().fg(Color::Cyan))
    } else {
        Span::raw(" ")
    };

    // Header
    let mut header = vec![
        marker.clone(),
        Span::styled(&job.company, Style::default().fg(Color::Cyan).bold()),
    ];
    for badge in job.badges() {
        let style = match badge {
            "NEW!" => Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
            _ => Style::default().fg(Color::White).bg(Color::DarkGray).bold(),
        };
        header.push(Span::raw(" "));
        header.push(Span::styled(format!(" {} ", badge), style));
    }

    let position = Line::from(vec![
        marker.clone(),
        Span::styled(&job.position, Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let meta = Line::from(vec![
        marker.clone(),
        Span::styled(
            format!("{} • {} • {}", job.posted_at, job.contract, job.location),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let mut chips = vec![marker];
    for (i, tag) in job.tags().enumerate() {
        let style = if tag_cursor == Some(i) {
            Style::default().fg(Color::White).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Cyan)
        };
        chips.push(Span::styled(format!("[{}]", tag), style));
        chips.push(Span::raw(" "));
    }

    Text::from(vec![
        Line::from(header),
        position,
        meta,
        Line::from(chips),
        Line::from(""),
    ])
}

fn draw_dropdown(frame: &mut Frame, state: &AppState, index: usize) {
    let options = state.options();
    let area = centered_rect(40, dropdown_height(options.len()), frame.area());

    let items: Vec<ListItem> = options.iter().map(|o| ListItem::new(o.as_str())).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Filter by "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    list_state.select(Some(index));

    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Option rows plus the two border rows.
fn dropdown_height(options: usize) -> u16 {
    u16::try_from(options).unwrap_or(u16::MAX).saturating_add(2)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
