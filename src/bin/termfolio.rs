use std::{
    io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::Paragraph,
};
use tracing::{debug, info};

use termfolio::logging::{self, LogConfig};
use termfolio::navigator::{Measure, Navigator};
use termfolio::render::render_content;
use termfolio::site::{DEFAULT_PAGE, LINK_LIST, PageIcon, Site};
use termfolio::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TREE_WIDTH: u16 = 24;
const GUTTER_WIDTH: u16 = 5;

/// A personal portfolio you browse like a terminal editor.
#[derive(Debug, Parser)]
#[command(name = "termfolio", version, about)]
struct Args {
    /// Page opened at start-up
    #[arg(long, default_value = DEFAULT_PAGE)]
    page: String,

    /// Directory with `<page>.md` files replacing the bundled pages
    #[arg(long, env = "TERMFOLIO_PAGES_DIR")]
    pages_dir: Option<PathBuf>,

    /// Log file, or a directory to create it in
    #[arg(long, env = "TERMFOLIO_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Start with the file tree closed
    #[arg(long)]
    hide_tree: bool,
}

fn main() -> Result<()> {
    run(Args::parse())
}

fn run(args: Args) -> Result<()> {
    let log_guard = logging::init(LogConfig {
        log_file_path: args.log_file.clone(),
    })
    .context("failed to initialize logging")?;
    info!(log_file = %log_guard.log_file.display(), "termfolio starting");

    let site = match &args.pages_dir {
        Some(dir) => Site::from_dir(dir),
        None => Site::builtin(),
    }
    .context("failed to load pages")?;
    let mut app = App::new(site, &args.page, !args.hide_tree)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            match event::read().context("failed to read event")? {
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind: KeyEventKind::Press,
                    ..
                }) => {
                    app.handle_key(code, modifiers);
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }

        // The clock in the top bar and expiring messages need periodic redraws.
        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
            needs_redraw = true;
        }
    }

    info!("termfolio exiting");
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Content,
    Tree,
}

/// First key of a two-key binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PendingKey {
    G,
    Leader,
}

struct App {
    site: Site,
    navigator: Navigator,
    theme: Theme,
    current_page: &'static str,
    tree_visible: bool,
    tree_selected: usize,
    focus: Focus,
    pending: Option<PendingKey>,
    scroll_top: usize,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
}

impl App {
    fn new(site: Site, page: &str, tree_visible: bool) -> Result<Self> {
        let mut app = Self {
            site,
            navigator: Navigator::new(),
            theme: Theme::default(),
            current_page: DEFAULT_PAGE,
            tree_visible,
            tree_selected: 0,
            focus: Focus::Content,
            pending: None,
            scroll_top: 0,
            should_quit: false,
            status_message: None,
        };
        app.open_page(page)?;
        Ok(app)
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn on_tick(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn open_page(&mut self, slug: &str) -> Result<()> {
        let page = self
            .site
            .page(slug)
            .with_context(|| format!("cannot open page `{slug}`"))?;
        self.navigator.replace_root(page.root.clone());
        self.current_page = page.slug;
        if let Some(idx) = Site::link_index(page.slug) {
            self.tree_selected = idx;
        }
        self.scroll_top = 0;
        info!(page = page.slug, "opened page");
        Ok(())
    }

    fn current_title(&self) -> &'static str {
        self.site
            .page(self.current_page)
            .map(|page| page.title)
            .unwrap_or(self.current_page)
    }

    /// Route and file name of the open page, e.g. `~/about  About.tsx`.
    fn status_path(&self) -> String {
        let href = Site::href(self.current_page).unwrap_or("/");
        format!("~{href}  {}", self.current_title())
    }

    fn toggle_tree(&mut self) {
        self.tree_visible = !self.tree_visible;
        self.focus = if self.tree_visible {
            Focus::Tree
        } else {
            Focus::Content
        };
        if let Some(idx) = Site::link_index(self.current_page) {
            self.tree_selected = idx;
        }
        debug!(visible = self.tree_visible, "file tree toggled");
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.pending.take() {
            Some(PendingKey::Leader) => {
                if code == KeyCode::Char('e') {
                    self.toggle_tree();
                }
                return;
            }
            Some(PendingKey::G) => {
                if code == KeyCode::Char('g') {
                    self.motion(Navigator::move_to_first_text_node);
                }
                return;
            }
            None => {}
        }

        match code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(' ') => {
                self.pending = Some(PendingKey::Leader);
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Tree => self.handle_tree_key(code),
            Focus::Content => self.handle_content_key(code),
        }
    }

    fn handle_tree_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.tree_selected = (self.tree_selected + 1).min(LINK_LIST.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.tree_selected = self.tree_selected.saturating_sub(1);
            }
            KeyCode::Enter => {
                let link = LINK_LIST[self.tree_selected];
                match link.page {
                    Some(slug) => {
                        if let Err(err) = self.open_page(slug) {
                            self.set_status(format!("{err:#}"));
                        } else {
                            self.focus = Focus::Content;
                        }
                    }
                    None => self.set_status(format!("{} is a folder", link.title)),
                }
            }
            KeyCode::Esc | KeyCode::Char('l') | KeyCode::Right => {
                self.focus = Focus::Content;
            }
            _ => {}
        }
    }

    fn handle_content_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('h') | KeyCode::Left => self.motion(Navigator::move_left),
            KeyCode::Char('l') | KeyCode::Right => self.motion(Navigator::move_right),
            KeyCode::Char('j') | KeyCode::Down => self.motion(Navigator::move_down),
            KeyCode::Char('k') | KeyCode::Up => self.motion(Navigator::move_up),
            KeyCode::Char('w') => self.motion(Navigator::move_word_forward),
            KeyCode::Char('b') => self.motion(Navigator::move_word_backward),
            KeyCode::Char('0') | KeyCode::Home => self.motion(Navigator::move_to_first_char),
            KeyCode::Char('$') | KeyCode::End => self.motion(Navigator::move_to_last_char),
            KeyCode::Char('G') => self.motion(Navigator::move_to_last_text_node),
            KeyCode::Char('g') => self.pending = Some(PendingKey::G),
            KeyCode::Tab if self.tree_visible => self.focus = Focus::Tree,
            _ => {}
        }
    }

    fn motion(&mut self, motion: fn(&mut Navigator)) {
        motion(&mut self.navigator);
        let boundary = self
            .navigator
            .last_failure()
            .and_then(|failure| failure.boundary());
        if let Some(boundary) = boundary {
            self.set_status(format!("Reached {boundary} of document"));
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height < 3 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);
        self.draw_top_bar(frame, vertical[0], Local::now());

        let body = vertical[1];
        let content_area = if self.tree_visible && body.width > TREE_WIDTH + GUTTER_WIDTH + 1 {
            let horizontal = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(TREE_WIDTH), Constraint::Min(1)])
                .split(body);
            self.draw_tree(frame, horizontal[0]);
            horizontal[1]
        } else {
            body
        };

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(GUTTER_WIDTH), Constraint::Min(1)])
            .split(content_area);
        let gutter_area = horizontal[0];
        let text_area = horizontal[1];

        self.navigator.set_measure(Measure::cells(text_area.width));
        let Some(root) = self.navigator.root() else {
            return;
        };
        let render = render_content(
            root,
            self.navigator.measure(),
            self.navigator.cursor(),
            self.navigator.active_container(),
            &self.theme,
        );

        let viewport = text_area.height as usize;
        let max_scroll = render.total_lines.saturating_sub(viewport.max(1));
        if let Some(cursor) = render.cursor {
            self.scroll_top = self.scroll_top_for_cursor(cursor.line, viewport, max_scroll);
        }
        self.scroll_top = self.scroll_top.min(max_scroll);

        let total_lines = self.navigator.wrapped_line_count();
        let cursor_line = render.cursor.map(|cursor| cursor.line);
        self.draw_gutter(frame, gutter_area, total_lines, cursor_line);

        let paragraph = Paragraph::new(Text::from(render.lines))
            .style(Style::default().bg(self.theme.background))
            .scroll((u16::try_from(self.scroll_top).unwrap_or(u16::MAX), 0));
        frame.render_widget(paragraph, text_area);

        if self.focus == Focus::Content
            && let Some(cursor) = render.cursor
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        self.draw_status(frame, vertical[2]);
    }

    fn scroll_top_for_cursor(&self, cursor_line: usize, viewport: usize, max_scroll: usize) -> usize {
        let mut scroll = self.scroll_top.min(max_scroll);
        if viewport == 0 {
            return scroll;
        }

        let margin = if viewport >= 3 { 1 } else { 0 };
        let top_limit = scroll.saturating_add(margin);
        let bottom_offset = viewport.saturating_sub(1).saturating_sub(margin);
        let bottom_limit = scroll.saturating_add(bottom_offset);
        if cursor_line < top_limit {
            scroll = cursor_line.saturating_sub(margin);
        } else if cursor_line > bottom_limit {
            scroll = cursor_line.saturating_sub(bottom_offset);
        }
        scroll.min(max_scroll)
    }

    fn draw_top_bar<Tz: TimeZone>(&self, frame: &mut Frame, area: Rect, now: DateTime<Tz>)
    where
        Tz::Offset: std::fmt::Display,
    {
        let style = self.theme.top_bar_style();
        frame.render_widget(Paragraph::new("").style(style), area);

        let left = Line::from(vec![
            Span::styled(" Workspaces ", self.theme.workspace_active_style()),
            Span::styled(" Applications ", style),
        ]);
        frame.render_widget(Paragraph::new(left).style(style), area);
        frame.render_widget(
            Paragraph::new(clock_label(&now))
                .style(style)
                .alignment(Alignment::Center),
            area,
        );
        frame.render_widget(
            Paragraph::new("100 % ")
                .style(style)
                .alignment(Alignment::Right),
            area,
        );
    }

    fn draw_tree(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line<'static>> = LINK_LIST
            .iter()
            .enumerate()
            .map(|(idx, link)| {
                let indent = "  ".repeat(link.level);
                let icon_style = match link.icon {
                    PageIcon::Folder => self.theme.tree_folder_style(),
                    _ => self.theme.tree_style(),
                };
                let mut label_style = if link.page == Some(self.current_page) {
                    self.theme.tree_current_style()
                } else if link.icon == PageIcon::Folder {
                    self.theme.tree_folder_style()
                } else {
                    self.theme.tree_style()
                };
                if self.focus == Focus::Tree && idx == self.tree_selected {
                    label_style = label_style.patch(self.theme.tree_selected_style());
                }
                Line::from(vec![
                    Span::raw(format!(" {indent}")),
                    Span::styled(format!("{} ", link.icon.glyph()), icon_style),
                    Span::styled(link.title.to_string(), label_style),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(Text::from(lines)), area);
    }

    fn draw_gutter(
        &self,
        frame: &mut Frame,
        area: Rect,
        total_lines: usize,
        cursor_line: Option<usize>,
    ) {
        let width = usize::from(area.width.saturating_sub(1));
        let lines: Vec<Line<'static>> = (self.scroll_top..total_lines)
            .take(area.height as usize)
            .map(|line| {
                let style = if Some(line) == cursor_line {
                    self.theme.gutter_current_style()
                } else {
                    self.theme.gutter_style()
                };
                Line::from(Span::styled(format!("{:>width$} ", line + 1), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(Text::from(lines)), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let mode = match self.focus {
            Focus::Content => " NORMAL ",
            Focus::Tree => " TREE ",
        };
        let mut spans = vec![
            Span::styled(mode, self.theme.mode_style()),
            Span::raw(" "),
            Span::raw(self.status_path()),
        ];
        if let Some(cursor) = self.navigator.cursor() {
            spans.push(Span::raw(format!(
                "  {}:{}",
                cursor.segment.index() + 1,
                cursor.offset + 1
            )));
        }
        if let Some((message, _)) = &self.status_message {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.clone(), self.theme.message_style()));
        }
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(self.theme.status_style()),
            area,
        );
    }
}

/// Date and time as shown in the middle of the top bar, e.g. `October 19 3:07 PM`.
fn clock_label<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%B %-d %-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn app() -> App {
        App::new(Site::builtin().unwrap(), DEFAULT_PAGE, false).unwrap()
    }

    fn press(app: &mut App, keys: &str) {
        for ch in keys.chars() {
            app.handle_key(KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    #[test]
    fn clock_uses_month_day_and_twelve_hour_time() {
        let now = Utc.with_ymd_and_hms(2024, 10, 19, 15, 7, 0).unwrap();
        assert_eq!(clock_label(&now), "October 19 3:07 PM");
    }

    #[test]
    fn leader_e_toggles_the_tree() {
        let mut app = app();
        press(&mut app, " e");
        assert!(app.tree_visible);
        assert_eq!(app.focus, Focus::Tree);
        press(&mut app, " e");
        assert!(!app.tree_visible);
        assert_eq!(app.focus, Focus::Content);
    }

    #[test]
    fn enter_in_tree_opens_the_selected_page() {
        let mut app = app();
        press(&mut app, " e");
        assert_eq!(app.tree_selected, Site::link_index("readme").unwrap());
        for _ in 0..LINK_LIST.len() {
            press(&mut app, "k");
        }
        press(&mut app, "j");
        app.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.current_page, "about");
        assert_eq!(app.focus, Focus::Content);
        let context = app.navigator.local_context().unwrap();
        assert_eq!(context.offset, 0);
        assert!(context.merged().starts_with("Hey"));
    }

    #[test]
    fn gg_at_top_reports_the_boundary() {
        let mut app = app();
        press(&mut app, "gg");
        let (message, _) = app.status_message.clone().unwrap();
        assert_eq!(message, "Reached start of document");

        press(&mut app, "G");
        assert_ne!(app.navigator.cursor().unwrap().segment.index(), 0);
        press(&mut app, "gg");
        assert_eq!(app.navigator.cursor().unwrap().segment.index(), 0);
    }

    #[test]
    fn status_path_follows_the_open_page() {
        let mut app = app();
        assert_eq!(app.status_path(), "~/  Readme.md");
        app.open_page("training").unwrap();
        assert_eq!(app.status_path(), "~/training  Training.tsx");
    }

    #[test]
    fn q_quits() {
        let mut app = app();
        press(&mut app, "q");
        assert!(app.should_quit());
    }
}
