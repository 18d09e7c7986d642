//! Core TUI application state and event loop.
//!
//! The event loop stays on the main thread; all backend work is spawned
//! onto a tokio runtime through the shared [`Ctx`], and screens render
//! from view-model snapshots on each 100 ms tick.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use enrich_client::ApiClient;
use enrich_shared::load_config;
use enrich_state::{ArticleDetailModel, ArticleListModel, PollPolicy, SubmitModel};

use crate::screens::{Action, ScreenId, Screens};
use crate::widgets::status_bar;

/// Shared handles for spawning backend work from screens.
pub(crate) struct Ctx {
    pub handle: tokio::runtime::Handle,
    pub client: ApiClient,
    pub list: Arc<ArticleListModel>,
    pub detail: Arc<ArticleDetailModel>,
    pub submit: Arc<SubmitModel>,
    pub poll: PollPolicy,
}

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub tabs: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Screen states.
    pub screens: Screens,
}

impl App {
    fn new(ctx: Arc<Ctx>) -> Self {
        Self {
            active_tab: 0,
            tabs: vec![ScreenId::Submit, ScreenId::Articles, ScreenId::Detail],
            should_quit: false,
            status: "Ready — press ? for help".to_string(),
            show_help: false,
            screens: Screens::new(ctx),
        }
    }

    fn current(&self) -> ScreenId {
        self.tabs[self.active_tab]
    }

    fn switch_to(&mut self, id: ScreenId) {
        if let Some(idx) = self.tabs.iter().position(|t| *t == id) {
            self.active_tab = idx;
            self.status = format!("{id}");
        }
    }
}

/// Entry point — builds the runtime and models, runs the event loop,
/// restores the terminal.
pub(crate) fn run() -> Result<()> {
    let config = load_config()?;
    let client = ApiClient::new(&config.api)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let ctx = Arc::new(Ctx {
        handle: runtime.handle().clone(),
        client: client.clone(),
        list: Arc::new(ArticleListModel::new(client.clone(), config.ui.page_size)),
        detail: Arc::new(ArticleDetailModel::new(client.clone())),
        submit: Arc::new(SubmitModel::new(client)),
        poll: PollPolicy::from(&config.polling),
    });

    // Load the first page before the first frame renders.
    {
        let list = ctx.list.clone();
        ctx.handle.spawn(async move { list.refresh().await });
    }

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, ctx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, ctx: Arc<Ctx>) -> Result<()> {
    let mut app = App::new(ctx.clone());

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout so view-model updates show up
        // without any keypress.
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, &ctx, key.code, key.modifiers);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, ctx: &Arc<Ctx>, code: KeyCode, modifiers: KeyModifiers) {
    let editing = app.screens.is_editing(app.current());

    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !editing => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !editing => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='3') if !editing => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.tabs.len() {
                app.active_tab = idx;
                app.status = format!("{}", app.tabs[idx]);
            }
            return;
        }
        KeyCode::Tab if !editing => {
            app.active_tab = (app.active_tab + 1) % app.tabs.len();
            app.status = format!("{}", app.tabs[app.active_tab]);
            return;
        }
        KeyCode::BackTab if !editing => {
            app.active_tab = if app.active_tab == 0 {
                app.tabs.len() - 1
            } else {
                app.active_tab - 1
            };
            app.status = format!("{}", app.tabs[app.active_tab]);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen; screens can request cross-tab actions.
    let action = app.screens.handle_key(app.current(), code, modifiers);
    match action {
        Some(Action::OpenArticle(id)) => {
            let detail = ctx.detail.clone();
            let article_id = id.clone();
            ctx.handle.spawn(async move { detail.load(&article_id).await });
            app.switch_to(ScreenId::Detail);
            app.status = format!("Article {id}");
        }
        Some(Action::SwitchTo(id)) => {
            app.switch_to(id);
        }
        None => {}
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = app.tabs.iter().map(|s| Line::from(format!("{s}"))).collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title(" Enrich "))
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area — delegate to screen
    app.screens.draw(app.current(), f, chunks[1]);

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-3          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Articles:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓          Select article"),
        Line::from("  Enter        Open selected article"),
        Line::from("  n / p        Next / previous page"),
        Line::from("  /            Edit search query"),
        Line::from("  r            Refresh"),
        Line::from("  d            Delete selected article"),
        Line::from(""),
        Line::from("Submit:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Edit URL / submit"),
        Line::from("  Esc          Stop editing"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
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
