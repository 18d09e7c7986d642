//! "Articles" screen — paged, searchable article list.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use tracing::warn;

use enrich_state::{display_date, display_language, truncate_summary};

use crate::app::Ctx;
use crate::screens::Action;

pub(crate) struct ArticlesScreen {
    ctx: Arc<Ctx>,
    search_input: String,
    editing: bool,
    selected: usize,
}

impl ArticlesScreen {
    pub(crate) fn new(ctx: Arc<Ctx>) -> Self {
        Self {
            ctx,
            search_input: String::new(),
            editing: false,
            selected: 0,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let state = self.ctx.list.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Search bar
                Constraint::Min(1),    // List
                Constraint::Length(2), // Footer
            ])
            .split(area);

        // Search bar
        let search_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let search_text = if self.editing {
            self.search_input.clone()
        } else {
            state.query.clone().unwrap_or_default()
        };
        let search = Paragraph::new(search_text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search (/) ")
                .border_style(search_style),
        );
        f.render_widget(search, chunks[0]);

        // Article list
        let title = match (&state.query, state.loading) {
            (Some(q), false) => format!(" Articles matching '{q}' ({}) ", state.total),
            (None, false) => format!(" Articles ({}) ", state.total),
            (_, true) => " Articles — loading… ".to_string(),
        };

        if state.articles.is_empty() {
            let text = if state.loading {
                "Loading…".to_string()
            } else if let Some(error) = &state.error {
                format!("Could not load articles:\n{error}")
            } else if state.query.is_some() {
                "No articles match this search.".to_string()
            } else {
                "No articles yet.\n\nUse the 'Submit URL' tab to create one.".to_string()
            };
            let empty = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(empty, chunks[1]);
        } else {
            let selected = self.selected.min(state.articles.len() - 1);
            let items: Vec<ListItem> = state
                .articles
                .iter()
                .enumerate()
                .map(|(i, article)| {
                    let style = if i == selected {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let prefix = if i == selected { "▸ " } else { "  " };
                    let qa = match &article.qa_scores {
                        Some(qa) if qa.passed => "QA✓",
                        Some(_) => "QA✗",
                        None => "QA–",
                    };
                    let mut lines = vec![Line::from(format!(
                        "{prefix}{}  [{}] [{}] {}",
                        article.title,
                        display_language(article),
                        qa,
                        display_date(article.created_at.as_ref()),
                    ))];
                    if let Some(summary) = &article.summary {
                        lines.push(
                            Line::from(format!("    {}", truncate_summary(summary)))
                                .style(Style::default().fg(Color::DarkGray)),
                        );
                    }
                    ListItem::new(lines).style(style)
                })
                .collect();

            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title));
            f.render_widget(list, chunks[1]);
        }

        // Footer: pagination + errors
        let last_page = state.total_pages();
        let mut footer = format!(
            "Page {} of {}  ·  n next · p prev · r refresh · Enter open · d delete",
            state.page,
            last_page.max(1)
        );
        if let Some(error) = &state.error {
            footer = format!("{error}  ·  {footer}");
        }
        let footer_style = if state.error.is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let footer_p = Paragraph::new(footer)
            .style(footer_style)
            .alignment(Alignment::Center);
        f.render_widget(footer_p, chunks[2]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> Option<Action> {
        if self.editing {
            match code {
                KeyCode::Esc => {
                    self.editing = false;
                }
                KeyCode::Enter => {
                    self.editing = false;
                    self.selected = 0;
                    let list = self.ctx.list.clone();
                    let query = self.search_input.clone();
                    self.ctx.handle.spawn(async move {
                        list.set_query(&query).await;
                    });
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                }
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                }
                _ => {}
            }
            return None;
        }

        let state = self.ctx.list.snapshot();
        match code {
            KeyCode::Char('/') => {
                self.search_input = state.query.unwrap_or_default();
                self.editing = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < state.articles.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('n') => {
                self.selected = 0;
                let list = self.ctx.list.clone();
                self.ctx.handle.spawn(async move { list.next_page().await });
            }
            KeyCode::Char('p') => {
                self.selected = 0;
                let list = self.ctx.list.clone();
                self.ctx.handle.spawn(async move { list.prev_page().await });
            }
            KeyCode::Char('r') => {
                let list = self.ctx.list.clone();
                self.ctx.handle.spawn(async move { list.refresh().await });
            }
            KeyCode::Char('d') => {
                if let Some(article) = state.articles.get(self.selected.min(
                    state.articles.len().saturating_sub(1),
                )) {
                    self.delete_article(article.id.clone());
                }
            }
            KeyCode::Enter => {
                let selected = self.selected.min(state.articles.len().saturating_sub(1));
                if let Some(article) = state.articles.get(selected) {
                    return Some(Action::OpenArticle(article.id.clone()));
                }
            }
            _ => {}
        }
        None
    }

    /// Delete then refresh. An already-deleted article counts as success.
    fn delete_article(&self, id: String) {
        let client = self.ctx.client.clone();
        let list = self.ctx.list.clone();
        self.ctx.handle.spawn(async move {
            match client.delete_article(&id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => warn!(article_id = %id, error = %e, "delete failed"),
            }
            list.refresh().await;
        });
    }
}
