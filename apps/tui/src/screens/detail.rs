//! "Detail" screen — one article with metadata and QA score bands.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use enrich_state::{display_date, display_language, score_band};

use crate::app::Ctx;
use crate::screens::{Action, ScreenId};
use crate::widgets::band_color;

pub(crate) struct DetailScreen {
    ctx: Arc<Ctx>,
    scroll: u16,
}

impl DetailScreen {
    pub(crate) fn new(ctx: Arc<Ctx>) -> Self {
        Self { ctx, scroll: 0 }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let state = self.ctx.detail.snapshot();

        if state.loading {
            let loading = Paragraph::new("Loading article…")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Article "));
            f.render_widget(loading, area);
            return;
        }

        if let Some(error) = &state.error {
            // MissingId and NotFound share the not-found view; anything else
            // renders as a generic failure.
            let text = if error.is_not_found() {
                "Article Not Found\n\nThe article does not exist or was deleted.\n\nEsc to go back."
                    .to_string()
            } else {
                format!("Could not load the article:\n{error}\n\nEsc to go back.")
            };
            let view = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Article "));
            f.render_widget(view, area);
            return;
        }

        let Some(article) = &state.article else {
            let empty = Paragraph::new("Select an article on the Articles tab.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(" Article "));
            f.render_widget(empty, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(6), // Metadata
                Constraint::Length(9), // QA scores
                Constraint::Min(1),    // Body
            ])
            .split(area);

        // Metadata
        let meta_lines = vec![
            Line::from(vec![
                Span::styled(
                    article.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  [{}]", article.status),
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
            Line::from(format!(
                "{} · created {} · updated {}",
                display_language(article),
                display_date(article.created_at.as_ref()),
                display_date(article.updated_at.as_ref()),
            )),
            Line::from(format!(
                "source: {} ({})",
                article.source_url, article.source_type
            )),
            Line::from(format!(
                "tags: {} · categories: {}",
                if article.tags.is_empty() {
                    "-".to_string()
                } else {
                    article.tags.join(", ")
                },
                if article.categories.is_empty() {
                    "-".to_string()
                } else {
                    article.categories.join(", ")
                },
            )),
        ];
        let meta = Paragraph::new(meta_lines)
            .block(Block::default().borders(Borders::ALL).title(" Article "));
        f.render_widget(meta, chunks[0]);

        // QA scores
        let qa_lines: Vec<Line> = match &article.qa_scores {
            Some(qa) => {
                let mut lines = vec![Line::from(if qa.passed {
                    Span::styled("passed", Style::default().fg(Color::Green))
                } else {
                    Span::styled("failed", Style::default().fg(Color::Red))
                })];
                for (name, value) in qa.metrics() {
                    let band = score_band(value);
                    lines.push(Line::from(vec![
                        Span::raw(format!("{name:<16} {value:>5.1}  ")),
                        Span::styled(band.label(), Style::default().fg(band_color(band))),
                    ]));
                }
                if !qa.failed_metrics.is_empty() {
                    lines.push(Line::from(format!(
                        "failed metrics: {}",
                        qa.failed_metrics.join(", ")
                    )));
                }
                lines
            }
            None => vec![Line::from("QA has not run for this article yet.")],
        };
        let qa = Paragraph::new(qa_lines)
            .block(Block::default().borders(Borders::ALL).title(" QA scores "));
        f.render_widget(qa, chunks[1]);

        // Body
        let mut body_text = String::new();
        if let Some(summary) = &article.summary {
            body_text.push_str(summary);
            body_text.push_str("\n\n");
        }
        body_text.push_str(&article.body);

        let body = Paragraph::new(body_text)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Body (↑/↓ scroll · Esc back) "),
            );
        f.render_widget(body, chunks[2]);
    }

    pub(crate) fn handle_key(
        &mut self,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> Option<Action> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = self.scroll.saturating_add(1);
            }
            KeyCode::Esc | KeyCode::Char('b') => {
                // Discard the held article on navigation away.
                self.scroll = 0;
                self.ctx.detail.reset();
                return Some(Action::SwitchTo(ScreenId::Articles));
            }
            _ => {}
        }
        None
    }
}
