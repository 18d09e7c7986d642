//! "Submit URL" screen — URL input, async submission, and live task status.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::Ctx;
use crate::screens::Action;

pub(crate) struct SubmitScreen {
    ctx: Arc<Ctx>,
    editing: bool,
}

impl SubmitScreen {
    pub(crate) fn new(ctx: Arc<Ctx>) -> Self {
        Self {
            ctx,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let state = self.ctx.submit.snapshot();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // URL
                Constraint::Length(3), // Action hint
                Constraint::Min(1),    // Status / progress
            ])
            .split(area);

        // URL field
        let url_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let url_block = Block::default()
            .borders(Borders::ALL)
            .title(" Source URL ")
            .border_style(url_style);
        let url_text = Paragraph::new(state.url.as_str()).block(url_block);
        f.render_widget(url_text, chunks[0]);

        // Action hint
        let hint = if state.submitting {
            "Submission in flight — the form unlocks when it settles"
        } else if self.editing {
            "Type the URL · Enter to submit · Esc to stop editing"
        } else {
            "Enter to edit · the URL is kept if a submission fails"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);

        // Status area
        let mut lines: Vec<Line> = Vec::new();
        if state.submitting {
            lines.push(Line::from("Working…").style(Style::default().fg(Color::Yellow)));
        }
        if let Some(task_id) = &state.task_id {
            lines.push(Line::from(format!("Task: {task_id}")));
        }
        if let Some(message) = &state.message {
            lines.push(Line::from(message.clone()).style(Style::default().fg(Color::Green)));
        }
        if let Some(error) = &state.error {
            lines.push(Line::from(error.clone()).style(Style::default().fg(Color::Red)));
        }
        if lines.is_empty() {
            lines.push(Line::from(
                "Submit a page or group URL to generate an article.",
            ));
        }

        let status_block = Block::default().borders(Borders::ALL).title(" Status ");
        let status_text = Paragraph::new(lines).block(status_block);
        f.render_widget(status_text, chunks[2]);
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
                    self.start_submission();
                }
                KeyCode::Backspace => {
                    self.ctx.submit.backspace();
                }
                KeyCode::Char(c) => {
                    self.ctx.submit.push_char(c);
                }
                _ => {}
            }
        } else {
            match code {
                KeyCode::Enter => {
                    if !self.ctx.submit.snapshot().submitting {
                        self.editing = true;
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Kick off the async submit → poll → refresh chain.
    ///
    /// A successful submission invalidates the current article listing, so
    /// the spawned task refreshes the list view-model once the outcome is
    /// in (the refresh contract is the consumer's responsibility).
    fn start_submission(&self) {
        let submit = self.ctx.submit.clone();
        let list = self.ctx.list.clone();
        let policy = self.ctx.poll.clone();

        self.ctx.handle.spawn(async move {
            let created = submit.submit(&policy).await;
            if created {
                list.refresh().await;
            }
        });
    }
}
