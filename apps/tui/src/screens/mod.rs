//! TUI screen definitions.
//!
//! Each screen corresponds to a tab, renders from its view-model's
//! snapshot, and spawns backend work through the shared [`Ctx`].

mod articles;
mod detail;
mod submit;

use std::fmt;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;

use crate::app::Ctx;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Submit,
    Articles,
    Detail,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submit => write!(f, "Submit URL"),
            Self::Articles => write!(f, "Articles"),
            Self::Detail => write!(f, "Detail"),
        }
    }
}

/// Cross-screen request raised by a key handler.
pub(crate) enum Action {
    /// Open the given article id on the Detail tab.
    OpenArticle(String),
    /// Switch to another tab.
    SwitchTo(ScreenId),
}

/// All screen states, dispatched by [`ScreenId`].
pub(crate) struct Screens {
    submit: submit::SubmitScreen,
    articles: articles::ArticlesScreen,
    detail: detail::DetailScreen,
}

impl Screens {
    pub(crate) fn new(ctx: Arc<Ctx>) -> Self {
        Self {
            submit: submit::SubmitScreen::new(ctx.clone()),
            articles: articles::ArticlesScreen::new(ctx.clone()),
            detail: detail::DetailScreen::new(ctx),
        }
    }

    /// Whether the given screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Submit => self.submit.is_editing(),
            ScreenId::Articles => self.articles.is_editing(),
            ScreenId::Detail => false,
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect) {
        match id {
            ScreenId::Submit => self.submit.draw(f, area),
            ScreenId::Articles => self.articles.draw(f, area),
            ScreenId::Detail => self.detail.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Option<Action> {
        match id {
            ScreenId::Submit => self.submit.handle_key(code, modifiers),
            ScreenId::Articles => self.articles.handle_key(code, modifiers),
            ScreenId::Detail => self.detail.handle_key(code, modifiers),
        }
    }
}
