//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use enrich_state::ScoreBand;

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(Color::DarkGray).fg(Color::White))
}

/// Terminal color for a QA score band.
pub(crate) fn band_color(band: ScoreBand) -> Color {
    match band {
        ScoreBand::Good => Color::Green,
        ScoreBand::Warning => Color::Yellow,
        ScoreBand::Poor => Color::Red,
    }
}
