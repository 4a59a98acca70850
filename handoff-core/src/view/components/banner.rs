//! src/view/components/banner.rs
//! ============================================================================
//! # `MessageBanner`: Page Messages Above the Form
//!
//! Stacks the queued page messages one per line, newest at the bottom,
//! each with the severity icon and color of its level. The area shrinks to
//! zero when nothing is queued, so the form slides back up.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::ui_state::UIState;
use crate::view::theme;

pub struct MessageBanner;

impl MessageBanner {
    pub fn render(frame: &mut Frame<'_>, ui: &UIState, area: Rect) {
        let lines: Vec<Line> = ui
            .messages
            .iter()
            .map(|message| {
                let style = theme::severity_style(message.severity);
                Line::from(vec![
                    Span::styled(theme::severity_icon(message.severity), style),
                    Span::raw(" "),
                    Span::styled(message.text.as_str(), style),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).style(theme::base_style()), area);
    }
}
