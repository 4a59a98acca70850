//! src/view/components/status_bar.rs
//! ============================================================================
//! # `StatusBar`: Backend, Focus, and Background Tasks

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::app_state::AppState;
use crate::model::ui_state::Focus;
use crate::view::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState, backend: &str, area: Rect) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let left = Paragraph::new(Line::from(vec![
            Span::styled(" Mass Transfer Contacts ", Style::default().fg(theme::PURPLE).bold()),
            Span::styled(backend.to_string(), Style::default().fg(theme::COMMENT)),
        ]))
        .style(theme::base_style());
        frame.render_widget(left, halves[0]);

        let mut right_spans = Vec::new();
        let running = state.running_tasks();
        if running > 0 {
            right_spans.push(Span::styled(
                format!("Tasks: {running}  "),
                Style::default().fg(theme::CYAN),
            ));
        }
        right_spans.push(Span::styled(
            format!("Focus: {}  ", Self::focus_label(state.ui.focus)),
            Style::default().fg(theme::FOREGROUND),
        ));
        right_spans.push(Span::styled(
            "F1 Help ",
            Style::default().fg(theme::COMMENT),
        ));

        let right = Paragraph::new(Line::from(right_spans))
            .alignment(Alignment::Right)
            .style(theme::base_style());
        frame.render_widget(right, halves[1]);
    }

    const fn focus_label(focus: Focus) -> &'static str {
        match focus {
            Focus::ToUser => "To User",
            Focus::CriteriaField(_) => "Field",
            Focus::CriteriaOperator(_) => "Operator",
            Focus::CriteriaValue(_) => "Value",
            Focus::Contacts => "Contacts",
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}
