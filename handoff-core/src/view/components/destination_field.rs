//! src/view/components/destination_field.rs
//! ============================================================================
//! # `DestinationField`: The To-User Picker
//!
//! Single-line input holding the destination-user query. After a pick the
//! field shows the chosen user's name with a check mark; the record id only
//! ever travels inside the transfer request.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::model::lookup::LookupField;
use crate::view::theme;

pub struct DestinationField;

impl DestinationField {
    pub fn render(frame: &mut Frame<'_>, field: &LookupField, focused: bool, area: Rect) {
        let border = if focused {
            theme::focused_border_style()
        } else {
            theme::border_style()
        };

        let mut spans = vec![Span::styled(
            field.query.as_str(),
            Style::default().fg(theme::FOREGROUND),
        )];
        if field.selection.is_some() {
            spans.push(Span::styled(" ✓", Style::default().fg(theme::GREEN)));
        }

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" To User ")
                .title_style(Style::default().fg(theme::PURPLE).bold())
                .border_style(border)
                .style(theme::base_style()),
        );

        frame.render_widget(paragraph, area);
    }
}
