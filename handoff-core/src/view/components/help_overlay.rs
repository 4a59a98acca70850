//! src/view/components/help_overlay.rs
//! ============================================================================
//! # `HelpOverlay`: Key Bindings

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::view::theme;

pub struct HelpOverlay;

impl HelpOverlay {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let overlay_area = Self::centered_rect(70, 80, area);
        frame.render_widget(Clear, overlay_area);

        let help = Paragraph::new(Text::from(Self::bindings()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Help ")
                    .title_alignment(Alignment::Center)
                    .title_style(Style::default().fg(theme::CYAN).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(theme::PURPLE))
                    .style(Style::default().bg(theme::BACKGROUND)),
            )
            .style(Style::default().fg(theme::FOREGROUND))
            .wrap(Wrap { trim: true });

        frame.render_widget(help, overlay_area);
        self.render_footer(frame, overlay_area);
    }

    fn bindings() -> Vec<Line<'static>> {
        vec![
            Line::from(Span::styled(
                "Form",
                Style::default().fg(theme::CYAN),
            )),
            Line::from("  Tab / Shift+Tab   Move between form cells"),
            Line::from("  type              Search users as you type"),
            Line::from("  ↑↓ + Enter        Pick a user from the popup"),
            Line::from("  ←→                Change field / operator in a criteria cell"),
            Line::from("  Ctrl+N            Add a criteria row"),
            Line::from("  Ctrl+D            Remove the focused criteria row"),
            Line::from("  Esc               Close popup, then dismiss messages"),
            Line::from(""),
            Line::from(Span::styled(
                "Contacts",
                Style::default().fg(theme::CYAN),
            )),
            Line::from("  ↑↓ / k j          Move the cursor"),
            Line::from("  Space             Select / deselect the contact"),
            Line::from("  a                 Select all (or none)"),
            Line::from("  t / e             Toggle open-tasks / email option"),
            Line::from(""),
            Line::from(Span::styled(
                "Workflow",
                Style::default().fg(theme::CYAN),
            )),
            Line::from("  Ctrl+F            Find contacts matching the criteria"),
            Line::from("  Ctrl+T            Transfer the selected contacts"),
            Line::from("  Ctrl+C / Ctrl+Q   Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "Transfer options",
                Style::default().fg(theme::CYAN),
            )),
            Line::from("  Transfer open tasks       open activities on the contacts move"),
            Line::from("                            to the new owner as well"),
            Line::from("  Send notification email   the new owner gets one summary email"),
            Line::from("                            listing the records received"),
        ]
    }

    fn render_footer(&self, frame: &mut Frame<'_>, area: Rect) {
        let footer_area = Rect {
            x: area.x + 2,
            y: area.y + area.height.saturating_sub(2),
            width: area.width.saturating_sub(4),
            height: 1,
        };

        let footer = Paragraph::new("Esc/q/? Close help")
            .style(Style::default().fg(theme::COMMENT))
            .alignment(Alignment::Center);
        frame.render_widget(footer, footer_area);
    }

    fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ])
            .split(area);

        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ])
            .split(vertical[1]);

        horizontal[1]
    }
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self::new()
    }
}
