//! src/view/components/transfer_controls.rs
//! ============================================================================
//! # `TransferControls`: Find / Transfer Buttons and the Two Options
//!
//! A one-line toolbar. Captions come from the workflow phase, so a running
//! search renders as "Searching…" and a running transfer as "Transferring…",
//! and a disabled control is dimmed exactly while the state says it ignores
//! input.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::model::transfer::TransferState;
use crate::view::theme;

pub struct TransferControls;

impl TransferControls {
    pub fn render(frame: &mut Frame<'_>, transfer: &TransferState, area: Rect) {
        let controls = transfer.controls;

        let mut spans = vec![
            Span::styled(
                format!("[ {} ]", transfer.find_caption()),
                theme::control_style(controls.find_enabled),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[ {} ]", transfer.transfer_caption()),
                theme::control_style(controls.transfer_enabled),
            ),
            Span::raw("   "),
        ];
        spans.extend(Self::option(
            "Transfer open tasks",
            transfer.options.transfer_open_tasks,
            controls.options_enabled,
        ));
        spans.push(Span::raw("  "));
        spans.extend(Self::option(
            "Send notification email",
            transfer.options.send_notification_email,
            controls.options_enabled,
        ));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(theme::base_style()),
            area,
        );
    }

    fn option(label: &str, checked: bool, enabled: bool) -> Vec<Span<'static>> {
        let mark_style = if enabled {
            Style::default().fg(theme::GREEN)
        } else {
            Style::default().fg(theme::COMMENT)
        };
        let label_style = if enabled {
            Style::default().fg(theme::FOREGROUND)
        } else {
            Style::default().fg(theme::COMMENT)
        };
        vec![
            Span::styled(if checked { "[x]" } else { "[ ]" }, mark_style),
            Span::styled(format!(" {label}"), label_style),
        ]
    }
}
