//! src/view/components/contact_table.rs
//! ============================================================================
//! # `ContactTable`: Search Results With Selection Marks
//!
//! The results table only gets its header after the first completed search;
//! from then on the header stays, even when a later search comes back empty.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Style, Stylize},
    widgets::{Block, Borders, Cell, HighlightSpacing, Row, Table, TableState},
};

use crate::model::transfer::TransferState;
use crate::view::theme;

pub struct ContactTable;

impl ContactTable {
    pub fn render(frame: &mut Frame<'_>, transfer: &TransferState, focused: bool, area: Rect) {
        let header = Row::new(vec!["", "Name", "Account", "Email", "Owner"])
            .style(Style::default().fg(theme::YELLOW).bold())
            .bottom_margin(1);

        let rows: Vec<Row> = transfer
            .contacts
            .iter()
            .map(|row| {
                let mark = if row.selected { "[x]" } else { "[ ]" };
                let mark_style = if row.selected {
                    Style::default().fg(theme::GREEN)
                } else {
                    Style::default().fg(theme::COMMENT)
                };
                Row::new(vec![
                    Cell::from(mark).style(mark_style),
                    Cell::from(row.record.name.clone()),
                    Cell::from(row.record.account.clone()),
                    Cell::from(row.record.email.clone()),
                    Cell::from(row.record.owner_alias.clone()),
                ])
                .style(Style::default().fg(theme::FOREGROUND))
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Length(12),
        ];

        let title = if transfer.results_header {
            format!(
                " Search Results ({}) • {} selected ",
                transfer.contacts.len(),
                transfer.selected_count()
            )
        } else {
            " Contacts ".to_string()
        };

        let border = if focused {
            theme::focused_border_style()
        } else {
            theme::border_style()
        };

        let mut table_state = TableState::default().with_selected(Some(transfer.cursor));

        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(theme::PURPLE).bold())
                    .border_style(border)
                    .style(theme::base_style()),
            )
            .row_highlight_style(theme::highlight_style())
            .highlight_symbol("▶ ")
            .highlight_spacing(HighlightSpacing::Always);

        frame.render_stateful_widget(table, area, &mut table_state);
    }
}
