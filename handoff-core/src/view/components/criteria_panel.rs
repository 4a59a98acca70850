//! src/view/components/criteria_panel.rs
//! ============================================================================
//! # `CriteriaPanel`: The Filter Rows
//!
//! One line per criteria row, laid out as fixed field and operator columns
//! with the value taking the rest. The cell under focus gets the highlight
//! background; a pinned operator is dimmed so the operator column reads as
//! not-editable while the row is in user-lookup mode.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::model::criteria::{CriteriaRow, CriteriaState, ValueMode};
use crate::model::ui_state::Focus;
use crate::view::theme;

/// Column widths, shared with the renderer so lookup popups can be anchored
/// under the value cell.
pub const FIELD_COL: u16 = 17;
pub const OPERATOR_COL: u16 = 13;

pub struct CriteriaPanel;

impl CriteriaPanel {
    pub fn render(frame: &mut Frame<'_>, criteria: &CriteriaState, focus: Focus, area: Rect) {
        let lines: Vec<Line> = criteria
            .rows()
            .iter()
            .map(|row| Self::row_line(row, focus))
            .collect();

        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Criteria ")
                .title_style(Style::default().fg(theme::PURPLE).bold())
                .title_bottom(
                    Line::from(" Ctrl+N add • Ctrl+D remove ")
                        .style(Style::default().fg(theme::COMMENT))
                        .right_aligned(),
                )
                .border_style(theme::border_style())
                .style(theme::base_style()),
        );

        frame.render_widget(panel, area);
    }

    fn row_line(row: &CriteriaRow, focus: Focus) -> Line<'static> {
        let field_style = Self::cell_style(
            Style::default().fg(theme::CYAN),
            focus == Focus::CriteriaField(row.id),
        );
        let operator_base = if row.operator_locked {
            Style::default().fg(theme::COMMENT)
        } else {
            Style::default().fg(theme::FOREGROUND)
        };
        let operator_style =
            Self::cell_style(operator_base, focus == Focus::CriteriaOperator(row.id));
        let value_style = Self::cell_style(
            Style::default().fg(theme::FOREGROUND),
            focus == Focus::CriteriaValue(row.id),
        );

        let field = format!("{:<width$}", row.field.label(), width = FIELD_COL as usize);
        let operator = format!(
            "{:<width$}",
            row.operator.label(),
            width = OPERATOR_COL as usize
        );

        let mut spans = vec![
            Span::styled(field, field_style),
            Span::styled(operator, operator_style),
        ];
        match row.mode {
            ValueMode::FreeText => {
                spans.push(Span::styled(row.text_value.to_string(), value_style));
            }
            ValueMode::UserLookup => {
                spans.push(Span::styled(row.lookup.query.to_string(), value_style));
                if row.lookup.selection.is_some() {
                    spans.push(Span::styled(" ✓", Style::default().fg(theme::GREEN)));
                }
            }
        }
        Line::from(spans)
    }

    fn cell_style(base: Style, focused: bool) -> Style {
        if focused {
            base.bg(theme::CURRENT_LINE).bold()
        } else {
            base
        }
    }
}
