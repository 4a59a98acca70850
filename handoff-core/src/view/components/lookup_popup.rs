//! src/view/components/lookup_popup.rs
//! ============================================================================
//! # `LookupPopup`: Typeahead Results Under a Lookup Field
//!
//! Floats below whichever lookup field is being edited. While the shared
//! guard is held the title carries a spinner; the list itself keeps showing
//! whatever the previous search produced until fresh hits replace it.
//!
//! The no-matches placeholder is rendered like a row but never highlighted
//! and never selectable.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use crate::model::lookup::{LookupField, LookupRow};
use crate::view::theme;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct LookupPopup;

impl LookupPopup {
    pub fn render(
        frame: &mut Frame<'_>,
        field: &LookupField,
        searching: bool,
        spinner_frame: u8,
        anchor: Rect,
    ) {
        let area = Self::popup_area(field, anchor, frame.area());
        if area.height < 3 || area.width < 8 {
            return;
        }
        frame.render_widget(Clear, area);

        let title = if searching {
            let glyph = SPINNER_FRAMES[spinner_frame as usize % SPINNER_FRAMES.len()];
            format!(" {glyph} Searching ")
        } else {
            " Users ".to_string()
        };

        let items: Vec<ListItem> = field.rows.iter().map(Self::row_item).collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .title_style(Style::default().fg(theme::CYAN))
                    .border_style(theme::focused_border_style())
                    .style(theme::base_style()),
            )
            .highlight_style(theme::highlight_style())
            .highlight_symbol("▶ ");

        // Never ride the highlight onto the placeholder row
        let selected = field
            .rows
            .get(field.cursor)
            .is_some_and(LookupRow::is_selectable)
            .then_some(field.cursor);
        let mut list_state = ListState::default().with_selected(selected);

        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn row_item(row: &LookupRow) -> ListItem<'static> {
        match row {
            LookupRow::User(user) => ListItem::new(Line::from(vec![
                Span::styled(
                    user.name.clone(),
                    Style::default()
                        .fg(theme::FOREGROUND)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} ({})", user.username, user.user_type),
                    Style::default().fg(theme::COMMENT),
                ),
            ])),
            LookupRow::NoMatches => ListItem::new(Line::from(Span::styled(
                "No records found",
                Style::default()
                    .fg(theme::COMMENT)
                    .add_modifier(Modifier::ITALIC),
            ))),
        }
    }

    /// Popup rectangle below the anchor, clamped to the screen.
    fn popup_area(field: &LookupField, anchor: Rect, screen: Rect) -> Rect {
        let height = (field.rows.len().max(1) as u16 + 2).min(10);
        let width = anchor.width.clamp(24, 48).min(screen.width);
        let x = anchor.x.min(screen.right().saturating_sub(width));
        let below = anchor.bottom();
        let y = if below + height <= screen.bottom() {
            below
        } else {
            anchor.y.saturating_sub(height)
        };
        Rect {
            x,
            y,
            width,
            height: height.min(screen.height),
        }
    }
}
