//! src/view/ui.rs
//! ============================================================
//! Frame renderer. Draws the whole console from an immutable
//! `AppState` borrow; nothing here mutates state, so a render
//! can never race the dispatcher.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

use crate::{
    model::{
        app_state::AppState,
        lookup::{LookupField, LookupTarget},
        ui_state::{Focus, Overlay},
    },
    view::components::{
        banner::MessageBanner,
        contact_table::ContactTable,
        criteria_panel::{CriteriaPanel, FIELD_COL, OPERATOR_COL},
        destination_field::DestinationField,
        help_overlay::HelpOverlay,
        lookup_popup::LookupPopup,
        status_bar::StatusBar,
        transfer_controls::TransferControls,
    },
};

/// ---------------------------------------------------------------------------
/// Renderer
/// ---------------------------------------------------------------------------
pub struct UiRenderer {
    backend_label: String,
    status_bar: StatusBar,
    help: HelpOverlay,
}

struct FormAreas {
    banner: Rect,
    to_user: Rect,
    criteria: Rect,
    controls: Rect,
    contacts: Rect,
}

impl UiRenderer {
    #[must_use]
    pub fn new(backend_label: impl Into<String>) -> Self {
        Self {
            backend_label: backend_label.into(),
            status_bar: StatusBar::new(),
            help: HelpOverlay::new(),
        }
    }

    pub fn render(&self, frame: &mut Frame<'_>, state: &AppState) {
        let [content, status] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        let areas = Self::form_areas(state, content);

        MessageBanner::render(frame, &state.ui, areas.banner);
        DestinationField::render(
            frame,
            &state.lookup.to_user,
            state.ui.focus == Focus::ToUser,
            areas.to_user,
        );
        CriteriaPanel::render(frame, &state.criteria, state.ui.focus, areas.criteria);
        TransferControls::render(frame, &state.transfer, areas.controls);
        ContactTable::render(
            frame,
            &state.transfer,
            state.ui.focus == Focus::Contacts,
            areas.contacts,
        );
        self.status_bar
            .render(frame, state, &self.backend_label, status);

        self.draw_popup(frame, state, &areas);
        self.draw_overlay(frame, state);
    }
}

/// ---------------------------------------------------------------------------
/// popups and overlays
/// ---------------------------------------------------------------------------
impl UiRenderer {
    fn draw_popup(&self, frame: &mut Frame<'_>, state: &AppState, areas: &FormAreas) {
        let Some((field, anchor)) = Self::open_popup(state, areas) else {
            return;
        };
        LookupPopup::render(
            frame,
            field,
            state.lookup.is_searching(),
            state.ui.spinner_frame,
            anchor,
        );
    }

    /// The one lookup field with an open popup, plus the rect to hang the
    /// popup under. Moving focus closes popups, so there is at most one.
    fn open_popup<'a>(state: &'a AppState, areas: &FormAreas) -> Option<(&'a LookupField, Rect)> {
        if state.lookup.to_user.open {
            return Some((&state.lookup.to_user, areas.to_user));
        }
        for (index, row) in state.criteria.rows().iter().enumerate() {
            if row.lookup.open {
                let anchor = Self::value_cell(areas.criteria, index);
                let field = state.lookup_field(LookupTarget::Criteria(row.id))?;
                return Some((field, anchor));
            }
        }
        None
    }

    /// Screen rect of a criteria row's value cell, inside the panel border.
    fn value_cell(criteria: Rect, row_index: usize) -> Rect {
        let x = criteria.x + 1 + FIELD_COL + OPERATOR_COL;
        Rect {
            x: x.min(criteria.right().saturating_sub(1)),
            y: criteria.y + 1 + row_index as u16,
            width: criteria.right().saturating_sub(x + 1),
            height: 1,
        }
    }

    fn draw_overlay(&self, frame: &mut Frame<'_>, state: &AppState) {
        match state.ui.overlay {
            Overlay::Help => self.help.render(frame, frame.area()),
            Overlay::None => {}
        }
    }
}

/// ---------------------------------------------------------------------------
/// layout
/// ---------------------------------------------------------------------------
impl UiRenderer {
    fn form_areas(state: &AppState, content: Rect) -> FormAreas {
        let banner_height = state.ui.messages.len() as u16;
        let criteria_height = state.criteria.rows().len() as u16 + 2;
        let [banner, to_user, criteria, controls, contacts] = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Length(criteria_height),
            Constraint::Length(1),
            Constraint::Min(5),
        ])
        .areas(content);
        FormAreas {
            banner,
            to_user,
            criteria,
            controls,
            contacts,
        }
    }
}
