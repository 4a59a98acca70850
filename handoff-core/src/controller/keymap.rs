//! ``src/controller/keymap.rs``
//! ============================================================================
//! # Key Bindings
//!
//! Pure translation from terminal events to [`Action`]s. The mapping reads
//! application state but never mutates it; every state change goes through
//! the dispatcher so the keymap stays trivially testable.
//!
//! Routing priority:
//! 1. global chords (Ctrl-C / Ctrl-Q quit, Ctrl-F find, Ctrl-T transfer)
//! 2. the help overlay, which swallows everything except its close keys
//! 3. an open typeahead popup, which captures Up/Down/Enter
//! 4. the focused control

use crate::controller::actions::Action;
use crate::model::app_state::AppState;
use crate::model::ui_state::{Focus, Overlay};
use crossterm::event::{Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::trace;

/// Maps a raw terminal event to an action, or `None` when the event is
/// irrelevant (key releases, mouse noise, unbound keys).
pub fn map_event(state: &AppState, event: &TermEvent) -> Option<Action> {
    match event {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => map_key(state, *key),
        TermEvent::Resize(width, height) => Some(Action::Resize(*width, *height)),
        _ => None,
    }
}

/// Maps a key press against the current focus and overlay.
pub fn map_key(state: &AppState, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return map_control_chord(state, key.code);
    }

    // Help swallows the keyboard until dismissed.
    if state.ui.overlay == Overlay::Help {
        return match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q' | '?') => {
                Some(Action::CloseOverlay)
            }
            _ => Some(Action::NoOp),
        };
    }

    match key.code {
        KeyCode::F(1) => return Some(Action::ToggleHelp),
        KeyCode::Tab => return Some(Action::FocusNext),
        KeyCode::BackTab => return Some(Action::FocusPrev),
        KeyCode::Esc => return Some(Action::CloseOverlay),
        _ => {}
    }

    // An open popup owns list navigation and Enter.
    if let Some(target) = state.focused_lookup_target()
        && state.lookup_field(target).is_some_and(|field| field.open)
    {
        match key.code {
            KeyCode::Up => return Some(Action::LookupCursorUp),
            KeyCode::Down => return Some(Action::LookupCursorDown),
            KeyCode::Enter => return Some(Action::LookupSelect),
            _ => {}
        }
    }

    match state.ui.focus {
        Focus::ToUser | Focus::CriteriaValue(_) => map_text_key(key),
        Focus::CriteriaField(row) => map_field_selector_key(state, row, key),
        Focus::CriteriaOperator(row) => map_operator_selector_key(row, key),
        Focus::Contacts => map_contacts_key(key),
    }
}

fn map_control_chord(state: &AppState, code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('c' | 'q') => Some(Action::Quit),
        KeyCode::Char('f') => Some(Action::StartContactSearch),
        KeyCode::Char('t') => Some(Action::StartTransfer),
        KeyCode::Char('n') => Some(Action::AddCriteriaRow),
        KeyCode::Char('d') => focused_criteria_row(state).map(Action::RemoveCriteriaRow),
        _ => {
            trace!("Unbound control chord: {:?}", code);
            None
        }
    }
}

fn map_text_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char(c) => Some(Action::TypeChar(c)),
        KeyCode::Backspace => Some(Action::Backspace),
        _ => {
            trace!("Unbound text-field key: {:?}", key.code);
            None
        }
    }
}

/// Left/Right (or Up/Down) walk the field list like a dropdown.
fn map_field_selector_key(state: &AppState, row: u32, key: KeyEvent) -> Option<Action> {
    let current = state.criteria.row(row)?.field;
    match key.code {
        KeyCode::Left | KeyCode::Up => Some(Action::CriteriaFieldChanged {
            row,
            field: current.prev(),
        }),
        KeyCode::Right | KeyCode::Down => Some(Action::CriteriaFieldChanged {
            row,
            field: current.next(),
        }),
        _ => None,
    }
}

fn map_operator_selector_key(row: u32, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Left | KeyCode::Up => Some(Action::CriteriaOperatorCycle {
            row,
            forward: false,
        }),
        KeyCode::Right | KeyCode::Down => Some(Action::CriteriaOperatorCycle {
            row,
            forward: true,
        }),
        _ => None,
    }
}

fn map_contacts_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ContactCursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ContactCursorDown),
        KeyCode::Char(' ') => Some(Action::ToggleContactSelected),
        KeyCode::Char('a') => Some(Action::ToggleSelectAll),
        KeyCode::Char('t') => Some(Action::ToggleTransferTasks),
        KeyCode::Char('e') => Some(Action::ToggleSendEmail),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => {
            trace!("Unbound contacts key: {:?}", key.code);
            None
        }
    }
}

fn focused_criteria_row(state: &AppState) -> Option<u32> {
    match state.ui.focus {
        Focus::CriteriaField(row) | Focus::CriteriaOperator(row) | Focus::CriteriaValue(row) => {
            Some(row)
        }
        Focus::ToUser | Focus::Contacts => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::criteria::FilterField;
    use std::sync::Arc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn state() -> AppState {
        AppState::new(Arc::new(Config::default()))
    }

    #[test]
    fn test_ctrl_c_quits_from_any_focus() {
        let mut app = state();
        assert!(matches!(map_key(&app, ctrl('c')), Some(Action::Quit)));

        app.ui.focus = Focus::Contacts;
        assert!(matches!(map_key(&app, ctrl('c')), Some(Action::Quit)));

        app.ui.overlay = Overlay::Help;
        assert!(matches!(map_key(&app, ctrl('c')), Some(Action::Quit)));
    }

    #[test]
    fn test_typing_reaches_the_focused_text_field() {
        let app = state();
        assert!(matches!(
            map_key(&app, press(KeyCode::Char('a'))),
            Some(Action::TypeChar('a'))
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Backspace)),
            Some(Action::Backspace)
        ));
    }

    #[test]
    fn test_help_overlay_swallows_keys() {
        let mut app = state();
        app.ui.overlay = Overlay::Help;

        assert!(matches!(
            map_key(&app, press(KeyCode::Char('x'))),
            Some(Action::NoOp)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Esc)),
            Some(Action::CloseOverlay)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::F(1))),
            Some(Action::CloseOverlay)
        ));
    }

    #[test]
    fn test_open_popup_captures_enter_and_arrows() {
        let mut app = state();
        app.lookup.to_user.open = true;

        assert!(matches!(
            map_key(&app, press(KeyCode::Enter)),
            Some(Action::LookupSelect)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Down)),
            Some(Action::LookupCursorDown)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Up)),
            Some(Action::LookupCursorUp)
        ));
    }

    #[test]
    fn test_field_selector_cycles_with_arrows() {
        let mut app = state();
        let row = app.criteria.first_row_id().unwrap();
        app.ui.focus = Focus::CriteriaField(row);

        let action = map_key(&app, press(KeyCode::Right));
        assert!(matches!(
            action,
            Some(Action::CriteriaFieldChanged {
                field: FilterField::Account,
                ..
            })
        ));
    }

    #[test]
    fn test_contacts_focus_binds_selection_keys() {
        let mut app = state();
        app.ui.focus = Focus::Contacts;

        assert!(matches!(
            map_key(&app, press(KeyCode::Char(' '))),
            Some(Action::ToggleContactSelected)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Char('a'))),
            Some(Action::ToggleSelectAll)
        ));
        assert!(matches!(
            map_key(&app, press(KeyCode::Char('t'))),
            Some(Action::ToggleTransferTasks)
        ));
    }

    #[test]
    fn test_remove_row_chord_requires_criteria_focus() {
        let mut app = state();
        assert!(map_key(&app, ctrl('d')).is_none());

        let row = app.criteria.first_row_id().unwrap();
        app.ui.focus = Focus::CriteriaValue(row);
        assert!(matches!(
            map_key(&app, ctrl('d')),
            Some(Action::RemoveCriteriaRow(id)) if id == row
        ));
    }

    #[test]
    fn test_release_events_are_ignored() {
        let app = state();
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;
        assert!(map_event(&app, &TermEvent::Key(key)).is_none());
    }
}
