//! src/model/lookup.rs
//! ============================================================================
//! # Lookup: Typeahead Search State
//!
//! State behind every user-lookup field: the query text, the results popup,
//! the committed selection, and the single in-flight guard shared by all
//! fields. The guard is owned here (not by a process-wide flag) so the
//! controller can reason about it and tests can drive it directly.
//!
//! Staleness is handled with a generation counter: clearing a field or
//! committing a selection bumps the generation, and a completion tagged with
//! an older generation still releases the guard but must not touch the list.

use compact_str::CompactString;

use crate::directory::client::UserRecord;

/// Which lookup field a typeahead event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTarget {
    /// The destination-user picker at the top of the form.
    ToUser,
    /// The value cell of a criteria row, keyed by row id.
    Criteria(u32),
}

/// One entry in the results popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupRow {
    User(UserRecord),
    /// Rendered when the search came back empty; never selectable.
    NoMatches,
}

impl LookupRow {
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// A committed pick: the record id travels with the request, the name is
/// what the operator sees in the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSelection {
    pub id: CompactString,
    pub name: CompactString,
}

/// Per-field typeahead state.
#[derive(Debug, Clone, Default)]
pub struct LookupField {
    pub query: CompactString,
    /// Whether the results popup is visible.
    pub open: bool,
    pub rows: Vec<LookupRow>,
    pub cursor: usize,
    pub selection: Option<UserSelection>,
}

impl LookupField {
    /// Closes the popup and forgets the hits; query and selection stay.
    pub fn close(&mut self) {
        self.open = false;
        self.rows.clear();
        self.cursor = 0;
    }

    /// Full reset: popup, query, and selection.
    pub fn clear(&mut self) {
        self.close();
        self.query.clear();
        self.selection = None;
    }

    /// Replaces popup content with fresh hits, or the no-matches placeholder.
    pub fn apply_results(&mut self, users: Vec<UserRecord>) {
        self.rows = if users.is_empty() {
            vec![LookupRow::NoMatches]
        } else {
            users.into_iter().map(LookupRow::User).collect()
        };
        self.cursor = 0;
    }

    /// The record under the popup cursor, if it is selectable.
    #[must_use]
    pub fn hit_under_cursor(&self) -> Option<&UserRecord> {
        match self.rows.get(self.cursor) {
            Some(LookupRow::User(user)) => Some(user),
            _ => None,
        }
    }

    /// Commits a pick: selection set, visible text replaced by the user's
    /// name, popup closed.
    pub fn choose(&mut self, user: &UserRecord) {
        self.selection = Some(UserSelection {
            id: CompactString::new(&user.id),
            name: CompactString::new(&user.name),
        });
        self.query = CompactString::new(&user.name);
        self.close();
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if !self.rows.is_empty() {
            self.cursor = (self.cursor + 1).min(self.rows.len() - 1);
        }
    }
}

/// The shared typeahead guard plus the destination-user field.
///
/// One search may be in flight at a time across *all* lookup fields; a
/// trigger that arrives while the guard is held is dropped, never queued.
#[derive(Debug, Default)]
pub struct LookupState {
    pub to_user: LookupField,
    searching: bool,
    generation: u64,
}

impl LookupState {
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Takes the guard. Returns the generation to tag the request with, or
    /// `None` when a search is already in flight.
    pub fn begin_search(&mut self) -> Option<u64> {
        if self.searching {
            return None;
        }
        self.searching = true;
        self.generation += 1;
        Some(self.generation)
    }

    /// Marks any in-flight result stale without touching the guard.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Releases the guard. This happens on success, failure, and timeout
    /// alike; a completion that never cleared the guard would wedge every
    /// lookup field for the rest of the session.
    ///
    /// Returns whether the completion is current and may be rendered.
    pub fn complete(&mut self, generation: u64) -> bool {
        self.searching = false;
        generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            username: format!("{id}@example.com"),
            user_type: "Standard".to_string(),
        }
    }

    #[test]
    fn test_guard_admits_one_search_at_a_time() {
        let mut lookup = LookupState::default();

        let first = lookup.begin_search();
        assert_eq!(first, Some(1));
        assert!(lookup.is_searching());

        // Second trigger while in flight is refused
        assert_eq!(lookup.begin_search(), None);

        assert!(lookup.complete(1));
        assert!(!lookup.is_searching());

        // Guard is free again afterwards
        assert_eq!(lookup.begin_search(), Some(2));
    }

    #[test]
    fn test_guard_releases_even_for_stale_completions() {
        let mut lookup = LookupState::default();
        let generation = lookup.begin_search().unwrap();

        lookup.invalidate();

        // Stale: must not render, but the guard still comes back
        assert!(!lookup.complete(generation));
        assert!(!lookup.is_searching());
        assert!(lookup.begin_search().is_some());
    }

    #[test]
    fn test_empty_results_become_placeholder_row() {
        let mut field = LookupField::default();
        field.open = true;

        field.apply_results(Vec::new());

        assert_eq!(field.rows, vec![LookupRow::NoMatches]);
        assert!(field.hit_under_cursor().is_none());
    }

    #[test]
    fn test_choose_writes_id_and_name_and_closes() {
        let mut field = LookupField::default();
        field.query = CompactString::new("ann");
        field.open = true;
        field.apply_results(vec![user("u-001", "Ann Alvarez")]);

        let picked = field.hit_under_cursor().cloned().unwrap();
        field.choose(&picked);

        let selection = field.selection.as_ref().unwrap();
        assert_eq!(selection.id, "u-001");
        assert_eq!(selection.name, "Ann Alvarez");
        assert_eq!(field.query, "Ann Alvarez");
        assert!(!field.open);
        assert!(field.rows.is_empty());
    }

    #[test]
    fn test_cursor_stays_inside_rows() {
        let mut field = LookupField::default();
        field.apply_results(vec![user("u-1", "A"), user("u-2", "B")]);

        field.cursor_up();
        assert_eq!(field.cursor, 0);
        field.cursor_down();
        field.cursor_down();
        field.cursor_down();
        assert_eq!(field.cursor, 1);
    }
}
