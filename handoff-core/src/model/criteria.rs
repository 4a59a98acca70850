//! src/model/criteria.rs
//! ============================================================================
//! # Criteria: Contact Filter Rows
//!
//! The filter form is a stack of rows, each `field / operator / value`.
//! Picking one of the three user-scope fields flips the row's value cell
//! into user-lookup mode and pins the operator to equality; picking a plain
//! field releases it again. The transitions are idempotent and clear only
//! what a mode change invalidates: moving between two plain fields keeps
//! the typed value.

use compact_str::CompactString;

use crate::directory::client::{CriterionSpec, UserScope};
use crate::model::lookup::LookupField;

/// Everything a criteria row's field picker can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterField {
    #[default]
    Name,
    Account,
    Email,
    OwnerAlias,
    ActiveUsers,
    InactiveUsers,
    CommunityUsers,
}

impl FilterField {
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::Account,
        Self::Email,
        Self::OwnerAlias,
        Self::ActiveUsers,
        Self::InactiveUsers,
        Self::CommunityUsers,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Account => "Account",
            Self::Email => "Email",
            Self::OwnerAlias => "Owner Alias",
            Self::ActiveUsers => "Active Users",
            Self::InactiveUsers => "Inactive Users",
            Self::CommunityUsers => "Community Users",
        }
    }

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Account => "account",
            Self::Email => "email",
            Self::OwnerAlias => "owner-alias",
            Self::ActiveUsers => "active-users",
            Self::InactiveUsers => "inactive-users",
            Self::CommunityUsers => "community-users",
        }
    }

    /// `Some` for the three special values that flip the row into
    /// user-lookup mode.
    #[must_use]
    pub const fn user_scope(self) -> Option<UserScope> {
        match self {
            Self::ActiveUsers => Some(UserScope::ActiveUsers),
            Self::InactiveUsers => Some(UserScope::InactiveUsers),
            Self::CommunityUsers => Some(UserScope::CommunityUsers),
            _ => None,
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Comparison operators offered by the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Equals,
    NotEquals,
    Contains,
    StartsWith,
}

impl Operator {
    pub const ALL: [Self; 4] = [
        Self::Equals,
        Self::NotEquals,
        Self::Contains,
        Self::StartsWith,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not equal",
            Self::Contains => "contains",
            Self::StartsWith => "starts with",
        }
    }

    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Equals => "eq",
            Self::NotEquals => "ne",
            Self::Contains => "contains",
            Self::StartsWith => "starts",
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// How the value cell of a row is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueMode {
    #[default]
    FreeText,
    UserLookup,
}

/// One filter row.
#[derive(Debug, Default)]
pub struct CriteriaRow {
    pub id: u32,
    pub field: FilterField,
    pub operator: Operator,
    /// Set while the field is a user scope; the operator is pinned to
    /// equality and cycling it is refused.
    pub operator_locked: bool,
    pub mode: ValueMode,
    pub text_value: CompactString,
    pub lookup: LookupField,
}

impl CriteriaRow {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Applies a field change, flipping the value cell's mode when needed.
    ///
    /// Entering lookup mode always clears the value (a typed string makes no
    /// sense against a user id) and re-picking a scope while already in
    /// lookup mode clears the previous pick. Leaving lookup mode restores
    /// free text and clears the stale user id. A plain-to-plain change
    /// touches nothing but the field.
    pub fn set_field(&mut self, field: FilterField) {
        self.field = field;
        if field.user_scope().is_some() {
            self.mode = ValueMode::UserLookup;
            self.operator = Operator::Equals;
            self.operator_locked = true;
            self.text_value.clear();
            self.lookup.clear();
        } else if self.operator_locked {
            self.mode = ValueMode::FreeText;
            self.operator_locked = false;
            self.text_value.clear();
            self.lookup.clear();
        }
    }

    /// Cycles the operator unless the row is pinned to equality.
    pub fn cycle_operator(&mut self, forward: bool) {
        if self.operator_locked {
            return;
        }
        self.operator = if forward {
            self.operator.next()
        } else {
            self.operator.prev()
        };
    }

    #[must_use]
    pub fn value_is_empty(&self) -> bool {
        match self.mode {
            ValueMode::FreeText => self.text_value.trim().is_empty(),
            ValueMode::UserLookup => self.lookup.selection.is_none(),
        }
    }

    /// Wire form of this row, or `None` when the value is empty and the row
    /// should not constrain the search.
    #[must_use]
    pub fn criterion(&self) -> Option<CriterionSpec> {
        if self.value_is_empty() {
            return None;
        }
        let value = match self.mode {
            ValueMode::FreeText => self.text_value.trim().to_string(),
            ValueMode::UserLookup => self
                .lookup
                .selection
                .as_ref()
                .map(|s| s.id.to_string())?,
        };
        Some(CriterionSpec {
            field: self.field.wire_name().to_string(),
            operator: self.operator.wire_name().to_string(),
            value,
        })
    }
}

/// The whole filter form.
#[derive(Debug)]
pub struct CriteriaState {
    rows: Vec<CriteriaRow>,
    next_id: u32,
    max_rows: usize,
}

impl CriteriaState {
    /// Starts with a single empty row, like the page always rendered one.
    #[must_use]
    pub fn new(max_rows: usize) -> Self {
        let mut state = Self {
            rows: Vec::new(),
            next_id: 1,
            max_rows: max_rows.max(1),
        };
        state.add_row();
        state
    }

    /// Appends a row; refuses beyond the configured cap.
    pub fn add_row(&mut self) -> Option<u32> {
        if self.rows.len() >= self.max_rows {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.rows.push(CriteriaRow::new(id));
        Some(id)
    }

    /// Removes a row; the last row never goes away.
    pub fn remove_row(&mut self, id: u32) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|r| r.id != id);
        self.rows.len() != before
    }

    #[must_use]
    pub fn rows(&self) -> &[CriteriaRow] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, id: u32) -> Option<&CriteriaRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn row_mut(&mut self, id: u32) -> Option<&mut CriteriaRow> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    #[must_use]
    pub fn first_row_id(&self) -> Option<u32> {
        self.rows.first().map(|r| r.id)
    }

    /// Wire form of every non-empty row.
    #[must_use]
    pub fn specs(&self) -> Vec<CriterionSpec> {
        self.rows.iter().filter_map(CriteriaRow::criterion).collect()
    }
}
