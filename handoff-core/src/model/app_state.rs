//! src/model/app_state.rs
//! ============================================================================
//! # AppState: Single Owner of All Mutable State
//!
//! Owned by the action dispatcher and mutated only on the event-loop thread.
//! Background tasks never see this struct; they report through the action
//! channel and the dispatcher folds their results in here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use compact_str::CompactString;
use tracing::debug;

use crate::config::Config;
use crate::directory::client::UserScope;
use crate::model::criteria::{CriteriaState, ValueMode};
use crate::model::lookup::{LookupField, LookupState, LookupTarget};
use crate::model::transfer::TransferState;
use crate::model::ui_state::{Focus, UIState};

/// A background task the status bar can report on.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub id: u64,
    pub description: CompactString,
    pub started_at: Instant,
}

#[derive(Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lookup: LookupState,
    pub criteria: CriteriaState,
    pub transfer: TransferState,
    pub ui: UIState,
    tasks: HashMap<u64, TaskInfo>,
    next_task_id: u64,
}

impl AppState {
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        let criteria = CriteriaState::new(config.ui.max_criteria_rows);
        let ui = UIState::new(config.ui.max_messages);
        Self {
            config,
            lookup: LookupState::default(),
            criteria,
            transfer: TransferState::default(),
            ui,
            tasks: HashMap::new(),
            next_task_id: 1,
        }
    }

    /// Registers a background task and returns its id.
    pub fn add_task(&mut self, description: impl Into<CompactString>) -> u64 {
        let id = self.next_task_id;
        self.next_task_id += 1;
        let info = TaskInfo {
            id,
            description: description.into(),
            started_at: Instant::now(),
        };
        debug!(task_id = id, description = %info.description, "task started");
        self.tasks.insert(id, info);
        id
    }

    /// Unregisters a finished task.
    pub fn finish_task(&mut self, id: u64) {
        if let Some(info) = self.tasks.remove(&id) {
            debug!(
                task_id = id,
                elapsed_ms = info.started_at.elapsed().as_millis() as u64,
                "task finished"
            );
        }
    }

    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Resolves a lookup target to its field, if the row still exists.
    #[must_use]
    pub fn lookup_field(&self, target: LookupTarget) -> Option<&LookupField> {
        match target {
            LookupTarget::ToUser => Some(&self.lookup.to_user),
            LookupTarget::Criteria(id) => self.criteria.row(id).map(|r| &r.lookup),
        }
    }

    pub fn lookup_field_mut(&mut self, target: LookupTarget) -> Option<&mut LookupField> {
        match target {
            LookupTarget::ToUser => Some(&mut self.lookup.to_user),
            LookupTarget::Criteria(id) => self.criteria.row_mut(id).map(|r| &mut r.lookup),
        }
    }

    /// The directory slice a target searches: criteria rows search their
    /// field's scope, the destination picker searches unscoped.
    #[must_use]
    pub fn lookup_scope(&self, target: LookupTarget) -> Option<UserScope> {
        match target {
            LookupTarget::ToUser => None,
            LookupTarget::Criteria(id) => self.criteria.row(id).and_then(|r| r.field.user_scope()),
        }
    }

    /// The lookup target under focus, if the focused cell is one.
    #[must_use]
    pub fn focused_lookup_target(&self) -> Option<LookupTarget> {
        match self.ui.focus {
            Focus::ToUser => Some(LookupTarget::ToUser),
            Focus::CriteriaValue(id) => {
                let row = self.criteria.row(id)?;
                (row.mode == ValueMode::UserLookup).then_some(LookupTarget::Criteria(id))
            }
            _ => None,
        }
    }

    /// Moves focus to the next/previous cell in form order.
    pub fn cycle_focus(&mut self, forward: bool) {
        let order = self.focus_order();
        if order.is_empty() {
            return;
        }
        let current = order
            .iter()
            .position(|f| *f == self.ui.focus)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.ui.focus = order[next];
    }

    /// Puts focus back on a cell that still exists after a row removal.
    pub fn normalize_focus(&mut self) {
        let order = self.focus_order();
        if !order.contains(&self.ui.focus) {
            self.ui.focus = Focus::ToUser;
        }
    }

    fn focus_order(&self) -> Vec<Focus> {
        let mut order = vec![Focus::ToUser];
        for row in self.criteria.rows() {
            order.push(Focus::CriteriaField(row.id));
            order.push(Focus::CriteriaOperator(row.id));
            order.push(Focus::CriteriaValue(row.id));
        }
        order.push(Focus::Contacts);
        order
    }
}
