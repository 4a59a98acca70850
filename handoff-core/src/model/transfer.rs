//! src/model/transfer.rs
//! ============================================================================
//! # Transfer: Workflow Phase, Control Enablement, Result Table
//!
//! Carries everything downstream of the lookup form: which long-running
//! operation is active, which of the three controls (find / transfer /
//! transfer options) currently accept input, the found contacts with their
//! selection marks, and the two transfer options.
//!
//! The enablement transitions are asymmetric on purpose: finishing a
//! transfer re-enables find and transfer but leaves the options checkboxes
//! alone, while finishing a contact search re-enables all three.

use crate::directory::client::ContactRecord;

/// Which long-running operation the console is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPhase {
    #[default]
    Idle,
    FindingContacts,
    Transferring,
}

/// Enable/disable state of the three workflow controls.
///
/// Everything starts disabled; controls come alive as the operator supplies
/// a destination user and runs searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlState {
    pub find_enabled: bool,
    pub transfer_enabled: bool,
    pub options_enabled: bool,
}

/// The two transfer options, both off until chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferOptions {
    pub transfer_open_tasks: bool,
    pub send_notification_email: bool,
}

/// One row of the results table.
#[derive(Debug, Clone)]
pub struct ContactRow {
    pub record: ContactRecord,
    pub selected: bool,
}

/// Search results and transfer workflow state.
#[derive(Debug, Default)]
pub struct TransferState {
    pub phase: WorkflowPhase,
    pub controls: ControlState,
    pub options: TransferOptions,
    pub contacts: Vec<ContactRow>,
    /// Becomes true after the first completed search; the results header
    /// stays up from then on, even across empty result sets.
    pub results_header: bool,
    pub cursor: usize,
}

impl TransferState {
    /// Caption for the find control in the current phase.
    #[must_use]
    pub const fn find_caption(&self) -> &'static str {
        match self.phase {
            WorkflowPhase::FindingContacts => "Searching…",
            _ => "Find",
        }
    }

    /// Caption for the transfer control in the current phase.
    #[must_use]
    pub const fn transfer_caption(&self) -> &'static str {
        match self.phase {
            WorkflowPhase::Transferring => "Transferring…",
            _ => "Transfer Selected",
        }
    }

    /// Contact search left the station: both action controls go dark.
    pub fn begin_contact_search(&mut self) {
        self.phase = WorkflowPhase::FindingContacts;
        self.controls.find_enabled = false;
        self.controls.transfer_enabled = false;
    }

    /// Contact search came back (either way): everything re-enables and the
    /// results header is committed.
    pub fn finish_contact_search(&mut self) {
        self.phase = WorkflowPhase::Idle;
        self.results_header = true;
        self.controls.find_enabled = true;
        self.controls.transfer_enabled = true;
        self.controls.options_enabled = true;
    }

    /// Transfer submitted: both action controls go dark.
    pub fn begin_transfer(&mut self) {
        self.phase = WorkflowPhase::Transferring;
        self.controls.find_enabled = false;
        self.controls.transfer_enabled = false;
    }

    /// Transfer finished (either way): action controls return, options
    /// untouched.
    pub fn finish_transfer(&mut self) {
        self.phase = WorkflowPhase::Idle;
        self.controls.transfer_enabled = true;
        self.controls.find_enabled = true;
    }

    /// Replaces the table content; selection marks reset.
    pub fn set_contacts(&mut self, contacts: Vec<ContactRecord>) {
        self.contacts = contacts
            .into_iter()
            .map(|record| ContactRow {
                record,
                selected: false,
            })
            .collect();
        self.cursor = 0;
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.contacts.iter().filter(|c| c.selected).count()
    }

    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        self.contacts
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.record.id.clone())
            .collect()
    }

    /// Toggles the row under the cursor.
    pub fn toggle_current(&mut self) {
        if let Some(row) = self.contacts.get_mut(self.cursor) {
            row.selected = !row.selected;
        }
    }

    /// Checkbox-header semantics: everything on unless everything already
    /// was, in which case everything off.
    pub fn toggle_select_all(&mut self) {
        if self.contacts.is_empty() {
            return;
        }
        let all_selected = self.contacts.iter().all(|c| c.selected);
        for row in &mut self.contacts {
            row.selected = !all_selected;
        }
    }

    /// Drops rows whose ids were just transferred away.
    pub fn remove_contacts(&mut self, ids: &[String]) {
        self.contacts.retain(|c| !ids.contains(&c.record.id));
        if self.cursor >= self.contacts.len() {
            self.cursor = self.contacts.len().saturating_sub(1);
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if !self.contacts.is_empty() {
            self.cursor = (self.cursor + 1).min(self.contacts.len() - 1);
        }
    }
}
