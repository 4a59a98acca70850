//! src/controller/actions.rs
//! ============================================================================
//! # Actions: Centralized Application Commands
//!
//! Defines the `Action` enum, which represents all user inputs and internal
//! events the console responds to. Keyboard events are translated into these
//! by the keymap; background tasks send their completions through the same
//! channel, so the dispatcher is the only place state ever changes.

use crate::directory::client::{ContactRecord, DirectoryError, TransferReport, UserRecord};
use crate::model::criteria::FilterField;
use crate::model::lookup::LookupTarget;

/// Represents a high-level action that the application can perform.
/// This abstracts away raw terminal events into meaningful commands.
#[derive(Debug, Clone)]
pub enum Action {
    /// Append a criteria row to the filter form.
    AddCriteriaRow,

    /// Delete a character from the focused editable cell.
    Backspace,

    /// Close the active overlay, or the focused popup, or dismiss banners.
    CloseOverlay,

    /// Move the results-table cursor down.
    ContactCursorDown,

    /// Move the results-table cursor up.
    ContactCursorUp,

    /// A contact search finished.
    ContactSearchLoaded {
        task_id: u64,
        outcome: Result<Vec<ContactRecord>, DirectoryError>,
    },

    /// Set a criteria row's field, applying the lookup/free-text transition.
    CriteriaFieldChanged { row: u32, field: FilterField },

    /// Cycle a criteria row's operator (no-op while pinned).
    CriteriaOperatorCycle { row: u32, forward: bool },

    /// Move focus to the next form cell.
    FocusNext,

    /// Move focus to the previous form cell.
    FocusPrev,

    /// A typeahead user search finished.
    LookupLoaded {
        task_id: u64,
        target: LookupTarget,
        generation: u64,
        outcome: Result<Vec<UserRecord>, DirectoryError>,
    },

    /// Move the popup cursor down.
    LookupCursorDown,

    /// Move the popup cursor up.
    LookupCursorUp,

    /// Commit the popup row under the cursor as the field's selection.
    LookupSelect,

    /// No operation. Used when an event is consumed but no state change is needed.
    NoOp,

    /// Remove a criteria row from the filter form.
    RemoveCriteriaRow(u32),

    /// A terminal resize event.
    Resize(u16, u16),

    /// Run the contact search for the current criteria.
    StartContactSearch,

    /// Submit the selected contacts for transfer.
    StartTransfer,

    /// An internal tick event for periodic updates (spinner frames).
    Tick,

    /// Toggle selection of the contact row under the cursor.
    ToggleContactSelected,

    /// Toggle the help overlay visibility.
    ToggleHelp,

    /// Toggle select-all over the results table.
    ToggleSelectAll,

    /// Toggle the "send notification email" option.
    ToggleSendEmail,

    /// Toggle the "transfer open tasks" option.
    ToggleTransferTasks,

    /// A transfer submission finished.
    TransferFinished {
        task_id: u64,
        contact_ids: Vec<String>,
        outcome: Result<TransferReport, DirectoryError>,
    },

    /// Type a character into the focused editable cell.
    TypeChar(char),

    /// Quit the application.
    Quit,
}
