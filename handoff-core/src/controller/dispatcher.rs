//! ``src/controller/dispatcher.rs``
//! ============================================================================
//! # Action Dispatcher
//!
//! The one place application state changes. Every keystroke, task completion,
//! and tick arrives here as an [`Action`]; the dispatcher mutates [`AppState`]
//! and spawns background work, never the other way around.
//!
//! The transfer workflow runs through fixed stations:
//! pick a destination user (typeahead), optionally narrow with criteria rows,
//! Find matching contacts, select rows, Transfer. Controls gate each station:
//! Find unlocks when a destination is chosen, Transfer and the options unlock
//! when a contact search completes, and both action controls go dark while a
//! search or transfer is in flight.
//!
//! Typeahead rules, which are easy to get wrong:
//! - at most one user search is in flight; keystrokes during that window are
//!   dropped, not queued
//! - the guard is released on success, failure, and timeout alike
//! - clearing the input or committing a pick bumps the request generation, so
//!   a completion that lands afterwards is discarded instead of resurrecting
//!   the popup

use crate::controller::actions::Action;
use crate::directory::client::{
    ContactQuery, ContactRecord, DirectoryClient, DirectoryError, TransferReport, TransferRequest,
    UserQuery, UserRecord,
};
use crate::model::app_state::AppState;
use crate::model::criteria::FilterField;
use crate::model::lookup::LookupTarget;
use crate::model::transfer::WorkflowPhase;
use crate::model::ui_state::{Focus, Overlay, RedrawFlag, Severity};
use crate::tasks::{contact_search, transfer_task, user_search};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Whether the main loop should keep running after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    Continue,
    Quit,
}

/// Owns the application state and applies actions to it.
///
/// Background tasks never touch state directly; they report back through the
/// action channel and their completions pass through [`handle`] like any
/// other action.
///
/// [`handle`]: ActionDispatcher::handle
pub struct ActionDispatcher {
    state: AppState,
    client: Arc<dyn DirectoryClient>,
    action_tx: UnboundedSender<Action>,
}

impl ActionDispatcher {
    pub fn new(
        state: AppState,
        client: Arc<dyn DirectoryClient>,
        action_tx: UnboundedSender<Action>,
    ) -> Self {
        Self {
            state,
            client,
            action_tx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Applies one action to the state.
    pub fn handle(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Quit => {
                info!("Quit requested");
                return DispatchResult::Quit;
            }

            Action::NoOp => {}

            Action::Tick => self.on_tick(),

            Action::Resize(width, height) => {
                debug!("Terminal resized to {}x{}", width, height);
                self.state.ui.request_redraw(RedrawFlag::All);
            }

            Action::FocusNext => self.on_cycle_focus(true),
            Action::FocusPrev => self.on_cycle_focus(false),

            Action::ToggleHelp => {
                self.state.ui.overlay = match self.state.ui.overlay {
                    Overlay::Help => Overlay::None,
                    Overlay::None => Overlay::Help,
                };
                self.state.ui.request_redraw(RedrawFlag::All);
            }

            Action::CloseOverlay => self.on_close_overlay(),

            Action::TypeChar(c) => self.on_type_char(c),
            Action::Backspace => self.on_backspace(),

            Action::LookupCursorUp => self.on_lookup_cursor(false),
            Action::LookupCursorDown => self.on_lookup_cursor(true),
            Action::LookupSelect => self.on_lookup_select(),
            Action::LookupLoaded {
                task_id,
                target,
                generation,
                outcome,
            } => self.on_lookup_loaded(task_id, target, generation, outcome),

            Action::AddCriteriaRow => self.on_add_criteria_row(),
            Action::RemoveCriteriaRow(row) => self.on_remove_criteria_row(row),
            Action::CriteriaFieldChanged { row, field } => {
                self.on_criteria_field_changed(row, field);
            }
            Action::CriteriaOperatorCycle { row, forward } => {
                if let Some(row) = self.state.criteria.row_mut(row) {
                    row.cycle_operator(forward);
                    self.state.ui.request_redraw(RedrawFlag::Main);
                }
            }

            Action::StartContactSearch => self.on_start_contact_search(),
            Action::ContactSearchLoaded { task_id, outcome } => {
                self.on_contact_search_loaded(task_id, outcome);
            }

            Action::StartTransfer => self.on_start_transfer(),
            Action::TransferFinished {
                task_id,
                contact_ids,
                outcome,
            } => self.on_transfer_finished(task_id, contact_ids, outcome),

            Action::ContactCursorUp => {
                self.state.transfer.cursor_up();
                self.state.ui.request_redraw(RedrawFlag::Main);
            }
            Action::ContactCursorDown => {
                self.state.transfer.cursor_down();
                self.state.ui.request_redraw(RedrawFlag::Main);
            }
            Action::ToggleContactSelected => {
                self.state.transfer.toggle_current();
                self.state.ui.request_redraw(RedrawFlag::Main);
            }
            Action::ToggleSelectAll => {
                self.state.transfer.toggle_select_all();
                self.state.ui.request_redraw(RedrawFlag::Main);
            }

            Action::ToggleTransferTasks => {
                if self.state.transfer.controls.options_enabled {
                    let options = &mut self.state.transfer.options;
                    options.transfer_open_tasks = !options.transfer_open_tasks;
                    self.state.ui.request_redraw(RedrawFlag::Main);
                }
            }
            Action::ToggleSendEmail => {
                if self.state.transfer.controls.options_enabled {
                    let options = &mut self.state.transfer.options;
                    options.send_notification_email = !options.send_notification_email;
                    self.state.ui.request_redraw(RedrawFlag::Main);
                }
            }
        }

        DispatchResult::Continue
    }

    fn on_tick(&mut self) {
        let busy = self.state.lookup.is_searching()
            || self.state.transfer.phase != WorkflowPhase::Idle;
        if busy {
            self.state.ui.advance_spinner();
        }
    }

    /// Moving focus away blurs the current typeahead field: its popup closes,
    /// though query and selection survive.
    fn on_cycle_focus(&mut self, forward: bool) {
        if let Some(target) = self.state.focused_lookup_target()
            && let Some(field) = self.state.lookup_field_mut(target)
            && field.open
        {
            field.close();
        }
        self.state.cycle_focus(forward);
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    /// Escape semantics: overlay first, then an open popup, then banners.
    fn on_close_overlay(&mut self) {
        if self.state.ui.overlay != Overlay::None {
            self.state.ui.overlay = Overlay::None;
            self.state.ui.request_redraw(RedrawFlag::All);
            return;
        }
        if let Some(target) = self.state.focused_lookup_target()
            && let Some(field) = self.state.lookup_field_mut(target)
            && field.open
        {
            field.close();
            self.state.ui.request_redraw(RedrawFlag::All);
            return;
        }
        self.state.ui.dismiss_messages();
    }

    fn on_type_char(&mut self, c: char) {
        if let Some(target) = self.state.focused_lookup_target() {
            if let Some(field) = self.state.lookup_field_mut(target) {
                field.query.push(c);
            }
            self.after_lookup_edit(target);
            return;
        }
        if let Focus::CriteriaValue(row) = self.state.ui.focus
            && let Some(row) = self.state.criteria.row_mut(row)
        {
            row.text_value.push(c);
            self.state.ui.request_redraw(RedrawFlag::Main);
        }
    }

    fn on_backspace(&mut self) {
        if let Some(target) = self.state.focused_lookup_target() {
            if let Some(field) = self.state.lookup_field_mut(target) {
                field.query.pop();
            }
            self.after_lookup_edit(target);
            return;
        }
        if let Focus::CriteriaValue(row) = self.state.ui.focus
            && let Some(row) = self.state.criteria.row_mut(row)
        {
            row.text_value.pop();
            self.state.ui.request_redraw(RedrawFlag::Main);
        }
    }

    /// The typeahead entry point, run after every edit of a lookup query.
    ///
    /// Empty input hides the popup and forgets the pick; for the destination
    /// field it also revokes Find and the transfer options. Non-empty input
    /// starts a search unless one is already in flight, in which case the
    /// keystroke is dropped and the in-flight reply will still render for its
    /// own, older query.
    fn after_lookup_edit(&mut self, target: LookupTarget) {
        let min_len = self.state.config.ui.min_query_len;
        let Some(field) = self.state.lookup_field(target) else {
            return;
        };
        let text = field.query.trim().to_string();

        if text.chars().count() < min_len {
            if let Some(field) = self.state.lookup_field_mut(target) {
                field.close();
                field.selection = None;
            }
            if target == LookupTarget::ToUser {
                self.state.transfer.controls.find_enabled = false;
                self.state.transfer.controls.options_enabled = false;
            }
            // A reply still in flight must not repopulate the hidden popup.
            self.state.lookup.invalidate();
            self.state.ui.request_redraw(RedrawFlag::All);
            return;
        }

        let Some(generation) = self.state.lookup.begin_search() else {
            debug!(?target, "Typeahead already in flight; keystroke dropped");
            return;
        };

        if let Some(field) = self.state.lookup_field_mut(target) {
            field.open = true;
        }
        self.state.transfer.controls.transfer_enabled = false;
        self.state.transfer.controls.options_enabled = false;

        let scope = self.state.lookup_scope(target);
        let task_id = self.state.add_task("user search");
        user_search::spawn_user_search(
            Arc::clone(&self.client),
            self.action_tx.clone(),
            task_id,
            target,
            generation,
            UserQuery {
                text,
                scope,
                limit: self.state.config.remote.max_hits,
            },
            self.state.config.remote.search_timeout,
        );
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_lookup_cursor(&mut self, down: bool) {
        if let Some(target) = self.state.focused_lookup_target()
            && let Some(field) = self.state.lookup_field_mut(target)
            && field.open
        {
            if down {
                field.cursor_down();
            } else {
                field.cursor_up();
            }
            self.state.ui.request_redraw(RedrawFlag::Overlay);
        }
    }

    /// Commits the popup row under the cursor.
    ///
    /// Picking a destination unlocks Find and revokes any earlier transfer
    /// readiness; a pick inside a criteria row touches nothing but that row.
    fn on_lookup_select(&mut self) {
        let Some(target) = self.state.focused_lookup_target() else {
            return;
        };
        let chosen = self
            .state
            .lookup_field(target)
            .filter(|field| field.open)
            .and_then(|field| field.hit_under_cursor().cloned());
        let Some(user) = chosen else {
            return;
        };

        if let Some(field) = self.state.lookup_field_mut(target) {
            field.choose(&user);
        }
        // The pick supersedes whatever an in-flight search would render.
        self.state.lookup.invalidate();

        match target {
            LookupTarget::ToUser => {
                info!(user_id = %user.id, "Destination user selected");
                self.state.transfer.controls.find_enabled = true;
                self.state.transfer.controls.transfer_enabled = false;
            }
            LookupTarget::Criteria(row) => {
                debug!(row, user_id = %user.id, "Criteria user selected");
            }
        }
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_lookup_loaded(
        &mut self,
        task_id: u64,
        target: LookupTarget,
        generation: u64,
        outcome: Result<Vec<UserRecord>, DirectoryError>,
    ) {
        self.state.finish_task(task_id);

        // Guard release is unconditional; freshness only decides rendering.
        let fresh = self.state.lookup.complete(generation);
        if !fresh {
            debug!(task_id, generation, "Stale typeahead reply discarded");
            self.state.ui.request_redraw(RedrawFlag::All);
            return;
        }

        match outcome {
            Ok(users) => {
                if let Some(field) = self.state.lookup_field_mut(target)
                    && field.open
                {
                    field.apply_results(users);
                }
            }
            Err(err) => {
                // Typeahead failures stay quiet: the popup simply does not
                // populate and the user is free to retry.
                warn!(task_id, error = %err, "User search failed; popup left as-is");
            }
        }
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_add_criteria_row(&mut self) {
        match self.state.criteria.add_row() {
            Some(row) => {
                debug!(row, "Criteria row added");
                self.state.ui.focus = Focus::CriteriaField(row);
                self.state.ui.request_redraw(RedrawFlag::All);
            }
            None => {
                self.state.ui.push_message(
                    Severity::Warning,
                    format!(
                        "No more than {} criteria rows.",
                        self.state.config.ui.max_criteria_rows
                    ),
                );
            }
        }
    }

    fn on_remove_criteria_row(&mut self, row: u32) {
        if self.state.criteria.remove_row(row) {
            debug!(row, "Criteria row removed");
            self.state.normalize_focus();
            self.state.ui.request_redraw(RedrawFlag::All);
        }
    }

    fn on_criteria_field_changed(&mut self, row: u32, field: FilterField) {
        if let Some(row_state) = self.state.criteria.row_mut(row) {
            row_state.set_field(field);
            self.state.ui.request_redraw(RedrawFlag::Main);
        }
    }

    fn on_start_contact_search(&mut self) {
        if self.state.transfer.phase != WorkflowPhase::Idle {
            debug!("Contact search ignored; workflow busy");
            return;
        }
        if !self.state.transfer.controls.find_enabled {
            self.state.ui.push_message(
                Severity::Warning,
                "Select a destination user before searching.",
            );
            return;
        }

        // Banners from the previous workflow round are stale once a new one
        // starts.
        self.state.ui.dismiss_messages();
        self.state.transfer.begin_contact_search();
        let task_id = self.state.add_task("contact search");
        let criteria = self.state.criteria.specs();
        info!(task_id, criteria = criteria.len(), "Contact search requested");

        contact_search::spawn_contact_search(
            Arc::clone(&self.client),
            self.action_tx.clone(),
            task_id,
            ContactQuery {
                criteria,
                limit: self.state.config.remote.max_contacts,
            },
            self.state.config.remote.request_timeout,
        );
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_contact_search_loaded(
        &mut self,
        task_id: u64,
        outcome: Result<Vec<ContactRecord>, DirectoryError>,
    ) {
        self.state.finish_task(task_id);
        // Controls come back whatever happened; a wedged Find button would
        // end the session.
        self.state.transfer.finish_contact_search();

        match outcome {
            Ok(contacts) if contacts.is_empty() => {
                self.state.transfer.set_contacts(contacts);
                self.state
                    .ui
                    .push_message(Severity::Info, "No contacts matched your criteria.");
            }
            Ok(contacts) => {
                let found = contacts.len();
                self.state.transfer.set_contacts(contacts);
                self.state.ui.push_message(
                    Severity::Success,
                    format!("Found {found} contact(s). Select the ones to transfer."),
                );
            }
            Err(err) => {
                // Previous results stay on screen so a flaky backend does not
                // wipe the admin's working set.
                self.state
                    .ui
                    .push_message(Severity::Error, format!("Contact search failed: {err}"));
            }
        }
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_start_transfer(&mut self) {
        if self.state.transfer.phase != WorkflowPhase::Idle {
            debug!("Transfer ignored; workflow busy");
            return;
        }
        if !self.state.transfer.controls.transfer_enabled {
            self.state
                .ui
                .push_message(Severity::Warning, "Run Find before transferring.");
            return;
        }
        let Some(destination) = self.state.lookup.to_user.selection.clone() else {
            self.state
                .ui
                .push_message(Severity::Warning, "Select a destination user first.");
            return;
        };
        let contact_ids = self.state.transfer.selected_ids();
        if contact_ids.is_empty() {
            self.state.ui.push_message(
                Severity::Warning,
                "Select at least one contact to transfer.",
            );
            return;
        }

        self.state.ui.dismiss_messages();
        self.state.transfer.begin_transfer();
        let task_id = self.state.add_task("contact transfer");
        info!(
            task_id,
            contacts = contact_ids.len(),
            to_user = %destination.id,
            "Transfer requested"
        );

        transfer_task::spawn_transfer(
            Arc::clone(&self.client),
            self.action_tx.clone(),
            task_id,
            TransferRequest {
                contact_ids,
                to_user_id: destination.id.to_string(),
                transfer_open_tasks: self.state.transfer.options.transfer_open_tasks,
                send_notification_email: self.state.transfer.options.send_notification_email,
                idempotency_key: format!("tr_{}", Uuid::new_v4().simple()),
            },
            self.state.config.remote.request_timeout,
        );
        self.state.ui.request_redraw(RedrawFlag::All);
    }

    fn on_transfer_finished(
        &mut self,
        task_id: u64,
        contact_ids: Vec<String>,
        outcome: Result<TransferReport, DirectoryError>,
    ) {
        self.state.finish_task(task_id);
        self.state.transfer.finish_transfer();

        match outcome {
            Ok(report) if report.transferred == contact_ids.len() => {
                self.state.transfer.remove_contacts(&contact_ids);
                let mut text = format!("Transferred {} contact(s)", report.transferred);
                if let Some(destination) = &self.state.lookup.to_user.selection {
                    text.push_str(&format!(" to {}", destination.name));
                }
                text.push('.');
                if report.tasks_transferred > 0 {
                    text.push_str(&format!(
                        " {} open task(s) moved.",
                        report.tasks_transferred
                    ));
                }
                if report.emails_sent > 0 {
                    text.push_str(&format!(" {} notification email(s) sent.", report.emails_sent));
                }
                self.state.ui.push_message(Severity::Success, text);
            }
            Ok(report) => {
                // Partial result: keep the rows so the admin can see what is
                // left and retry.
                self.state.ui.push_message(
                    Severity::Warning,
                    format!(
                        "Transferred {} of {} contact(s); the rest were skipped.",
                        report.transferred,
                        contact_ids.len()
                    ),
                );
            }
            Err(err) => {
                self.state
                    .ui
                    .push_message(Severity::Error, format!("Transfer failed: {err}"));
            }
        }
        self.state.ui.request_redraw(RedrawFlag::All);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::directory::client::UserScope;
    use crate::model::criteria::{Operator, ValueMode};
    use crate::model::lookup::{LookupRow, UserSelection};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    /// Test double whose user search blocks until released, for pinning down
    /// in-flight behavior.
    struct GatedUsers {
        calls: AtomicUsize,
        gate: Notify,
        users: Vec<UserRecord>,
        fail: bool,
        last_query: StdMutex<Option<UserQuery>>,
    }

    impl GatedUsers {
        fn new(users: Vec<UserRecord>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                users,
                fail: false,
                last_query: StdMutex::new(None),
            }
        }

        fn failing() -> Self {
            let mut stub = Self::new(Vec::new());
            stub.fail = true;
            stub
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn release(&self) {
            self.gate.notify_one();
        }

        fn last_query(&self) -> Option<UserQuery> {
            self.last_query.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DirectoryClient for GatedUsers {
        async fn search_users(
            &self,
            query: &UserQuery,
        ) -> Result<Vec<UserRecord>, DirectoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());
            self.gate.notified().await;
            if self.fail {
                Err(DirectoryError::Transport("connection reset".to_string()))
            } else {
                Ok(self.users.clone())
            }
        }

        async fn search_contacts(
            &self,
            _query: &ContactQuery,
        ) -> Result<Vec<ContactRecord>, DirectoryError> {
            Err(DirectoryError::Transport("not wired".to_string()))
        }

        async fn transfer_contacts(
            &self,
            _request: &TransferRequest,
        ) -> Result<TransferReport, DirectoryError> {
            Err(DirectoryError::Transport("not wired".to_string()))
        }
    }

    /// Test double that answers immediately, for workflow lifecycle tests.
    struct StubDirectory {
        users: Vec<UserRecord>,
        contacts: Vec<ContactRecord>,
        report: Result<TransferReport, DirectoryError>,
        last_request: StdMutex<Option<TransferRequest>>,
    }

    impl StubDirectory {
        fn new() -> Self {
            Self {
                users: vec![user("u-1", "Ann Alvarez")],
                contacts: vec![contact("c-1", "Beatrice Quint"), contact("c-2", "Tomas Herrera")],
                report: Ok(TransferReport {
                    transferred: 2,
                    tasks_transferred: 0,
                    emails_sent: 0,
                }),
                last_request: StdMutex::new(None),
            }
        }

        fn last_request(&self) -> Option<TransferRequest> {
            self.last_request.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DirectoryClient for StubDirectory {
        async fn search_users(
            &self,
            _query: &UserQuery,
        ) -> Result<Vec<UserRecord>, DirectoryError> {
            Ok(self.users.clone())
        }

        async fn search_contacts(
            &self,
            _query: &ContactQuery,
        ) -> Result<Vec<ContactRecord>, DirectoryError> {
            Ok(self.contacts.clone())
        }

        async fn transfer_contacts(
            &self,
            request: &TransferRequest,
        ) -> Result<TransferReport, DirectoryError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.report.clone()
        }
    }

    fn user(id: &str, name: &str) -> UserRecord {
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            username: format!("{id}@example.com"),
            user_type: "Standard".to_string(),
        }
    }

    fn contact(id: &str, name: &str) -> ContactRecord {
        ContactRecord {
            id: id.to_string(),
            name: name.to_string(),
            account: "Acme Corp".to_string(),
            email: format!("{id}@acme.example"),
            owner_id: "u-9".to_string(),
            owner_alias: "inactive".to_string(),
        }
    }

    fn dispatcher(
        client: Arc<dyn DirectoryClient>,
    ) -> (ActionDispatcher, UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = AppState::new(Arc::new(Config::default()));
        (ActionDispatcher::new(state, client, tx), rx)
    }

    /// Lets already-spawned tasks run up to their next await point.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// Feeds one task completion back through the dispatcher.
    async fn drain_one(d: &mut ActionDispatcher, rx: &mut UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("expected a completion action");
        d.handle(action);
    }

    fn drain_pending(d: &mut ActionDispatcher, rx: &mut UnboundedReceiver<Action>) {
        while let Ok(action) = rx.try_recv() {
            d.handle(action);
        }
    }

    #[tokio::test]
    async fn test_overlapping_input_issues_no_second_search() {
        let client = Arc::new(GatedUsers::new(vec![user("1", "Ann")]));
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('a'));
        settle().await;
        assert_eq!(client.calls(), 1);
        assert!(d.state().lookup.is_searching());

        // Guard held: this keystroke updates the text but fires nothing.
        d.handle(Action::TypeChar('n'));
        settle().await;
        assert_eq!(client.calls(), 1);
        assert_eq!(d.state().lookup.to_user.query.as_str(), "an");

        client.release();
        drain_one(&mut d, &mut rx).await;
        assert!(!d.state().lookup.is_searching());
        assert_eq!(d.state().lookup.to_user.rows.len(), 1);

        // Guard released: typing searches again.
        d.handle(Action::TypeChar('n'));
        settle().await;
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_search_releases_guard_without_banner() {
        let client = Arc::new(GatedUsers::failing());
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('a'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;

        assert!(!d.state().lookup.is_searching(), "guard must never wedge");
        assert!(d.state().ui.messages.is_empty(), "typeahead failures are silent");

        // The user can retry immediately.
        d.handle(Action::TypeChar('b'));
        settle().await;
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_result_renders_single_placeholder() {
        let client = Arc::new(GatedUsers::new(Vec::new()));
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('z'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;

        let field = &d.state().lookup.to_user;
        assert_eq!(field.rows, vec![LookupRow::NoMatches]);
        assert!(field.hit_under_cursor().is_none());

        // Selecting the placeholder commits nothing.
        d.handle(Action::LookupSelect);
        assert!(d.state().lookup.to_user.selection.is_none());
    }

    #[tokio::test]
    async fn test_selecting_destination_gates_controls() {
        let client = Arc::new(GatedUsers::new(vec![user("1", "Ann")]));
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('a'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;

        d.handle(Action::LookupSelect);

        let field = &d.state().lookup.to_user;
        let selection = field.selection.as_ref().expect("selection committed");
        assert_eq!(selection.id.as_str(), "1");
        assert_eq!(selection.name.as_str(), "Ann");
        assert_eq!(field.query.as_str(), "Ann");
        assert!(!field.open);

        assert!(d.state().transfer.controls.find_enabled);
        assert!(!d.state().transfer.controls.transfer_enabled);
    }

    #[tokio::test]
    async fn test_criteria_row_selection_stays_scoped_to_the_row() {
        let client = Arc::new(GatedUsers::new(vec![user("u-7", "Harriet Cole")]));
        let (mut d, mut rx) = dispatcher(client.clone());
        let row = d.state().criteria.first_row_id().unwrap();

        d.handle(Action::CriteriaFieldChanged {
            row,
            field: FilterField::ActiveUsers,
        });
        d.state_mut().ui.focus = Focus::CriteriaValue(row);

        d.handle(Action::TypeChar('h'));
        settle().await;
        // The row's scope rides along on the wire.
        assert_eq!(
            client.last_query().and_then(|q| q.scope),
            Some(UserScope::ActiveUsers)
        );

        client.release();
        drain_one(&mut d, &mut rx).await;
        d.handle(Action::LookupSelect);

        let row_state = d.state().criteria.row(row).unwrap();
        let selection = row_state.lookup.selection.as_ref().expect("row selection");
        assert_eq!(selection.id.as_str(), "u-7");

        // Row-scoped picks leave the workflow controls alone.
        assert!(!d.state().transfer.controls.find_enabled);
        assert!(!d.state().transfer.controls.transfer_enabled);
    }

    #[tokio::test]
    async fn test_clearing_destination_revokes_find_and_options() {
        let client = Arc::new(GatedUsers::new(vec![user("1", "Ann")]));
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('a'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;
        d.handle(Action::LookupSelect);
        assert!(d.state().lookup.to_user.selection.is_some());

        // "Ann" is three backspaces from empty; intermediate edits may fire
        // searches, the final empty edit must revoke everything.
        for _ in 0..3 {
            d.handle(Action::Backspace);
        }
        settle().await;
        client.release();
        settle().await;
        drain_pending(&mut d, &mut rx);

        let field = &d.state().lookup.to_user;
        assert!(field.query.is_empty());
        assert!(field.selection.is_none(), "cleared text clears the pick");
        assert!(!field.open);
        assert!(field.rows.is_empty(), "stale reply must not repopulate");
        assert!(!d.state().lookup.is_searching());
        assert!(!d.state().transfer.controls.find_enabled);
        assert!(!d.state().transfer.controls.options_enabled);
    }

    #[tokio::test]
    async fn test_clearing_criteria_text_leaves_global_controls_alone() {
        let client = Arc::new(GatedUsers::new(Vec::new()));
        let (mut d, mut rx) = dispatcher(client.clone());
        let row = d.state().criteria.first_row_id().unwrap();

        d.handle(Action::CriteriaFieldChanged {
            row,
            field: FilterField::InactiveUsers,
        });
        d.state_mut().ui.focus = Focus::CriteriaValue(row);
        d.state_mut().transfer.controls.find_enabled = true;

        d.handle(Action::TypeChar('x'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;
        d.handle(Action::Backspace);

        let row_state = d.state().criteria.row(row).unwrap();
        assert!(!row_state.lookup.open);
        assert!(d.state().transfer.controls.find_enabled, "global Find untouched");
    }

    #[tokio::test]
    async fn test_filter_mode_round_trip_resets_the_row() {
        let client = Arc::new(GatedUsers::new(Vec::new()));
        let (mut d, _rx) = dispatcher(client);
        let row = d.state().criteria.first_row_id().unwrap();

        d.handle(Action::CriteriaFieldChanged {
            row,
            field: FilterField::ActiveUsers,
        });
        {
            let row_state = d.state().criteria.row(row).unwrap();
            assert_eq!(row_state.mode, ValueMode::UserLookup);
            assert_eq!(row_state.operator, Operator::Equals);
            assert!(row_state.operator_locked);
        }

        // Pinned operator refuses to budge.
        d.handle(Action::CriteriaOperatorCycle { row, forward: true });
        assert_eq!(d.state().criteria.row(row).unwrap().operator, Operator::Equals);

        d.handle(Action::CriteriaFieldChanged {
            row,
            field: FilterField::Name,
        });
        let row_state = d.state().criteria.row(row).unwrap();
        assert_eq!(row_state.mode, ValueMode::FreeText);
        assert!(!row_state.operator_locked);
        assert!(row_state.text_value.is_empty());
        assert!(row_state.lookup.query.is_empty());
    }

    #[tokio::test]
    async fn test_contact_search_walks_the_lifecycle() {
        let client = Arc::new(StubDirectory::new());
        let (mut d, mut rx) = dispatcher(client);
        d.state_mut().lookup.to_user.selection = Some(UserSelection {
            id: "u-1".into(),
            name: "Ann Alvarez".into(),
        });
        d.state_mut().transfer.controls.find_enabled = true;

        d.handle(Action::StartContactSearch);
        assert_eq!(d.state().transfer.phase, WorkflowPhase::FindingContacts);
        assert_eq!(d.state().transfer.find_caption(), "Searching…");
        assert!(!d.state().transfer.controls.find_enabled);
        assert!(!d.state().transfer.controls.transfer_enabled);

        settle().await;
        drain_one(&mut d, &mut rx).await;

        assert_eq!(d.state().transfer.phase, WorkflowPhase::Idle);
        assert_eq!(d.state().transfer.find_caption(), "Find");
        assert!(d.state().transfer.results_header);
        assert_eq!(d.state().transfer.contacts.len(), 2);
        assert!(d.state().transfer.controls.find_enabled);
        assert!(d.state().transfer.controls.transfer_enabled);
        assert!(d.state().transfer.controls.options_enabled);

        let message = d.state().ui.messages.last().unwrap();
        assert_eq!(message.severity, Severity::Success);
        assert!(message.text.contains("Found 2"));
    }

    #[tokio::test]
    async fn test_transfer_success_removes_rows_and_reports() {
        let client = Arc::new(StubDirectory::new());
        let (mut d, mut rx) = dispatcher(client.clone());
        d.state_mut().lookup.to_user.selection = Some(UserSelection {
            id: "u-1".into(),
            name: "Ann Alvarez".into(),
        });
        d.state_mut().transfer.controls.find_enabled = true;

        d.handle(Action::StartContactSearch);
        settle().await;
        drain_one(&mut d, &mut rx).await;

        d.state_mut().ui.focus = Focus::Contacts;
        d.handle(Action::ToggleSelectAll);
        d.handle(Action::StartTransfer);
        assert_eq!(d.state().transfer.phase, WorkflowPhase::Transferring);
        assert_eq!(d.state().transfer.transfer_caption(), "Transferring…");

        settle().await;
        drain_one(&mut d, &mut rx).await;

        assert_eq!(d.state().transfer.phase, WorkflowPhase::Idle);
        assert!(d.state().transfer.contacts.is_empty(), "moved rows drop off");

        let request = client.last_request().expect("transfer reached the client");
        assert_eq!(request.to_user_id, "u-1");
        assert_eq!(request.contact_ids, vec!["c-1", "c-2"]);
        assert!(request.idempotency_key.starts_with("tr_"));

        let message = d.state().ui.messages.last().unwrap();
        assert_eq!(message.severity, Severity::Success);
        assert!(message.text.contains("Transferred 2"));
    }

    #[tokio::test]
    async fn test_partial_transfer_warns_and_keeps_rows() {
        let mut client = StubDirectory::new();
        client.report = Ok(TransferReport {
            transferred: 1,
            tasks_transferred: 0,
            emails_sent: 0,
        });
        let client = Arc::new(client);
        let (mut d, mut rx) = dispatcher(client);
        d.state_mut().lookup.to_user.selection = Some(UserSelection {
            id: "u-1".into(),
            name: "Ann Alvarez".into(),
        });
        d.state_mut().transfer.controls.find_enabled = true;

        d.handle(Action::StartContactSearch);
        settle().await;
        drain_one(&mut d, &mut rx).await;
        d.handle(Action::ToggleSelectAll);
        d.handle(Action::StartTransfer);
        settle().await;
        drain_one(&mut d, &mut rx).await;

        assert_eq!(d.state().transfer.contacts.len(), 2, "rows stay for retry");
        let message = d.state().ui.messages.last().unwrap();
        assert_eq!(message.severity, Severity::Warning);
        assert!(message.text.contains("1 of 2"));
    }

    #[tokio::test]
    async fn test_transfer_validations_warn_instead_of_firing() {
        let client = Arc::new(StubDirectory::new());
        let (mut d, _rx) = dispatcher(client);

        // Nothing found yet: Transfer is not armed.
        d.handle(Action::StartTransfer);
        let message = d.state().ui.messages.last().unwrap();
        assert_eq!(message.severity, Severity::Warning);
        assert!(message.text.contains("Run Find"));

        // Armed but nothing selected.
        d.state_mut().transfer.controls.transfer_enabled = true;
        d.state_mut().lookup.to_user.selection = Some(UserSelection {
            id: "u-1".into(),
            name: "Ann".into(),
        });
        d.handle(Action::StartTransfer);
        let message = d.state().ui.messages.last().unwrap();
        assert!(message.text.contains("at least one contact"));
        assert_eq!(d.state().transfer.phase, WorkflowPhase::Idle);
    }

    #[tokio::test]
    async fn test_moving_focus_blurs_the_popup() {
        let client = Arc::new(GatedUsers::new(vec![user("1", "Ann")]));
        let (mut d, mut rx) = dispatcher(client.clone());

        d.handle(Action::TypeChar('a'));
        settle().await;
        client.release();
        drain_one(&mut d, &mut rx).await;
        assert!(d.state().lookup.to_user.open);

        d.handle(Action::FocusNext);
        assert!(!d.state().lookup.to_user.open, "blur closes the popup");
        assert_ne!(d.state().ui.focus, Focus::ToUser);
    }

    #[tokio::test]
    async fn test_quit_action_stops_the_loop() {
        let client = Arc::new(StubDirectory::new());
        let (mut d, _rx) = dispatcher(client);
        assert_eq!(d.handle(Action::Quit), DispatchResult::Quit);
        assert_eq!(d.handle(Action::Tick), DispatchResult::Continue);
    }
}
