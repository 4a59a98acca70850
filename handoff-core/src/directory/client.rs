//! src/directory/client.rs
//! ============================================================================
//! # DirectoryClient: Remote Directory Abstraction
//!
//! The trait every backend implements, plus the wire-level records and the
//! error type that rides the action channel back into the UI. The controller
//! only ever sees this trait; whether hits come from a live HTTP service or
//! the built-in sample set is a startup decision.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which slice of the directory a user search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserScope {
    ActiveUsers,
    InactiveUsers,
    CommunityUsers,
}

impl UserScope {
    /// Wire value, matching the serde representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveUsers => "active-users",
            Self::InactiveUsers => "inactive-users",
            Self::CommunityUsers => "community-users",
        }
    }

    /// Human-facing label for pickers and headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ActiveUsers => "Active Users",
            Self::InactiveUsers => "Inactive Users",
            Self::CommunityUsers => "Community Users",
        }
    }
}

/// A directory user as returned by a typeahead search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub username: String,
    pub user_type: String,
}

/// A contact as returned by a criteria search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub account: String,
    pub email: String,
    pub owner_id: String,
    pub owner_alias: String,
}

/// Parameters of one typeahead user search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserQuery {
    /// Raw text as typed; matching is up to the backend.
    pub text: String,

    /// `None` searches active users of any type (the destination picker).
    pub scope: Option<UserScope>,

    /// Hard cap on hits returned.
    pub limit: usize,
}

/// One filter criterion in wire form.
///
/// Field and operator travel as their wire names so the backend never needs
/// to know about UI-side enums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub field: String,
    pub operator: String,
    pub value: String,
}

/// Parameters of one contact search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactQuery {
    /// Criteria are ANDed together. An empty list matches everything.
    pub criteria: Vec<CriterionSpec>,
    pub limit: usize,
}

/// A transfer submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub contact_ids: Vec<String>,
    pub to_user_id: String,
    pub transfer_open_tasks: bool,
    pub send_notification_email: bool,
    /// Lets the backend dedupe a resubmitted batch.
    pub idempotency_key: String,
}

/// What the backend reports after a transfer batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReport {
    pub transferred: usize,
    pub tasks_transferred: usize,
    pub emails_sent: usize,
}

/// Directory failures as seen by the controller.
///
/// Clonable on purpose: these are carried inside actions and may be logged
/// and rendered from more than one place.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The deadline wrapped around the call elapsed first.
    #[error("directory request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure before any HTTP status was seen.
    #[error("directory transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("directory service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the body did not parse.
    #[error("failed to decode directory response: {0}")]
    Decode(String),
}

/// Async interface to the user/contact directory.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Typeahead search over directory users.
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, DirectoryError>;

    /// Criteria search over contacts.
    async fn search_contacts(
        &self,
        query: &ContactQuery,
    ) -> Result<Vec<ContactRecord>, DirectoryError>;

    /// Reassign the given contacts to a new owner.
    async fn transfer_contacts(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReport, DirectoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_wire_values_are_kebab_case() {
        let json = serde_json::to_string(&UserScope::ActiveUsers).unwrap();
        assert_eq!(json, "\"active-users\"");
        assert_eq!(UserScope::CommunityUsers.as_str(), "community-users");

        let parsed: UserScope = serde_json::from_str("\"inactive-users\"").unwrap();
        assert_eq!(parsed, UserScope::InactiveUsers);
    }

    #[test]
    fn test_error_messages_carry_status() {
        let err = DirectoryError::Api {
            status: 503,
            message: "maintenance window".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance window"));
    }
}
