//! src/directory/memory.rs
//! ============================================================================
//! # InMemoryDirectory: Built-In Sample Backend
//!
//! Serves `--demo` runs and unit tests without a live directory service.
//! Matching rules mirror what the HTTP service does: case-insensitive
//! substring match on name/username for users, ANDed criteria for contacts,
//! deterministic name ordering, hard result caps.

use tokio::sync::Mutex;

use async_trait::async_trait;

use crate::directory::client::{
    ContactQuery, ContactRecord, CriterionSpec, DirectoryClient, DirectoryError, TransferReport,
    TransferRequest, UserQuery, UserRecord, UserScope,
};

const USER_TYPE_STANDARD: &str = "Standard";
const USER_TYPE_COMMUNITY: &str = "Community";

#[derive(Debug, Clone)]
struct SampleUser {
    record: UserRecord,
    active: bool,
}

/// Fully self-contained directory used for demos and tests.
#[derive(Debug)]
pub struct InMemoryDirectory {
    users: Vec<SampleUser>,
    contacts: Mutex<Vec<ContactRecord>>,
}

impl InMemoryDirectory {
    /// Empty directory; seed it with [`Self::with_users`] / [`Self::with_contacts`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            contacts: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_users(mut self, users: Vec<(UserRecord, bool)>) -> Self {
        self.users = users
            .into_iter()
            .map(|(record, active)| SampleUser { record, active })
            .collect();
        self
    }

    #[must_use]
    pub fn with_contacts(mut self, contacts: Vec<ContactRecord>) -> Self {
        self.contacts = Mutex::new(contacts);
        self
    }

    /// The demo data set: a small org with a couple of departed owners
    /// whose books need reassigning.
    #[must_use]
    pub fn with_sample_data() -> Self {
        let users = vec![
            sample_user("u-001", "Ann Alvarez", USER_TYPE_STANDARD, true),
            sample_user("u-002", "Andre Benton", USER_TYPE_STANDARD, true),
            sample_user("u-003", "Dana Whitfield", USER_TYPE_STANDARD, true),
            sample_user("u-004", "Marcus Okafor", USER_TYPE_STANDARD, true),
            sample_user("u-005", "Priya Raman", USER_TYPE_STANDARD, true),
            sample_user("u-006", "Sven Larsson", USER_TYPE_STANDARD, false),
            sample_user("u-007", "Harriet Cole", USER_TYPE_STANDARD, false),
            sample_user("u-008", "Noor Haddad", USER_TYPE_COMMUNITY, true),
            sample_user("u-009", "Felix Grant", USER_TYPE_COMMUNITY, true),
        ];

        let contacts = vec![
            sample_contact("c-001", "Beatrice Quint", "Northwind Traders", "u-006"),
            sample_contact("c-002", "Tomas Herrera", "Northwind Traders", "u-006"),
            sample_contact("c-003", "Ingrid Mathers", "Acme Corp", "u-006"),
            sample_contact("c-004", "Yusuf Demir", "Acme Corp", "u-006"),
            sample_contact("c-005", "Claudia Ferreira", "Globex", "u-006"),
            sample_contact("c-006", "Owen Blackwood", "Globex", "u-007"),
            sample_contact("c-007", "Mira Castellanos", "Initech", "u-007"),
            sample_contact("c-008", "Janek Kowalski", "Initech", "u-007"),
            sample_contact("c-009", "Lucia Moretti", "Northwind Traders", "u-003"),
            sample_contact("c-010", "Ethan Caldwell", "Acme Corp", "u-003"),
            sample_contact("c-011", "Sofia Lindqvist", "Globex", "u-004"),
            sample_contact("c-012", "Ravi Chandran", "Initech", "u-004"),
        ];

        Self::new().with_users(users).with_contacts(contacts)
    }

    fn user(&self, id: &str) -> Option<&SampleUser> {
        self.users.iter().find(|u| u.record.id == id)
    }

    fn selectable(&self, user: &SampleUser, scope: Option<UserScope>) -> bool {
        match scope {
            None => user.active,
            Some(UserScope::ActiveUsers) => {
                user.active && user.record.user_type == USER_TYPE_STANDARD
            }
            Some(UserScope::InactiveUsers) => !user.active,
            Some(UserScope::CommunityUsers) => user.record.user_type == USER_TYPE_COMMUNITY,
        }
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, DirectoryError> {
        let needle = query.text.to_lowercase();
        let mut hits: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|u| self.selectable(u, query.scope))
            .filter(|u| {
                u.record.name.to_lowercase().contains(&needle)
                    || u.record.username.to_lowercase().contains(&needle)
            })
            .map(|u| u.record.clone())
            .collect();

        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits.truncate(query.limit);
        Ok(hits)
    }

    async fn search_contacts(
        &self,
        query: &ContactQuery,
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        let contacts = self.contacts.lock().await;
        let mut hits: Vec<ContactRecord> = contacts
            .iter()
            .filter(|c| query.criteria.iter().all(|spec| criterion_matches(spec, c)))
            .cloned()
            .collect();

        hits.sort_by(|a, b| a.name.cmp(&b.name));
        hits.truncate(query.limit);
        Ok(hits)
    }

    async fn transfer_contacts(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReport, DirectoryError> {
        let Some(new_owner) = self.user(&request.to_user_id) else {
            return Err(DirectoryError::Api {
                status: 404,
                message: format!("no such user: {}", request.to_user_id),
            });
        };
        let new_alias = user_alias(&new_owner.record.name);
        let new_owner_id = new_owner.record.id.clone();

        let mut contacts = self.contacts.lock().await;
        let mut transferred = 0;
        for contact in contacts.iter_mut() {
            if request.contact_ids.iter().any(|id| *id == contact.id) {
                contact.owner_id = new_owner_id.clone();
                contact.owner_alias = new_alias.clone();
                transferred += 1;
            }
        }

        Ok(TransferReport {
            transferred,
            tasks_transferred: if request.transfer_open_tasks {
                transferred
            } else {
                0
            },
            emails_sent: if request.send_notification_email {
                transferred
            } else {
                0
            },
        })
    }
}

fn criterion_matches(spec: &CriterionSpec, contact: &ContactRecord) -> bool {
    // The three user-scope fields carry a selected user id as their value.
    if matches!(
        spec.field.as_str(),
        "active-users" | "inactive-users" | "community-users"
    ) {
        return contact.owner_id == spec.value;
    }

    let actual = match spec.field.as_str() {
        "name" => &contact.name,
        "account" => &contact.account,
        "email" => &contact.email,
        "owner-alias" => &contact.owner_alias,
        _ => return false,
    };
    operator_matches(&spec.operator, actual, &spec.value)
}

fn operator_matches(operator: &str, actual: &str, expected: &str) -> bool {
    let actual = actual.to_lowercase();
    let expected = expected.to_lowercase();
    match operator {
        "eq" => actual == expected,
        "ne" => actual != expected,
        "contains" => actual.contains(&expected),
        "starts" => actual.starts_with(&expected),
        _ => false,
    }
}

fn sample_user(id: &str, name: &str, user_type: &str, active: bool) -> (UserRecord, bool) {
    let username = format!(
        "{}@example.com",
        name.to_lowercase().replace(' ', ".")
    );
    (
        UserRecord {
            id: id.to_string(),
            name: name.to_string(),
            username,
            user_type: user_type.to_string(),
        },
        active,
    )
}

fn sample_contact(id: &str, name: &str, account: &str, owner_id: &str) -> ContactRecord {
    let owner_alias = match owner_id {
        "u-003" => "dwhitfie",
        "u-004" => "mokafor",
        "u-006" => "slarsson",
        "u-007" => "hcole",
        _ => "unknown",
    };
    let email = format!(
        "{}@{}.example",
        name.to_lowercase().replace(' ', "."),
        account.to_lowercase().replace(' ', "-")
    );
    ContactRecord {
        id: id.to_string(),
        name: name.to_string(),
        account: account.to_string(),
        email,
        owner_id: owner_id.to_string(),
        owner_alias: owner_alias.to_string(),
    }
}

/// Salesforce-style alias: first initial plus last name, eight chars max.
/// A single-word name is used whole.
fn user_alias(name: &str) -> String {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or("");
    let alias: String = match parts.next_back() {
        Some(last) => first.chars().take(1).chain(last.chars()).collect(),
        None => first.to_string(),
    };
    alias.to_lowercase().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(text: &str, scope: Option<UserScope>) -> UserQuery {
        UserQuery {
            text: text.to_string(),
            scope,
            limit: 8,
        }
    }

    #[tokio::test]
    async fn test_unscoped_search_returns_only_active_users() {
        let dir = InMemoryDirectory::with_sample_data();
        let hits = dir.search_users(&query("a", None)).await.unwrap();

        assert!(!hits.is_empty());
        assert!(hits.iter().all(|u| u.id != "u-006"), "inactive Sven leaked");
        // Deterministic ordering by name
        let names: Vec<&str> = hits.iter().map(|u| u.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn test_scope_filters_slice_the_directory() {
        let dir = InMemoryDirectory::with_sample_data();

        let inactive = dir
            .search_users(&query("", Some(UserScope::InactiveUsers)))
            .await
            .unwrap();
        let ids: Vec<&str> = inactive.iter().map(|u| u.id.as_str()).collect();
        // Name order: Harriet Cole before Sven Larsson
        assert_eq!(ids, vec!["u-007", "u-006"]);

        let community = dir
            .search_users(&query("", Some(UserScope::CommunityUsers)))
            .await
            .unwrap();
        assert_eq!(community.len(), 2);
        assert!(community.iter().all(|u| u.user_type == "Community"));

        let active_standard = dir
            .search_users(&query("", Some(UserScope::ActiveUsers)))
            .await
            .unwrap();
        assert!(active_standard.iter().all(|u| u.user_type == "Standard"));
        assert!(active_standard.iter().all(|u| u.id != "u-006"));
    }

    #[tokio::test]
    async fn test_case_insensitive_match_on_name_and_username() {
        let dir = InMemoryDirectory::with_sample_data();

        let by_name = dir.search_users(&query("ANN", None)).await.unwrap();
        assert!(by_name.iter().any(|u| u.name == "Ann Alvarez"));

        let by_username = dir.search_users(&query("priya.raman", None)).await.unwrap();
        assert!(by_username.iter().any(|u| u.name == "Priya Raman"));
    }

    #[tokio::test]
    async fn test_limit_caps_hits() {
        let dir = InMemoryDirectory::with_sample_data();
        let mut q = query("a", None);
        q.limit = 2;
        let hits = dir.search_users(&q).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_contact_criteria_are_anded() {
        let dir = InMemoryDirectory::with_sample_data();
        let q = ContactQuery {
            criteria: vec![
                CriterionSpec {
                    field: "account".to_string(),
                    operator: "eq".to_string(),
                    value: "Northwind Traders".to_string(),
                },
                CriterionSpec {
                    field: "owner-alias".to_string(),
                    operator: "eq".to_string(),
                    value: "slarsson".to_string(),
                },
            ],
            limit: 50,
        };
        let hits = dir.search_contacts(&q).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|c| c.account == "Northwind Traders"));
        assert!(hits.iter().all(|c| c.owner_alias == "slarsson"));
    }

    #[tokio::test]
    async fn test_user_scope_criterion_matches_owner_id() {
        let dir = InMemoryDirectory::with_sample_data();
        let q = ContactQuery {
            criteria: vec![CriterionSpec {
                field: "inactive-users".to_string(),
                operator: "eq".to_string(),
                value: "u-006".to_string(),
            }],
            limit: 50,
        };
        let hits = dir.search_contacts(&q).await.unwrap();
        assert_eq!(hits.len(), 5);
        assert!(hits.iter().all(|c| c.owner_id == "u-006"));
    }

    #[tokio::test]
    async fn test_transfer_reassigns_owner_and_reports_counts() {
        let dir = InMemoryDirectory::with_sample_data();
        let report = dir
            .transfer_contacts(&TransferRequest {
                contact_ids: vec!["c-001".to_string(), "c-002".to_string()],
                to_user_id: "u-003".to_string(),
                transfer_open_tasks: true,
                send_notification_email: false,
                idempotency_key: "k-1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(report.transferred, 2);
        assert_eq!(report.tasks_transferred, 2);
        assert_eq!(report.emails_sent, 0);

        let q = ContactQuery {
            criteria: vec![CriterionSpec {
                field: "owner-alias".to_string(),
                operator: "eq".to_string(),
                value: "dwhitfie".to_string(),
            }],
            limit: 50,
        };
        let now_danas = dir.search_contacts(&q).await.unwrap();
        assert!(now_danas.iter().any(|c| c.id == "c-001"));
        assert!(now_danas.iter().any(|c| c.id == "c-002"));
    }

    #[tokio::test]
    async fn test_transfer_skips_unknown_contacts() {
        let dir = InMemoryDirectory::with_sample_data();
        let report = dir
            .transfer_contacts(&TransferRequest {
                contact_ids: vec!["c-001".to_string(), "c-404".to_string()],
                to_user_id: "u-005".to_string(),
                transfer_open_tasks: false,
                send_notification_email: false,
                idempotency_key: "k-2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(report.transferred, 1);
    }

    #[tokio::test]
    async fn test_transfer_to_unknown_user_is_an_api_error() {
        let dir = InMemoryDirectory::with_sample_data();
        let err = dir
            .transfer_contacts(&TransferRequest {
                contact_ids: vec!["c-001".to_string()],
                to_user_id: "u-999".to_string(),
                transfer_open_tasks: false,
                send_notification_email: false,
                idempotency_key: "k-3".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Api { status: 404, .. }));
    }

    #[test]
    fn test_alias_is_first_initial_plus_last_name() {
        assert_eq!(user_alias("Dana Whitfield"), "dwhitfie");
        assert_eq!(user_alias("Priya Raman"), "praman");
        assert_eq!(user_alias("Cher"), "cher");
    }
}
