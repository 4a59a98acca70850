//! src/directory/http.rs
//! ============================================================================
//! # HttpDirectoryClient: Live Directory Backend
//!
//! Thin JSON-over-HTTP implementation of [`DirectoryClient`]. Deadlines are
//! applied by the calling task, not here, so every method runs the request to
//! completion and reports exactly what the service said.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use async_trait::async_trait;

use crate::directory::client::{
    ContactQuery, ContactRecord, DirectoryClient, DirectoryError, TransferReport, TransferRequest,
    UserQuery, UserRecord,
};
use crate::error::AppError;

const USERS_SEARCH_PATH: &str = "/api/v1/users/search";
const CONTACTS_SEARCH_PATH: &str = "/api/v1/contacts/search";
const CONTACTS_TRANSFER_PATH: &str = "/api/v1/contacts/transfer";

#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UserSearchResponse {
    users: Vec<UserRecord>,
}

#[derive(Debug, Deserialize)]
struct ContactSearchResponse {
    contacts: Vec<ContactRecord>,
}

/// Error body the directory service sends on non-2xx answers.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl HttpDirectoryClient {
    /// Builds a client for the given base URL.
    ///
    /// The URL is normalized (trailing slashes trimmed) and rejected outright
    /// if it is empty or lacks an http/https scheme, so a typo'd `--endpoint`
    /// fails at startup instead of on the first keystroke.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(AppError::invalid_endpoint(base_url, "empty URL"));
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(AppError::invalid_endpoint(
                base_url,
                "expected an http:// or https:// URL",
            ));
        }

        Ok(Self {
            base_url: trimmed.to_string(),
            http: reqwest::Client::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_id() -> String {
        format!("req_{}", Uuid::new_v4().simple())
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn search_users(&self, query: &UserQuery) -> Result<Vec<UserRecord>, DirectoryError> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.text.clone()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(scope) = query.scope {
            params.push(("scope", scope.as_str().to_string()));
        }

        debug!(query = %query.text, scope = ?query.scope, "GET {USERS_SEARCH_PATH}");

        let response = self
            .http
            .get(self.endpoint(USERS_SEARCH_PATH))
            .header("x-request-id", Self::request_id())
            .query(&params)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let body: UserSearchResponse = decode_json_response(response).await?;
        Ok(body.users)
    }

    async fn search_contacts(
        &self,
        query: &ContactQuery,
    ) -> Result<Vec<ContactRecord>, DirectoryError> {
        debug!(
            criteria = query.criteria.len(),
            limit = query.limit,
            "POST {CONTACTS_SEARCH_PATH}"
        );

        let response = self
            .http
            .post(self.endpoint(CONTACTS_SEARCH_PATH))
            .header("x-request-id", Self::request_id())
            .json(query)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        let body: ContactSearchResponse = decode_json_response(response).await?;
        Ok(body.contacts)
    }

    async fn transfer_contacts(
        &self,
        request: &TransferRequest,
    ) -> Result<TransferReport, DirectoryError> {
        debug!(
            contacts = request.contact_ids.len(),
            to_user = %request.to_user_id,
            "POST {CONTACTS_TRANSFER_PATH}"
        );

        let response = self
            .http
            .post(self.endpoint(CONTACTS_TRANSFER_PATH))
            .header("x-request-id", Self::request_id())
            .json(request)
            .send()
            .await
            .map_err(|e| DirectoryError::Transport(e.to_string()))?;

        decode_json_response(response).await
    }
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, DirectoryError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| DirectoryError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(api_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|e| DirectoryError::Decode(e.to_string()))
}

/// Shapes a non-2xx answer into [`DirectoryError::Api`], preferring the
/// service's own `message` field when the body is structured.
fn api_error(status: StatusCode, body: &[u8]) -> DirectoryError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            let text = String::from_utf8_lossy(body);
            let trimmed = text.trim();
            if trimmed.is_empty() {
                "<empty body>".to_string()
            } else {
                trimmed.to_string()
            }
        });

    DirectoryError::Api {
        status: status.as_u16(),
        message,
    }
}
