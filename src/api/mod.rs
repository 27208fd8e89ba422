//! Backend REST client.
//!
//! `DirectoryApi` is the seam between the UI state machine and the network.
//! `HttpApi` implements it with `reqwest`; tests substitute in-memory fakes.
//!
pub mod model;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::ApiError;
use model::{ActionReply, DashboardSummary, Group, User, UserUpdate};

/// Operations the dashboard needs from the backend.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    /// `POST /login`; the session cookie is kept by the client.
    async fn login(&self, email: &str, password: &str) -> Result<ActionReply, ApiError>;

    /// `POST /register`.
    async fn register(&self, name: &str, email: &str, password: &str) -> Result<ActionReply, ApiError>;

    /// `GET /api/ad/users`.
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// `GET /api/ad/groups`.
    async fn list_groups(&self) -> Result<Vec<Group>, ApiError>;

    /// `GET /api/ad/group/{name}/members`.
    async fn group_members(&self, group: &str) -> Result<Vec<String>, ApiError>;

    /// `DELETE /api/ad/group/{name}/members` with `{ dn }`.
    async fn remove_group_member(&self, group: &str, dn: &str) -> Result<ActionReply, ApiError>;

    /// `PUT /api/ad/user/{name}`.
    async fn update_user(&self, username: &str, update: &UserUpdate) -> Result<ActionReply, ApiError>;

    /// `GET /api/dashboard-data`.
    async fn dashboard(&self) -> Result<DashboardSummary, ApiError>;
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    users: Option<Vec<User>>,
}

#[derive(Debug, Deserialize)]
struct GroupsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    groups: Option<Vec<Group>>,
}

#[derive(Debug, Deserialize)]
struct MembersEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    members: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// HTTP implementation of [`DirectoryApi`].
#[derive(Clone, Debug)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// Build a client rooted at `base_url`. `timeout` of `None` means requests never time out.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().cookie_store(true);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_url(&self, username: &str) -> String {
        self.url(&format!("/api/ad/user/{}", urlencoding::encode(username)))
    }

    fn members_url(&self, group: &str) -> String {
        self.url(&format!("/api/ad/group/{}/members", urlencoding::encode(group)))
    }
}

/// Decode a response, mapping non-2xx statuses to `Server`/`Transport` errors.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        tracing::warn!(%status, ?message, "request failed");
        return Err(match message {
            Some(message) => ApiError::Server {
                status: status.as_u16(),
                message,
            },
            None => ApiError::status(status),
        });
    }
    Ok(serde_json::from_slice(&body)?)
}

fn domain_failure(message: Option<String>, fallback: &str) -> ApiError {
    ApiError::Domain(
        message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string()),
    )
}

#[async_trait]
impl DirectoryApi for HttpApi {
    async fn login(&self, email: &str, password: &str) -> Result<ActionReply, ApiError> {
        tracing::info!(email, "logging in");
        let response = self
            .client
            .post(self.url("/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        read_json(response).await
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> Result<ActionReply, ApiError> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.client.get(self.url("/api/ad/users")).send().await?;
        tracing::debug!(status = %response.status(), "users response");
        let envelope: UsersEnvelope = read_json(response).await?;
        if !envelope.success {
            return Err(domain_failure(envelope.message, "Failed to load users"));
        }
        Ok(envelope.users.unwrap_or_default())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, ApiError> {
        let response = self.client.get(self.url("/api/ad/groups")).send().await?;
        tracing::debug!(status = %response.status(), "groups response");
        let envelope: GroupsEnvelope = read_json(response).await?;
        if !envelope.success {
            return Err(domain_failure(envelope.message, "Failed to load groups"));
        }
        Ok(envelope.groups.unwrap_or_default())
    }

    async fn group_members(&self, group: &str) -> Result<Vec<String>, ApiError> {
        let response = self.client.get(self.members_url(group)).send().await?;
        let envelope: MembersEnvelope = read_json(response).await?;
        if !envelope.success {
            return Err(domain_failure(envelope.message, "Failed to load group members"));
        }
        Ok(envelope.members.unwrap_or_default())
    }

    async fn remove_group_member(&self, group: &str, dn: &str) -> Result<ActionReply, ApiError> {
        tracing::info!(group, dn, "removing group member");
        let response = self
            .client
            .delete(self.members_url(group))
            .json(&json!({ "dn": dn }))
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_user(&self, username: &str, update: &UserUpdate) -> Result<ActionReply, ApiError> {
        let action = match update {
            UserUpdate::ResetPassword { .. } => "reset_password",
            UserUpdate::Enable => "enable",
            UserUpdate::Disable => "disable",
        };
        tracing::info!(username, action, "updating user");
        let response = self
            .client
            .put(self.user_url(username))
            .json(update)
            .send()
            .await?;
        read_json(response).await
    }

    async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        let response = self.client.get(self.url("/api/dashboard-data")).send().await?;
        tracing::debug!(status = %response.status(), "dashboard response");
        let summary: DashboardSummary = read_json(response).await?;
        if summary.success == Some(false) {
            let detail = summary
                .error
                .clone()
                .or_else(|| summary.metadata.as_ref().and_then(|m| m.error.clone()));
            return Err(domain_failure(detail, "Failed to fetch data"));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_percent_encoded() {
        let api = HttpApi::new("http://localhost:5000/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(
            api.members_url("Domain Admins"),
            "http://localhost:5000/api/ad/group/Domain%20Admins/members"
        );
        assert_eq!(api.user_url("j/doe"), "http://localhost:5000/api/ad/user/j%2Fdoe");
    }
}
