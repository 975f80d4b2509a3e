//! Typed HTTP client for the ClubHub API.
//!
//! The session returned by sign-up/sign-in is written to a JSON file so the
//! next [`ClubClient::load`] picks it up again. Expired sessions are dropped
//! on load and whenever [`ClubClient::current_user`] notices the expiry.

use std::path::PathBuf;

use reqwest::{Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::user::{AuthResponse, MeResponse, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    pub user: UserProfile,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}

impl From<AuthResponse> for Session {
    fn from(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            expires_at: resp.expires_at,
            user: resp.user,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct ClubClient {
    http: reqwest::Client,
    base_url: Url,
    session_path: PathBuf,
    session: Option<Session>,
}

impl ClubClient {
    /// Builds a client and rehydrates a persisted session if one is on disk
    /// and still valid.
    pub async fn load(base_url: &str, session_path: impl Into<PathBuf>) -> Result<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut client = Self {
            http: reqwest::Client::new(),
            base_url,
            session_path: session_path.into(),
            session: None,
        };

        match tokio::fs::read(&client.session_path).await {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) if !session.is_expired() => client.session = Some(session),
                Ok(_) => {
                    tracing::debug!(path = %client.session_path.display(), "Discarding expired session");
                    client.clear_session().await?;
                }
                Err(e) => {
                    tracing::warn!(path = %client.session_path.display(), "Discarding unreadable session: {}", e);
                    client.clear_session().await?;
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(client)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<&Session> {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        let resp: AuthResponse = self
            .send(Method::POST, &["api", "auth", "signup"], Some(&body), false)
            .await?;
        self.save_session(resp.into()).await
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&Session> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp: AuthResponse = self
            .send(Method::POST, &["api", "auth", "signin"], Some(&body), false)
            .await?;
        self.save_session(resp.into()).await
    }

    /// Forgets the session locally; tokens are stateless so the server is not involved.
    pub async fn sign_out(&mut self) -> Result<()> {
        self.clear_session().await
    }

    /// The signed-in user from the persisted session, or `None` once it expires.
    pub async fn current_user(&mut self) -> Result<Option<UserProfile>> {
        if self.session.as_ref().is_some_and(Session::is_expired) {
            self.clear_session().await?;
            return Ok(None);
        }
        Ok(self.session.as_ref().map(|s| s.user.clone()))
    }

    /// Fresh profile and views from the server.
    pub async fn me(&self) -> Result<MeResponse> {
        self.send(Method::GET, &["api", "auth", "me"], None, true).await
    }

    pub async fn members(&self, org_id: Uuid) -> Result<Vec<UserProfile>> {
        let org = org_id.to_string();
        self.send(Method::GET, &["api", "organizations", &org, "members"], None, true)
            .await
    }

    pub async fn assign_member(&self, org_id: Uuid, email: &str) -> Result<UserProfile> {
        let org = org_id.to_string();
        let body = serde_json::json!({ "email": email });
        self.send(
            Method::POST,
            &["api", "organizations", &org, "members"],
            Some(&body),
            true,
        )
        .await
    }

    pub async fn remove_member(&self, org_id: Uuid, email: &str) -> Result<()> {
        let org = org_id.to_string();
        let _: serde_json::Value = self
            .send(
                Method::DELETE,
                &["api", "organizations", &org, "members", email],
                None,
                true,
            )
            .await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&serde_json::Value>,
        authenticated: bool,
    ) -> Result<T> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        let mut req = self.http.request(method, url);
        if authenticated {
            let session = self.session.as_ref().ok_or(ClientError::NotSignedIn)?;
            req = req.bearer_auth(&session.token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = match resp.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => status.canonical_reason().unwrap_or("Request failed").to_string(),
            };
            return Err(ClientError::Api { status, message });
        }

        Ok(resp.json().await?)
    }

    async fn save_session(&mut self, session: Session) -> Result<&Session> {
        if let Some(parent) = self.session_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.session_path, serde_json::to_vec_pretty(&session)?).await?;
        Ok(self.session.insert(session))
    }

    async fn clear_session(&mut self) -> Result<()> {
        self.session = None;
        match tokio::fs::remove_file(&self.session_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
