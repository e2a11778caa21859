//! Admin sign-in and session persistence.
//!
//! Sessions come from the hosted auth service's password grant and are kept
//! in a [`KeyValueStore`] under [`SESSION_KEY`], so a signed-in admin stays
//! signed in across CLI invocations. [`current_session`] refreshes a session
//! that is about to expire and writes the new one back.

use crate::config::BackendConfig;
use crate::kv::{KeyValueStore, KvError};
use chrono::Utc;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

pub const SESSION_KEY: &str = "auth.session";

/// Sessions expiring within this many seconds are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("backend not configured")]
    NotConfigured,
    #[error("email and password are required")]
    MissingCredentials,
    #[error("not signed in; run `church-site login` first")]
    NotSignedIn,
    #[error("sign-in rejected: {0}")]
    Rejected(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("session store error: {0}")]
    Store(#[from] KvError),
    #[error("stored session is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    #[serde(default)]
    pub email: Option<String>,
}

impl Session {
    pub fn expires_within(&self, now: i64, margin: i64) -> bool {
        self.expires_at - now <= margin
    }
}

/// Anything that can trade a refresh token for a new session.
pub trait TokenIssuer {
    fn refresh(&self, session: &Session) -> Result<Session, AuthError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<TokenUser>,
}

#[derive(Deserialize)]
struct TokenUser {
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at.unwrap_or(now + self.expires_in),
            email: self.user.and_then(|u| u.email),
        }
    }
}

/// Client for the hosted auth endpoints (`/auth/v1/...`).
pub struct AuthClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl AuthClient {
    pub fn new(backend: &BackendConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: backend.url.trim_end_matches('/').to_string(),
            anon_key: backend.anon_key.clone(),
        }
    }

    fn token_url(&self, grant: &str) -> Result<String, AuthError> {
        if self.base_url.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        Ok(format!("{}/auth/v1/token?grant_type={grant}", self.base_url))
    }

    fn request_token(&self, grant: &str, body: Value) -> Result<Session, AuthError> {
        let url = self.token_url(grant)?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()?;
        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().unwrap_or(Value::Null);
            return Err(AuthError::Rejected(error_text(&body, &status.to_string())));
        }
        let token: TokenResponse = response.json()?;
        Ok(token.into_session(Utc::now().timestamp()))
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        self.request_token(
            "password",
            json!({ "email": email.trim(), "password": password }),
        )
    }

    /// Revoke the session remotely.
    pub fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        if self.base_url.is_empty() {
            return Err(AuthError::NotConfigured);
        }
        let response = self
            .client
            .post(format!("{}/auth/v1/logout", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()?;
        if !response.status().is_success() {
            return Err(AuthError::Rejected(response.status().to_string()));
        }
        Ok(())
    }
}

impl TokenIssuer for AuthClient {
    fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        self.request_token(
            "refresh_token",
            json!({ "refresh_token": session.refresh_token }),
        )
    }
}

/// GoTrue reports errors under several keys depending on the endpoint.
fn error_text(body: &Value, fallback: &str) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .unwrap_or(fallback)
        .to_string()
}

// ============================================================================
// Persistence
// ============================================================================

pub fn load_session(store: &dyn KeyValueStore) -> Result<Option<Session>, AuthError> {
    match store.get(SESSION_KEY)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn save_session(store: &dyn KeyValueStore, session: &Session) -> Result<(), AuthError> {
    store.set(SESSION_KEY, &serde_json::to_string(session)?)?;
    Ok(())
}

pub fn clear_session(store: &dyn KeyValueStore) -> Result<(), AuthError> {
    store.remove(SESSION_KEY)?;
    Ok(())
}

/// The stored session, refreshed first if it expires within
/// [`REFRESH_MARGIN_SECS`] of `now`.
pub fn current_session(
    store: &dyn KeyValueStore,
    issuer: &dyn TokenIssuer,
    now: i64,
) -> Result<Session, AuthError> {
    let session = load_session(store)?.ok_or(AuthError::NotSignedIn)?;
    if !session.expires_within(now, REFRESH_MARGIN_SECS) {
        return Ok(session);
    }
    log::info!("session expires at {}, refreshing", session.expires_at);
    let mut refreshed = issuer.refresh(&session)?;
    if refreshed.email.is_none() {
        refreshed.email = session.email.clone();
    }
    save_session(store, &refreshed)?;
    Ok(refreshed)
}
