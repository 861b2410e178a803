//! Backend facades.
//!
//! Each service turns one backend operation into a [`Request`], hands it to
//! a [`Transport`] and classifies the outcome into a [`SyncError`]:
//!
//! - transport failure → [`SyncError::Network`]
//! - the access-denied sentinel body → [`SyncError::NotLoggedIn`]
//! - a body that does not decode → [`SyncError::Json`]
//!
//! [`Request`]: crate::transport::Request

pub mod article;
pub mod feed;
pub mod user;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use url::Url;

use crate::app::{Result, SyncError};
use crate::codec::{self, DecodeError};
use crate::domain::{CheckResult, Feed};
use crate::transport::{Headers, TransportError};

pub use article::BackendArticleService;
pub use feed::BackendFeedService;
pub use user::BackendUserService;

/// Body the backend sends when it does not recognise the auth token.
pub const ACCESS_DENIED: &[u8] = b"HTTP Token: Access denied.\n";

#[async_trait]
pub trait UserService: Send + Sync {
    /// Registers a new account and returns its auth token.
    async fn create_account(&self, email: &str, password: &str) -> Result<String>;

    /// Exchanges credentials for an auth token.
    async fn login(&self, email: &str, password: &str) -> Result<String>;

    async fn add_device_token(&self, token: &str, auth_token: &str) -> Result<()>;

    async fn delete_account(&self, auth_token: &str) -> Result<()>;
}

#[async_trait]
pub trait FeedService: Send + Sync {
    /// Asks the backend whether `url` is a feed, an OPML list, or neither.
    async fn check(&self, url: &Url) -> Result<CheckResult>;

    /// Returns the feeds the backend accepted.
    async fn subscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>>;

    /// Returns the subscriptions the backend still holds afterwards.
    async fn unsubscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>>;

    async fn subscribed_feeds(&self, auth_token: &str) -> Result<Vec<Url>>;

    /// Fetches feeds changed since the given per-feed timestamps. An empty
    /// map asks for everything.
    async fn fetch(
        &self,
        auth_token: &str,
        feeds: &BTreeMap<Url, DateTime<Utc>>,
    ) -> Result<Vec<Feed>>;
}

#[async_trait]
pub trait ArticleService: Send + Sync {
    /// Pushes read state per article URL.
    async fn mark_read(&self, articles: &BTreeMap<Url, bool>, auth_token: &str) -> Result<()>;
}

/// Base URL and app identity shared by every request a service builds.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: Url,
    app_token: String,
}

impl Endpoint {
    /// A base URL without a trailing slash is treated as a directory, so
    /// `https://host/prefix` resolves paths under `/prefix/`.
    pub fn new(mut base_url: Url, app_token: impl Into<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            app_token: app_token.into(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| {
            tracing::warn!(path, error = %e, "Could not build endpoint URL");
            SyncError::Unknown
        })
    }

    pub fn headers(&self, auth_token: Option<&str>) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".into(), "application/json".into());
        headers.insert("X-APP-TOKEN".into(), self.app_token.clone());
        if let Some(token) = auth_token {
            headers.insert("Authorization".into(), format!("Token token=\"{}\"", token));
        }
        headers
    }
}

/// Maps a transport outcome onto the error taxonomy, leaving a body that
/// still needs decoding.
pub fn classify(
    operation: &'static str,
    outcome: std::result::Result<Vec<u8>, TransportError>,
) -> Result<Vec<u8>> {
    match outcome {
        Ok(body) if body == ACCESS_DENIED => {
            tracing::warn!(operation, "Backend rejected auth token");
            Err(SyncError::NotLoggedIn)
        }
        Ok(body) => Ok(body),
        Err(e) => {
            tracing::warn!(operation, error = %e, "Transport failure");
            Err(SyncError::Network)
        }
    }
}

/// Parses `body` as JSON and runs `decoder` over it.
pub fn decode<T, F>(operation: &'static str, body: &[u8], decoder: F) -> Result<T>
where
    F: FnOnce(&Value) -> std::result::Result<T, DecodeError>,
{
    codec::parse_body(body)
        .and_then(|value| decoder(&value))
        .map_err(|e| {
            tracing::warn!(operation, error = %e, "Undecodable response");
            SyncError::Json
        })
}

pub(crate) fn encode(value: &Value) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        tracing::warn!(error = %e, "Could not encode request body");
        SyncError::Unknown
    })
}
