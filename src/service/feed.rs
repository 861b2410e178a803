use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use url::Url;

use crate::app::Result;
use crate::codec::{self, format_timestamp, DecodeError};
use crate::domain::{CheckResult, Feed};
use crate::service::{classify, decode, encode, Endpoint, FeedService};
use crate::transport::Transport;

pub struct BackendFeedService {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl BackendFeedService {
    pub fn new(base_url: Url, app_token: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(base_url, app_token),
            transport,
        }
    }

    async fn change_subscriptions(
        &self,
        operation: &'static str,
        path: &'static str,
        feeds: &[Url],
        auth_token: &str,
    ) -> Result<Vec<Url>> {
        let url = self.endpoint.url(path)?;
        let headers = self.endpoint.headers(Some(auth_token));
        let body = feeds_body(feeds)?;

        tracing::debug!(operation, count = feeds.len(), "Updating subscriptions");
        let outcome = self.transport.post(url, headers, body).await;
        let body = classify(operation, outcome)?;
        decode(operation, &body, codec::url_list)
    }
}

#[async_trait]
impl FeedService for BackendFeedService {
    async fn check(&self, url: &Url) -> Result<CheckResult> {
        let mut request_url = self.endpoint.url("api/v1/feeds/check")?;
        request_url.query_pairs_mut().append_pair("url", url.as_str());
        let headers = self.endpoint.headers(None);

        let outcome = self.transport.get(request_url, headers).await;
        let body = classify("check", outcome)?;
        decode("check", &body, CheckResult::from_json)
    }

    async fn subscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>> {
        self.change_subscriptions("subscribe", "api/v1/feeds/subscribe", feeds, auth_token)
            .await
    }

    async fn unsubscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>> {
        self.change_subscriptions("unsubscribe", "api/v1/feeds/unsubscribe", feeds, auth_token)
            .await
    }

    async fn subscribed_feeds(&self, auth_token: &str) -> Result<Vec<Url>> {
        let url = self.endpoint.url("api/v1/feeds/subscribed")?;
        let headers = self.endpoint.headers(Some(auth_token));

        let outcome = self.transport.get(url, headers).await;
        let body = classify("subscribed_feeds", outcome)?;
        decode("subscribed_feeds", &body, codec::url_list)
    }

    async fn fetch(
        &self,
        auth_token: &str,
        feeds: &BTreeMap<Url, DateTime<Utc>>,
    ) -> Result<Vec<Feed>> {
        let url = self.endpoint.url("api/v1/feeds/fetch")?;
        let headers = self.endpoint.headers(Some(auth_token));
        let body = fetch_body(feeds)?;

        tracing::debug!(known = feeds.len(), "Fetching feeds");
        let outcome = self.transport.post(url, headers, body).await;
        let body = classify("fetch", outcome)?;
        let fetched = decode("fetch", &body, fetched_feeds)?;
        tracing::debug!(fetched = fetched.len(), "Fetched feeds");
        Ok(fetched)
    }
}

pub fn feeds_body(feeds: &[Url]) -> Result<Vec<u8>> {
    let urls: Vec<&str> = feeds.iter().map(Url::as_str).collect();
    encode(&json!({ "feeds": urls }))
}

/// `{"<feed url>": "<last update>"}`, or no bytes at all when nothing is
/// known yet.
pub fn fetch_body(feeds: &BTreeMap<Url, DateTime<Utc>>) -> Result<Vec<u8>> {
    if feeds.is_empty() {
        return Ok(Vec::new());
    }
    let object: Map<String, Value> = feeds
        .iter()
        .map(|(url, updated)| (url.to_string(), Value::String(format_timestamp(updated))))
        .collect();
    encode(&Value::Object(object))
}

fn fetched_feeds(value: &Value) -> std::result::Result<Vec<Feed>, DecodeError> {
    let object = codec::as_object(value)?;
    Ok(codec::decode_lenient(object, "feeds", Feed::from_json))
}
