use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use crate::app::Result;
use crate::service::{classify, encode, ArticleService, Endpoint};
use crate::transport::Transport;

pub struct BackendArticleService {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl BackendArticleService {
    pub fn new(base_url: Url, app_token: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(base_url, app_token),
            transport,
        }
    }
}

#[async_trait]
impl ArticleService for BackendArticleService {
    async fn mark_read(&self, articles: &BTreeMap<Url, bool>, auth_token: &str) -> Result<()> {
        let url = self.endpoint.url("api/v1/articles/update")?;
        let headers = self.endpoint.headers(Some(auth_token));
        let body = mark_read_body(articles)?;

        tracing::debug!(count = articles.len(), "Updating read state");
        let outcome = self.transport.post(url, headers, body).await;
        classify("mark_read", outcome).map(|_| ())
    }
}

pub fn mark_read_body(articles: &BTreeMap<Url, bool>) -> Result<Vec<u8>> {
    let object: Map<String, Value> = articles
        .iter()
        .map(|(url, read)| (url.to_string(), Value::Bool(*read)))
        .collect();
    encode(&Value::Object(object))
}
