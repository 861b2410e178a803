use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::transport::{Method, Request, Transport, TransportError};

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// Uses a client configured by the caller as is.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Vec<u8>, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        // The backend reports rejected tokens in the body of a 401, so the
        // body is handed back regardless of status.
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                status = status.as_u16(),
                "Non-success status from backend"
            );
        }

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }
}
