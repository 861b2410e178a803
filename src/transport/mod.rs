pub mod http;

#[cfg(test)]
pub(crate) mod fake;

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

pub use http::HttpTransport;

pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A single exchange with the backend, as handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection closed before a response arrived")]
    Closed,
}

/// Byte-level HTTP capability the services are built on.
///
/// Implementations return the response body whatever the status code; the
/// services decide what a body means.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Vec<u8>, TransportError>;

    async fn get(&self, url: Url, headers: Headers) -> Result<Vec<u8>, TransportError> {
        self.send(Request {
            method: Method::Get,
            url,
            headers,
            body: None,
        })
        .await
    }

    async fn put(
        &self,
        url: Url,
        headers: Headers,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        self.send(Request {
            method: Method::Put,
            url,
            headers,
            body: Some(body),
        })
        .await
    }

    async fn post(
        &self,
        url: Url,
        headers: Headers,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        self.send(Request {
            method: Method::Post,
            url,
            headers,
            body: Some(body),
        })
        .await
    }

    async fn delete(&self, url: Url, headers: Headers) -> Result<Vec<u8>, TransportError> {
        self.send(Request {
            method: Method::Delete,
            url,
            headers,
            body: None,
        })
        .await
    }
}
