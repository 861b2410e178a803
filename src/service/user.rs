use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use url::Url;

use crate::app::Result;
use crate::codec::{self, DecodeError};
use crate::service::{classify, decode, encode, Endpoint, UserService};
use crate::transport::{Method, Request, Transport};

pub struct BackendUserService {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl BackendUserService {
    pub fn new(base_url: Url, app_token: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint: Endpoint::new(base_url, app_token),
            transport,
        }
    }

    /// Account creation and login share a request shape and only differ in
    /// path and verb.
    async fn api_token(
        &self,
        method: Method,
        path: &'static str,
        email: &str,
        password: &str,
    ) -> Result<String> {
        let request = Request {
            method,
            url: self.endpoint.url(path)?,
            headers: self.endpoint.headers(None),
            body: Some(credentials_body(email, password)?),
        };

        tracing::debug!(%method, url = %request.url, "Requesting api token");
        let body = classify("api_token", self.transport.send(request).await)?;
        decode("api_token", &body, api_token)
    }
}

#[async_trait]
impl UserService for BackendUserService {
    async fn create_account(&self, email: &str, password: &str) -> Result<String> {
        self.api_token(Method::Put, "api/v1/user/create", email, password)
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<String> {
        self.api_token(Method::Post, "api/v1/user/login", email, password)
            .await
    }

    async fn add_device_token(&self, token: &str, auth_token: &str) -> Result<()> {
        let url = self.endpoint.url("api/v1/user/add_device_token")?;
        let headers = self.endpoint.headers(Some(auth_token));
        let body = device_token_body(token)?;

        let outcome = self.transport.put(url, headers, body).await;
        classify("add_device_token", outcome).map(|_| ())
    }

    async fn delete_account(&self, auth_token: &str) -> Result<()> {
        let url = self.endpoint.url("api/v1/user/delete")?;
        let headers = self.endpoint.headers(Some(auth_token));

        let outcome = self.transport.delete(url, headers).await;
        classify("delete_account", outcome).map(|_| ())
    }
}

pub fn credentials_body(email: &str, password: &str) -> Result<Vec<u8>> {
    encode(&json!({ "email": email, "password": password }))
}

pub fn device_token_body(token: &str) -> Result<Vec<u8>> {
    encode(&json!({ "token": token }))
}

fn api_token(value: &Value) -> std::result::Result<String, DecodeError> {
    codec::required_string(codec::as_object(value)?, "api_token")
}
