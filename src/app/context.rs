use std::sync::Arc;

use crate::app::error::AppError;
use crate::config::Config;
use crate::repository::Repository;
use crate::transport::http::HttpTransport;
use crate::transport::Transport;

pub struct AppContext {
    pub config: Config,
    pub repository: Repository,
}

impl AppContext {
    /// Builds an HTTP-backed repository from `config`, restoring the saved
    /// session if there is one.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
            config.timeout(),
            &config.http.user_agent,
        )?);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self, AppError> {
        let base_url = config.base_url()?;
        let repository = Repository::with_transport(base_url, &config.server.app_token, transport);

        if let Some(token) = config.session.auth_token.as_deref().filter(|t| !t.is_empty()) {
            repository.login_with_token(token);
        }

        Ok(Self { config, repository })
    }
}
