//! The entry point applications talk to.
//!
//! [`Repository`] owns the auth token and gates every authenticated call on
//! it. Each operation returns a [`Pending`] handle; while a request is
//! outstanding, repeated calls get the same handle back instead of issuing
//! another request:
//!
//! - `check` is deduplicated per URL;
//! - every other operation has a single slot, so a second call made while
//!   one is in flight joins it and its arguments are ignored.
//!
//! Requests are spawned onto the current tokio runtime. Called outside of
//! one, an operation starts nothing and resolves to `Unknown`.

mod inflight;

pub use inflight::{resolved, InFlight, Pending};

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use url::Url;

use crate::app::SyncError;
use crate::domain::{CheckResult, Feed};
use crate::service::{
    ArticleService, BackendArticleService, BackendFeedService, BackendUserService, FeedService,
    UserService,
};
use crate::transport::Transport;

type Token = Arc<RwLock<Option<String>>>;

pub struct Repository {
    users: Arc<dyn UserService>,
    feeds: Arc<dyn FeedService>,
    articles: Arc<dyn ArticleService>,
    auth_token: Token,

    create_account: InFlight<(), ()>,
    login: InFlight<(), ()>,
    add_device_token: InFlight<(), ()>,
    delete_account: InFlight<(), ()>,
    subscribe: InFlight<(), Vec<Url>>,
    unsubscribe: InFlight<(), Vec<Url>>,
    subscribed_feeds: InFlight<(), Vec<Url>>,
    fetch: InFlight<(), Vec<Feed>>,
    mark_read: InFlight<(), ()>,
    check: InFlight<Url, CheckResult>,
}

impl Repository {
    pub fn new(
        users: Arc<dyn UserService>,
        feeds: Arc<dyn FeedService>,
        articles: Arc<dyn ArticleService>,
    ) -> Self {
        Self {
            users,
            feeds,
            articles,
            auth_token: Arc::new(RwLock::new(None)),
            create_account: InFlight::new("create_account"),
            login: InFlight::new("login"),
            add_device_token: InFlight::new("add_device_token"),
            delete_account: InFlight::new("delete_account"),
            subscribe: InFlight::new("subscribe"),
            unsubscribe: InFlight::new("unsubscribe"),
            subscribed_feeds: InFlight::new("subscribed_feeds"),
            fetch: InFlight::new("fetch"),
            mark_read: InFlight::new("mark_read"),
            check: InFlight::new("check"),
        }
    }

    /// Builds a repository talking to the backend at `base_url` through the
    /// given transport.
    pub fn with_transport(
        base_url: Url,
        app_token: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let users = BackendUserService::new(base_url.clone(), app_token, transport.clone());
        let feeds = BackendFeedService::new(base_url.clone(), app_token, transport.clone());
        let articles = BackendArticleService::new(base_url, app_token, transport);
        Self::new(Arc::new(users), Arc::new(feeds), Arc::new(articles))
    }

    // User lifecycle

    pub fn create_account(&self, email: &str, password: &str) -> Pending<()> {
        let users = Arc::clone(&self.users);
        let auth_token = Arc::clone(&self.auth_token);
        let (email, password) = (email.to_string(), password.to_string());
        self.create_account.get_or_start((), move || async move {
            let token = users.create_account(&email, &password).await?;
            store_token(&auth_token, token);
            Ok(())
        })
    }

    pub fn login(&self, email: &str, password: &str) -> Pending<()> {
        let users = Arc::clone(&self.users);
        let auth_token = Arc::clone(&self.auth_token);
        let (email, password) = (email.to_string(), password.to_string());
        self.login.get_or_start((), move || async move {
            let token = users.login(&email, &password).await?;
            store_token(&auth_token, token);
            Ok(())
        })
    }

    /// Adopts a token obtained earlier, e.g. one restored from storage.
    pub fn login_with_token(&self, token: impl Into<String>) {
        store_token(&self.auth_token, token.into());
    }

    pub fn auth_token(&self) -> Option<String> {
        self.auth_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth_token().is_some()
    }

    pub fn add_device_token(&self, token: &str) -> Pending<()> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let users = Arc::clone(&self.users);
        let token = token.to_string();
        self.add_device_token.get_or_start((), move || async move {
            users.add_device_token(&token, &auth_token).await
        })
    }

    pub fn delete_account(&self) -> Pending<()> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let users = Arc::clone(&self.users);
        self.delete_account
            .get_or_start((), move || async move { users.delete_account(&auth_token).await })
    }

    // Feeds

    /// Not gated on login: the backend answers checks for anyone holding
    /// the app token.
    pub fn check(&self, url: &Url) -> Pending<CheckResult> {
        let feeds = Arc::clone(&self.feeds);
        let target = url.clone();
        self.check
            .get_or_start(url.clone(), move || async move { feeds.check(&target).await })
    }

    pub fn subscribe(&self, urls: Vec<Url>) -> Pending<Vec<Url>> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let feeds = Arc::clone(&self.feeds);
        self.subscribe.get_or_start((), move || async move {
            feeds.subscribe(&urls, &auth_token).await
        })
    }

    pub fn unsubscribe(&self, urls: Vec<Url>) -> Pending<Vec<Url>> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let feeds = Arc::clone(&self.feeds);
        self.unsubscribe.get_or_start((), move || async move {
            feeds.unsubscribe(&urls, &auth_token).await
        })
    }

    pub fn subscribed_feeds(&self) -> Pending<Vec<Url>> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let feeds = Arc::clone(&self.feeds);
        self.subscribed_feeds
            .get_or_start((), move || async move { feeds.subscribed_feeds(&auth_token).await })
    }

    /// Fetches feeds updated since the given per-feed timestamps.
    pub fn fetch(&self, since: BTreeMap<Url, DateTime<Utc>>) -> Pending<Vec<Feed>> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let feeds = Arc::clone(&self.feeds);
        self.fetch
            .get_or_start((), move || async move { feeds.fetch(&auth_token, &since).await })
    }

    // Articles

    pub fn mark_read(&self, articles: BTreeMap<Url, bool>) -> Pending<()> {
        let Some(auth_token) = self.auth_token() else {
            return not_logged_in();
        };
        let service = Arc::clone(&self.articles);
        self.mark_read.get_or_start((), move || async move {
            service.mark_read(&articles, &auth_token).await
        })
    }
}

fn store_token(slot: &RwLock<Option<String>>, token: String) {
    *slot.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    tracing::info!("Logged in");
}

fn not_logged_in<T>() -> Pending<T>
where
    T: Clone + Send + Sync + 'static,
{
    tracing::debug!("Rejecting call made while logged out");
    resolved(Err(SyncError::NotLoggedIn))
}
