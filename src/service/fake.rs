use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::oneshot;
use url::Url;

use crate::app::{Result, SyncError};
use crate::domain::{CheckResult, Feed};
use crate::service::{ArticleService, FeedService, UserService};

/// One recorded service method. Replies are queued ahead of the call, either
/// already resolved ([`Stub::returns`]) or held open by the test
/// ([`Stub::pending`]). A call with nothing queued fails with `Unknown`.
pub struct Stub<A, T> {
    calls: Mutex<Vec<A>>,
    replies: Mutex<VecDeque<oneshot::Receiver<Result<T>>>>,
}

impl<A, T> Default for Stub<A, T> {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

impl<A: Clone, T> Stub<A, T> {
    pub fn returns(&self, result: Result<T>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        self.replies.lock().unwrap().push_back(rx);
    }

    pub fn pending(&self) -> oneshot::Sender<Result<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<A> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn call(&self, args: A) -> Result<T> {
        self.calls.lock().unwrap().push(args);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(rx) => rx.await.unwrap_or(Err(SyncError::Unknown)),
            None => Err(SyncError::Unknown),
        }
    }
}

#[derive(Default)]
pub struct FakeUserService {
    pub create_account: Stub<(String, String), String>,
    pub login: Stub<(String, String), String>,
    pub add_device_token: Stub<(String, String), ()>,
    pub delete_account: Stub<String, ()>,
}

#[async_trait]
impl UserService for FakeUserService {
    async fn create_account(&self, email: &str, password: &str) -> Result<String> {
        self.create_account
            .call((email.to_string(), password.to_string()))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> Result<String> {
        self.login.call((email.to_string(), password.to_string())).await
    }

    async fn add_device_token(&self, token: &str, auth_token: &str) -> Result<()> {
        self.add_device_token
            .call((token.to_string(), auth_token.to_string()))
            .await
    }

    async fn delete_account(&self, auth_token: &str) -> Result<()> {
        self.delete_account.call(auth_token.to_string()).await
    }
}

#[derive(Default)]
pub struct FakeFeedService {
    pub check: Stub<Url, CheckResult>,
    pub subscribe: Stub<(Vec<Url>, String), Vec<Url>>,
    pub unsubscribe: Stub<(Vec<Url>, String), Vec<Url>>,
    pub subscribed_feeds: Stub<String, Vec<Url>>,
    pub fetch: Stub<(String, BTreeMap<Url, DateTime<Utc>>), Vec<Feed>>,
}

#[async_trait]
impl FeedService for FakeFeedService {
    async fn check(&self, url: &Url) -> Result<CheckResult> {
        self.check.call(url.clone()).await
    }

    async fn subscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>> {
        self.subscribe
            .call((feeds.to_vec(), auth_token.to_string()))
            .await
    }

    async fn unsubscribe(&self, feeds: &[Url], auth_token: &str) -> Result<Vec<Url>> {
        self.unsubscribe
            .call((feeds.to_vec(), auth_token.to_string()))
            .await
    }

    async fn subscribed_feeds(&self, auth_token: &str) -> Result<Vec<Url>> {
        self.subscribed_feeds.call(auth_token.to_string()).await
    }

    async fn fetch(
        &self,
        auth_token: &str,
        feeds: &BTreeMap<Url, DateTime<Utc>>,
    ) -> Result<Vec<Feed>> {
        self.fetch
            .call((auth_token.to_string(), feeds.clone()))
            .await
    }
}

#[derive(Default)]
pub struct FakeArticleService {
    pub mark_read: Stub<(BTreeMap<Url, bool>, String), ()>,
}

#[async_trait]
impl ArticleService for FakeArticleService {
    async fn mark_read(&self, articles: &BTreeMap<Url, bool>, auth_token: &str) -> Result<()> {
        self.mark_read
            .call((articles.clone(), auth_token.to_string()))
            .await
    }
}
