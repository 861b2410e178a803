//! # feedsync
//!
//! Client library for a feed synchronization backend: account lifecycle,
//! feed subscriptions, incremental feed fetches, and read-state updates.
//!
//! ## Architecture
//!
//! ```text
//! Repository → Services → Transport → backend
//!                 ↓
//!               Codec → Domain
//! ```
//!
//! - [`repository`]: Holds the session and deduplicates in-flight requests
//! - [`service`]: One facade per backend resource (users, feeds, articles)
//! - [`transport`]: Byte-level HTTP capability with a reqwest implementation
//! - [`codec`]: Lenient JSON decoding and the wire timestamp format
//!
//! ## Quick Start
//!
//! ```bash
//! # Log in, then save the printed token under [session] in the config
//! feedsync login me@example.com hunter2
//!
//! # Subscribe and fetch
//! feedsync subscribe https://blog.rust-lang.org/feed.xml
//! feedsync fetch --since https://blog.rust-lang.org/feed.xml=2024-01-01T00:00:00.000Z
//! ```

/// Application context and error types.
///
/// [`AppContext`](app::AppContext) builds a repository over HTTP from the
/// loaded configuration. [`SyncError`](app::SyncError) is the error every
/// library operation reports.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// JSON field decoders and the wire timestamp format.
pub mod codec;

/// Configuration loaded from `~/.config/feedsync/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): a feed and the articles fetched with it
/// - [`Article`](domain::Article): one entry with its read flag
/// - [`Author`](domain::Author): article author
/// - [`CheckResult`](domain::CheckResult): what a URL turned out to be
pub mod domain;

/// Session-aware entry point with request deduplication.
pub mod repository;

/// Backend facades.
///
/// - [`UserService`](service::UserService): accounts and device tokens
/// - [`FeedService`](service::FeedService): checks, subscriptions, fetches
/// - [`ArticleService`](service::ArticleService): read state
pub mod service;

/// HTTP transport.
///
/// - [`Transport`](transport::Transport): async trait the services send through
/// - [`HttpTransport`](transport::HttpTransport): reqwest-based implementation
pub mod transport;
