pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser)]
#[command(name = "feedsync")]
#[command(about = "Client for a feed synchronization backend", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/feedsync/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account and print its auth token
    CreateAccount { email: String, password: String },
    /// Log in and print the auth token
    Login { email: String, password: String },
    /// Register a push notification token for this device
    AddDeviceToken { token: String },
    /// Delete the logged-in account
    DeleteAccount,
    /// Check whether a URL is a feed or an OPML list of feeds
    Check { url: Url },
    /// Subscribe to feeds
    Subscribe {
        #[arg(required = true)]
        urls: Vec<Url>,
    },
    /// Unsubscribe from feeds
    Unsubscribe {
        #[arg(required = true)]
        urls: Vec<Url>,
    },
    /// List subscribed feed URLs
    Subscribed,
    /// Fetch feeds and print them as JSON
    Fetch {
        /// Only articles newer than TIMESTAMP for feed URL
        /// (e.g. https://example.com/feed=2024-01-01T00:00:00.000Z)
        #[arg(long, value_name = "URL=TIMESTAMP")]
        since: Vec<String>,
    },
    /// Mark articles as read
    MarkRead {
        #[arg(required = true)]
        urls: Vec<Url>,

        /// Mark as unread instead
        #[arg(long)]
        unread: bool,
    },
}
