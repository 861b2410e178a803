use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feedsync::app::AppContext;
use feedsync::cli::{commands, Cli, Commands};
use feedsync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::CreateAccount { email, password } => {
            commands::create_account(&ctx, &email, &password).await?;
        }
        Commands::Login { email, password } => {
            commands::login(&ctx, &email, &password).await?;
        }
        Commands::AddDeviceToken { token } => {
            commands::add_device_token(&ctx, &token).await?;
        }
        Commands::DeleteAccount => {
            commands::delete_account(&ctx).await?;
        }
        Commands::Check { url } => {
            commands::check(&ctx, &url).await?;
        }
        Commands::Subscribe { urls } => {
            commands::subscribe(&ctx, urls).await?;
        }
        Commands::Unsubscribe { urls } => {
            commands::unsubscribe(&ctx, urls).await?;
        }
        Commands::Subscribed => {
            commands::subscribed(&ctx).await?;
        }
        Commands::Fetch { since } => {
            commands::fetch(&ctx, &since).await?;
        }
        Commands::MarkRead { urls, unread } => {
            commands::mark_read(&ctx, urls, unread).await?;
        }
    }

    Ok(())
}
