use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use url::Url;

use crate::app::{AppContext, AppError};
use crate::codec;
use crate::domain::CheckResult;

type Result<T> = std::result::Result<T, AppError>;

pub async fn create_account(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    ctx.repository.create_account(email, password).await?;
    print_session(ctx);
    Ok(())
}

pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<()> {
    ctx.repository.login(email, password).await?;
    print_session(ctx);
    Ok(())
}

fn print_session(ctx: &AppContext) {
    if let Some(token) = ctx.repository.auth_token() {
        println!("{}", token);
        eprintln!("Add it to the [session] section of your config to stay logged in");
    }
}

pub async fn add_device_token(ctx: &AppContext, token: &str) -> Result<()> {
    ctx.repository.add_device_token(token).await?;
    println!("Registered device token");
    Ok(())
}

pub async fn delete_account(ctx: &AppContext) -> Result<()> {
    ctx.repository.delete_account().await?;
    println!("Account deleted");
    Ok(())
}

pub async fn check(ctx: &AppContext, url: &Url) -> Result<()> {
    match ctx.repository.check(url).await? {
        CheckResult::Feed(feed) => println!("Feed: {}", feed),
        CheckResult::Opml(feeds) => {
            println!("OPML with {} feeds:", feeds.len());
            for feed in feeds {
                println!("  {}", feed);
            }
        }
        CheckResult::None => println!("No feed found at {}", url),
    }
    Ok(())
}

pub async fn subscribe(ctx: &AppContext, urls: Vec<Url>) -> Result<()> {
    let subscribed = ctx.repository.subscribe(urls).await?;
    print_urls("Subscribed to", &subscribed);
    Ok(())
}

pub async fn unsubscribe(ctx: &AppContext, urls: Vec<Url>) -> Result<()> {
    let remaining = ctx.repository.unsubscribe(urls).await?;
    print_urls("Still subscribed to", &remaining);
    Ok(())
}

pub async fn subscribed(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.repository.subscribed_feeds().await?;
    if feeds.is_empty() {
        println!("No subscriptions");
        return Ok(());
    }
    for feed in feeds {
        println!("{}", feed);
    }
    Ok(())
}

fn print_urls(heading: &str, urls: &[Url]) {
    println!("{} {} feeds", heading, urls.len());
    for url in urls {
        println!("  {}", url);
    }
}

pub async fn fetch(ctx: &AppContext, since: &[String]) -> Result<()> {
    let since = parse_since(since)?;
    let feeds = ctx.repository.fetch(since).await?;

    for feed in &feeds {
        tracing::info!(url = %feed.url, unread = feed.unread_count(), "Fetched feed");
    }
    println!("{}", serde_json::to_string_pretty(&feeds)?);
    Ok(())
}

pub async fn mark_read(ctx: &AppContext, urls: Vec<Url>, unread: bool) -> Result<()> {
    let count = urls.len();
    let articles: BTreeMap<Url, bool> = urls.into_iter().map(|url| (url, !unread)).collect();
    ctx.repository.mark_read(articles).await?;
    println!(
        "Marked {} articles as {}",
        count,
        if unread { "unread" } else { "read" }
    );
    Ok(())
}

/// Parses `URL=TIMESTAMP` pairs. The timestamp may be in wire format or any
/// RFC 3339 form.
pub fn parse_since(pairs: &[String]) -> Result<BTreeMap<Url, DateTime<Utc>>> {
    pairs
        .iter()
        .map(|pair| -> Result<(Url, DateTime<Utc>)> {
            let invalid = || AppError::InvalidTimestamp {
                url: pair.clone(),
                value: String::new(),
            };
            let (url, value) = pair.rsplit_once('=').ok_or_else(invalid)?;
            let timestamp = codec::parse_timestamp(value)
                .or_else(|| {
                    DateTime::parse_from_rfc3339(value)
                        .ok()
                        .map(|t| t.with_timezone(&Utc))
                })
                .ok_or_else(|| AppError::InvalidTimestamp {
                    url: url.to_string(),
                    value: value.to_string(),
                })?;
            Ok((Url::parse(url)?, timestamp))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_since_wire_format() {
        let since = parse_since(&["https://example.com/feed?a=b=1970-01-01T00:00:00.000Z".to_string()])
            .unwrap();
        assert_eq!(
            since,
            BTreeMap::from([(
                Url::parse("https://example.com/feed?a=b").unwrap(),
                Utc.timestamp_opt(0, 0).unwrap()
            )])
        );
    }

    #[test]
    fn test_parse_since_rfc3339() {
        let since = parse_since(&["https://example.com/feed=2015-12-23T01:00:00+01:00".to_string()])
            .unwrap();
        assert_eq!(
            since[&Url::parse("https://example.com/feed").unwrap()],
            Utc.with_ymd_and_hms(2015, 12, 23, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_since_rejects_bad_input() {
        assert!(matches!(
            parse_since(&["https://example.com/feed".to_string()]),
            Err(AppError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_since(&["https://example.com/feed=yesterday".to_string()]),
            Err(AppError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            parse_since(&["not a url=1970-01-01T00:00:00.000Z".to_string()]),
            Err(AppError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_since_empty() {
        assert!(parse_since(&[]).unwrap().is_empty());
    }
}
