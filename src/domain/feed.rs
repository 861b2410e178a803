use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::codec::{self, DecodeError};
use crate::domain::Article;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feed {
    pub title: String,
    pub url: Url,
    pub summary: String,
    pub image_url: Option<Url>,
    pub last_updated: DateTime<Utc>,
    pub read: bool,
    pub articles: Vec<Article>,
}

impl Feed {
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = codec::as_object(value)?;
        Ok(Self {
            title: codec::required_string(object, "title")?,
            url: codec::required_url(object, "url")?,
            summary: codec::optional_string(object, "summary"),
            image_url: codec::optional_url(object, "image_url"),
            last_updated: codec::required_timestamp(object, "last_updated")?,
            read: codec::flag(object, "read")?,
            articles: codec::decode_lenient(object, "articles", Article::from_json),
        })
    }

    pub fn unread_count(&self) -> usize {
        self.articles.iter().filter(|a| !a.read).count()
    }
}
