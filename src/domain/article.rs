use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::codec::{self, DecodeError};
use crate::domain::Author;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub title: String,
    pub url: Url,
    pub summary: String,
    pub content: String,
    pub published: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub read: bool,
    pub authors: Vec<Author>,
}

impl Article {
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = codec::as_object(value)?;
        Ok(Self {
            title: codec::required_string(object, "title")?,
            url: codec::required_url(object, "url")?,
            summary: codec::optional_string(object, "summary"),
            content: codec::optional_string(object, "content"),
            published: codec::required_timestamp(object, "published")?,
            updated: codec::optional_timestamp(object, "updated"),
            read: codec::flag(object, "read")?,
            authors: codec::decode_lenient(object, "authors", Author::from_json),
        })
    }
}
