use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::codec::{self, DecodeError};

/// Outcome of asking the backend what lives at a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "urls", rename_all = "lowercase")]
pub enum CheckResult {
    /// The URL is a feed the backend can subscribe to.
    Feed(Url),
    /// The URL is an OPML document listing these feeds.
    Opml(Vec<Url>),
    None,
}

impl CheckResult {
    /// A usable `feed` wins over `opml`; an empty or missing `opml` list
    /// means neither.
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = codec::as_object(value)?;
        if let Some(feed) = codec::optional_url(object, "feed") {
            return Ok(Self::Feed(feed));
        }
        let opml = codec::decode_lenient(object, "opml", codec::url_element);
        if opml.is_empty() {
            Ok(Self::None)
        } else {
            Ok(Self::Opml(opml))
        }
    }
}
