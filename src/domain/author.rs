use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::codec::{self, DecodeError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub name: String,
    pub email: Option<Url>,
}

impl Author {
    pub fn new(name: impl Into<String>, email: Option<Url>) -> Self {
        Self {
            name: name.into(),
            email,
        }
    }

    /// Decodes an author. Only `name` is required; an email that is not a
    /// valid URL is dropped.
    pub fn from_json(value: &Value) -> Result<Self, DecodeError> {
        let object = codec::as_object(value)?;
        Ok(Self {
            name: codec::required_string(object, "name")?,
            email: codec::optional_url(object, "email"),
        })
    }
}
