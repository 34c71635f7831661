//! Response body parsers.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::http::JSON_CONTENT_TYPE;

/// Decodes response bodies into a JSON value tree.
///
/// Typed decoding goes through `serde` with `parse_as` on `dyn ObjectParser`.
pub trait ObjectParser: fmt::Debug + Send + Sync {
    /// Media type this parser understands.
    fn content_type(&self) -> &str;

    fn parse_value(&self, body: &str) -> Result<serde_json::Value, ClientError>;
}

impl<'a> dyn ObjectParser + 'a {
    pub fn parse_as<T: DeserializeOwned>(&self, body: &str) -> Result<T, ClientError> {
        let value = self.parse_value(body)?;
        serde_json::from_value(value).map_err(|e| ClientError::Deserialization(e.to_string()))
    }
}

/// JSON parser that can unwrap an envelope.
///
/// With wrapper keys `["data"]`, the body `{"data": {...}}` parses to the
/// inner object. Keys are descended in order.
#[derive(Debug, Clone, Default)]
pub struct JsonObjectParser {
    wrapper_keys: Vec<String>,
}

impl JsonObjectParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wrapper_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrapper_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn wrapper_keys(&self) -> &[String] {
        &self.wrapper_keys
    }
}

impl ObjectParser for JsonObjectParser {
    fn content_type(&self) -> &str {
        JSON_CONTENT_TYPE
    }

    fn parse_value(&self, body: &str) -> Result<serde_json::Value, ClientError> {
        let mut value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ClientError::Deserialization(e.to_string()))?;
        for key in &self.wrapper_keys {
            value = match value {
                serde_json::Value::Object(mut map) => map.remove(key).ok_or_else(|| {
                    ClientError::Deserialization(format!("wrapper key {key:?} not found"))
                })?,
                _ => {
                    return Err(ClientError::Deserialization(format!(
                        "expected an object around wrapper key {key:?}"
                    )))
                }
            };
        }
        Ok(value)
    }
}
