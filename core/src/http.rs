//! HTTP request/response types exchanged with the injected transport.
//!
//! # Design
//! Requests and responses are plain data. The client builds `HttpRequest`
//! values and hands them to an `HttpTransport`; the transport performs the
//! I/O and returns an `HttpResponse`. Headers are kept as an ordered list of
//! pairs and looked up case-insensitively.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ClientError;
use crate::parser::ObjectParser;

pub const USER_AGENT: &str = "user-agent";
pub const CONTENT_TYPE: &str = "content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body.
///
/// `Empty` is an explicit zero-length body, distinct from having no content
/// at all: transports send it with `Content-Length: 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpContent {
    Empty,
    Text { content_type: String, data: String },
}

impl HttpContent {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ClientError> {
        let data =
            serde_json::to_string(value).map_err(|e| ClientError::Serialization(e.to_string()))?;
        Ok(HttpContent::Text {
            content_type: JSON_CONTENT_TYPE.to_string(),
            data,
        })
    }

    /// URL-encoded form body from an already encoded query string.
    pub fn form(encoded: impl Into<String>) -> Self {
        HttpContent::Text {
            content_type: FORM_CONTENT_TYPE.to_string(),
            data: encoded.into(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        match self {
            HttpContent::Empty => None,
            HttpContent::Text { content_type, .. } => Some(content_type),
        }
    }

    pub fn data(&self) -> &str {
        match self {
            HttpContent::Empty => "",
            HttpContent::Text { data, .. } => data,
        }
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An outbound HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub content: Option<HttpContent>,
    /// Parser used to decode the response to this request.
    pub parser: Option<Arc<dyn ObjectParser>>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            content: None,
            parser: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Set `name` to `value`, replacing any existing values for `name`.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.remove_header(name);
        self.headers.push((name.to_ascii_lowercase(), value.into()));
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

/// An HTTP response described as plain data.
///
/// Built by the transport. The client attaches the originating request's
/// parser before handing the response back to callers.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub parser: Option<Arc<dyn ObjectParser>>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            parser: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Map non-success status codes to the appropriate `ClientError` variant.
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            return Ok(self);
        }
        if self.status == 404 {
            return Err(ClientError::NotFound);
        }
        Err(ClientError::Http {
            status: self.status,
            body: self.body,
        })
    }

    /// Decode the body with the attached parser, falling back to plain JSON.
    pub fn parse_as<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        match &self.parser {
            Some(parser) => parser.parse_as(&self.body),
            None => serde_json::from_str(&self.body)
                .map_err(|e| ClientError::Deserialization(e.to_string())),
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
