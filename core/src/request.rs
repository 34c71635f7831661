//! Typed API calls and the hook that initializes them.
//!
//! # Design
//! A `ClientRequest` describes one API method call relative to the client's
//! base URL: a URI template, path and query parameters, extra headers and an
//! optional body. The client runs its `ClientRequestInitializer` on it before
//! turning it into an `HttpRequest`, which is where API keys, quota users and
//! field masks get attached.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::{form_urlencoded, Url};

use crate::error::ClientError;
use crate::http::{HttpContent, HttpMethod};

/// Bytes left untouched when expanding a `{name}` template expression.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// One API method call.
///
/// The URI template is resolved against the base URL. `{name}` expands to
/// the percent-encoded path parameter, `{+name}` inserts it verbatim. A
/// template starting with `/` is resolved against the host of the base URL
/// and an absolute `http(s)://` template is used as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    method: HttpMethod,
    uri_template: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    content: Option<HttpContent>,
}

impl ClientRequest {
    pub fn new(method: HttpMethod, uri_template: impl Into<String>) -> Self {
        Self {
            method,
            uri_template: uri_template.into(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            content: None,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn uri_template(&self) -> &str {
        &self.uri_template
    }

    pub fn content(&self) -> Option<&HttpContent> {
        self.content.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        lookup(&self.path_params, name)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    pub fn with_path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        replace(&mut self.path_params, name, value.into());
        self
    }

    pub fn with_query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_query_param(name, value);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn with_content(mut self, content: HttpContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn set_query_param(&mut self, name: &str, value: impl Into<String>) {
        replace(&mut self.query, name, value.into());
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_ascii_lowercase(), value.into()));
    }

    /// Resolve the template against `base_url` and append the query string.
    pub fn expand_url(&self, base_url: &str) -> Result<String, ClientError> {
        let path = self.expand_template()?;
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            path
        } else if let Some(absolute) = path.strip_prefix('/') {
            let base = Url::parse(base_url).map_err(|source| ClientError::InvalidUrl {
                url: base_url.to_string(),
                source,
            })?;
            format!("{}/{absolute}", base.origin().ascii_serialization())
        } else {
            format!("{base_url}{path}")
        };

        if !self.query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.query)
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }
        Ok(url)
    }

    fn expand_template(&self) -> Result<String, ClientError> {
        let mut out = String::with_capacity(self.uri_template.len());
        let mut rest = self.uri_template.as_str();
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                // unterminated expression, keep it literally
                out.push_str(&rest[start..]);
                return Ok(out);
            };
            let expr = &after[..end];
            let (reserved, name) = match expr.strip_prefix('+') {
                Some(name) => (true, name),
                None => (false, expr),
            };
            let value = self
                .path_param(name)
                .ok_or_else(|| ClientError::MissingPathParameter(name.to_string()))?;
            if reserved {
                out.push_str(value);
            } else {
                out.extend(utf8_percent_encode(value, PATH_SEGMENT));
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn replace(pairs: &mut Vec<(String, String)>, name: &str, value: String) {
    match pairs.iter_mut().find(|(k, _)| k == name) {
        Some((_, existing)) => *existing = value,
        None => pairs.push((name.to_string(), value)),
    }
}

/// Hook run on every `ClientRequest` before it is executed.
pub trait ClientRequestInitializer: Send + Sync {
    fn initialize(&self, request: &mut ClientRequest) -> Result<(), ClientError>;
}

impl<F> ClientRequestInitializer for F
where
    F: Fn(&mut ClientRequest) -> Result<(), ClientError> + Send + Sync,
{
    fn initialize(&self, request: &mut ClientRequest) -> Result<(), ClientError> {
        self(request)
    }
}

/// Sets the system query parameters most APIs accept on every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonParamsInitializer {
    key: Option<String>,
    quota_user: Option<String>,
    fields: Option<String>,
    pretty_print: Option<bool>,
}

impl CommonParamsInitializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// API key identifying the calling project.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_quota_user(mut self, quota_user: impl Into<String>) -> Self {
        self.quota_user = Some(quota_user.into());
        self
    }

    /// Partial response field mask.
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = Some(pretty_print);
        self
    }
}

impl ClientRequestInitializer for CommonParamsInitializer {
    fn initialize(&self, request: &mut ClientRequest) -> Result<(), ClientError> {
        if let Some(key) = &self.key {
            request.set_query_param("key", key.as_str());
        }
        if let Some(quota_user) = &self.quota_user {
            request.set_query_param("quotaUser", quota_user.as_str());
        }
        if let Some(fields) = &self.fields {
            request.set_query_param("fields", fields.as_str());
        }
        if let Some(pretty_print) = self.pretty_print {
            request.set_query_param("prettyPrint", pretty_print.to_string());
        }
        Ok(())
    }
}
