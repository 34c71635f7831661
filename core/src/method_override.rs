//! Tunnels HTTP methods through POST.
//!
//! Some proxies and transports cannot send every method, and servers cap URL
//! length. An overridden request is sent as POST with the original method in
//! `X-HTTP-Method-Override`. An overridden GET carries its query string as an
//! URL-encoded form body instead of in the URL.

use crate::http::{HttpContent, HttpMethod, HttpRequest};
use crate::transport::HttpTransport;

pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// GET requests with longer URLs are overridden.
pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodOverride {
    override_all_methods: bool,
}

impl MethodOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override every method other than GET and POST, even those the
    /// transport supports.
    pub fn override_all_methods(mut self, override_all: bool) -> Self {
        self.override_all_methods = override_all;
        self
    }

    pub fn overrides_all_methods(&self) -> bool {
        self.override_all_methods
    }

    pub fn intercept(&self, request: &mut HttpRequest, transport: &dyn HttpTransport) {
        if !self.should_override(request, transport) {
            return;
        }
        let method = request.method;
        tracing::debug!(%method, url = %request.url, "overriding HTTP method with POST");
        request.method = HttpMethod::Post;
        request.set_header(METHOD_OVERRIDE_HEADER, method.as_str());
        if method == HttpMethod::Get {
            if let Some((path, query)) = request.url.split_once('?') {
                request.content = Some(HttpContent::form(query));
                request.url = path.to_string();
            } else {
                request.content = Some(HttpContent::Empty);
            }
        } else if request.content.is_none() {
            request.content = Some(HttpContent::Empty);
        }
    }

    fn should_override(&self, request: &HttpRequest, transport: &dyn HttpTransport) -> bool {
        let method = request.method;
        if method == HttpMethod::Post {
            return false;
        }
        let forced = if method == HttpMethod::Get {
            request.url.len() > MAX_URL_LENGTH
        } else {
            self.override_all_methods
        };
        forced || !transport.supports_method(method)
    }
}
