//! Transport seam and the request factory built on it.
//!
//! # Design
//! The client never performs I/O itself. An `HttpTransport` executes
//! `HttpRequest` values; the `RequestFactory` pairs a transport with an
//! optional `HttpRequestInitializer` that sees every request it builds
//! (credentials, timeouts, custom headers).

use std::fmt;
use std::sync::Arc;

use crate::error::{ClientError, TransportError};
use crate::http::{HttpContent, HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP requests.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Whether the transport can send `method` natively. Methods it cannot
    /// send are tunnelled through POST by `MethodOverride`.
    fn supports_method(&self, method: HttpMethod) -> bool {
        let _ = method;
        true
    }
}

/// Hook run on every `HttpRequest` a `RequestFactory` builds.
pub trait HttpRequestInitializer: Send + Sync {
    fn initialize(&self, request: &mut HttpRequest) -> Result<(), ClientError>;
}

impl<F> HttpRequestInitializer for F
where
    F: Fn(&mut HttpRequest) -> Result<(), ClientError> + Send + Sync,
{
    fn initialize(&self, request: &mut HttpRequest) -> Result<(), ClientError> {
        self(request)
    }
}

/// Builds and executes requests over a shared transport.
#[derive(Clone)]
pub struct RequestFactory {
    transport: Arc<dyn HttpTransport>,
    initializer: Option<Arc<dyn HttpRequestInitializer>>,
}

impl RequestFactory {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        initializer: Option<Arc<dyn HttpRequestInitializer>>,
    ) -> Self {
        Self {
            transport,
            initializer,
        }
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    pub fn initializer(&self) -> Option<&Arc<dyn HttpRequestInitializer>> {
        self.initializer.as_ref()
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        url: &str,
        content: Option<HttpContent>,
    ) -> Result<HttpRequest, ClientError> {
        let mut request = HttpRequest::new(method, url);
        request.content = content;
        if let Some(initializer) = &self.initializer {
            tracing::trace!(%method, url, "running HTTP request initializer");
            initializer.initialize(&mut request)?;
        }
        Ok(request)
    }

    /// Send `request` and return the raw response, whatever its status.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        self.transport
            .execute(request)
            .map_err(ClientError::Transport)
    }
}

impl fmt::Debug for RequestFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestFactory")
            .field("has_initializer", &self.initializer.is_some())
            .finish_non_exhaustive()
    }
}
