//! Client configuration and request construction.
//!
//! # Design
//! `ApiClient` is built once through `ApiClientBuilder` and is immutable
//! afterwards. It holds the normalized root URL and service path, the
//! request factory wrapping the injected transport, the object parser and a
//! few optional collaborators, all behind `Arc` so clones are cheap and the
//! client can be shared across threads. It never touches the network itself:
//! every request goes through the transport.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::de::DeserializeOwned;

use crate::batch::BatchRequest;
use crate::error::ClientError;
use crate::http::{HttpContent, HttpMethod, HttpRequest, HttpResponse, USER_AGENT};
use crate::method_override::MethodOverride;
use crate::normalize::{batch_url, normalize_root_url, normalize_service_path};
use crate::parser::ObjectParser;
use crate::request::{ClientRequest, ClientRequestInitializer};
use crate::settings::ClientSettings;
use crate::subscription::SubscriptionStore;
use crate::transport::{HttpRequestInitializer, HttpTransport, RequestFactory};

/// Configured client for one REST API.
#[derive(Clone)]
pub struct ApiClient {
    request_factory: RequestFactory,
    client_request_initializer: Option<Arc<dyn ClientRequestInitializer>>,
    root_url: String,
    service_path: String,
    application_name: Option<String>,
    object_parser: Arc<dyn ObjectParser>,
    subscription_store: Option<Arc<dyn SubscriptionStore>>,
    suppress_pattern_checks: bool,
    method_override: MethodOverride,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Root URL of the API, always ending in `/`.
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Service path relative to the root URL: empty, or ending in `/`
    /// without a leading `/`.
    pub fn service_path(&self) -> &str {
        &self.service_path
    }

    pub fn base_url(&self) -> String {
        format!("{}{}", self.root_url, self.service_path)
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    pub fn request_factory(&self) -> &RequestFactory {
        &self.request_factory
    }

    pub fn client_request_initializer(&self) -> Option<&Arc<dyn ClientRequestInitializer>> {
        self.client_request_initializer.as_ref()
    }

    pub fn object_parser(&self) -> &Arc<dyn ObjectParser> {
        &self.object_parser
    }

    pub fn subscription_store(&self) -> Option<&Arc<dyn SubscriptionStore>> {
        self.subscription_store.as_ref()
    }

    pub fn suppress_pattern_checks(&self) -> bool {
        self.suppress_pattern_checks
    }

    pub fn method_override(&self) -> MethodOverride {
        self.method_override
    }

    /// Run the client request initializer on `request`, if one is set.
    pub fn initialize(&self, request: &mut ClientRequest) -> Result<(), ClientError> {
        if let Some(initializer) = &self.client_request_initializer {
            tracing::trace!(template = request.uri_template(), "running client request initializer");
            initializer.initialize(request)?;
        }
        Ok(())
    }

    /// Validate a request parameter against its declared pattern.
    ///
    /// Always succeeds when pattern checks are suppressed.
    pub fn check_pattern(&self, name: &str, value: &str, pattern: &str) -> Result<(), ClientError> {
        if self.suppress_pattern_checks {
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|source| ClientError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        if regex.is_match(value) {
            Ok(())
        } else {
            Err(ClientError::PatternMismatch {
                name: name.to_string(),
                value: value.to_string(),
                pattern: pattern.to_string(),
            })
        }
    }

    /// Build a request through the request factory and apply the client's
    /// configuration: method override, object parser, User-Agent, and an
    /// empty body for POST requests without content.
    pub fn build_http_request(
        &self,
        method: HttpMethod,
        url: &str,
        content: Option<HttpContent>,
    ) -> Result<HttpRequest, ClientError> {
        let mut request = self.request_factory.build_request(method, url, content)?;
        self.method_override
            .intercept(&mut request, self.request_factory.transport().as_ref());
        request.parser = Some(self.object_parser.clone());
        if let Some(name) = &self.application_name {
            request.set_header(USER_AGENT, name.as_str());
        }
        // POST without content still needs a Content-Length header
        if request.content.is_none() && method == HttpMethod::Post {
            request.content = Some(HttpContent::Empty);
        }
        tracing::debug!(method = %request.method, url = %request.url, "built HTTP request");
        Ok(request)
    }

    /// Initialize `request`, resolve it against the base URL and build the
    /// HTTP request for it.
    pub fn build_client_request(&self, mut request: ClientRequest) -> Result<HttpRequest, ClientError> {
        self.initialize(&mut request)?;
        let url = request.expand_url(&self.base_url())?;
        let mut http_request =
            self.build_http_request(request.method(), &url, request.content().cloned())?;
        for (name, value) in request.headers() {
            http_request.set_header(name, value.as_str());
        }
        Ok(http_request)
    }

    pub fn execute(&self, request: ClientRequest) -> Result<HttpResponse, ClientError> {
        let http_request = self.build_client_request(request)?;
        self.execute_unparsed_request(&http_request)
    }

    pub fn execute_as<T: DeserializeOwned>(&self, request: ClientRequest) -> Result<T, ClientError> {
        self.execute(request)?.parse_as()
    }

    pub fn execute_unparsed(
        &self,
        method: HttpMethod,
        url: &str,
        content: Option<HttpContent>,
    ) -> Result<HttpResponse, ClientError> {
        let request = self.build_http_request(method, url, content)?;
        self.execute_unparsed_request(&request)
    }

    /// Send `request` and return the response without decoding its body.
    /// Non-2xx statuses are errors.
    pub fn execute_unparsed_request(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut response = self.request_factory.execute(request)?;
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "executed HTTP request"
        );
        response.parser = request.parser.clone();
        response.error_for_status()
    }

    /// Send a request and return the raw response body.
    pub fn execute_as_string(
        &self,
        method: HttpMethod,
        url: &str,
        content: Option<HttpContent>,
    ) -> Result<String, ClientError> {
        Ok(self.execute_unparsed(method, url, content)?.body)
    }

    pub fn batch(&self) -> BatchRequest {
        self.batch_with_initializer(None)
    }

    /// Batch over this client's transport, posting to `<root_url>batch`.
    pub fn batch_with_initializer(
        &self,
        initializer: Option<Arc<dyn HttpRequestInitializer>>,
    ) -> BatchRequest {
        BatchRequest::new(self.request_factory.transport().clone(), initializer)
            .with_batch_url(batch_url(&self.root_url))
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("root_url", &self.root_url)
            .field("service_path", &self.service_path)
            .field("application_name", &self.application_name)
            .field("object_parser", &self.object_parser)
            .field("suppress_pattern_checks", &self.suppress_pattern_checks)
            .field("method_override", &self.method_override)
            .finish_non_exhaustive()
    }
}

/// Single-use builder for `ApiClient`.
///
/// Transport, object parser, root URL and service path are required;
/// `build` reports whichever is missing.
#[derive(Default)]
pub struct ApiClientBuilder {
    transport: Option<Arc<dyn HttpTransport>>,
    object_parser: Option<Arc<dyn ObjectParser>>,
    root_url: Option<String>,
    service_path: Option<String>,
    http_request_initializer: Option<Arc<dyn HttpRequestInitializer>>,
    client_request_initializer: Option<Arc<dyn ClientRequestInitializer>>,
    application_name: Option<String>,
    subscription_store: Option<Arc<dyn SubscriptionStore>>,
    suppress_pattern_checks: bool,
    method_override: MethodOverride,
}

impl ApiClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn object_parser(mut self, parser: Arc<dyn ObjectParser>) -> Self {
        self.object_parser = Some(parser);
        self
    }

    pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
        self.root_url = Some(root_url.into());
        self
    }

    pub fn service_path(mut self, service_path: impl Into<String>) -> Self {
        self.service_path = Some(service_path.into());
        self
    }

    pub fn http_request_initializer(mut self, initializer: Arc<dyn HttpRequestInitializer>) -> Self {
        self.http_request_initializer = Some(initializer);
        self
    }

    pub fn client_request_initializer(
        mut self,
        initializer: Arc<dyn ClientRequestInitializer>,
    ) -> Self {
        self.client_request_initializer = Some(initializer);
        self
    }

    /// Sent as the User-Agent of every request.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn subscription_store(mut self, store: Arc<dyn SubscriptionStore>) -> Self {
        self.subscription_store = Some(store);
        self
    }

    pub fn suppress_pattern_checks(mut self, suppress: bool) -> Self {
        self.suppress_pattern_checks = suppress;
        self
    }

    pub fn method_override(mut self, method_override: MethodOverride) -> Self {
        self.method_override = method_override;
        self
    }

    /// Copy every field that is set in `settings`.
    pub fn apply_settings(mut self, settings: &ClientSettings) -> Self {
        if let Some(root_url) = &settings.root_url {
            self.root_url = Some(root_url.clone());
        }
        if let Some(service_path) = &settings.service_path {
            self.service_path = Some(service_path.clone());
        }
        if let Some(name) = &settings.application_name {
            self.application_name = Some(name.clone());
        }
        if let Some(suppress) = settings.suppress_pattern_checks {
            self.suppress_pattern_checks = suppress;
        }
        if let Some(override_all) = settings.override_all_methods {
            self.method_override = self.method_override.override_all_methods(override_all);
        }
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let transport = self.transport.ok_or(ClientError::MissingTransport)?;
        let object_parser = self.object_parser.ok_or(ClientError::MissingObjectParser)?;
        let root_url = normalize_root_url(self.root_url.as_deref().ok_or(ClientError::MissingRootUrl)?);
        let service_path = normalize_service_path(
            self.service_path
                .as_deref()
                .ok_or(ClientError::MissingServicePath)?,
        )?;

        tracing::debug!(
            root_url = %root_url,
            service_path = %service_path,
            application_name = ?self.application_name,
            "built API client"
        );
        Ok(ApiClient {
            request_factory: RequestFactory::new(transport, self.http_request_initializer),
            client_request_initializer: self.client_request_initializer,
            root_url,
            service_path,
            application_name: self.application_name,
            object_parser,
            subscription_store: self.subscription_store,
            suppress_pattern_checks: self.suppress_pattern_checks,
            method_override: self.method_override,
        })
    }
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("root_url", &self.root_url)
            .field("service_path", &self.service_path)
            .field("application_name", &self.application_name)
            .field("suppress_pattern_checks", &self.suppress_pattern_checks)
            .finish_non_exhaustive()
    }
}
