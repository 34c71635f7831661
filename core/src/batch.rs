//! Batch façade.
//!
//! # Design
//! A `BatchRequest` collects requests built by a client and dispatches them
//! together over the client's transport. The multipart wire envelope is not
//! produced here: each queued request is sent on its own, after passing
//! through the batch's `HttpRequestInitializer`, and results come back in
//! queue order.

use std::fmt;
use std::sync::Arc;

use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{HttpRequestInitializer, HttpTransport, RequestFactory};

pub struct BatchRequest {
    factory: RequestFactory,
    batch_url: String,
    requests: Vec<HttpRequest>,
}

impl BatchRequest {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        initializer: Option<Arc<dyn HttpRequestInitializer>>,
    ) -> Self {
        Self {
            factory: RequestFactory::new(transport, initializer),
            batch_url: String::new(),
            requests: Vec::new(),
        }
    }

    pub fn with_batch_url(mut self, batch_url: impl Into<String>) -> Self {
        self.batch_url = batch_url.into();
        self
    }

    pub fn batch_url(&self) -> &str {
        &self.batch_url
    }

    pub fn queue(&mut self, request: HttpRequest) -> &mut Self {
        self.requests.push(request);
        self
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Send every queued request and drain the queue.
    ///
    /// Fails only when nothing is queued. Per-request failures, including
    /// non-2xx statuses, are reported in the returned list.
    pub fn execute(&mut self) -> Result<Vec<Result<HttpResponse, ClientError>>, ClientError> {
        if self.requests.is_empty() {
            return Err(ClientError::EmptyBatch);
        }
        tracing::debug!(count = self.requests.len(), batch_url = %self.batch_url, "executing batch");
        let requests = std::mem::take(&mut self.requests);
        let results = requests
            .into_iter()
            .map(|request| {
                let result = self.dispatch(request);
                if let Err(e) = &result {
                    tracing::warn!(error = %e, "batched request failed");
                }
                result
            })
            .collect();
        Ok(results)
    }

    fn dispatch(&self, mut request: HttpRequest) -> Result<HttpResponse, ClientError> {
        if let Some(initializer) = self.factory.initializer() {
            initializer.initialize(&mut request)?;
        }
        let mut response = self.factory.execute(&request)?;
        response.parser = request.parser.clone();
        response.error_for_status()
    }
}

impl fmt::Debug for BatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchRequest")
            .field("batch_url", &self.batch_url)
            .field("queued", &self.requests.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::testing::RecordingTransport;

    #[test]
    fn empty_batch_fails() {
        let mut batch = BatchRequest::new(Arc::new(RecordingTransport::new()), None);
        assert!(matches!(batch.execute(), Err(ClientError::EmptyBatch)));
    }

    #[test]
    fn dispatches_in_order_and_drains_queue() {
        let transport = Arc::new(RecordingTransport::new());
        transport.push_response(HttpResponse::new(200, "one"));
        transport.push_response(HttpResponse::new(404, ""));
        transport.push_error("reset");

        let mut batch = BatchRequest::new(transport.clone(), None).with_batch_url("http://h/batch");
        batch
            .queue(HttpRequest::new(HttpMethod::Get, "http://h/a"))
            .queue(HttpRequest::new(HttpMethod::Get, "http://h/b"))
            .queue(HttpRequest::new(HttpMethod::Get, "http://h/c"));
        assert_eq!(batch.len(), 3);

        let results = batch.execute().unwrap();
        assert_eq!(results[0].as_ref().unwrap().body, "one");
        assert!(matches!(results[1], Err(ClientError::NotFound)));
        assert!(matches!(results[2], Err(ClientError::Transport(_))));
        assert!(batch.is_empty());

        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls, ["http://h/a", "http://h/b", "http://h/c"]);
    }

    #[test]
    fn batch_initializer_sees_each_request() {
        let transport = Arc::new(RecordingTransport::new());
        let init = |req: &mut HttpRequest| -> Result<(), ClientError> {
            req.set_header("x-batch", "1");
            Ok(())
        };
        let mut batch = BatchRequest::new(transport.clone(), Some(Arc::new(init)));
        batch.queue(HttpRequest::new(HttpMethod::Delete, "http://h/a"));
        batch.execute().unwrap();
        assert_eq!(transport.last_request().unwrap().header("x-batch"), Some("1"));
    }
}
