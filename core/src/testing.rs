//! In-memory transport for unit tests.

use std::collections::VecDeque;

use parking_lot::Mutex;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::HttpTransport;

/// Records every request and replays queued responses in order. Once the
/// queue is drained it answers `200 {}`.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<HttpRequest>>,
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    unsupported: Vec<HttpMethod>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_methods(methods: &[HttpMethod]) -> Self {
        Self {
            unsupported: methods.to_vec(),
            ..Self::default()
        }
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.responses.lock().push_back(Ok(response));
    }

    pub fn push_error(&self, message: &str) {
        self.responses.lock().push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

impl HttpTransport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request.clone());
        match self.responses.lock().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(message.into()),
            None => Ok(HttpResponse::new(200, "{}")),
        }
    }

    fn supports_method(&self, method: HttpMethod) -> bool {
        !self.unsupported.contains(&method)
    }
}
