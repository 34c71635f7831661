//! Typed client for the todo API.
//!
//! # Design
//! `TodoService` is a thin generated-style layer over `ApiClient`. Each
//! operation has a `*_request` method producing a `ClientRequest` (usable on
//! its own or in a batch) and an executing method that sends it and decodes
//! the response. Ids are checked against the UUID pattern unless the client
//! suppresses pattern checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::{ApiClient, ApiClientBuilder};
use crate::error::ClientError;
use crate::http::{HttpContent, HttpMethod};
use crate::parser::JsonObjectParser;
use crate::request::ClientRequest;
use crate::transport::HttpTransport;

pub const DEFAULT_SERVICE_PATH: &str = "todo/v1/";

pub const ID_PATTERN: &str =
    "^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update; absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TodoService {
    client: ApiClient,
}

impl TodoService {
    /// Builder preset with a JSON parser and the default service path.
    pub fn builder(transport: Arc<dyn HttpTransport>, root_url: &str) -> ApiClientBuilder {
        ApiClient::builder()
            .transport(transport)
            .object_parser(Arc::new(JsonObjectParser::new()))
            .root_url(root_url)
            .service_path(DEFAULT_SERVICE_PATH)
    }

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn list_request(&self, completed: Option<bool>) -> ClientRequest {
        let request = ClientRequest::new(HttpMethod::Get, "todos");
        match completed {
            Some(completed) => request.with_query_param("completed", completed.to_string()),
            None => request,
        }
    }

    pub fn get_request(&self, id: &str) -> Result<ClientRequest, ClientError> {
        self.client.check_pattern("id", id, ID_PATTERN)?;
        Ok(ClientRequest::new(HttpMethod::Get, "todos/{id}").with_path_param("id", id))
    }

    pub fn create_request(&self, input: &CreateTodo) -> Result<ClientRequest, ClientError> {
        Ok(ClientRequest::new(HttpMethod::Post, "todos").with_content(HttpContent::json(input)?))
    }

    pub fn update_request(&self, id: &str, input: &UpdateTodo) -> Result<ClientRequest, ClientError> {
        self.client.check_pattern("id", id, ID_PATTERN)?;
        Ok(ClientRequest::new(HttpMethod::Put, "todos/{id}")
            .with_path_param("id", id)
            .with_content(HttpContent::json(input)?))
    }

    pub fn delete_request(&self, id: &str) -> Result<ClientRequest, ClientError> {
        self.client.check_pattern("id", id, ID_PATTERN)?;
        Ok(ClientRequest::new(HttpMethod::Delete, "todos/{id}").with_path_param("id", id))
    }

    pub fn list_todos(&self) -> Result<Vec<Todo>, ClientError> {
        self.client.execute_as(self.list_request(None))
    }

    pub fn list_todos_by_status(&self, completed: bool) -> Result<Vec<Todo>, ClientError> {
        self.client.execute_as(self.list_request(Some(completed)))
    }

    pub fn get_todo(&self, id: &str) -> Result<Todo, ClientError> {
        self.client.execute_as(self.get_request(id)?)
    }

    pub fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        self.client.execute_as(self.create_request(input)?)
    }

    pub fn update_todo(&self, id: &str, input: &UpdateTodo) -> Result<Todo, ClientError> {
        self.client.execute_as(self.update_request(id, input)?)
    }

    pub fn delete_todo(&self, id: &str) -> Result<(), ClientError> {
        self.client.execute(self.delete_request(id)?)?;
        Ok(())
    }

    /// Fetch several todos through one batch. Results are in `ids` order.
    pub fn batch_get(&self, ids: &[&str]) -> Result<Vec<Result<Todo, ClientError>>, ClientError> {
        let mut batch = self.client.batch();
        for id in ids {
            batch.queue(self.client.build_client_request(self.get_request(id)?)?);
        }
        let results = batch.execute()?;
        Ok(results
            .into_iter()
            .map(|result| result.and_then(|response| response.parse_as()))
            .collect())
    }
}
