//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and drives `ApiClient` and
//! `TodoService` over real HTTP through a `ureq`-backed `HttpTransport`. The
//! transport deliberately lacks PATCH so method override is exercised on the
//! wire.

use std::sync::Arc;

use mock_server::Echo;
use rest_client_core::{
    ApiClient, ClientError, ClientRequest, CommonParamsInitializer, CreateTodo, HttpContent,
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, JsonObjectParser, TodoService,
    TransportError, UpdateTodo,
};

/// Executes requests with ureq, returning 4xx/5xx responses as data.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    content: Option<&HttpContent>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match content {
        Some(HttpContent::Text { content_type, data }) => {
            builder.content_type(content_type.as_str()).send(data.as_bytes())
        }
        _ => builder.send_empty(),
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let content = request.content.as_ref();
        let mut response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), request).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), request).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(url), request), content),
            HttpMethod::Put => send(with_headers(self.agent.put(url), request), content),
            other => return Err(format!("unsupported method {other}").into()),
        }?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string()?;
        Ok(HttpResponse::new(status, body))
    }

    fn supports_method(&self, method: HttpMethod) -> bool {
        matches!(
            method,
            HttpMethod::Get | HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete
        )
    }
}

/// Start the mock server on a random port and return its root URL.
fn spawn_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn echo_client(root_url: &str) -> ApiClient {
    ApiClient::builder()
        .transport(Arc::new(UreqTransport::new()))
        .object_parser(Arc::new(JsonObjectParser::new()))
        .root_url(root_url)
        .service_path("/")
        .application_name("todo-cli/1.0")
        .build()
        .unwrap()
}

#[test]
fn crud_lifecycle() {
    let root_url = spawn_server();
    let client = TodoService::builder(Arc::new(UreqTransport::new()), &root_url)
        .build()
        .unwrap();
    let service = TodoService::new(client);

    assert!(service.list_todos().unwrap().is_empty(), "expected empty list");

    let created = service
        .create_todo(&CreateTodo {
            title: "Integration test".to_string(),
            completed: false,
        })
        .unwrap();
    assert_eq!(created.title, "Integration test");
    let id = created.id.to_string();

    let fetched = service.get_todo(&id).unwrap();
    assert_eq!(fetched, created);

    let updated = service
        .update_todo(
            &id,
            &UpdateTodo {
                completed: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.title, "Integration test");
    assert!(updated.completed);

    assert_eq!(service.list_todos_by_status(true).unwrap().len(), 1);
    assert!(service.list_todos_by_status(false).unwrap().is_empty());

    service.delete_todo(&id).unwrap();
    assert!(matches!(service.get_todo(&id), Err(ClientError::NotFound)));
    assert!(matches!(service.delete_todo(&id), Err(ClientError::NotFound)));
    assert!(service.list_todos().unwrap().is_empty());
}

#[test]
fn batch_get_mixes_hits_and_misses() {
    let root_url = spawn_server();
    let client = TodoService::builder(Arc::new(UreqTransport::new()), &root_url)
        .build()
        .unwrap();
    let service = TodoService::new(client);
    let created = service
        .create_todo(&CreateTodo {
            title: "Batched".to_string(),
            completed: true,
        })
        .unwrap();
    let id = created.id.to_string();

    let results = service
        .batch_get(&[&id, "00000000-0000-0000-0000-000000000000"])
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().id, created.id);
    assert!(matches!(results[1], Err(ClientError::NotFound)));
}

#[test]
fn suppressed_pattern_checks_let_server_reject_ids() {
    let root_url = spawn_server();
    let client = TodoService::builder(Arc::new(UreqTransport::new()), &root_url)
        .suppress_pattern_checks(true)
        .build()
        .unwrap();
    let service = TodoService::new(client);
    let err = service.get_todo("not-a-uuid").unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 400, .. }));
}

#[test]
fn user_agent_reaches_server() {
    let root_url = spawn_server();
    let client = echo_client(&root_url);
    let echo: Echo = client
        .execute_as(ClientRequest::new(HttpMethod::Get, "echo"))
        .unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.user_agent.as_deref(), Some("todo-cli/1.0"));
}

#[test]
fn post_without_content_is_sent_empty() {
    let root_url = spawn_server();
    let client = echo_client(&root_url);
    let echo: Echo = client
        .execute_as(ClientRequest::new(HttpMethod::Post, "echo"))
        .unwrap();
    assert_eq!(echo.method, "POST");
    assert!(echo.body.is_empty());
}

#[test]
fn unsupported_method_is_tunnelled_through_post() {
    let root_url = spawn_server();
    let client = echo_client(&root_url);
    let request = ClientRequest::new(HttpMethod::Patch, "echo")
        .with_content(HttpContent::json(&serde_json::json!({"title": "x"})).unwrap());
    let echo: Echo = client.execute_as(request).unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.method_override.as_deref(), Some("PATCH"));
    assert_eq!(echo.content_type.as_deref(), Some("application/json"));
    assert_eq!(echo.body, r#"{"title":"x"}"#);
}

#[test]
fn long_get_moves_query_into_body() {
    let root_url = spawn_server();
    let client = echo_client(&root_url);
    let long = "a".repeat(3000);
    let echo: Echo = client
        .execute_as(ClientRequest::new(HttpMethod::Get, "echo").with_query_param("q", long.as_str()))
        .unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.method_override.as_deref(), Some("GET"));
    assert!(echo.query.is_none());
    assert_eq!(echo.body, format!("q={long}"));
}

#[test]
fn client_request_initializer_adds_query_params() {
    let root_url = spawn_server();
    let client = ApiClient::builder()
        .transport(Arc::new(UreqTransport::new()))
        .object_parser(Arc::new(JsonObjectParser::new()))
        .root_url(&root_url)
        .service_path("")
        .client_request_initializer(Arc::new(
            CommonParamsInitializer::new().with_key("k-1").with_quota_user("alice"),
        ))
        .build()
        .unwrap();
    let echo: Echo = client
        .execute_as(ClientRequest::new(HttpMethod::Get, "echo"))
        .unwrap();
    assert_eq!(echo.query.as_deref(), Some("key=k-1&quotaUser=alice"));
}

#[test]
fn connection_failure_is_a_transport_error() {
    // bind then drop to get a port nobody listens on
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let client = echo_client(&format!("http://{addr}"));
    let err = client
        .execute_as_string(HttpMethod::Get, &format!("{}echo", client.base_url()), None)
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}
