//! Configuration layer for generated REST API clients.
//!
//! # Overview
//! An `ApiClient` combines a root URL and a service path into a base URL and
//! wires together the collaborators every generated API method needs: a
//! request factory over an injected transport, an object parser, optional
//! User-Agent injection, request initializers, a batch façade and a
//! subscription store.
//!
//! # Design
//! - The client performs no I/O. An `HttpTransport` implementation supplied
//!   by the caller executes plain-data `HttpRequest` values.
//! - URLs are normalized once at build time so `base_url` is always
//!   `root_url + service_path` with exactly one separating slash.
//! - The client is immutable after `build()`; collaborators are shared
//!   behind `Arc`, so it is cheap to clone and safe to share across threads.
//! - `TodoService` shows a typed API layered on top.

pub mod batch;
pub mod client;
pub mod error;
pub mod http;
pub mod method_override;
pub mod normalize;
pub mod parser;
pub mod request;
pub mod settings;
pub mod subscription;
pub mod todo;
pub mod transport;

#[cfg(test)]
mod testing;

pub use batch::BatchRequest;
pub use client::{ApiClient, ApiClientBuilder};
pub use error::{ClientError, TransportError};
pub use http::{HttpContent, HttpMethod, HttpRequest, HttpResponse};
pub use method_override::MethodOverride;
pub use normalize::{normalize_root_url, normalize_service_path};
pub use parser::{JsonObjectParser, ObjectParser};
pub use request::{ClientRequest, ClientRequestInitializer, CommonParamsInitializer};
pub use settings::ClientSettings;
pub use subscription::{MemorySubscriptionStore, Subscription, SubscriptionStore};
pub use todo::{CreateTodo, Todo, TodoService, UpdateTodo};
pub use transport::{HttpRequestInitializer, HttpTransport, RequestFactory};
