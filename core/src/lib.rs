//! Client side of the todo service's `/todos` API.
//!
//! Nothing here opens a socket. `TodoClient` turns each operation into an
//! `HttpRequest` the host sends however it likes, and turns the host's
//! `HttpResponse` back into a `Todo` or an `ApiError`. Status expectations
//! follow the server: 201 on create, 204 on delete, 200 otherwise.
//!
//! The wire types are declared here rather than borrowed from `todo-server`,
//! so `tests/integration.rs` is what notices when the two disagree.
//! `Todo::effective_progress` gives the live percentage a UI shows beside a
//! todo with a time window.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{Todo, TodoInput};
