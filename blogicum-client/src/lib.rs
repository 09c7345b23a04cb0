//! Typed HTTP client for the blogicum server.

mod error;
mod http_client;
pub mod models;

pub use error::{BlogClientError, FieldError};
pub use http_client::{BlogClient, TOKEN_FILE};
