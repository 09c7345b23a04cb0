use reqwest::{Response, StatusCode, header};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum BlogClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Only the author may do that; see {location}")]
    Redirected { location: String },
    #[error("Invalid request: {}", describe(.0))]
    InvalidRequest(Vec<FieldError>),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Server answered {status}: {message}")]
    Status { status: StatusCode, message: String },
}

fn describe(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    fields: Vec<FieldError>,
}

impl BlogClientError {
    /// Turns a non-success response into the matching error.
    pub async fn from_http_response(resp: Response) -> Self {
        let status = resp.status();
        if status.is_redirection() {
            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            return BlogClientError::Redirected { location };
        }

        let body: ErrorBody = resp.json().await.unwrap_or_default();
        Self::from_parts(status, body)
    }

    fn from_parts(status: StatusCode, body: ErrorBody) -> Self {
        match status {
            StatusCode::NOT_FOUND => BlogClientError::NotFound(body.error),
            StatusCode::UNAUTHORIZED => BlogClientError::Unauthorized,
            StatusCode::CONFLICT => BlogClientError::Conflict(body.error),
            StatusCode::BAD_REQUEST => {
                BlogClientError::InvalidRequest(body.details.unwrap_or_default().fields)
            }
            _ => BlogClientError::Status {
                status,
                message: body.error,
            },
        }
    }
}
