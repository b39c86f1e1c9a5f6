use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to the casebook API.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("API refused credentials ({status}): {body}")]
    Auth { status: StatusCode, body: String },

    /// The server has no endpoint for a collection we tried to write.
    #[error("Collection endpoint missing on server: {0}")]
    EndpointMissing(String),

    #[error("API still rate limited after retries")]
    RateLimited,

    #[error("API server failed ({status}): {body}")]
    Server { status: StatusCode, body: String },

    #[error("Cannot reach API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected API response ({status}): {body}")]
    Unexpected { status: StatusCode, body: String },
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Cut a response body at a char boundary so messages stay short.
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

impl HttpError {
    /// Map a non-success status (other than a retryable 429) to an error.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let body = truncate_body(body);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HttpError::Auth { status, body },
            StatusCode::NOT_FOUND => HttpError::EndpointMissing(body),
            StatusCode::TOO_MANY_REQUESTS => HttpError::RateLimited,
            s if s.is_server_error() => HttpError::Server { status, body },
            _ => HttpError::Unexpected { status, body },
        }
    }
}
