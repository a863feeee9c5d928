use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No signed-in user")]
    Unauthenticated,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} is out of range (1..={total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("Page size must be greater than zero")]
    InvalidPageSize,

    #[error("A submission is already in flight for {0}")]
    Busy(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl CatalogError {
    /// Map a non-success response from the catalog API onto the error taxonomy.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                } else {
                    trimmed.to_string()
                }
            });

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                CatalogError::Validation(message)
            }
            StatusCode::UNAUTHORIZED => CatalogError::Unauthenticated,
            StatusCode::FORBIDDEN => CatalogError::Forbidden(message),
            StatusCode::NOT_FOUND => CatalogError::NotFound(message),
            other => CatalogError::Server {
                status: other.as_u16(),
                message,
            },
        }
    }

    /// Whether the caller may simply retry the same operation.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Transport(_) => true,
            CatalogError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Short user-facing notice for the presentation layer.
    pub fn notice(&self) -> String {
        match self {
            CatalogError::Validation(msg) => msg.clone(),
            CatalogError::Unauthenticated => "Please sign in to continue".to_string(),
            CatalogError::Forbidden(_) => "You are not allowed to do that".to_string(),
            CatalogError::NotFound(_) => {
                "That item no longer exists; the view has been refreshed".to_string()
            }
            CatalogError::Busy(_) => "Still working on your last request".to_string(),
            CatalogError::Transport(_) => "Network problem, please try again".to_string(),
            CatalogError::Server { .. } => "The server could not complete the request".to_string(),
            other => other.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
