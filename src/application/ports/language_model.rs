use async_trait::async_trait;

/// Backend failure surfaced by the gateway. Callers convert this into safe
/// defaults; it never propagates to the HTTP layer.
#[derive(Debug)]
pub enum GatewayError {
    NetworkError(String),
    /// Non-2xx response with the backend status and body.
    BackendError { status: u16, body: String },
    InvalidResponse(String),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            GatewayError::BackendError { status, body } => {
                write!(f, "Backend error {}: {}", status, body)
            }
            GatewayError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

/// Text-generation and embedding backend. Both operations are single
/// request/response calls; retry policy belongs to the caller.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GatewayError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, GatewayError>;
}
