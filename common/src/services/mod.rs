pub mod assistant;
pub mod codebase;
pub mod projects;

use crate::domain::archive::ExtractionError;
use crate::domain::tree::ConflictError;

#[derive(Debug)]
pub struct ServiceError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl From<ExtractionError> for ServiceError {
    fn from(err: ExtractionError) -> Self {
        let code = match err {
            ExtractionError::UnsupportedFormat => 415,
            ExtractionError::Corrupt(_) => 400,
            ExtractionError::TooLarge { .. } => 413,
        };
        Self::new(code, err.to_string())
            .with_data(serde_json::json!({ "reason": err.reason() }))
    }
}

impl From<ConflictError> for ServiceError {
    fn from(err: ConflictError) -> Self {
        Self::new(422, err.to_string()).with_data(serde_json::json!({ "path": err.path }))
    }
}
