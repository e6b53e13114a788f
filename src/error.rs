use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Bad input from the caller: unknown ids, empty move lists, malformed tags
    #[error("validation error: {0}")]
    Validation(String),

    /// The feature layout does not match what the classifier was trained on
    #[error("model contract violated: {0}")]
    ModelContract(String),

    #[error("feature builder has not been fit")]
    NotFitted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AdvisorError::Validation(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        AdvisorError::ModelContract(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
