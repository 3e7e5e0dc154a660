use thiserror::Error;

/// Domain errors for the pump device. Every variant is converted into a
/// structured `{status:"error", message}` payload at the dispatch boundary;
/// none escape as uncaught faults.
#[derive(Debug, Error, Clone)]
pub enum DeviceError {
    #[error("auth error: {0}")]
    Auth(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("state error: {0}")]
    State(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("hardware error: {0}")]
    Hardware(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
