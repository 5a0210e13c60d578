use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("thread pool error: {0}")]
    ThreadPool(String),
    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<SimError> for pyo3::PyErr {
    fn from(err: SimError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
