use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router inbox closed")]
    Closed,
    #[error("run task failed: {0}")]
    Join(String),
}
