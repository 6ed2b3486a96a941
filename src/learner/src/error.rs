use thiserror::Error;

#[derive(Debug, Error)]
pub enum LearnerError {
    #[error("L2 cache error: {0}")]
    L2(String),
}
