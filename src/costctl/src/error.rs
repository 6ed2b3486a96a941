use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostError {
    #[error("budget would be exceeded: {0}")]
    BudgetExceeded(String),

    #[error("cost repository error: {0}")]
    Repository(String),
}
