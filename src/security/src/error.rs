use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecurityError {
    /// Content failed validation and the caller asked to fail closed.
    #[error("content blocked: {0}")]
    Blocked(String),

    /// The configured encryption key could not be turned into a 32-byte AES-256 key.
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("encryption failure: {0}")]
    Encryption(String),

    #[error("decryption failure: {0}")]
    Decryption(String),
}
