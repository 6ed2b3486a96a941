//! # Security Gate
//!
//! Stage 1 of the execution pipeline. Four sub-engines — PII detector,
//! secret scanner, data classifier, encryptor — composed into a single
//! `validate_content` entry point that the execution pipeline calls before
//! anything else touches a request's parameters.

pub mod classifier;
pub mod encryptor;
pub mod error;
pub mod pii;
pub mod secrets;
pub mod validator;

pub use classifier::DataClassifier;
pub use encryptor::Encryptor;
pub use error::SecurityError;
pub use pii::PiiDetector;
pub use secrets::SecretScanner;
pub use validator::{SecurityConfig, SecurityValidation, SecurityValidator};
