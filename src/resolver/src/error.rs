use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    /// No operation could be resolved for `action`. `available` carries up
    /// to 20 candidate operation ids for diagnostics.
    #[error("could not resolve action {action:?} ({} candidates known)", available.len())]
    Unresolved { action: String, available: Vec<String> },
}
