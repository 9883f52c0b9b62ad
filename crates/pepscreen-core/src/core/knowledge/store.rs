use crate::core::models::region::ReferenceRegion;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not reach reference store at '{endpoint}': {message}")]
    Connection { endpoint: String, message: String },

    #[error("Reference store did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Reference store rejected the query: {0}")]
    Query(String),

    #[error("Malformed reference store response: {0}")]
    Decode(String),
}

/// Backend that can list reference regions for a target protein.
pub trait ReferenceStore: Send + Sync {
    /// Human-readable description of where the data comes from, used in logs.
    fn describe(&self) -> String;

    fn query_regions(&self, target: &str) -> Result<Vec<ReferenceRegion>, StoreError>;
}
