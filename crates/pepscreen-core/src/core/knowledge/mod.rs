//! Reference data for candidate generation.
//!
//! [`KnowledgeSource`] is either backed by a live [`ReferenceStore`] with the built-in
//! [`SyntheticStore`] as fallback, or by the synthetic set alone. Whatever the backend
//! does, [`KnowledgeSource::fetch_reference_regions`] returns a non-empty list.

pub mod graph;
pub mod store;
pub mod synthetic;

pub use graph::{GraphStore, GraphStoreSettings};
pub use store::{ReferenceStore, StoreError};
pub use synthetic::SyntheticStore;

use crate::core::models::region::ReferenceRegion;
use tracing::{info, warn};

pub enum KnowledgeSource {
    Live {
        store: Box<dyn ReferenceStore>,
        fallback: SyntheticStore,
    },
    Synthetic(SyntheticStore),
}

impl KnowledgeSource {
    pub fn live(store: Box<dyn ReferenceStore>) -> Self {
        KnowledgeSource::Live {
            store,
            fallback: SyntheticStore::new(),
        }
    }

    pub fn synthetic() -> Self {
        KnowledgeSource::Synthetic(SyntheticStore::new())
    }

    /// Connects to the graph store if one can be configured; otherwise uses the
    /// synthetic set.
    pub fn connect(settings: GraphStoreSettings) -> Self {
        match GraphStore::new(settings) {
            Ok(store) => Self::live(Box::new(store)),
            Err(e) => {
                warn!(error = %e, "Reference store client could not be created.");
                Self::synthetic()
            }
        }
    }

    /// Issues at most one query against the live store. Failures and empty answers
    /// are both replaced by the synthetic set.
    pub fn fetch_reference_regions(&self, target: &str) -> Vec<ReferenceRegion> {
        match self {
            KnowledgeSource::Synthetic(fallback) => fallback.regions().to_vec(),
            KnowledgeSource::Live { store, fallback } => {
                match store.query_regions(target) {
                    Ok(regions) if !regions.is_empty() => {
                        info!(
                            count = regions.len(),
                            source = %store.describe(),
                            "Fetched reference regions."
                        );
                        regions
                    }
                    Ok(_) => {
                        info!(
                            target,
                            source = %store.describe(),
                            "Reference store has no regions for target; using synthetic set."
                        );
                        fallback.regions().to_vec()
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            source = %store.describe(),
                            "Reference store unavailable; using synthetic set."
                        );
                        fallback.regions().to_vec()
                    }
                }
            }
        }
    }
}
