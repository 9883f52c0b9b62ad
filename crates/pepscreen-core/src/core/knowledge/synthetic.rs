use super::store::{ReferenceStore, StoreError};
use crate::core::models::region::{ReferenceRegion, RegionRole};

/// Thrombospondin-type domain of THBS4 (residues 120-250), the default secretory region.
pub const TSP_DOMAIN_SEQUENCE: &str = "RLLKGVPGNDVPALNQGKEVPALNWQKQEVVQIQFQNHDQALGQKKQDLPEKDKQLLSGQEQKQLFVGGQQLASVQQLAGQKQQLQVGEQQLQEQLQGQEKQLEQA";

const BINDING_MOTIFS: [(&str, &str); 3] = [
    ("EGFR_binding_motif", "LLKGVPGNDVPALNQGKEVPALNWQKQEVVQIQFQNHDQ"),
    ("MET_binding_motif", "VPGNDVPALNQGKEVPALNWQKQEVVQIQFQNHDQAL"),
    ("KDR_binding_motif", "NDVPALNQGKEVPALNWQKQEVVQIQFQNHDQALGQ"),
];

/// Fixed reference set used whenever the live store is unavailable or empty.
///
/// It contains one secretory domain and three receptor-binding motifs, all human, and
/// is returned for every target.
#[derive(Debug, Clone)]
pub struct SyntheticStore {
    regions: Vec<ReferenceRegion>,
}

impl Default for SyntheticStore {
    fn default() -> Self {
        let mut regions = Vec::with_capacity(1 + BINDING_MOTIFS.len());
        regions.extend(ReferenceRegion::new(
            "THBS4_TSP_domain",
            TSP_DOMAIN_SEQUENCE,
            RegionRole::SecretoryDomain,
            "human",
        ));
        regions.extend(BINDING_MOTIFS.iter().filter_map(|(id, sequence)| {
            ReferenceRegion::new(*id, sequence, RegionRole::ReceptorBinding, "human").ok()
        }));
        Self { regions }
    }
}

impl SyntheticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn regions(&self) -> &[ReferenceRegion] {
        &self.regions
    }
}

impl ReferenceStore for SyntheticStore {
    fn describe(&self) -> String {
        "built-in synthetic reference set".to_string()
    }

    fn query_regions(&self, _target: &str) -> Result<Vec<ReferenceRegion>, StoreError> {
        Ok(self.regions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_sequence_is_valid() {
        assert_eq!(SyntheticStore::new().regions().len(), 4);
    }

    #[test]
    fn synthetic_set_spans_both_roles() {
        let store = SyntheticStore::new();
        let roles: Vec<_> = store.regions().iter().map(|r| r.role()).collect();
        assert!(roles.contains(&RegionRole::SecretoryDomain));
        assert!(roles.contains(&RegionRole::ReceptorBinding));
    }

    #[test]
    fn query_ignores_target() {
        let store = SyntheticStore::new();
        let a = store.query_regions("THBS4").unwrap();
        let b = store.query_regions("anything-else").unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }
}
