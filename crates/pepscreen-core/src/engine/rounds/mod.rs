pub mod cross_population;
pub mod generation;
pub mod stability;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::models::candidate::{Candidate, Lineage};
    use crate::core::models::region::{ReferenceRegion, RegionRole};
    use crate::core::scoring::AnalysisTier;
    use crate::core::scoring::composition::measure;
    use crate::core::sequence::ProteinSequence;

    pub fn seq(s: &str) -> ProteinSequence {
        ProteinSequence::new(s).unwrap()
    }

    pub fn candidate(id: &str, s: &str) -> Candidate {
        let region = ReferenceRegion::new("test_region", s, RegionRole::ReceptorBinding, "human")
            .unwrap();
        let sequence = seq(s);
        let composition = measure(&sequence, AnalysisTier::Precise);
        Candidate::new(id, sequence, Lineage::from_region(&region, 0), composition)
    }
}
