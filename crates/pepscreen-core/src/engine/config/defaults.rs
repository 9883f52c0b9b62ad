use super::{PipelineConfigBuilder, RegionSelection};
use crate::core::scoring::{AnalysisTier, Receptor};

/// Compiled-in value for every option; the first layer of resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsConfig {
    pub target_protein: String,
    pub target_count: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub max_attempts_per_candidate: usize,
    pub region_selection: RegionSelection,
    pub seed: Option<u64>,

    pub analysis: AnalysisTier,
    pub max_molecular_weight: f64,
    pub max_hydrophobicity: f64,
    pub max_hydrophobic_fraction: f64,
    pub max_cysteine_fraction: f64,
    pub forbidden_motifs: Vec<String>,

    pub tm_threshold: f64,
    pub protective_mutations: bool,
    pub max_protective_mutations: usize,

    pub max_ratio: f64,
    pub primary_population: String,
    pub secondary_population: String,
    pub receptors: Vec<Receptor>,

    pub knowledge_enabled: bool,
    pub knowledge_uri: String,
    pub knowledge_database: String,
    pub knowledge_user: String,
    pub knowledge_password: Option<String>,
    pub knowledge_timeout_secs: u64,
    pub binding_energy_cutoff: f64,
    pub top_receptors: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            target_protein: "THBS4".to_string(),
            target_count: 100,
            min_length: 10,
            max_length: 18,
            max_attempts_per_candidate: 20,
            region_selection: RegionSelection::RoundRobin,
            seed: None,

            analysis: AnalysisTier::Precise,
            max_molecular_weight: 2000.0,
            max_hydrophobicity: -0.5,
            max_hydrophobic_fraction: 0.4,
            max_cysteine_fraction: 0.1,
            forbidden_motifs: vec!["CC".to_string(), "KKKK".to_string(), "RRRR".to_string()],

            tm_threshold: 55.0,
            protective_mutations: true,
            max_protective_mutations: 3,

            max_ratio: 2.0,
            primary_population: "human".to_string(),
            secondary_population: "mouse".to_string(),
            receptors: Receptor::default_panel(),

            knowledge_enabled: true,
            knowledge_uri: "http://localhost:7474".to_string(),
            knowledge_database: "neo4j".to_string(),
            knowledge_user: "neo4j".to_string(),
            knowledge_password: None,
            knowledge_timeout_secs: 5,
            binding_energy_cutoff: -8.0,
            top_receptors: 3,
        }
    }
}

impl DefaultsConfig {
    pub fn into_builder(self) -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
            .target_protein(self.target_protein)
            .target_count(self.target_count)
            .length_range(self.min_length, self.max_length)
            .max_attempts_per_candidate(self.max_attempts_per_candidate)
            .region_selection(self.region_selection)
            .seed(self.seed)
            .analysis(self.analysis)
            .max_molecular_weight(self.max_molecular_weight)
            .max_hydrophobicity(self.max_hydrophobicity)
            .max_hydrophobic_fraction(self.max_hydrophobic_fraction)
            .max_cysteine_fraction(self.max_cysteine_fraction)
            .forbidden_motifs(self.forbidden_motifs)
            .tm_threshold(self.tm_threshold)
            .protective_mutations(self.protective_mutations)
            .max_protective_mutations(self.max_protective_mutations)
            .max_ratio(self.max_ratio)
            .populations(self.primary_population, self.secondary_population)
            .receptors(self.receptors)
            .knowledge_enabled(self.knowledge_enabled)
            .knowledge_endpoint(self.knowledge_uri, self.knowledge_database)
            .knowledge_credentials(self.knowledge_user, self.knowledge_password)
            .knowledge_timeout_secs(self.knowledge_timeout_secs)
            .binding_energy_cutoff(self.binding_energy_cutoff)
            .top_receptors(self.top_receptors)
    }
}
