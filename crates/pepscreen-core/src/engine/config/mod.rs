//! Pipeline configuration.
//!
//! Values are layered in one linear pass: compiled-in [`defaults`], then an optional
//! TOML document ([`file`]), then environment overrides ([`env`]), then explicit
//! overrides, and finally [`PipelineConfigBuilder::build`] validates the result. The
//! [`resolver`] drives that pass.

pub mod defaults;
pub mod env;
pub mod file;
pub mod resolver;

pub use defaults::DefaultsConfig;
pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use file::{CONFIG_KEYS, ConfigKey, FileConfig};
pub use resolver::{ConfigResolver, ConfigWarning, ResolvedConfig};

use crate::core::knowledge::GraphStoreSettings;
use crate::core::scoring::{AnalysisTier, CompositionLimits, Receptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Unsupported configuration key: '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid override '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionSelection {
    /// Cycle through the reference regions in order.
    #[default]
    RoundRobin,
    /// Draw regions at random, weighted by their role.
    Weighted,
}

impl fmt::Display for RegionSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelection::RoundRobin => f.write_str("round-robin"),
            RegionSelection::Weighted => f.write_str("weighted"),
        }
    }
}

impl FromStr for RegionSelection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "round-robin" => Ok(RegionSelection::RoundRobin),
            "weighted" => Ok(RegionSelection::Weighted),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GenerationConfig {
    pub target_protein: String,
    pub target_count: usize,
    pub min_length: usize,
    pub max_length: usize,
    pub max_attempts_per_candidate: usize,
    pub region_selection: RegionSelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn length_range(&self) -> RangeInclusive<usize> {
        self.min_length..=self.max_length
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompositionConfig {
    pub analysis: AnalysisTier,
    pub max_molecular_weight: f64,
    pub max_hydrophobicity: f64,
    pub max_hydrophobic_fraction: f64,
    pub max_cysteine_fraction: f64,
    pub forbidden_motifs: Vec<String>,
}

impl CompositionConfig {
    pub fn limits(&self) -> CompositionLimits {
        CompositionLimits {
            max_molecular_weight: self.max_molecular_weight,
            max_hydrophobicity: self.max_hydrophobicity,
            max_hydrophobic_fraction: self.max_hydrophobic_fraction,
            max_cysteine_fraction: self.max_cysteine_fraction,
            forbidden_motifs: self.forbidden_motifs.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StabilityConfig {
    pub tm_threshold: f64,
    pub protective_mutations: bool,
    pub max_protective_mutations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossPopulationConfig {
    pub max_ratio: f64,
    pub primary_population: String,
    pub secondary_population: String,
    pub receptors: Vec<Receptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct KnowledgeConfig {
    pub enabled: bool,
    pub uri: String,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub timeout_secs: u64,
    pub binding_energy_cutoff: f64,
    pub top_receptors: usize,
}

impl KnowledgeConfig {
    pub fn graph_settings(&self) -> GraphStoreSettings {
        GraphStoreSettings {
            uri: self.uri.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            binding_energy_cutoff: self.binding_energy_cutoff,
            top_receptors: self.top_receptors,
        }
    }
}

/// Fully resolved, validated settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    pub generation: GenerationConfig,
    pub composition: CompositionConfig,
    pub stability: StabilityConfig,
    pub cross_population: CrossPopulationConfig,
    pub knowledge: KnowledgeConfig,
}

#[derive(Default, Debug, Clone)]
pub struct PipelineConfigBuilder {
    target_protein: Option<String>,
    target_count: Option<usize>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    max_attempts_per_candidate: Option<usize>,
    region_selection: Option<RegionSelection>,
    seed: Option<u64>,

    analysis: Option<AnalysisTier>,
    max_molecular_weight: Option<f64>,
    max_hydrophobicity: Option<f64>,
    max_hydrophobic_fraction: Option<f64>,
    max_cysteine_fraction: Option<f64>,
    forbidden_motifs: Option<Vec<String>>,

    tm_threshold: Option<f64>,
    protective_mutations: Option<bool>,
    max_protective_mutations: Option<usize>,

    max_ratio: Option<f64>,
    primary_population: Option<String>,
    secondary_population: Option<String>,
    receptors: Option<Vec<Receptor>>,

    knowledge_enabled: Option<bool>,
    knowledge_uri: Option<String>,
    knowledge_database: Option<String>,
    knowledge_user: Option<String>,
    knowledge_password: Option<String>,
    knowledge_timeout_secs: Option<u64>,
    binding_energy_cutoff: Option<f64>,
    top_receptors: Option<usize>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_protein(mut self, target: impl Into<String>) -> Self {
        self.target_protein = Some(target.into());
        self
    }
    pub fn target_count(mut self, count: usize) -> Self {
        self.target_count = Some(count);
        self
    }
    pub fn length_range(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }
    pub fn max_attempts_per_candidate(mut self, attempts: usize) -> Self {
        self.max_attempts_per_candidate = Some(attempts);
        self
    }
    pub fn region_selection(mut self, selection: RegionSelection) -> Self {
        self.region_selection = Some(selection);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn analysis(mut self, tier: AnalysisTier) -> Self {
        self.analysis = Some(tier);
        self
    }
    pub fn max_molecular_weight(mut self, weight: f64) -> Self {
        self.max_molecular_weight = Some(weight);
        self
    }
    pub fn max_hydrophobicity(mut self, gravy: f64) -> Self {
        self.max_hydrophobicity = Some(gravy);
        self
    }
    pub fn max_hydrophobic_fraction(mut self, fraction: f64) -> Self {
        self.max_hydrophobic_fraction = Some(fraction);
        self
    }
    pub fn max_cysteine_fraction(mut self, fraction: f64) -> Self {
        self.max_cysteine_fraction = Some(fraction);
        self
    }
    pub fn forbidden_motifs(mut self, motifs: Vec<String>) -> Self {
        self.forbidden_motifs = Some(motifs);
        self
    }

    pub fn tm_threshold(mut self, threshold: f64) -> Self {
        self.tm_threshold = Some(threshold);
        self
    }
    pub fn protective_mutations(mut self, enabled: bool) -> Self {
        self.protective_mutations = Some(enabled);
        self
    }
    pub fn max_protective_mutations(mut self, count: usize) -> Self {
        self.max_protective_mutations = Some(count);
        self
    }

    pub fn max_ratio(mut self, ratio: f64) -> Self {
        self.max_ratio = Some(ratio);
        self
    }
    pub fn populations(
        mut self,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        self.primary_population = Some(primary.into());
        self.secondary_population = Some(secondary.into());
        self
    }
    pub fn receptors(mut self, receptors: Vec<Receptor>) -> Self {
        self.receptors = Some(receptors);
        self
    }

    pub fn knowledge_enabled(mut self, enabled: bool) -> Self {
        self.knowledge_enabled = Some(enabled);
        self
    }
    pub fn knowledge_endpoint(
        mut self,
        uri: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        self.knowledge_uri = Some(uri.into());
        self.knowledge_database = Some(database.into());
        self
    }
    pub fn knowledge_credentials(
        mut self,
        user: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.knowledge_user = Some(user.into());
        self.knowledge_password = password;
        self
    }
    pub fn knowledge_timeout_secs(mut self, seconds: u64) -> Self {
        self.knowledge_timeout_secs = Some(seconds);
        self
    }
    pub fn binding_energy_cutoff(mut self, cutoff: f64) -> Self {
        self.binding_energy_cutoff = Some(cutoff);
        self
    }
    pub fn top_receptors(mut self, count: usize) -> Self {
        self.top_receptors = Some(count);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let generation = GenerationConfig {
            target_protein: self
                .target_protein
                .ok_or(ConfigError::MissingParameter("target_protein"))?,
            target_count: self
                .target_count
                .ok_or(ConfigError::MissingParameter("target_count"))?,
            min_length: self
                .min_length
                .ok_or(ConfigError::MissingParameter("min_length"))?,
            max_length: self
                .max_length
                .ok_or(ConfigError::MissingParameter("max_length"))?,
            max_attempts_per_candidate: self
                .max_attempts_per_candidate
                .ok_or(ConfigError::MissingParameter("max_attempts_per_candidate"))?,
            region_selection: self.region_selection.unwrap_or_default(),
            seed: self.seed,
        };
        let composition = CompositionConfig {
            analysis: self.analysis.unwrap_or_default(),
            max_molecular_weight: self
                .max_molecular_weight
                .ok_or(ConfigError::MissingParameter("max_molecular_weight"))?,
            max_hydrophobicity: self
                .max_hydrophobicity
                .ok_or(ConfigError::MissingParameter("max_hydrophobicity"))?,
            max_hydrophobic_fraction: self
                .max_hydrophobic_fraction
                .ok_or(ConfigError::MissingParameter("max_hydrophobic_fraction"))?,
            max_cysteine_fraction: self
                .max_cysteine_fraction
                .ok_or(ConfigError::MissingParameter("max_cysteine_fraction"))?,
            forbidden_motifs: self.forbidden_motifs.unwrap_or_default(),
        };
        let stability = StabilityConfig {
            tm_threshold: self
                .tm_threshold
                .ok_or(ConfigError::MissingParameter("tm_threshold"))?,
            protective_mutations: self.protective_mutations.unwrap_or(false),
            max_protective_mutations: self.max_protective_mutations.unwrap_or(0),
        };
        let cross_population = CrossPopulationConfig {
            max_ratio: self
                .max_ratio
                .ok_or(ConfigError::MissingParameter("max_ratio"))?,
            primary_population: self
                .primary_population
                .ok_or(ConfigError::MissingParameter("primary_population"))?,
            secondary_population: self
                .secondary_population
                .ok_or(ConfigError::MissingParameter("secondary_population"))?,
            receptors: self
                .receptors
                .ok_or(ConfigError::MissingParameter("receptors"))?,
        };
        let knowledge = KnowledgeConfig {
            enabled: self.knowledge_enabled.unwrap_or(false),
            uri: self.knowledge_uri.unwrap_or_default(),
            database: self.knowledge_database.unwrap_or_default(),
            user: self.knowledge_user.unwrap_or_default(),
            password: self.knowledge_password,
            timeout_secs: self
                .knowledge_timeout_secs
                .ok_or(ConfigError::MissingParameter("knowledge_timeout_secs"))?,
            binding_energy_cutoff: self
                .binding_energy_cutoff
                .ok_or(ConfigError::MissingParameter("binding_energy_cutoff"))?,
            top_receptors: self
                .top_receptors
                .ok_or(ConfigError::MissingParameter("top_receptors"))?,
        };

        let config = PipelineConfig {
            generation,
            composition,
            stability,
            cross_population,
            knowledge,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

fn validate(config: &PipelineConfig) -> Result<(), ConfigError> {
    let generation = &config.generation;
    if generation.target_protein.trim().is_empty() {
        return Err(invalid("target_protein", "must not be empty"));
    }
    if generation.target_count == 0 {
        return Err(invalid("target_count", "must be positive"));
    }
    if generation.min_length == 0 {
        return Err(invalid("min_length", "must be positive"));
    }
    if generation.min_length > generation.max_length {
        return Err(invalid(
            "min_length",
            format!(
                "{} exceeds max_length {}",
                generation.min_length, generation.max_length
            ),
        ));
    }
    if generation.max_attempts_per_candidate == 0 {
        return Err(invalid("max_attempts_per_candidate", "must be positive"));
    }

    let composition = &config.composition;
    if composition.max_molecular_weight.is_nan() || composition.max_molecular_weight <= 0.0 {
        return Err(invalid("max_molecular_weight", "must be positive"));
    }
    for (name, fraction) in [
        ("max_hydrophobic_fraction", composition.max_hydrophobic_fraction),
        ("max_cysteine_fraction", composition.max_cysteine_fraction),
    ] {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(invalid(name, format!("{fraction} is outside 0..=1")));
        }
    }
    if !composition.max_hydrophobicity.is_finite() {
        return Err(invalid("max_hydrophobicity", "must be finite"));
    }

    if !config.stability.tm_threshold.is_finite() {
        return Err(invalid("tm_threshold", "must be finite"));
    }

    let cross = &config.cross_population;
    if cross.max_ratio.is_nan() || cross.max_ratio < 1.0 {
        return Err(invalid(
            "max_ratio",
            format!("{} is below 1.0, which no ratio can satisfy", cross.max_ratio),
        ));
    }
    if cross.primary_population.trim().is_empty() || cross.secondary_population.trim().is_empty()
    {
        return Err(invalid("populations", "population names must not be empty"));
    }
    if cross.receptors.is_empty() {
        return Err(invalid("receptors", "at least one receptor is required"));
    }

    let knowledge = &config.knowledge;
    if knowledge.enabled && knowledge.uri.trim().is_empty() {
        return Err(invalid("knowledge_uri", "required when the knowledge store is enabled"));
    }
    if knowledge.timeout_secs == 0 {
        return Err(invalid("knowledge_timeout_secs", "must be positive"));
    }
    if knowledge.top_receptors == 0 {
        return Err(invalid("top_receptors", "must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PipelineConfigBuilder {
        DefaultsConfig::default().into_builder()
    }

    #[test]
    fn defaults_build_successfully() {
        let config = complete().build().unwrap();
        assert_eq!(config.generation.target_count, 100);
        assert_eq!(config.generation.length_range(), 10..=18);
        assert_eq!(config.stability.tm_threshold, 55.0);
        assert_eq!(config.cross_population.max_ratio, 2.0);
        assert_eq!(config.composition.max_molecular_weight, 2000.0);
    }

    #[test]
    fn missing_parameter_is_reported_by_name() {
        let err = PipelineConfigBuilder::new()
            .target_protein("THBS4")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("target_count"));
    }

    #[test]
    fn inverted_length_range_is_rejected() {
        let err = complete().length_range(20, 10).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "min_length",
                ..
            }
        ));
    }

    #[test]
    fn non_positive_target_count_is_rejected() {
        let err = complete().target_count(0).build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "target_count",
                ..
            }
        ));
    }

    #[test]
    fn ratio_below_parity_is_rejected() {
        assert!(complete().max_ratio(0.5).build().is_err());
        assert!(complete().max_ratio(f64::NAN).build().is_err());
        assert!(complete().max_ratio(1.0).build().is_ok());
    }

    #[test]
    fn fractions_must_lie_in_unit_interval() {
        assert!(complete().max_cysteine_fraction(1.5).build().is_err());
        assert!(complete().max_hydrophobic_fraction(-0.1).build().is_err());
    }

    #[test]
    fn enabled_knowledge_store_needs_uri() {
        let err = complete()
            .knowledge_enabled(true)
            .knowledge_endpoint("", "neo4j")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidParameter {
                name: "knowledge_uri",
                ..
            }
        ));
    }

    #[test]
    fn region_selection_parses_both_spellings() {
        assert_eq!("round_robin".parse(), Ok(RegionSelection::RoundRobin));
        assert_eq!("Weighted".parse(), Ok(RegionSelection::Weighted));
        assert!("random".parse::<RegionSelection>().is_err());
    }

    #[test]
    fn serialized_config_hides_password() {
        let config = complete()
            .knowledge_credentials("neo4j", Some("secret".into()))
            .build()
            .unwrap();
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("tm-threshold"));
    }
}
