use super::{ConfigError, DefaultsConfig, PipelineConfigBuilder, RegionSelection};
use crate::core::scoring::{AnalysisTier, Receptor};
use serde::Deserialize;
use std::str::FromStr;

/// An option addressable by key path and by environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    pub path: &'static str,
    pub env: &'static str,
    pub description: &'static str,
}

const fn key(path: &'static str, env: &'static str, description: &'static str) -> ConfigKey {
    ConfigKey {
        path,
        env,
        description,
    }
}

/// Every option that can be overridden, in resolution order.
pub const CONFIG_KEYS: &[ConfigKey] = &[
    key(
        "generation.target-protein",
        "PEPSCREEN_TARGET_PROTEIN",
        "Protein whose regions seed generation",
    ),
    key("generation.target-count", "PEPSCREEN_TARGET_COUNT", "Candidates Round 1 tries to accept"),
    key("generation.min-length", "PEPSCREEN_MIN_LENGTH", "Shortest candidate length"),
    key("generation.max-length", "PEPSCREEN_MAX_LENGTH", "Longest candidate length"),
    key(
        "generation.max-attempts-per-candidate",
        "PEPSCREEN_MAX_ATTEMPTS_PER_CANDIDATE",
        "Sampling attempts allowed per requested candidate",
    ),
    key("generation.region-selection", "PEPSCREEN_REGION_SELECTION", "round-robin or weighted"),
    key("generation.seed", "PEPSCREEN_SEED", "Seed for reproducible sampling"),
    key("composition.analysis", "PEPSCREEN_ANALYSIS", "precise or coarse composition analysis"),
    key(
        "composition.max-molecular-weight",
        "PEPSCREEN_MAX_MOLECULAR_WEIGHT",
        "Molecular weight ceiling (Da)",
    ),
    key(
        "composition.max-hydrophobicity",
        "PEPSCREEN_MAX_HYDROPHOBICITY",
        "GRAVY ceiling for precise analysis",
    ),
    key(
        "composition.max-hydrophobic-fraction",
        "PEPSCREEN_MAX_HYDROPHOBIC_FRACTION",
        "Hydrophobic residue fraction ceiling for coarse analysis",
    ),
    key(
        "composition.max-cysteine-fraction",
        "PEPSCREEN_MAX_CYSTEINE_FRACTION",
        "Cysteine fraction ceiling",
    ),
    key(
        "composition.forbidden-motifs",
        "PEPSCREEN_FORBIDDEN_MOTIFS",
        "Comma-separated motifs that reject a candidate",
    ),
    key("stability.tm-threshold", "PEPSCREEN_TM_THRESHOLD", "Minimum stability temperature (°C)"),
    key(
        "stability.protective-mutations",
        "PEPSCREEN_PROTECTIVE_MUTATIONS",
        "Substitute residues at predicted cleavage sites",
    ),
    key(
        "stability.max-protective-mutations",
        "PEPSCREEN_MAX_PROTECTIVE_MUTATIONS",
        "Cleavage sites protected per candidate",
    ),
    key(
        "cross-population.max-ratio",
        "PEPSCREEN_MAX_RATIO",
        "Largest accepted binding-energy ratio",
    ),
    key(
        "cross-population.primary-population",
        "PEPSCREEN_PRIMARY_POPULATION",
        "First population scored",
    ),
    key(
        "cross-population.secondary-population",
        "PEPSCREEN_SECONDARY_POPULATION",
        "Second population scored",
    ),
    key(
        "knowledge.enabled",
        "PEPSCREEN_KNOWLEDGE_ENABLED",
        "Query the graph store before using synthetic data",
    ),
    key("knowledge.uri", "PEPSCREEN_NEO4J_URI", "Graph store HTTP endpoint"),
    key("knowledge.database", "PEPSCREEN_NEO4J_DATABASE", "Graph store database name"),
    key("knowledge.user", "PEPSCREEN_NEO4J_USER", "Graph store user"),
    key("knowledge.password", "PEPSCREEN_NEO4J_PASSWORD", "Graph store password"),
    key("knowledge.timeout-secs", "PEPSCREEN_NEO4J_TIMEOUT_SECS", "Graph store request timeout"),
    key(
        "knowledge.binding-energy-cutoff",
        "PEPSCREEN_BINDING_ENERGY_CUTOFF",
        "Receptor interactions weaker than this are ignored",
    ),
    key(
        "knowledge.top-receptors",
        "PEPSCREEN_TOP_RECEPTORS",
        "Receptors whose binding sites are fetched",
    ),
];

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGeneration {
    pub target_protein: Option<String>,
    pub target_count: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub max_attempts_per_candidate: Option<usize>,
    pub region_selection: Option<RegionSelection>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileComposition {
    pub analysis: Option<AnalysisTier>,
    pub max_molecular_weight: Option<f64>,
    pub max_hydrophobicity: Option<f64>,
    pub max_hydrophobic_fraction: Option<f64>,
    pub max_cysteine_fraction: Option<f64>,
    pub forbidden_motifs: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileStability {
    pub tm_threshold: Option<f64>,
    pub protective_mutations: Option<bool>,
    pub max_protective_mutations: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileCrossPopulation {
    pub max_ratio: Option<f64>,
    pub primary_population: Option<String>,
    pub secondary_population: Option<String>,
    pub receptors: Option<Vec<Receptor>>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileKnowledge {
    pub enabled: Option<bool>,
    pub uri: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub binding_energy_cutoff: Option<f64>,
    pub top_receptors: Option<usize>,
}

/// Partial configuration as read from a TOML document; absent values fall back to
/// [`DefaultsConfig`].
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub generation: Option<FileGeneration>,
    pub composition: Option<FileComposition>,
    pub stability: Option<FileStability>,
    pub cross_population: Option<FileCrossPopulation>,
    pub knowledge: Option<FileKnowledge>,
}

impl FromStr for FileConfig {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

fn parse_value<T: FromStr>(
    key: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    })
}

fn parse_float(key: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = parse_value(key, value, "a finite number")?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a finite number",
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}

fn parse_motifs(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect()
}

impl FileConfig {
    /// Sets one option from its textual form. The current value is left untouched
    /// when `value` does not convert.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "generation.target-protein" => {
                self.generation.get_or_insert_with(Default::default).target_protein =
                    Some(value.trim().to_string());
            }
            "generation.target-count" => {
                self.generation.get_or_insert_with(Default::default).target_count =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "generation.min-length" => {
                self.generation.get_or_insert_with(Default::default).min_length =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "generation.max-length" => {
                self.generation.get_or_insert_with(Default::default).max_length =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "generation.max-attempts-per-candidate" => {
                self.generation
                    .get_or_insert_with(Default::default)
                    .max_attempts_per_candidate =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "generation.region-selection" => {
                self.generation.get_or_insert_with(Default::default).region_selection =
                    Some(parse_value(key, value, "'round-robin' or 'weighted'")?);
            }
            "generation.seed" => {
                self.generation.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value, "an unsigned 64-bit integer")?);
            }
            "composition.analysis" => {
                self.composition.get_or_insert_with(Default::default).analysis =
                    Some(parse_value(key, value, "'precise' or 'coarse'")?);
            }
            "composition.max-molecular-weight" => {
                self.composition
                    .get_or_insert_with(Default::default)
                    .max_molecular_weight = Some(parse_float(key, value)?);
            }
            "composition.max-hydrophobicity" => {
                self.composition
                    .get_or_insert_with(Default::default)
                    .max_hydrophobicity = Some(parse_float(key, value)?);
            }
            "composition.max-hydrophobic-fraction" => {
                self.composition
                    .get_or_insert_with(Default::default)
                    .max_hydrophobic_fraction = Some(parse_float(key, value)?);
            }
            "composition.max-cysteine-fraction" => {
                self.composition
                    .get_or_insert_with(Default::default)
                    .max_cysteine_fraction = Some(parse_float(key, value)?);
            }
            "composition.forbidden-motifs" => {
                self.composition.get_or_insert_with(Default::default).forbidden_motifs =
                    Some(parse_motifs(value));
            }
            "stability.tm-threshold" => {
                self.stability.get_or_insert_with(Default::default).tm_threshold =
                    Some(parse_float(key, value)?);
            }
            "stability.protective-mutations" => {
                self.stability
                    .get_or_insert_with(Default::default)
                    .protective_mutations = Some(parse_bool(key, value)?);
            }
            "stability.max-protective-mutations" => {
                self.stability
                    .get_or_insert_with(Default::default)
                    .max_protective_mutations =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "cross-population.max-ratio" => {
                self.cross_population.get_or_insert_with(Default::default).max_ratio =
                    Some(parse_float(key, value)?);
            }
            "cross-population.primary-population" => {
                self.cross_population
                    .get_or_insert_with(Default::default)
                    .primary_population = Some(value.trim().to_string());
            }
            "cross-population.secondary-population" => {
                self.cross_population
                    .get_or_insert_with(Default::default)
                    .secondary_population = Some(value.trim().to_string());
            }
            "knowledge.enabled" => {
                self.knowledge.get_or_insert_with(Default::default).enabled =
                    Some(parse_bool(key, value)?);
            }
            "knowledge.uri" => {
                self.knowledge.get_or_insert_with(Default::default).uri =
                    Some(value.trim().to_string());
            }
            "knowledge.database" => {
                self.knowledge.get_or_insert_with(Default::default).database =
                    Some(value.trim().to_string());
            }
            "knowledge.user" => {
                self.knowledge.get_or_insert_with(Default::default).user =
                    Some(value.trim().to_string());
            }
            "knowledge.password" => {
                self.knowledge.get_or_insert_with(Default::default).password =
                    Some(value.to_string());
            }
            "knowledge.timeout-secs" => {
                self.knowledge.get_or_insert_with(Default::default).timeout_secs =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            "knowledge.binding-energy-cutoff" => {
                self.knowledge
                    .get_or_insert_with(Default::default)
                    .binding_energy_cutoff = Some(parse_float(key, value)?);
            }
            "knowledge.top-receptors" => {
                self.knowledge.get_or_insert_with(Default::default).top_receptors =
                    Some(parse_value(key, value, "a non-negative integer")?);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Overlays every value present in this document onto `defaults`.
    pub fn merge_over(self, defaults: DefaultsConfig) -> PipelineConfigBuilder {
        let mut d = defaults;

        if let Some(g) = self.generation {
            d.target_protein = g.target_protein.unwrap_or(d.target_protein);
            d.target_count = g.target_count.unwrap_or(d.target_count);
            d.min_length = g.min_length.unwrap_or(d.min_length);
            d.max_length = g.max_length.unwrap_or(d.max_length);
            d.max_attempts_per_candidate = g
                .max_attempts_per_candidate
                .unwrap_or(d.max_attempts_per_candidate);
            d.region_selection = g.region_selection.unwrap_or(d.region_selection);
            d.seed = g.seed.or(d.seed);
        }
        if let Some(c) = self.composition {
            d.analysis = c.analysis.unwrap_or(d.analysis);
            d.max_molecular_weight = c.max_molecular_weight.unwrap_or(d.max_molecular_weight);
            d.max_hydrophobicity = c.max_hydrophobicity.unwrap_or(d.max_hydrophobicity);
            d.max_hydrophobic_fraction = c
                .max_hydrophobic_fraction
                .unwrap_or(d.max_hydrophobic_fraction);
            d.max_cysteine_fraction = c.max_cysteine_fraction.unwrap_or(d.max_cysteine_fraction);
            if let Some(motifs) = c.forbidden_motifs {
                d.forbidden_motifs = motifs
                    .iter()
                    .map(|m| m.trim().to_ascii_uppercase())
                    .collect();
            }
        }
        if let Some(s) = self.stability {
            d.tm_threshold = s.tm_threshold.unwrap_or(d.tm_threshold);
            d.protective_mutations = s.protective_mutations.unwrap_or(d.protective_mutations);
            d.max_protective_mutations = s
                .max_protective_mutations
                .unwrap_or(d.max_protective_mutations);
        }
        if let Some(x) = self.cross_population {
            d.max_ratio = x.max_ratio.unwrap_or(d.max_ratio);
            d.primary_population = x.primary_population.unwrap_or(d.primary_population);
            d.secondary_population = x.secondary_population.unwrap_or(d.secondary_population);
            d.receptors = x.receptors.unwrap_or(d.receptors);
        }
        if let Some(k) = self.knowledge {
            d.knowledge_enabled = k.enabled.unwrap_or(d.knowledge_enabled);
            d.knowledge_uri = k.uri.unwrap_or(d.knowledge_uri);
            d.knowledge_database = k.database.unwrap_or(d.knowledge_database);
            d.knowledge_user = k.user.unwrap_or(d.knowledge_user);
            d.knowledge_password = k.password.or(d.knowledge_password);
            d.knowledge_timeout_secs = k.timeout_secs.unwrap_or(d.knowledge_timeout_secs);
            d.binding_energy_cutoff = k.binding_energy_cutoff.unwrap_or(d.binding_energy_cutoff);
            d.top_receptors = k.top_receptors.unwrap_or(d.top_receptors);
        }

        d.into_builder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_key_is_settable() {
        let mut file = FileConfig::default();
        for k in CONFIG_KEYS {
            let sample = match k.path {
                "generation.region-selection" => "weighted",
                "composition.analysis" => "coarse",
                "stability.protective-mutations" | "knowledge.enabled" => "false",
                "composition.forbidden-motifs" => "cc, kkkk",
                _ => "3",
            };
            file.set(k.path, sample)
                .unwrap_or_else(|e| panic!("{}: {e}", k.path));
        }
        assert_eq!(
            file.composition.unwrap().forbidden_motifs,
            Some(vec!["CC".to_string(), "KKKK".to_string()])
        );
    }

    #[test]
    fn env_names_are_unique_and_prefixed() {
        let mut names: Vec<_> = CONFIG_KEYS.iter().map(|k| k.env).collect();
        assert!(names.iter().all(|n| n.starts_with("PEPSCREEN_")));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CONFIG_KEYS.len());
    }

    #[test]
    fn bad_value_leaves_previous_value_in_place() {
        let mut file: FileConfig = "[stability]\ntm-threshold = 60.0\n".parse().unwrap();
        let err = file.set("stability.tm-threshold", "warm").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(file.stability.unwrap().tm_threshold, Some(60.0));
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        let mut file = FileConfig::default();
        assert!(file.set("cross-population.max-ratio", "NaN").is_err());
        assert!(file.set("cross-population.max-ratio", "inf").is_err());
        assert!(file.cross_population.is_none());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut file = FileConfig::default();
        assert_eq!(
            file.set("generation.colour", "blue"),
            Err(ConfigError::UnknownKey("generation.colour".into()))
        );
    }

    #[test]
    fn document_parses_nested_sections_and_receptor_panel() {
        let text = r#"
[generation]
target-count = 25
min-length = 12
max-length = 16
seed = 42

[composition]
analysis = "coarse"
forbidden-motifs = ["cc"]

[cross-population]
max-ratio = 1.5

[[cross-population.receptors]]
name = "KDR"
structure-id = "3V2A"
"#;
        let file: FileConfig = text.parse().unwrap();
        let config = file.merge_over(DefaultsConfig::default()).build().unwrap();
        assert_eq!(config.generation.target_count, 25);
        assert_eq!(config.generation.length_range(), 12..=16);
        assert_eq!(config.generation.seed, Some(42));
        assert_eq!(config.composition.analysis, AnalysisTier::Coarse);
        assert_eq!(config.composition.forbidden_motifs, vec!["CC".to_string()]);
        assert_eq!(config.cross_population.max_ratio, 1.5);
        assert_eq!(config.cross_population.receptors, vec![Receptor::new("KDR", "3V2A")]);
        assert_eq!(config.stability.tm_threshold, 55.0);
    }

    #[test]
    fn unknown_fields_in_document_are_errors() {
        assert!("[generation]\ntarget-cnt = 5\n".parse::<FileConfig>().is_err());
        assert!("[unknown]\n".parse::<FileConfig>().is_err());
    }
}
