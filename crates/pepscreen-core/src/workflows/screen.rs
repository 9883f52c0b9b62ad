use crate::core::knowledge::KnowledgeSource;
use crate::core::models::candidate::Candidate;
use crate::core::models::round::RoundResult;
use crate::core::scoring::quality::quality_score;
use crate::core::scoring::{
    BindingScorer, HeuristicBindingScorer, HeuristicStabilityScorer, StabilityScorer,
};
use crate::engine::config::{ConfigResolver, EnvSource, KnowledgeConfig, PipelineConfig};
use crate::engine::error::PipelineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::rounds::{cross_population, generation, stability};
use crate::engine::state::{PipelineState, StateTrace};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{error, info, instrument};

/// Aggregates over the final surviving set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Summary {
    pub count: usize,
    pub mean_stability_temperature: f64,
    pub mean_molecular_weight: f64,
    pub mean_cross_population_ratio: f64,
}

impl Summary {
    /// `None` for an empty set; statistics are absent rather than zero.
    pub fn from_candidates(candidates: &[Candidate]) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(Self {
            count: candidates.len(),
            mean_stability_temperature: mean(
                candidates.iter().filter_map(|c| c.stability_temperature()),
            )?,
            mean_molecular_weight: mean(candidates.iter().filter_map(|c| c.molecular_weight()))?,
            mean_cross_population_ratio: mean(
                candidates.iter().filter_map(|c| c.cross_population_ratio()),
            )?,
        })
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineResult {
    pub target: String,
    pub state: PipelineState,
    pub trace: StateTrace,
    pub generation: RoundResult,
    pub stability: RoundResult,
    pub cross_population: RoundResult,
    pub summary: Option<Summary>,
    /// Final survivors, best quality score first.
    pub ranked: Vec<Candidate>,
}

impl PipelineResult {
    pub fn rounds(&self) -> [&RoundResult; 3] {
        [&self.generation, &self.stability, &self.cross_population]
    }
}

/// The knowledge source a configuration asks for.
pub fn knowledge_source(config: &KnowledgeConfig) -> KnowledgeSource {
    if config.enabled {
        KnowledgeSource::connect(config.graph_settings())
    } else {
        info!("Reference store disabled; using the synthetic set.");
        KnowledgeSource::synthetic()
    }
}

fn rank(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = candidates
        .iter()
        .cloned()
        .map(|c| match quality_score(&c) {
            Some(score) => c.with_quality_score(score),
            None => c,
        })
        .collect();
    ranked.sort_by(|a, b| {
        let (qa, qb) = (a.metrics().quality_score, b.metrics().quality_score);
        match (qa, qb) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.id().cmp(b.id()))
    });
    ranked
}

/// Runs the three rounds in order against an already validated configuration.
///
/// Empty rounds are not failures: every round result is emitted and the run ends in
/// [`PipelineState::Done`].
#[instrument(skip_all, name = "screen_workflow")]
pub fn run(
    config: &PipelineConfig,
    source: &KnowledgeSource,
    stability_scorer: &dyn StabilityScorer,
    binding_scorer: &dyn BindingScorer,
    reporter: &ProgressReporter,
) -> Result<PipelineResult, PipelineError> {
    let mut trace = StateTrace::new();
    let target = config.generation.target_protein.clone();

    // === Reference regions ===
    reporter.report(Progress::PhaseStart {
        name: "Loading Reference Regions",
    });
    let regions = source.fetch_reference_regions(&target);
    info!(%target, regions = regions.len(), "Reference regions ready.");
    reporter.report(Progress::PhaseFinish);

    // === Round 1 ===
    trace.advance(PipelineState::GeneratingRound1)?;
    let round1 = generation::generate(
        &regions,
        config.generation.target_count,
        config.generation.length_range(),
        config,
        reporter,
    );

    // === Round 2 ===
    trace.advance(PipelineState::FilteringRound2)?;
    let round2 = stability::filter(
        round1.candidates().to_vec(),
        config.stability.tm_threshold,
        config,
        stability_scorer,
        reporter,
    );

    // === Round 3 ===
    trace.advance(PipelineState::ValidatingRound3)?;
    let round3 = cross_population::validate(
        round2.candidates().to_vec(),
        config.cross_population.max_ratio,
        config,
        binding_scorer,
        reporter,
    );

    trace.advance(PipelineState::Done)?;
    let ranked = rank(round3.candidates());
    let summary = Summary::from_candidates(&ranked);

    info!(
        generated = round1.output_count(),
        stable = round2.output_count(),
        validated = round3.output_count(),
        "Screening complete."
    );
    Ok(PipelineResult {
        target,
        state: trace.current(),
        trace,
        generation: round1,
        stability: round2,
        cross_population: round3,
        summary,
        ranked,
    })
}

/// Resolves the configuration and runs the pipeline with the heuristic scorers.
///
/// An unusable configuration ends the run in [`PipelineState::Failed`] and is
/// returned as [`PipelineError::Config`].
pub fn resolve_and_run<E: EnvSource>(
    resolver: &ConfigResolver<E>,
    reporter: &ProgressReporter,
) -> Result<PipelineResult, PipelineError> {
    let resolved = match resolver.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            let mut trace = StateTrace::new();
            trace.advance(PipelineState::Failed)?;
            error!(error = %e, state = %trace.current(), "Configuration rejected.");
            return Err(e.into());
        }
    };
    let source = knowledge_source(&resolved.config.knowledge);
    run(
        &resolved.config,
        &source,
        &HeuristicStabilityScorer::default(),
        &HeuristicBindingScorer::default(),
        reporter,
    )
}
