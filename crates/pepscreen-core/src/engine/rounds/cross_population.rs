use crate::core::models::candidate::{BindingMetrics, Candidate};
use crate::core::models::round::{RejectionReason, Round, RoundResult};
use crate::core::scoring::{BindingScorer, Receptor};
use crate::core::sequence::ProteinSequence;
use crate::engine::cache::{ScoreCache, distinct_sequences};
use crate::engine::config::PipelineConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
struct PopulationEnergies {
    primary: Option<f64>,
    secondary: Option<f64>,
}

/// Mean energy over the receptors that produced an estimate; `None` if none did.
fn population_energy(
    scorer: &dyn BindingScorer,
    sequence: &ProteinSequence,
    receptors: &[Receptor],
    population: &str,
) -> Option<f64> {
    let energies: Vec<f64> = receptors
        .iter()
        .filter_map(|r| scorer.binding_energy(sequence, r, population))
        .collect();
    if energies.is_empty() {
        None
    } else {
        Some(energies.iter().sum::<f64>() / energies.len() as f64)
    }
}

/// Decides one candidate from its two population energies.
///
/// | primary | secondary | ratio        | verdict            |
/// |---------|-----------|--------------|--------------------|
/// | missing | any       |              | MissingBindingData |
/// | any     | missing   |              | MissingBindingData |
/// | zero    | any       |              | MissingBindingData |
/// | any     | zero      |              | MissingBindingData |
/// | present | present   | > max_ratio  | RatioExceeded      |
/// | present | present   | <= max_ratio | accepted           |
///
/// The ratio is the larger magnitude over the smaller, so it is always at least 1.
pub fn binding_verdict(
    primary: Option<f64>,
    secondary: Option<f64>,
    max_ratio: f64,
) -> Result<BindingMetrics, RejectionReason> {
    let usable = |e: Option<f64>| e.filter(|v| v.is_finite() && *v != 0.0);
    let (Some(primary), Some(secondary)) = (usable(primary), usable(secondary)) else {
        return Err(RejectionReason::MissingBindingData);
    };

    let (a, b) = (primary.abs(), secondary.abs());
    let ratio = a.max(b) / a.min(b);
    if ratio > max_ratio {
        return Err(RejectionReason::RatioExceeded);
    }
    Ok(BindingMetrics {
        primary_binding_energy: primary,
        secondary_binding_energy: secondary,
        cross_population_ratio: ratio,
    })
}

/// Round 3: scores every candidate against the receptor panel for both populations and
/// keeps those whose cross-population ratio stays within `max_ratio`.
#[instrument(skip_all, name = "cross_population_round")]
pub fn validate(
    candidates: Vec<Candidate>,
    max_ratio: f64,
    config: &PipelineConfig,
    scorer: &dyn BindingScorer,
    reporter: &ProgressReporter,
) -> RoundResult {
    let settings = &config.cross_population;
    info!(
        candidates = candidates.len(),
        max_ratio,
        primary = %settings.primary_population,
        secondary = %settings.secondary_population,
        receptors = settings.receptors.len(),
        "Starting cross-population validation."
    );
    reporter.report(Progress::PhaseStart {
        name: Round::CrossPopulation.name(),
    });

    let input_count = candidates.len();
    let work = distinct_sequences(candidates.iter().map(Candidate::sequence));
    reporter.report(Progress::TaskStart {
        total: work.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = work.iter();
    #[cfg(feature = "parallel")]
    let iterator = work.par_iter();

    let scored: Vec<(ProteinSequence, PopulationEnergies)> = iterator
        .map(|sequence| {
            let energies = PopulationEnergies {
                primary: population_energy(
                    scorer,
                    sequence,
                    &settings.receptors,
                    &settings.primary_population,
                ),
                secondary: population_energy(
                    scorer,
                    sequence,
                    &settings.receptors,
                    &settings.secondary_population,
                ),
            };
            reporter.report(Progress::TaskIncrement);
            (sequence.clone(), energies)
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let cache: ScoreCache<PopulationEnergies> = scored.into_iter().collect();

    let mut accepted = Vec::with_capacity(input_count);
    let mut rejections: BTreeMap<RejectionReason, usize> = BTreeMap::new();
    for candidate in candidates {
        let energies = cache.get(candidate.sequence()).copied();
        let verdict = binding_verdict(
            energies.and_then(|e| e.primary),
            energies.and_then(|e| e.secondary),
            max_ratio,
        );
        match verdict {
            Ok(binding) => accepted.push(candidate.with_binding(binding)),
            Err(reason) => {
                debug!(id = candidate.id(), ?reason, "Rejected in cross-population validation.");
                *rejections.entry(reason).or_default() += 1;
            }
        }
    }

    let result = RoundResult::new(Round::CrossPopulation, input_count, accepted, rejections);
    info!(
        accepted = result.output_count(),
        rejected = result.rejected_count(),
        "Cross-population validation finished."
    );
    reporter.report(Progress::RoundFinished {
        round: Round::CrossPopulation,
        accepted: result.output_count(),
        rejected: result.rejected_count(),
    });
    reporter.report(Progress::PhaseFinish);
    result
}
