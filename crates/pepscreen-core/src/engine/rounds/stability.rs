use crate::core::models::candidate::{Candidate, Mutation, StabilityMetrics};
use crate::core::models::round::{RejectionReason, Round, RoundResult};
use crate::core::scoring::composition::{self, AnalysisTier, CompositionLimits};
use crate::core::scoring::StabilityScorer;
use crate::core::scoring::stability::normalized_stability;
use crate::core::sequence::{AminoAcid, ProteinSequence};
use crate::engine::cache::{ScoreCache, distinct_sequences};
use crate::engine::config::PipelineConfig;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Residues after which the primary population's proteases cut.
const PRIMARY_CLEAVAGE: [AminoAcid; 5] = [
    AminoAcid::Lysine,
    AminoAcid::Arginine,
    AminoAcid::Phenylalanine,
    AminoAcid::Tryptophan,
    AminoAcid::Leucine,
];
/// The secondary population additionally cuts after proline.
const SECONDARY_EXTRA_CLEAVAGE: [AminoAcid; 1] = [AminoAcid::Proline];

fn is_cleavage_site(residue: AminoAcid) -> bool {
    PRIMARY_CLEAVAGE.contains(&residue) || SECONDARY_EXTRA_CLEAVAGE.contains(&residue)
}

fn protective_substitute(residue: AminoAcid) -> Option<AminoAcid> {
    match residue {
        AminoAcid::Leucine => Some(AminoAcid::Isoleucine),
        AminoAcid::Phenylalanine => Some(AminoAcid::Tyrosine),
        AminoAcid::Tryptophan => Some(AminoAcid::Tyrosine),
        _ => None,
    }
}

/// Substitutes protective residues at the first `max_sites` predicted cleavage sites.
///
/// When none of those sites can be substituted directly, the first site whose
/// C-terminal neighbour can be is protected through that neighbour instead.
pub fn protect_cleavage_sites(
    sequence: &ProteinSequence,
    max_sites: usize,
) -> (ProteinSequence, Vec<Mutation>) {
    let residues = sequence.residues();
    let sites: Vec<usize> = residues
        .iter()
        .enumerate()
        .filter(|(_, r)| is_cleavage_site(**r))
        .map(|(i, _)| i)
        .take(max_sites)
        .collect();

    let mut mutations: Vec<Mutation> = sites
        .iter()
        .filter_map(|&position| {
            let from = residues[position];
            protective_substitute(from).map(|to| Mutation { position, from, to })
        })
        .collect();

    if mutations.is_empty() {
        mutations.extend(sites.iter().find_map(|&site| {
            let position = site + 1;
            let from = *residues.get(position)?;
            protective_substitute(from).map(|to| Mutation { position, from, to })
        }));
    }

    let protected = mutations
        .iter()
        .fold(sequence.clone(), |seq, m| seq.with_substitution(m.position, m.to));
    (protected, mutations)
}

/// Protects `candidate` unless the protected variant would break the composition
/// limits Round 1 enforced, in which case the candidate is returned unchanged.
fn apply_protection(
    candidate: Candidate,
    max_sites: usize,
    tier: AnalysisTier,
    limits: &CompositionLimits,
) -> Candidate {
    let (protected, mutations) = protect_cleavage_sites(candidate.sequence(), max_sites);
    if mutations.is_empty() {
        return candidate;
    }
    let labels = mutations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let assessment = composition::assess(&protected, tier, limits);
    if let Err(reason) = assessment.verdict {
        debug!(
            id = candidate.id(),
            mutations = %labels,
            ?reason,
            "Skipped protective mutations that break composition limits."
        );
        return candidate;
    }
    debug!(id = candidate.id(), mutations = %labels, "Applied protective mutations.");
    candidate.with_mutations(protected, &mutations, assessment.metrics)
}

/// Round 2: scores every candidate's stability temperature and keeps those at or above
/// `tm_threshold`.
#[instrument(skip_all, name = "stability_round")]
pub fn filter(
    candidates: Vec<Candidate>,
    tm_threshold: f64,
    config: &PipelineConfig,
    scorer: &dyn StabilityScorer,
    reporter: &ProgressReporter,
) -> RoundResult {
    info!(
        candidates = candidates.len(),
        tm_threshold, "Starting stability filtering."
    );
    reporter.report(Progress::PhaseStart {
        name: Round::Stability.name(),
    });

    let input_count = candidates.len();
    let candidates: Vec<Candidate> = if config.stability.protective_mutations {
        let max_sites = config.stability.max_protective_mutations;
        let tier = config.composition.analysis;
        let limits = config.composition.limits();
        candidates
            .into_iter()
            .map(|c| apply_protection(c, max_sites, tier, &limits))
            .collect()
    } else {
        candidates
    };

    let work = distinct_sequences(candidates.iter().map(Candidate::sequence));
    reporter.report(Progress::TaskStart {
        total: work.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = work.iter();
    #[cfg(feature = "parallel")]
    let iterator = work.par_iter();

    let scored: Vec<(ProteinSequence, Option<f64>)> = iterator
        .map(|sequence| {
            let temperature = scorer.stability_temperature(sequence);
            reporter.report(Progress::TaskIncrement);
            (sequence.clone(), temperature)
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    let cache: ScoreCache<Option<f64>> = scored.into_iter().collect();

    let mut accepted = Vec::with_capacity(input_count);
    let mut rejections: BTreeMap<RejectionReason, usize> = BTreeMap::new();
    for candidate in candidates {
        match cache.get(candidate.sequence()).copied().flatten() {
            Some(tm) if tm >= tm_threshold => {
                let stability = StabilityMetrics {
                    stability_temperature: tm,
                    stability_score: normalized_stability(tm),
                    molecular_weight: candidate.sequence().molecular_weight(),
                };
                accepted.push(candidate.with_stability(stability));
            }
            Some(tm) => {
                debug!(id = candidate.id(), tm, "Below stability threshold.");
                *rejections
                    .entry(RejectionReason::BelowStabilityThreshold)
                    .or_default() += 1;
            }
            None => {
                debug!(id = candidate.id(), "No stability estimate available.");
                *rejections
                    .entry(RejectionReason::StabilityUnavailable)
                    .or_default() += 1;
            }
        }
    }

    let result = RoundResult::new(Round::Stability, input_count, accepted, rejections);
    info!(
        accepted = result.output_count(),
        rejected = result.rejected_count(),
        distinct = work.len(),
        "Stability filtering finished."
    );
    reporter.report(Progress::RoundFinished {
        round: Round::Stability,
        accepted: result.output_count(),
        rejected: result.rejected_count(),
    });
    reporter.report(Progress::PhaseFinish);
    result
}
