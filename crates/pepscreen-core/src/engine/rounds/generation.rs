use crate::core::models::candidate::{Candidate, Lineage, Mutation};
use crate::core::models::region::{ReferenceRegion, RegionRole};
use crate::core::models::round::{RejectionReason, Round, RoundResult};
use crate::core::scoring::composition;
use crate::core::sequence::ProteinSequence;
use crate::engine::config::{PipelineConfig, RegionSelection};
use crate::engine::progress::{Progress, ProgressReporter};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;
use tracing::{debug, info, instrument, warn};

const MIN_MUTATION_RATE: f64 = 0.05;
const MAX_MUTATION_RATE: f64 = 0.10;

fn role_weight(role: RegionRole) -> f64 {
    match role {
        RegionRole::SecretoryDomain => 2.0,
        RegionRole::ReceptorBinding => 1.0,
    }
}

enum RegionPicker {
    RoundRobin { next: usize },
    Weighted(WeightedIndex<f64>),
}

impl RegionPicker {
    fn new(selection: RegionSelection, regions: &[ReferenceRegion]) -> Self {
        match selection {
            RegionSelection::RoundRobin => RegionPicker::RoundRobin { next: 0 },
            RegionSelection::Weighted => {
                match WeightedIndex::new(regions.iter().map(|r| role_weight(r.role()))) {
                    Ok(index) => RegionPicker::Weighted(index),
                    Err(e) => {
                        warn!(error = %e, "Falling back to round-robin region selection.");
                        RegionPicker::RoundRobin { next: 0 }
                    }
                }
            }
        }
    }

    fn pick<R: Rng>(&mut self, count: usize, rng: &mut R) -> usize {
        match self {
            RegionPicker::RoundRobin { next } => {
                let index = *next % count;
                *next += 1;
                index
            }
            RegionPicker::Weighted(index) => index.sample(rng),
        }
    }
}

/// Applies conservative substitutions at 5-10% of positions (at least one).
fn conservative_variant<R: Rng>(
    window: &ProteinSequence,
    rng: &mut R,
) -> (ProteinSequence, Vec<Mutation>) {
    let rate = rng.gen_range(MIN_MUTATION_RATE..=MAX_MUTATION_RATE);
    let count = ((window.len() as f64 * rate).round() as usize).clamp(1, window.len());

    let mut positions = rand::seq::index::sample(rng, window.len(), count).into_vec();
    positions.sort_unstable();

    let mut variant = window.clone();
    let mut mutations = Vec::with_capacity(count);
    for position in positions {
        let from = variant.residues()[position];
        let to = from.conservative_substitutes()[rng.gen_range(0..3)];
        variant = variant.with_substitution(position, to);
        mutations.push(Mutation { position, from, to });
    }
    (variant, mutations)
}

/// Round 1: samples variants of the reference regions until `target_count` pass the
/// composition constraints or the attempt cap is reached.
#[instrument(skip_all, name = "generation_round")]
pub fn generate(
    regions: &[ReferenceRegion],
    target_count: usize,
    length_range: RangeInclusive<usize>,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
) -> RoundResult {
    let mut rng = match config.generation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with_rng(regions, target_count, length_range, config, reporter, &mut rng)
}

pub(crate) fn generate_with_rng<R: Rng>(
    regions: &[ReferenceRegion],
    target_count: usize,
    length_range: RangeInclusive<usize>,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
    rng: &mut R,
) -> RoundResult {
    info!(
        regions = regions.len(),
        target_count, "Starting candidate generation."
    );
    reporter.report(Progress::PhaseStart {
        name: Round::Generation.name(),
    });

    if regions.is_empty() || target_count == 0 {
        warn!("Nothing to generate from. Returning an empty round.");
        reporter.report(Progress::RoundFinished {
            round: Round::Generation,
            accepted: 0,
            rejected: 0,
        });
        reporter.report(Progress::PhaseFinish);
        return RoundResult::empty(Round::Generation).with_sampling(0, target_count);
    }

    let (min_length, max_length) = (*length_range.start(), *length_range.end());
    let max_attempts = target_count.saturating_mul(config.generation.max_attempts_per_candidate);
    let tier = config.composition.analysis;
    let limits = config.composition.limits();

    let mut picker = RegionPicker::new(config.generation.region_selection, regions);
    let mut accepted: Vec<Candidate> = Vec::with_capacity(target_count);
    let mut seen: HashSet<ProteinSequence> = HashSet::new();
    let mut rejections: BTreeMap<RejectionReason, usize> = BTreeMap::new();
    let mut attempts = 0;

    reporter.report(Progress::TaskStart {
        total: target_count as u64,
    });

    while accepted.len() < target_count && attempts < max_attempts {
        attempts += 1;
        let region = &regions[picker.pick(regions.len(), rng)];
        let region_length = region.sequence().len();

        let upper = max_length.min(region_length);
        if min_length == 0 || upper < min_length {
            *rejections.entry(RejectionReason::RegionTooShort).or_default() += 1;
            continue;
        }
        let length = rng.gen_range(min_length..=upper);
        let start = rng.gen_range(0..=region_length - length);
        let Some(window) = region.sequence().window(start, length) else {
            *rejections.entry(RejectionReason::RegionTooShort).or_default() += 1;
            continue;
        };

        let (variant, mutations) = conservative_variant(&window, rng);
        let assessment = composition::assess(&variant, tier, &limits);
        if let Err(reason) = assessment.verdict {
            *rejections.entry(reason).or_default() += 1;
            continue;
        }
        if !seen.insert(variant.clone()) {
            *rejections.entry(RejectionReason::Duplicate).or_default() += 1;
            continue;
        }

        let mut lineage = Lineage::from_region(region, start);
        lineage.mutations = mutations;
        let id = format!("PEP_{:04}", accepted.len() + 1);
        debug!(%id, sequence = %variant, source = region.id(), "Accepted candidate.");
        accepted.push(Candidate::new(id, variant, lineage, assessment.metrics));
        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);

    let result = RoundResult::new(Round::Generation, regions.len(), accepted, rejections)
        .with_sampling(attempts, target_count);
    if result.shortfall() > 0 {
        warn!(
            attempts,
            shortfall = result.shortfall(),
            "Attempt cap reached before the target count."
        );
        reporter.message(format!(
            "Attempt cap reached after {attempts} attempts, {} short of the target count.",
            result.shortfall()
        ));
    }
    info!(
        accepted = result.output_count(),
        rejected = result.rejected_count(),
        "Candidate generation finished."
    );
    reporter.report(Progress::RoundFinished {
        round: Round::Generation,
        accepted: result.output_count(),
        rejected: result.rejected_count(),
    });
    reporter.report(Progress::PhaseFinish);
    result
}
