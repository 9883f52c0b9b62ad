use super::resolve_settings;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use crate::utils::progress::RoundProgress;
use pepscreen::core::scoring::{HeuristicBindingScorer, HeuristicStabilityScorer};
use pepscreen::engine::progress::ProgressReporter;
use pepscreen::workflows::screen::{self, PipelineResult};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    let resolved = resolve_settings(&args.settings, args.assignments())?;
    let config = resolved.config;

    println!(
        "Screening candidates for {} (target count {}, lengths {}-{})...",
        config.generation.target_protein,
        config.generation.target_count,
        config.generation.min_length,
        config.generation.max_length
    );
    info!("Invoking the core screening workflow...");

    let progress = RoundProgress::new();
    let callback = progress.callback();

    // The reference store client blocks, so the whole run happens off the async workers.
    let result = tokio::task::spawn_blocking(move || {
        let reporter = ProgressReporter::with_callback(callback);
        let source = screen::knowledge_source(&config.knowledge);
        screen::run(
            &config,
            &source,
            &HeuristicStabilityScorer::default(),
            &HeuristicBindingScorer::default(),
            &reporter,
        )
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Screening task failed: {}", e)))??;

    print_summary(&result);

    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::Serialization(e.to_string()))?;
    match &args.output {
        Some(path) => {
            write_output(path, &json)?;
            println!("✓ Result written to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn write_output(path: &Path, json: &str) -> Result<()> {
    let mut file = std::fs::File::create(path).map_err(|source| CliError::Output {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|source| CliError::Output {
            path: path.to_path_buf(),
            source,
        })
}

fn summary_lines(result: &PipelineResult) -> Vec<String> {
    let mut lines = Vec::new();
    for round in result.rounds() {
        lines.push(format!(
            "{}: {} in, {} accepted, {} rejected",
            round.round(),
            round.input_count(),
            round.output_count(),
            round.rejected_count()
        ));
        for (reason, count) in round.rejections() {
            lines.push(format!("    {reason:?}: {count}"));
        }
    }
    if result.generation.shortfall() > 0 {
        lines.push(format!(
            "Round 1 stopped {} short of the target count.",
            result.generation.shortfall()
        ));
    }
    match &result.summary {
        Some(summary) => {
            lines.push(format!("Final candidates: {}", summary.count));
            lines.push(format!(
                "  mean stability temperature: {:.2} °C",
                summary.mean_stability_temperature
            ));
            lines.push(format!(
                "  mean molecular weight:      {:.1} Da",
                summary.mean_molecular_weight
            ));
            lines.push(format!(
                "  mean cross-population ratio: {:.3}",
                summary.mean_cross_population_ratio
            ));
            if let Some(best) = result.ranked.first() {
                lines.push(format!(
                    "  best: {} {} (quality {:.3})",
                    best.id(),
                    best.sequence(),
                    best.metrics().quality_score.unwrap_or_default()
                ));
            }
        }
        None => lines.push("Final candidates: none".to_string()),
    }
    lines
}

fn print_summary(result: &PipelineResult) {
    if result.summary.is_none() {
        warn!("Screening completed but no candidate survived all three rounds.");
    }
    for line in summary_lines(result) {
        eprintln!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepscreen::core::knowledge::KnowledgeSource;
    use pepscreen::engine::config::DefaultsConfig;

    fn screen_offline(tm: f64) -> PipelineResult {
        let config = DefaultsConfig::default()
            .into_builder()
            .knowledge_enabled(false)
            .seed(Some(5))
            .target_count(8)
            .tm_threshold(tm)
            .build()
            .unwrap();
        screen::run(
            &config,
            &KnowledgeSource::synthetic(),
            &HeuristicStabilityScorer::default(),
            &HeuristicBindingScorer::default(),
            &ProgressReporter::new(),
        )
        .unwrap()
    }

    #[test]
    fn summary_lists_every_round() {
        let lines = summary_lines(&screen_offline(55.0));
        assert!(lines[0].starts_with("Round 1 (Candidate Generation)"));
        assert!(lines.iter().any(|l| l.starts_with("Round 2 (Stability Filtering)")));
        assert!(lines.iter().any(|l| l.starts_with("Round 3 (Cross-Population Validation)")));
    }

    #[test]
    fn empty_final_set_is_reported() {
        let lines = summary_lines(&screen_offline(1000.0));
        assert_eq!(lines.last().map(String::as_str), Some("Final candidates: none"));
    }

    #[test]
    fn output_file_holds_the_json_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.json");
        let result = screen_offline(55.0);
        let json = serde_json::to_string_pretty(&result).unwrap();

        write_output(&path, &json).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["state"], "done");
        assert_eq!(parsed["target"], "THBS4");
        assert!(parsed["generation"]["candidates"].is_array());
    }

    #[test]
    fn unwritable_output_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_output(&dir.path().join("missing").join("out.json"), "{}").unwrap_err();
        assert!(matches!(err, CliError::Output { .. }));
    }
}
