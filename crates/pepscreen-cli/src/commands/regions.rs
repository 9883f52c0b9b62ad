use super::resolve_settings;
use crate::cli::RegionsArgs;
use crate::error::{CliError, Result};
use pepscreen::core::models::region::ReferenceRegion;
use pepscreen::workflows::screen;
use tracing::info;

pub async fn run(args: RegionsArgs) -> Result<()> {
    let resolved = resolve_settings(&args.settings, args.settings.assignments())?;
    let target = args
        .target
        .unwrap_or_else(|| resolved.config.generation.target_protein.clone());
    let knowledge = resolved.config.knowledge;

    info!(%target, "Fetching reference regions...");
    let query_target = target.clone();
    let regions = tokio::task::spawn_blocking(move || {
        screen::knowledge_source(&knowledge).fetch_reference_regions(&query_target)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Region lookup failed: {}", e)))?;

    println!("Reference regions for {target}:");
    for line in region_lines(&regions) {
        println!("{line}");
    }
    Ok(())
}

fn region_lines(regions: &[ReferenceRegion]) -> Vec<String> {
    regions
        .iter()
        .map(|r| {
            format!(
                "  {:<24} {:<17} {:<8} {:>4} aa  {}",
                r.id(),
                r.role().as_str(),
                r.species(),
                r.sequence().len(),
                r.sequence()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pepscreen::core::knowledge::SyntheticStore;

    #[test]
    fn one_line_per_region() {
        let regions = SyntheticStore::new().regions().to_vec();
        let lines = region_lines(&regions);
        assert_eq!(lines.len(), regions.len());
        assert!(lines[0].contains("THBS4_TSP_domain"));
        assert!(lines.iter().all(|l| l.contains("human")));
    }
}
