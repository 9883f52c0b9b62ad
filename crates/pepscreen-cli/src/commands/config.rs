use super::resolve_settings;
use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use pepscreen::engine::config::{CONFIG_KEYS, PipelineConfig};

pub async fn run(args: ConfigArgs) -> Result<()> {
    if args.keys {
        for line in key_lines() {
            println!("{line}");
        }
        return Ok(());
    }

    let resolved = resolve_settings(&args.settings, args.settings.assignments())?;
    print!("{}", render(&resolved.config)?);
    Ok(())
}

fn render(config: &PipelineConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::Serialization(e.to_string()))
}

fn key_lines() -> Vec<String> {
    let width = CONFIG_KEYS.iter().map(|k| k.path.len()).max().unwrap_or(0);
    CONFIG_KEYS
        .iter()
        .map(|k| format!("{:<width$}  {:<36}  {}", k.path, k.env, k.description))
        .collect()
}
