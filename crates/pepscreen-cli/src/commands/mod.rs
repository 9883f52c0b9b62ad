pub mod config;
pub mod regions;
pub mod run;

use crate::cli::SettingsArgs;
use crate::error::Result;
use directories::ProjectDirs;
use pepscreen::engine::config::{ConfigResolver, ResolvedConfig};
use std::path::PathBuf;
use tracing::{debug, info};

const CONFIG_FILE_NAME: &str = "config.toml";

/// `config.toml` in the platform configuration directory, if that directory is known.
fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "pepscreen", "pepscreen")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Resolves the configuration from the chosen file, the process environment and the
/// given assignments. Resolution warnings are logged and echoed to stderr.
pub(crate) fn resolve_settings(
    settings: &SettingsArgs,
    assignments: Vec<String>,
) -> Result<ResolvedConfig> {
    let mut resolver = ConfigResolver::new().overrides(assignments);
    match settings.config.clone() {
        Some(path) => {
            info!("Using configuration file {:?}", &path);
            resolver = resolver.file(path);
        }
        None => match default_config_path() {
            Some(path) if path.exists() => {
                info!("Using configuration file {:?}", &path);
                resolver = resolver.file(path);
            }
            _ => debug!("No configuration file found; using defaults and environment."),
        },
    }

    let resolved = resolver.resolve()?;
    for warning in &resolved.warnings {
        eprintln!("⚠ {warning}");
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use pepscreen::engine::config::ConfigError;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn explicit_file_and_assignments_are_merged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[generation]\ntarget-count = 12\n").unwrap();
        let settings = SettingsArgs {
            config: Some(file.path().to_path_buf()),
            set_values: vec!["stability.tm-threshold=61".into()],
            offline: true,
        };
        let resolved = resolve_settings(&settings, settings.assignments()).unwrap();
        assert_eq!(resolved.config.generation.target_count, 12);
        assert_eq!(resolved.config.stability.tm_threshold, 61.0);
        assert!(!resolved.config.knowledge.enabled);
    }

    #[test]
    #[serial]
    fn bad_assignment_is_reported() {
        let settings = SettingsArgs {
            set_values: vec!["generation.colour=blue".into()],
            ..SettingsArgs::default()
        };
        let err = resolve_settings(&settings, settings.assignments()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::UnknownKey(key)) if key == "generation.colour"
        ));
    }
}
