use super::file::{CONFIG_KEYS, ConfigKey};
use super::{ConfigError, DefaultsConfig, EnvSource, FileConfig, PipelineConfig, ProcessEnv};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A recoverable problem met during resolution; the affected layer is skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    FileNotFound {
        path: PathBuf,
    },
    FileUnreadable {
        path: PathBuf,
        message: String,
    },
    FileMalformed {
        path: PathBuf,
        message: String,
    },
    InvalidEnvOverride {
        variable: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::FileNotFound { path } => {
                write!(f, "Config file {} not found; using defaults", path.display())
            }
            ConfigWarning::FileUnreadable { path, message } => write!(
                f,
                "Config file {} could not be read ({message}); using defaults",
                path.display()
            ),
            ConfigWarning::FileMalformed { path, message } => write!(
                f,
                "Config file {} is malformed ({message}); using defaults",
                path.display()
            ),
            ConfigWarning::InvalidEnvOverride {
                variable,
                value,
                reason,
            } => write!(f, "Ignoring {variable}='{value}': {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: PipelineConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Merges defaults, an optional TOML document, environment variables and explicit
/// `KEY=VALUE` overrides, in that order.
///
/// Explicit overrides are strict. Environment values that do not convert, or that
/// would leave an otherwise valid configuration invalid, are dropped with a warning.
///
/// Resolution holds no global state: resolving twice with the same inputs yields
/// equal results.
#[derive(Debug, Clone)]
pub struct ConfigResolver<E: EnvSource = ProcessEnv> {
    path: Option<PathBuf>,
    env: E,
    overrides: Vec<String>,
    defaults: DefaultsConfig,
}

impl ConfigResolver<ProcessEnv> {
    pub fn new() -> Self {
        Self {
            path: None,
            env: ProcessEnv,
            overrides: Vec::new(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl Default for ConfigResolver<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> ConfigResolver<E> {
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn env<F: EnvSource>(self, env: F) -> ConfigResolver<F> {
        ConfigResolver {
            path: self.path,
            env,
            overrides: self.overrides,
            defaults: self.defaults,
        }
    }

    pub fn overrides(mut self, assignments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.overrides = assignments.into_iter().map(Into::into).collect();
        self
    }

    pub fn defaults(mut self, defaults: DefaultsConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let mut warnings = Vec::new();

        let file = match &self.path {
            Some(path) => load_file(path, &mut warnings),
            None => FileConfig::default(),
        };

        let mut env_values = Vec::new();
        for key in CONFIG_KEYS {
            let Some(value) = self.env.var(key.env) else {
                continue;
            };
            match file.clone().set(key.path, &value) {
                Ok(()) => {
                    debug!(variable = key.env, key = key.path, "Read environment override.");
                    env_values.push((key, value));
                }
                Err(e) => warnings.push(ConfigWarning::InvalidEnvOverride {
                    variable: key.env,
                    value,
                    reason: e.to_string(),
                }),
            }
        }

        let assignments = self
            .overrides
            .iter()
            .map(|assignment| {
                assignment
                    .split_once('=')
                    .map(|(key, value)| (key.trim(), value))
                    .ok_or_else(|| ConfigError::InvalidAssignment(assignment.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let config = match self.compose(&file, &env_values, &assignments) {
            Ok(config) => config,
            Err(e) if env_values.is_empty() => return Err(e),
            Err(_) => {
                // The environment made a valid configuration invalid: keep only the
                // overrides that leave it valid.
                self.compose(&file, &[], &assignments)?;
                let mut accepted: Vec<(&ConfigKey, String)> = Vec::new();
                let mut pending = env_values;
                loop {
                    let before = pending.len();
                    let mut rejected = Vec::new();
                    for (key, value) in pending {
                        accepted.push((key, value));
                        if let Err(e) = self.compose(&file, &accepted, &assignments) {
                            if let Some((key, value)) = accepted.pop() {
                                rejected.push((key, value, e));
                            }
                        }
                    }
                    if rejected.len() == before || rejected.is_empty() {
                        warnings.extend(rejected.into_iter().map(|(key, value, e)| {
                            ConfigWarning::InvalidEnvOverride {
                                variable: key.env,
                                value,
                                reason: e.to_string(),
                            }
                        }));
                        break;
                    }
                    pending = rejected.into_iter().map(|(key, value, _)| (key, value)).collect();
                }
                self.compose(&file, &accepted, &assignments)?
            }
        };

        for warning in &warnings {
            warn!("{warning}");
        }
        Ok(ResolvedConfig { config, warnings })
    }

    /// Layers environment values and then explicit assignments over the file and builds.
    fn compose(
        &self,
        file: &FileConfig,
        env_values: &[(&ConfigKey, String)],
        assignments: &[(&str, &str)],
    ) -> Result<PipelineConfig, ConfigError> {
        let mut layered = file.clone();
        for (key, value) in env_values {
            layered.set(key.path, value)?;
        }
        for (key, value) in assignments {
            layered.set(key, value)?;
        }
        layered.merge_over(self.defaults.clone()).build()
    }
}

fn load_file(path: &Path, warnings: &mut Vec<ConfigWarning>) -> FileConfig {
    if !path.exists() {
        warnings.push(ConfigWarning::FileNotFound {
            path: path.to_path_buf(),
        });
        return FileConfig::default();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warnings.push(ConfigWarning::FileUnreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            return FileConfig::default();
        }
    };
    match text.parse::<FileConfig>() {
        Ok(file) => {
            debug!(path = %path.display(), "Loaded configuration file.");
            file
        }
        Err(e) => {
            warnings.push(ConfigWarning::FileMalformed {
                path: path.to_path_buf(),
                message: e.message().to_string(),
            });
            FileConfig::default()
        }
    }
}
