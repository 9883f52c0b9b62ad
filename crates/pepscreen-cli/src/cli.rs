use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "pepscreen CLI - Generate peptide candidates and screen them for stability and cross-population binding parity.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel scoring.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the three-round screening pipeline and write the result as JSON.
    Run(RunArgs),
    /// Show the reference regions the knowledge source yields for a target.
    Regions(RegionsArgs),
    /// Show the fully resolved configuration.
    Config(ConfigArgs),
}

/// Configuration sources shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Path to a TOML configuration file.
    /// Defaults to `config.toml` in the platform configuration directory.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a configuration value, overriding the file and the environment.
    /// Can be used multiple times. Example: -S stability.tm-threshold=60
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,

    /// Skip the reference store and use the built-in synthetic regions.
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Write the pipeline result to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Shortcuts for common overrides ---
    /// Override `generation.target-protein`.
    #[arg(short, long, value_name = "NAME")]
    pub target: Option<String>,

    /// Override `generation.target-count`.
    #[arg(short = 'n', long, value_name = "INT")]
    pub count: Option<usize>,

    /// Override `generation.seed` for a reproducible run.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Shortcut flags expressed as `KEY=VALUE` assignments, applied after `--set`.
    pub fn assignments(&self) -> Vec<String> {
        let mut assignments = self.settings.assignments();
        if let Some(target) = &self.target {
            assignments.push(format!("generation.target-protein={target}"));
        }
        if let Some(count) = self.count {
            assignments.push(format!("generation.target-count={count}"));
        }
        if let Some(seed) = self.seed {
            assignments.push(format!("generation.seed={seed}"));
        }
        assignments
    }
}

impl SettingsArgs {
    pub fn assignments(&self) -> Vec<String> {
        let mut assignments = self.set_values.clone();
        if self.offline {
            assignments.push("knowledge.enabled=false".to_string());
        }
        assignments
    }
}

/// Arguments for the `regions` subcommand.
#[derive(Args, Debug)]
pub struct RegionsArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Target protein to query; defaults to `generation.target-protein`.
    #[arg(short, long, value_name = "NAME")]
    pub target: Option<String>,
}

/// Arguments for the `config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// List every configuration key with its environment variable instead.
    #[arg(long)]
    pub keys: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_shortcuts_follow_explicit_sets() {
        let cli = Cli::try_parse_from([
            "pepscreen",
            "run",
            "-S",
            "stability.tm-threshold=60",
            "--offline",
            "--target",
            "THBS1",
            "--seed",
            "7",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected the run subcommand");
        };
        assert_eq!(
            args.assignments(),
            [
                "stability.tm-threshold=60",
                "knowledge.enabled=false",
                "generation.target-protein=THBS1",
                "generation.seed=7",
            ]
        );
    }

    #[test]
    fn global_flags_are_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["pepscreen", "config", "--keys", "-vv", "-j", "4"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        assert!(matches!(cli.command, Commands::Config(ConfigArgs { keys: true, .. })));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["pepscreen", "run", "-q", "-v"]).is_err());
    }
}
