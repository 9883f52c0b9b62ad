use thiserror::Error;

use super::config::ConfigError;
use super::state::PipelineState;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration is unusable: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Illegal pipeline transition from {from} to {to}")]
    IllegalTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

impl PipelineError {
    /// State the pipeline was left in when this error ended the run.
    pub fn state(&self) -> PipelineState {
        match self {
            PipelineError::Config { .. } => PipelineState::Failed,
            PipelineError::IllegalTransition { from, .. } => *from,
        }
    }
}
