use serde::Serialize;
use std::fmt;

use super::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineState {
    Idle,
    GeneratingRound1,
    FilteringRound2,
    ValidatingRound3,
    Done,
    /// Reached only when the configuration cannot be used.
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, GeneratingRound1)
                | (GeneratingRound1, FilteringRound2)
                | (FilteringRound2, ValidatingRound3)
                | (ValidatingRound3, Done)
                | (Idle, Failed)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::GeneratingRound1 => "generating-round-1",
            PipelineState::FilteringRound2 => "filtering-round-2",
            PipelineState::ValidatingRound3 => "validating-round-3",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Current state plus every state visited, starting at `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrace {
    current: PipelineState,
    visited: Vec<PipelineState>,
}

impl Default for StateTrace {
    fn default() -> Self {
        Self {
            current: PipelineState::Idle,
            visited: vec![PipelineState::Idle],
        }
    }
}

impl StateTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> PipelineState {
        self.current
    }

    pub fn visited(&self) -> &[PipelineState] {
        &self.visited
    }

    pub fn advance(&mut self, next: PipelineState) -> Result<(), PipelineError> {
        if !self.current.can_advance_to(next) {
            return Err(PipelineError::IllegalTransition {
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        self.visited.push(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PipelineState::*;

    #[test]
    fn happy_path_reaches_done() {
        let mut trace = StateTrace::new();
        for next in [GeneratingRound1, FilteringRound2, ValidatingRound3, Done] {
            trace.advance(next).unwrap();
        }
        assert_eq!(trace.current(), Done);
        assert!(trace.current().is_terminal());
        assert_eq!(
            trace.visited(),
            [Idle, GeneratingRound1, FilteringRound2, ValidatingRound3, Done]
        );
    }

    #[test]
    fn failed_is_only_reachable_before_generation() {
        let mut trace = StateTrace::new();
        trace.advance(Failed).unwrap();
        assert_eq!(trace.current(), Failed);

        let mut running = StateTrace::new();
        running.advance(GeneratingRound1).unwrap();
        assert!(running.advance(Failed).is_err());
    }

    #[test]
    fn rounds_cannot_be_skipped() {
        let mut trace = StateTrace::new();
        let err = trace.advance(FilteringRound2).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::IllegalTransition {
                from: Idle,
                to: FilteringRound2
            }
        ));
        assert_eq!(trace.current(), Idle);
    }
}
