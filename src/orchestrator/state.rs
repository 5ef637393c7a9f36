//! Orchestration run state machine.
//!
//! # State Transitions
//! ```text
//! Idle → SelectingCandidate | Terminal (empty registry)
//! SelectingCandidate → Skipped | Probing | Invoking (probing disabled)
//! Probing → Skipped | Invoking
//! Invoking → Succeeded | Failed
//! Skipped | Failed → SelectingCandidate | Terminal (candidates exhausted)
//! Succeeded → Terminal
//! ```

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    SelectingCandidate,
    Skipped,
    Probing,
    Invoking,
    Succeeded,
    Failed,
    Terminal,
}

impl RunState {
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, SelectingCandidate)
                | (Idle, Terminal)
                | (SelectingCandidate, Skipped)
                | (SelectingCandidate, Probing)
                | (SelectingCandidate, Invoking)
                | (Probing, Skipped)
                | (Probing, Invoking)
                | (Invoking, Succeeded)
                | (Invoking, Failed)
                | (Skipped, SelectingCandidate)
                | (Skipped, Terminal)
                | (Failed, SelectingCandidate)
                | (Failed, Terminal)
                | (Succeeded, Terminal)
        )
    }
}

/// Tracks the state of one run and logs every transition.
#[derive(Debug)]
pub struct RunStateMachine {
    state: RunState,
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid run transition {:?} -> {:?}",
            self.state,
            next
        );
        tracing::trace!(from = ?self.state, to = ?next, "Run state transition");
        self.state = next;
    }
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut machine = RunStateMachine::new();
        for next in [
            RunState::SelectingCandidate,
            RunState::Probing,
            RunState::Invoking,
            RunState::Succeeded,
            RunState::Terminal,
        ] {
            machine.advance(next);
        }
        assert_eq!(machine.state(), RunState::Terminal);
    }

    #[test]
    fn test_fallback_loop() {
        let mut machine = RunStateMachine::new();
        for next in [
            RunState::SelectingCandidate,
            RunState::Skipped,
            RunState::SelectingCandidate,
            RunState::Invoking,
            RunState::Failed,
            RunState::Terminal,
        ] {
            machine.advance(next);
        }
        assert_eq!(machine.state(), RunState::Terminal);
    }

    #[test]
    fn test_rejected_transitions() {
        assert!(!RunState::Idle.can_transition_to(RunState::Invoking));
        assert!(!RunState::Succeeded.can_transition_to(RunState::SelectingCandidate));
        assert!(!RunState::Terminal.can_transition_to(RunState::SelectingCandidate));
        assert!(!RunState::Probing.can_transition_to(RunState::Succeeded));
    }
}
