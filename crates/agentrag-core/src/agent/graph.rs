//! Phases of the decision graph and the transition function

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing done yet; executing it retrieves from the corpus
    Start,
    /// Local fragments gathered; executing it grades them
    Retrieved,
    /// A verdict exists; pure decision point
    Graded,
    /// Route, search the web, merge and re-grade
    Escalating,
    /// Synthesize the answer and record the exchange
    Answering,
    Done,
}

/// Facts `next_phase` decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub sufficient: bool,
    pub attempt_count: u32,
    pub max_attempts: u32,
}

/// Where the graph goes after executing `phase`
pub fn next_phase(phase: Phase, progress: Progress) -> Phase {
    match phase {
        Phase::Start => Phase::Retrieved,
        Phase::Retrieved => Phase::Graded,
        Phase::Graded => {
            if progress.sufficient || progress.attempt_count >= progress.max_attempts {
                Phase::Answering
            } else {
                Phase::Escalating
            }
        }
        Phase::Escalating => Phase::Graded,
        Phase::Answering | Phase::Done => Phase::Done,
    }
}

/// Upper bound on executed phases before the driver forces an answer
pub fn step_limit(max_attempts: u32) -> usize {
    max_attempts as usize * 2 + 4
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn progress(sufficient: bool, attempt_count: u32) -> Progress {
        Progress {
            sufficient,
            attempt_count,
            max_attempts: 2,
        }
    }

    #[test]
    fn test_linear_prefix() {
        assert_eq!(next_phase(Phase::Start, progress(false, 0)), Phase::Retrieved);
        assert_eq!(next_phase(Phase::Retrieved, progress(false, 0)), Phase::Graded);
        assert_eq!(next_phase(Phase::Escalating, progress(false, 1)), Phase::Graded);
        assert_eq!(next_phase(Phase::Answering, progress(true, 0)), Phase::Done);
        assert_eq!(next_phase(Phase::Done, progress(true, 0)), Phase::Done);
    }

    #[test]
    fn test_graded_branches() {
        assert_eq!(next_phase(Phase::Graded, progress(true, 0)), Phase::Answering);
        assert_eq!(next_phase(Phase::Graded, progress(false, 0)), Phase::Escalating);
        assert_eq!(next_phase(Phase::Graded, progress(false, 1)), Phase::Escalating);
        assert_eq!(next_phase(Phase::Graded, progress(false, 2)), Phase::Answering);
    }

    #[test]
    fn test_zero_budget_answers_immediately() {
        let p = Progress {
            sufficient: false,
            attempt_count: 0,
            max_attempts: 0,
        };
        assert_eq!(next_phase(Phase::Graded, p), Phase::Answering);
    }

    proptest! {
        /// Simulates the driver with arbitrary verdicts: always reaches Done
        /// inside the step limit and never escalates past the budget.
        #[test]
        fn prop_graph_terminates(
            max_attempts in 0u32..6,
            verdicts in proptest::collection::vec(any::<bool>(), 0..16),
        ) {
            let mut phase = Phase::Start;
            let mut attempts = 0u32;
            let mut steps = 0usize;
            let mut verdicts = verdicts.into_iter();
            let mut sufficient = false;

            while phase != Phase::Done {
                if matches!(phase, Phase::Retrieved | Phase::Escalating) {
                    sufficient = verdicts.next().unwrap_or(false);
                }
                steps += 1;
                let next = next_phase(phase, Progress { sufficient, attempt_count: attempts, max_attempts });
                if next == Phase::Escalating {
                    attempts += 1;
                }
                phase = next;
                prop_assert!(steps <= step_limit(max_attempts) + 1);
            }

            prop_assert!(attempts <= max_attempts);
        }
    }
}
