//! Episode termination semantics.
//!
//! A [`TerminationPolicy`] decides when an episode ends by orchestrating the
//! [`SafetyChecks`] capabilities of the environment. The policy never judges
//! success or failure itself; it only combines the environment's predicates
//! according to the configured [`DoneKind`].
use crate::{base::SafetyChecks, error::ReachAvoidError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Selectable termination semantics.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum DoneKind {
    /// Terminate only when the state leaves the training region.
    #[serde(rename = "toEnd")]
    ToEnd,

    /// Terminate on failure.
    #[serde(rename = "fail")]
    Fail,

    /// Terminate on failure or success.
    #[serde(rename = "TF")]
    Tf,

    /// Terminate on failure, success or leaving the training region, and tag
    /// the failure mode of the episode.
    #[serde(rename = "all")]
    All,

    /// Like [`DoneKind::All`], but substitutes the environment's stricter
    /// real-failure check for the margin-derived failure flag.
    #[serde(rename = "real")]
    Real,
}

impl FromStr for DoneKind {
    type Err = ReachAvoidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toEnd" => Ok(Self::ToEnd),
            "fail" => Ok(Self::Fail),
            "TF" => Ok(Self::Tf),
            "all" => Ok(Self::All),
            "real" => Ok(Self::Real),
            _ => Err(ReachAvoidError::InvalidConfiguration(format!(
                "unknown done kind: {}",
                s
            ))),
        }
    }
}

/// How an episode ended, for termination kinds that tag it.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// The state left the training region.
    OutOfEnv,

    /// The goal region was reached.
    Success,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::OutOfEnv => write!(f, "out_of_env"),
            FailureMode::Success => write!(f, "success"),
        }
    }
}

/// Decides when an episode ends.
///
/// The policy keeps a per-episode [`FailureMode`] tag with first-writer-wins
/// semantics: once set, later steps of the episode do not change it. Call
/// [`TerminationPolicy::reset`] at the start of every episode.
pub struct TerminationPolicy {
    kind: DoneKind,
    failure_mode: Option<FailureMode>,
}

impl TerminationPolicy {
    /// Builds a termination policy with the given semantics.
    pub fn new(kind: DoneKind) -> Self {
        Self {
            kind,
            failure_mode: None,
        }
    }

    /// Clears the per-episode failure mode tag.
    pub fn reset(&mut self) {
        self.failure_mode = None;
    }

    /// How the current episode ended, if tagged.
    pub fn failure_mode(&self) -> Option<FailureMode> {
        self.failure_mode
    }

    /// Evaluates the termination condition for the current step.
    ///
    /// `success` and `fail` are the environment's margin-derived flags for
    /// this step; the out-of-bounds and real-failure predicates are delegated
    /// to the `checks` capability.
    pub fn evaluate<C: SafetyChecks>(
        &mut self,
        checks: &C,
        state: &[f32],
        success: bool,
        fail: bool,
    ) -> bool {
        match self.kind {
            DoneKind::ToEnd => checks.check_out_of_bounds(state),
            DoneKind::Fail => fail,
            DoneKind::Tf => fail || success,
            DoneKind::All => {
                let oob = checks.check_out_of_bounds(state);
                self.tag(oob, success);
                fail || success || oob
            }
            DoneKind::Real => {
                let real_fail = checks.check_real_failure();
                let oob = checks.check_out_of_bounds(state);
                self.tag(oob, success);
                real_fail || success || oob
            }
        }
    }

    // First writer wins within an episode.
    fn tag(&mut self, out_of_bounds: bool, success: bool) {
        if self.failure_mode.is_none() {
            if out_of_bounds {
                self.failure_mode = Some(FailureMode::OutOfEnv);
            } else if success {
                self.failure_mode = Some(FailureMode::Success);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeChecks {
        out_of_bounds: bool,
        real_failure: bool,
    }

    impl SafetyChecks for FakeChecks {
        fn check_success(&self) -> bool {
            false
        }

        fn check_failure(&self) -> bool {
            false
        }

        fn check_real_failure(&self) -> bool {
            self.real_failure
        }

        fn check_out_of_bounds(&self, _state: &[f32]) -> bool {
            self.out_of_bounds
        }
    }

    const STATE: [f32; 2] = [0.0, 0.0];

    #[test]
    fn test_tf_matches_truth_table() {
        let checks = FakeChecks {
            out_of_bounds: true,
            real_failure: true,
        };
        for &success in &[false, true] {
            for &fail in &[false, true] {
                let mut policy = TerminationPolicy::new(DoneKind::Tf);
                let done = policy.evaluate(&checks, &STATE, success, fail);
                assert_eq!(done, success || fail);
            }
        }
    }

    #[test]
    fn test_to_end_delegates_to_bounds_check() {
        let mut policy = TerminationPolicy::new(DoneKind::ToEnd);
        let inside = FakeChecks {
            out_of_bounds: false,
            real_failure: false,
        };
        let outside = FakeChecks {
            out_of_bounds: true,
            real_failure: false,
        };
        assert!(!policy.evaluate(&inside, &STATE, true, true));
        assert!(policy.evaluate(&outside, &STATE, false, false));
    }

    #[test]
    fn test_all_tags_first_writer_wins() {
        let mut policy = TerminationPolicy::new(DoneKind::All);
        let outside = FakeChecks {
            out_of_bounds: true,
            real_failure: false,
        };
        assert!(policy.evaluate(&outside, &STATE, false, false));
        assert_eq!(policy.failure_mode(), Some(FailureMode::OutOfEnv));

        // A later success in the same episode must not overwrite the tag.
        assert!(policy.evaluate(&outside, &STATE, true, false));
        assert_eq!(policy.failure_mode(), Some(FailureMode::OutOfEnv));

        policy.reset();
        let inside = FakeChecks {
            out_of_bounds: false,
            real_failure: false,
        };
        assert!(policy.evaluate(&inside, &STATE, true, false));
        assert_eq!(policy.failure_mode(), Some(FailureMode::Success));
    }

    #[test]
    fn test_real_substitutes_strict_failure() {
        let inside = FakeChecks {
            out_of_bounds: false,
            real_failure: true,
        };
        let mut policy = TerminationPolicy::new(DoneKind::Real);
        // The strict check terminates even though the margin flag is unset ...
        assert!(policy.evaluate(&inside, &STATE, false, false));

        let benign = FakeChecks {
            out_of_bounds: false,
            real_failure: false,
        };
        let mut policy = TerminationPolicy::new(DoneKind::Real);
        // ... and a margin-derived failure without real failure is ignored.
        assert!(!policy.evaluate(&benign, &STATE, false, true));
    }

    #[test]
    fn test_invalid_done_kind() {
        assert!("TF".parse::<DoneKind>().is_ok());
        assert!("sometimes".parse::<DoneKind>().is_err());
    }
}
