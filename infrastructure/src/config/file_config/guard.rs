//! Plan-exit guard and loop detection tunables
//! (`[plan_exit_guard]` and `[loop_detection]` sections)

use serde::{Deserialize, Serialize};
use toolguard_domain::{GuardPolicy, LoopPolicy};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePlanExitGuardConfig {
    /// Trailing messages inspected for tool activity (default: 20)
    pub activity_window: usize,
    /// Implementation calls needed before activity alone blocks (default: 3)
    pub min_implementation_calls: usize,
}

impl Default for FilePlanExitGuardConfig {
    fn default() -> Self {
        let policy = GuardPolicy::default();
        Self {
            activity_window: policy.activity_window,
            min_implementation_calls: policy.min_implementation_calls,
        }
    }
}

impl FilePlanExitGuardConfig {
    pub fn to_policy(&self) -> GuardPolicy {
        GuardPolicy {
            activity_window: self.activity_window,
            min_implementation_calls: self.min_implementation_calls,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoopDetectionConfig {
    /// Trailing messages inspected (default: 40)
    pub window_messages: usize,
    /// Identical consecutive turns that count as a loop (default: 3)
    pub consecutive_threshold: usize,
    /// Longest alternating cycle considered (default: 3)
    pub max_cycle_period: usize,
    /// Full cycle repetitions that count as a loop (default: 2)
    pub min_cycle_repeats: usize,
}

impl Default for FileLoopDetectionConfig {
    fn default() -> Self {
        let policy = LoopPolicy::default();
        Self {
            window_messages: policy.window_messages,
            consecutive_threshold: policy.consecutive_threshold,
            max_cycle_period: policy.max_cycle_period,
            min_cycle_repeats: policy.min_cycle_repeats,
        }
    }
}

impl FileLoopDetectionConfig {
    pub fn to_policy(&self) -> LoopPolicy {
        LoopPolicy {
            window_messages: self.window_messages,
            consecutive_threshold: self.consecutive_threshold,
            max_cycle_period: self.max_cycle_period,
            min_cycle_repeats: self.min_cycle_repeats,
        }
    }
}
