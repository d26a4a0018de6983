//! Pipeline parameters: windows, thresholds and the adjudicator deadline.
//!
//! These are tunables, not algorithm constants; the infrastructure config
//! layer fills them from TOML.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use toolguard_domain::{GuardPolicy, LoopPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub guard: GuardPolicy,
    pub loops: LoopPolicy,
    /// Upper bound on a single adjudicator call.
    pub adjudicator_timeout: Duration,
    /// Observability only; never changes a decision.
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            guard: GuardPolicy::default(),
            loops: LoopPolicy::default(),
            adjudicator_timeout: Duration::from_millis(4000),
            debug: false,
        }
    }
}

impl PipelineConfig {
    // ==================== Builder Methods ====================

    pub fn with_guard_policy(mut self, guard: GuardPolicy) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_loop_policy(mut self, loops: LoopPolicy) -> Self {
        self.loops = loops;
        self
    }

    pub fn with_adjudicator_timeout(mut self, timeout: Duration) -> Self {
        self.adjudicator_timeout = timeout;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.guard.activity_window, 20);
        assert_eq!(config.guard.min_implementation_calls, 3);
        assert_eq!(config.loops.window_messages, 40);
        assert_eq!(config.loops.consecutive_threshold, 3);
        assert_eq!(config.adjudicator_timeout, Duration::from_secs(4));
        assert!(!config.debug);
    }

    #[test]
    fn test_builder_chain() {
        let config = PipelineConfig::default()
            .with_adjudicator_timeout(Duration::from_millis(250))
            .with_loop_policy(LoopPolicy {
                consecutive_threshold: 5,
                ..LoopPolicy::default()
            })
            .with_debug(true);
        assert_eq!(config.adjudicator_timeout.as_millis(), 250);
        assert_eq!(config.loops.consecutive_threshold, 5);
        assert!(config.debug);
    }
}
