//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! what it names.

mod adjudicator;
mod guard;
mod logging;
mod tools;

pub use adjudicator::FileAdjudicatorConfig;
pub use guard::{FileLoopDetectionConfig, FilePlanExitGuardConfig};
pub use logging::FileLoggingConfig;
pub use tools::{FileCustomToolConfig, FileCustomToolParameter, FileToolsConfig, SchemaLoadError};

use serde::{Deserialize, Serialize};
use toolguard_application::PipelineConfig;
use toolguard_domain::{ConfigIssue, ConfigIssueCode};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// LLM judge for plan-exit calls
    pub adjudicator: FileAdjudicatorConfig,
    /// Activity heuristics of the plan-exit guard
    pub plan_exit_guard: FilePlanExitGuardConfig,
    /// Repetition thresholds
    pub loop_detection: FileLoopDetectionConfig,
    /// Tracing level and the decision audit trail
    pub logging: FileLoggingConfig,
    /// Operator-declared tool schemas
    pub tools: FileToolsConfig,
}

impl FileConfig {
    /// Pipeline tunables derived from this file.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_guard_policy(self.plan_exit_guard.to_policy())
            .with_loop_policy(self.loop_detection.to_policy())
            .with_adjudicator_timeout(self.adjudicator.timeout())
            .with_debug(self.logging.debug)
    }

    /// Validate the entire configuration and return all issues found.
    ///
    /// Nothing here is fatal: the pipeline still runs with the loaded
    /// values, the caller decides how loudly to report.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Thresholds that make a component inert
        let zero_checks = [
            (
                "plan_exit_guard.activity_window",
                self.plan_exit_guard.activity_window,
            ),
            (
                "plan_exit_guard.min_implementation_calls",
                self.plan_exit_guard.min_implementation_calls,
            ),
            (
                "loop_detection.window_messages",
                self.loop_detection.window_messages,
            ),
            (
                "loop_detection.consecutive_threshold",
                self.loop_detection.consecutive_threshold,
            ),
            (
                "loop_detection.max_cycle_period",
                self.loop_detection.max_cycle_period,
            ),
            (
                "loop_detection.min_cycle_repeats",
                self.loop_detection.min_cycle_repeats,
            ),
        ];
        for (field, value) in zero_checks {
            if value == 0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidConstraint {
                        field: field.to_string(),
                    },
                    format!("{field}: must be greater than 0"),
                ));
            }
        }

        for (field, value) in [
            (
                "loop_detection.consecutive_threshold",
                self.loop_detection.consecutive_threshold,
            ),
            (
                "loop_detection.min_cycle_repeats",
                self.loop_detection.min_cycle_repeats,
            ),
        ] {
            if value == 1 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidConstraint {
                        field: field.to_string(),
                    },
                    format!("{field}: 1 would flag every tool call, using 2"),
                ));
            }
        }

        // 2. Adjudicator completeness
        if self.adjudicator.enabled {
            for (field, value) in [
                ("adjudicator.model", &self.adjudicator.model),
                ("adjudicator.endpoint", &self.adjudicator.endpoint),
            ] {
                if value.trim().is_empty() {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::MissingValue {
                            field: field.to_string(),
                        },
                        format!("{field}: required when the adjudicator is enabled"),
                    ));
                }
            }
            if self.adjudicator.timeout_ms == 0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidConstraint {
                        field: "adjudicator.timeout_ms".to_string(),
                    },
                    "adjudicator.timeout_ms: 0 makes every call time out",
                ));
            }
        }

        // 3. Custom tool schemas
        let (_, errors) = self.tools.custom_definitions();
        for error in errors {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidToolSchema {
                    tool: error.tool().to_string(),
                },
                format!("tools.custom: {error}"),
            ));
        }

        issues
    }
}
