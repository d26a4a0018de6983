//! Assemble a [`ToolCallPipeline`] from the loaded file configuration.
//!
//! Misconfigured optional parts (a custom tool schema, the adjudicator, the
//! decision log) are reported and left out; the pipeline itself always
//! builds.

use crate::adjudicator::ChatCompletionsAdjudicator;
use crate::config::FileConfig;
use crate::logging::JsonlDecisionLogger;
use std::sync::Arc;
use toolguard_application::ToolCallPipeline;
use toolguard_domain::SchemaRegistry;
use tracing::{info, warn};

/// Registry with the fallback schemas plus every loadable custom tool.
pub fn build_registry(config: &FileConfig) -> SchemaRegistry {
    let registry = SchemaRegistry::with_fallbacks();
    let (definitions, errors) = config.tools.custom_definitions();

    for error in errors {
        warn!("Skipping custom tool: {}", error);
    }
    for definition in &definitions {
        info!("Registered custom tool schema: {}", definition.name);
    }
    registry.register_all(&definitions);
    registry
}

pub fn build_pipeline(config: &FileConfig) -> ToolCallPipeline {
    let mut builder = ToolCallPipeline::builder()
        .with_registry(Arc::new(build_registry(config)))
        .with_config(config.to_pipeline_config());

    if config.adjudicator.enabled {
        match ChatCompletionsAdjudicator::from_config(&config.adjudicator) {
            Ok(adjudicator) => {
                info!(model = %config.adjudicator.model, "Plan-exit adjudicator enabled");
                builder = builder.with_adjudicator(Arc::new(adjudicator));
            }
            Err(e) => warn!("Plan-exit adjudicator disabled: {}", e),
        }
    }

    if let Some(path) = &config.logging.decision_log
        && let Some(logger) = JsonlDecisionLogger::new(path)
    {
        info!("Writing pipeline decisions to {}", logger.path().display());
        builder = builder.with_logger(Arc::new(logger));
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileCustomToolConfig, FileCustomToolParameter};
    use toolguard_application::PreForward;
    use toolguard_domain::{Message, ToolCall};

    fn deploy_tool() -> FileCustomToolConfig {
        let mut tool = FileCustomToolConfig {
            description: "Deploy the service".to_string(),
            ..Default::default()
        };
        tool.parameters.insert(
            "env".to_string(),
            FileCustomToolParameter {
                param_type: "string".to_string(),
                description: "Target environment".to_string(),
                required: true,
            },
        );
        tool
    }

    #[test]
    fn test_registry_includes_custom_tools() {
        let mut config = FileConfig::default();
        config.tools.custom.insert("Deploy".to_string(), deploy_tool());

        let registry = build_registry(&config);
        let schema = registry.get_schema("Deploy").unwrap();
        assert!(schema.is_required("env"));
        assert!(registry.get_schema("TodoWrite").is_some());
    }

    #[test]
    fn test_default_pipeline_has_no_adjudicator() {
        let pipeline = build_pipeline(&FileConfig::default());
        assert!(!pipeline.has_adjudicator());
        assert_eq!(pipeline.config().loops.consecutive_threshold, 3);
    }

    #[test]
    fn test_enabled_adjudicator_is_wired() {
        let mut config = FileConfig::default();
        config.adjudicator.enabled = true;
        config.adjudicator.endpoint = "http://127.0.0.1:9/v1/chat/completions".to_string();

        assert!(build_pipeline(&config).has_adjudicator());
    }

    #[test]
    fn test_incomplete_adjudicator_is_skipped() {
        let mut config = FileConfig::default();
        config.adjudicator.enabled = true;
        config.adjudicator.model = String::new();

        assert!(!build_pipeline(&config).has_adjudicator());
    }

    #[test]
    fn test_decision_log_records_short_circuit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("decisions.jsonl");
        let mut config = FileConfig::default();
        config.logging.decision_log = Some(path.clone());

        let pipeline = build_pipeline(&config);
        let mut conversation = vec![Message::user("read the file")];
        for i in 0..3 {
            let id = format!("t{i}");
            conversation.push(Message::assistant_tool_calls(vec![
                ToolCall::new("Read")
                    .with_id(id.clone())
                    .with_arg("file_path", "/src/main.rs"),
            ]));
            conversation.push(Message::tool_result(id, "fn main() {}"));
        }

        let outcome = pipeline.pre_forward(&conversation, &[]);
        assert!(matches!(outcome, PreForward::ShortCircuit { .. }));
        drop(pipeline);

        let log = std::fs::read_to_string(&path).unwrap();
        assert!(log.lines().any(|l| l.contains("\"type\":\"loop_detected\"")));
    }
}
