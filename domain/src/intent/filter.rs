//! Outbound tool-list policy derived from a [`RuleDecision`].

use super::rule::{Intent, RuleDecision};
use crate::tool::entities::ToolDefinition;

/// Drop the plan-exit tool when the request is research.
///
/// Every other tool is kept, in input order.
pub fn filter_tools(decision: &RuleDecision, tools: &[ToolDefinition]) -> Vec<ToolDefinition> {
    if decision.intent != Intent::Research {
        return tools.to_vec();
    }
    tools.iter().filter(|t| !t.is_plan_exit()).cloned().collect()
}

/// Force a tool call only on a confident "require" with tools left to call.
pub fn should_force_tool_choice(decision: &RuleDecision, tools: &[ToolDefinition]) -> bool {
    decision.require_tools && decision.confident && !tools.is_empty()
}
