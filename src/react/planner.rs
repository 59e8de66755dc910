//! Planner：基于 LLM 的决策服务实现
//!
//! system prompt = 基础提示 + 操作目录（含参数 Schema）+ Decision 输出格式 Schema；
//! user 消息 = 对话记录 + 当前请求。调用超时或输出无法解析均返回 DecisionUnavailable。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use schemars::schema_for;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::react::{parse_decision, Decision, DecisionFunction};
use crate::tools::operations_schema_json;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a shopping assistant for an online electronics store. \
Decide, one step at a time, which store operation to run for the user's request. \
Use product ids exactly as they appear in tool results or in [context: ...] annotations. \
Set should_continue to false and write final_response once the request is answered. \
Reply with exactly one JSON object and nothing else.";

/// Planner：持有 LLM、system prompt 与请求超时
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    timeout: Duration,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, base_prompt: &str, timeout_secs: u64) -> Self {
        Self {
            llm,
            system_prompt: build_system_prompt(base_prompt),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }
}

fn build_system_prompt(base: &str) -> String {
    let decision_schema = serde_json::to_string_pretty(&schema_for!(Decision))
        .unwrap_or_else(|_| String::new());
    format!(
        "{}\n\n## Operations\n{}\n\n## Output format (JSON Schema)\n{}\n\n\
`action.parameters` is the operation's parameters serialized as a JSON string. \
Use operation_name \"none\" with parameters \"{{}}\" when no operation is needed.",
        base,
        operations_schema_json(),
        decision_schema
    )
}

#[async_trait]
impl DecisionFunction for Planner {
    async fn decide(&self, user_request: &str, history: &str) -> Result<Decision, AgentError> {
        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(format!(
                "Conversation so far:\n{}\n\nCurrent request: {}",
                history, user_request
            )),
        ];
        let output = tokio::time::timeout(self.timeout, self.llm.complete(&messages))
            .await
            .map_err(|_| {
                AgentError::DecisionUnavailable(format!(
                    "request timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(AgentError::DecisionUnavailable)?;
        tracing::debug!(output = %output, "decision output");
        parse_decision(&output)
    }
}
