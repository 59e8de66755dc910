//! 决策服务边界：Decision 结构、DecisionFunction trait 与 LLM 输出解析
//!
//! 决策服务每轮返回一个 Decision；任何偏差（缺少必填字段、未知操作名、非 JSON 输出）
//! 都视为 DecisionUnavailable，而不是静默填默认值。

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::core::AgentError;
use crate::tools::OperationName;

/// 决策服务：给定原始用户请求与对话记录文本，返回一个结构化决策
#[async_trait]
pub trait DecisionFunction: Send + Sync {
    async fn decide(&self, user_request: &str, history: &str) -> Result<Decision, AgentError>;
}

/// 单轮决策
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Decision {
    /// 本轮推理（写入对话记录）
    pub reasoning: String,
    pub action: DecisionAction,
    /// false 表示本轮结束
    pub should_continue: bool,
    /// 给用户的最终回复
    #[serde(default)]
    pub final_response: Option<String>,
}

/// 选中的操作及其参数
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DecisionAction {
    pub operation_name: OperationName,
    pub reasoning: String,
    /// 序列化的 JSON 参数文本；若模型直接给出对象，则规范化为文本
    #[serde(deserialize_with = "parameters_text")]
    pub parameters: String,
}

impl Decision {
    /// 非空的最终回复
    pub fn final_message(&self) -> Option<&str> {
        self.final_response
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// 是否应在本轮结束（不再分发操作）
    pub fn is_terminal(&self) -> bool {
        !self.should_continue || self.action.operation_name.is_no_op()
    }
}

fn parameters_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        v @ serde_json::Value::Object(_) => Ok(v.to_string()),
        other => Err(D::Error::custom(format!(
            "parameters must be JSON text or an object, got {}",
            other
        ))),
    }
}

/// 从 LLM 文本中提取 JSON（```json ... ``` 或首个 `{` 到最后一个 `}`）并严格解析为 Decision
pub fn parse_decision(output: &str) -> Result<Decision, AgentError> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end < start {
            return Err(AgentError::DecisionUnavailable(format!(
                "no JSON object in output: {}",
                preview(trimmed)
            )));
        }
        &trimmed[start..=end]
    } else {
        return Err(AgentError::DecisionUnavailable(format!(
            "no JSON object in output: {}",
            preview(trimmed)
        )));
    };

    serde_json::from_str(json_str).map_err(|e| {
        AgentError::DecisionUnavailable(format!("invalid decision ({}): {}", e, preview(json_str)))
    })
}

fn preview(s: &str) -> String {
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s.to_string()
    }
}
