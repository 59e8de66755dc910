//! 单轮结果：自然语言消息 + 本轮累积的工具输出

use serde::Serialize;

use crate::core::AgentError;

pub const CLARIFICATION_MESSAGE: &str =
    "I couldn't finish that request. Could you clarify what you'd like me to do?";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// 决策服务给出的最终回复
    Answer,
    /// 本轮因错误中止
    Error,
    /// 达到最大步数仍未结束
    Clarification,
    /// 快捷命令
    Info,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TurnResponse {
    pub kind: ResponseKind,
    pub message: String,
    /// 已格式化的工具输出（按执行顺序）
    pub tool_outputs: Vec<String>,
}

impl TurnResponse {
    pub fn answer(message: impl Into<String>, tool_outputs: Vec<String>) -> Self {
        Self {
            kind: ResponseKind::Answer,
            message: message.into(),
            tool_outputs,
        }
    }

    pub fn error(err: &AgentError, tool_outputs: Vec<String>) -> Self {
        Self {
            kind: ResponseKind::Error,
            message: err.to_string(),
            tool_outputs,
        }
    }

    pub fn clarification(tool_outputs: Vec<String>) -> Self {
        Self {
            kind: ResponseKind::Clarification,
            message: CLARIFICATION_MESSAGE.to_string(),
            tool_outputs,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Info,
            message: message.into(),
            tool_outputs: Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ResponseKind::Error
    }

    /// 工具输出在前、消息在后，拼成一段文本；错误消息带 "Error:" 前缀
    pub fn render(&self) -> String {
        let message = match self.kind {
            ResponseKind::Error => format!("Error: {}", self.message),
            _ => self.message.clone(),
        };
        self.tool_outputs
            .iter()
            .filter(|s| !s.is_empty())
            .cloned()
            .chain(std::iter::once(message))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_outputs_then_message() {
        let r = TurnResponse::answer("Found 3 cables", vec!["list".into(), String::new()]);
        assert_eq!(r.render(), "list\n\nFound 3 cables");
    }

    #[test]
    fn test_error_prefix() {
        let r = TurnResponse::error(&AgentError::OperationFailure("Your cart is empty".into()), vec![]);
        assert!(r.is_error());
        assert_eq!(r.render(), "Error: Your cart is empty");
    }
}
