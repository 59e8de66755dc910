//! Mock / Scripted LLM 客户端（无需 API）
//!
//! - MockLlmClient：未配置 API Key 时的兜底，总是返回一个 `none` 决策并回显用户请求。
//! - ScriptedLlmClient：按顺序返回预置输出并记录每次调用的消息，供测试驱动编排循环。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：不调用任何外部服务
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .and_then(|m| m.content.lines().last())
            .unwrap_or("(no input)");

        let decision = serde_json::json!({
            "reasoning": "Mock mode: no reasoning service configured.",
            "action": {
                "operation_name": "none",
                "reasoning": "mock",
                "parameters": "{}"
            },
            "should_continue": false,
            "final_response": format!(
                "(mock) Set OPENAI_API_KEY or DEEPSEEK_API_KEY to enable the assistant. {}",
                last_user
            ),
        });
        Ok(decision.to_string())
    }
}

/// 脚本客户端：依次弹出预置结果；脚本耗尽后返回 fallback（未设置则报错）
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<Result<String, String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedLlmClient {
    pub fn new(responses: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 每次都返回同一输出（用于验证最大步数限制）
    pub fn repeating(output: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(Ok(output.into()))
    }

    pub fn with_fallback(mut self, fallback: Result<String, String>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// 已收到的全部调用（每次调用的完整消息列表）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(messages.to_vec());
        let next = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match next {
            Some(r) => r,
            None => self
                .fallback
                .clone()
                .unwrap_or_else(|| Err("script exhausted".to_string())),
        }
    }
}
