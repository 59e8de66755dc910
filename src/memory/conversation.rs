//! 短期记忆：LLM 消息与对话记录（Transcript）
//!
//! Transcript 是编排循环独占的有序文本记录（用户输入 / 推理 / 工具调用与结果），
//! 超过上限时从最旧一端剪枝，只保留最近部分；仅在用户显式 reset 时清空。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 发给 LLM 的单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 对话记录中的一条
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranscriptEntry {
    /// 用户输入（可能已追加商品上下文标注）
    User(String),
    /// 决策服务的推理文本
    Reasoning(String),
    /// 工具调用记录：操作名、参数原文、序列化后的结果
    ToolCall {
        operation: String,
        parameters: String,
        result: String,
    },
}

impl TranscriptEntry {
    pub fn render(&self) -> String {
        match self {
            TranscriptEntry::User(text) => format!("User: {}", text),
            TranscriptEntry::Reasoning(text) => format!("Agent: {}", text),
            TranscriptEntry::ToolCall {
                operation,
                parameters,
                result,
            } => format!("Tool {}({}) => {}", operation, parameters, result),
        }
    }
}

/// 有界对话记录：push 时超出 max_len 即丢弃最旧条目
#[derive(Clone, Debug)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    max_len: usize,
}

impl Transcript {
    pub fn new(max_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_len: max_len.max(1),
        }
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
        self.prune();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// 拼成单段文本，供决策服务作为 conversation_history
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(TranscriptEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn prune(&mut self) {
        if self.entries.len() > self.max_len {
            let excess = self.entries.len() - self.max_len;
            self.entries.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prune_keeps_most_recent() {
        let mut t = Transcript::new(3);
        for i in 0..5 {
            t.push(TranscriptEntry::User(format!("m{}", i)));
        }
        assert_eq!(t.len(), 3);
        assert_eq!(t.entries()[0], TranscriptEntry::User("m2".into()));
        assert_eq!(t.entries()[2], TranscriptEntry::User("m4".into()));
    }

    #[test]
    fn test_render_format() {
        let mut t = Transcript::new(10);
        t.push(TranscriptEntry::User("find cables".into()));
        t.push(TranscriptEntry::Reasoning("searching".into()));
        t.push(TranscriptEntry::ToolCall {
            operation: "search_products".into(),
            parameters: r#"{"query":"usb"}"#.into(),
            result: "[]".into(),
        });
        assert_eq!(
            t.render(),
            "User: find cables\nAgent: searching\nTool search_products({\"query\":\"usb\"}) => []"
        );
    }

    #[test]
    fn test_clear() {
        let mut t = Transcript::new(2);
        t.push(TranscriptEntry::User("a".into()));
        t.clear();
        assert!(t.is_empty());
    }
}
