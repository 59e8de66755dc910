//! Agent 错误类型
//!
//! 编排循环在迭代边界捕获下列错误并转为一段格式化文本；只有 Internal 会交给外层重试。

use thiserror::Error;

/// 单轮处理中可能出现的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// 决策服务不可达、超时或输出无法解析
    #[error("Decision service unavailable: {0}")]
    DecisionUnavailable(String),

    /// 操作参数无法解码；raw 为原始参数文本
    #[error("Malformed parameters for {operation}: {raw} ({reason})")]
    MalformedParameters {
        operation: String,
        raw: String,
        reason: String,
    },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// 后端拒绝输入，消息原样透传
    #[error("{0}")]
    OperationFailure(String),

    #[error("Operation timed out: {0}")]
    OperationTimeout(String),

    /// 上一个请求仍在处理
    #[error("Agent is busy with another request")]
    Busy,

    #[error("Cancelled")]
    Cancelled,

    /// 循环内部的意外故障（如 panic），外层可重试
    #[error("Internal error: {0}")]
    Internal(String),

    /// 意外故障发生在写操作提交之后：不重试，operations 列出已生效的操作
    #[error("Request interrupted after changes were applied: {operations}. Not retried ({reason})")]
    InterruptedAfterCommit { operations: String, reason: String },

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl AgentError {
    /// 外层重试包装器只对意外故障重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Internal(_))
    }
}
