//! 编排过程事件：供 CLI 等前端实时展示步骤、工具调用与结果

use serde::Serialize;

/// 单步过程事件（可序列化为 JSON）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReactEvent {
    /// 当前第几步
    StepUpdate { step: usize, max_steps: usize },
    /// 决策服务的推理内容
    Reasoning { text: String },
    /// 分发操作
    ToolCall { tool: String, parameters: String },
    /// 操作结果预览
    Observation { tool: String, preview: String },
    /// 操作失败
    ToolFailure { tool: String, reason: String },
    /// 本轮因错误中止
    Error { text: String },
}
