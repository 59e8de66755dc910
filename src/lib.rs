//! Shop Agent - 对话式购物助手
//!
//! 模块划分：
//! - **agent**: 组装（LLM 选择、目录加载、Planner + ToolExecutor + 主循环）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、外层重试、会话监管（忙碌 / 停止标志）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock / Scripted）
//! - **memory**: LLM 消息与有界对话记录
//! - **react**: 决策服务边界、Planner、指代上下文、快捷命令、工具编排主循环
//! - **shop**: 商品目录、会话状态与后端操作
//! - **tools**: 具名操作的强类型解码与分发执行
//! - **ui**: 操作结果的文本渲染

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod shop;
pub mod tools;
pub mod ui;

pub use react::{ShopAgent, TurnResponse};
