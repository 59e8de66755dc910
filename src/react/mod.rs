//! 认知层：决策服务边界、Planner、指代上下文、快捷命令、工具编排主循环

pub mod context;
pub mod decision;
pub mod events;
pub mod loop_;
pub mod planner;
pub mod quick;
pub mod response;

pub use context::{enrich_request, ProductIds, ProductRef};
pub use decision::{parse_decision, Decision, DecisionAction, DecisionFunction};
pub use events::ReactEvent;
pub use loop_::{LoopSettings, ShopAgent, TurnCheckpoint, DEFAULT_MAX_HISTORY, DEFAULT_MAX_ITERATIONS};
pub use planner::{Planner, DEFAULT_SYSTEM_PROMPT};
pub use quick::{QuickCommand, HELP_TEXT};
pub use response::{ResponseKind, TurnResponse, CLARIFICATION_MESSAGE};
