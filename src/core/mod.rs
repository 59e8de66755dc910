//! 核心层：错误类型、外层重试、会话监管

pub mod error;
pub mod retry;
pub mod session_supervisor;

pub use error::AgentError;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use session_supervisor::SessionSupervisor;
