//! 会话监管：忙碌标志、停止标志、意外故障捕获与外层重试
//!
//! Agent 放在异步互斥锁中，try_lock 失败即视为「正在处理上一条请求」并拒绝（不排队、不交错）；
//! CancellationToken 只在两次请求之间检查，进行中的决策 / 分发总会跑完。
//! 意外故障时：本轮没有写操作生效则回滚对话记录并允许重试；已有写操作生效则不重试，并在错误中列出这些操作。

use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::{retry_with_backoff, AgentError, RetryPolicy};
use crate::react::ShopAgent;

/// 会话级生命周期管理
pub struct SessionSupervisor {
    agent: Mutex<ShopAgent>,
    /// 用户中断（Ctrl+C）时触发
    cancel_token: CancellationToken,
    retry: RetryPolicy,
}

impl SessionSupervisor {
    pub fn new(agent: ShopAgent, retry: RetryPolicy) -> Self {
        Self {
            agent: Mutex::new(agent),
            cancel_token: CancellationToken::new(),
            retry,
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// 触发停止：当前请求照常完成，之后的请求被拒绝
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// 处理一条请求；循环内 panic 转为 AgentError::Internal
    pub async fn submit(&self, input: &str) -> Result<String, AgentError> {
        if self.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        let mut agent = self.agent.try_lock().map_err(|_| AgentError::Busy)?;
        let checkpoint = agent.checkpoint();
        let panic = match AssertUnwindSafe(agent.run(input)).catch_unwind().await {
            Ok(text) => return Ok(text),
            Err(panic) => panic_message(panic.as_ref()),
        };

        let committed = agent.committed_operations();
        if committed.is_empty() {
            // 无副作用：回滚对话记录，重试时不会出现重复的用户输入
            agent.restore(checkpoint);
            return Err(AgentError::Internal(panic));
        }
        tracing::error!(operations = ?committed, "request interrupted after committing changes");
        Err(AgentError::InterruptedAfterCommit {
            operations: committed.join(", "),
            reason: panic,
        })
    }

    /// 带外层重试的 submit：仅在无副作用的意外故障时按 backoff * attempt 重试
    pub async fn submit_with_retry(&self, input: &str) -> Result<String, AgentError> {
        retry_with_backoff(&self.retry, |attempt| {
            if attempt > 1 {
                tracing::info!(attempt, "re-running request after internal fault");
            }
            self.submit(input)
        })
        .await
    }

    /// 直接访问 Agent（测试与调试用）
    pub async fn with_agent<R>(&self, f: impl FnOnce(&mut ShopAgent) -> R) -> R {
        let mut agent = self.agent.lock().await;
        f(&mut agent)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic in request handler".to_string()
    }
}
