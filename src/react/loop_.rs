//! 工具编排主循环
//!
//! 快捷命令 -> 指代增强 -> 写入对话记录 -> 逐步：Decide -> (终止 | 解码 + 分发 -> 记录结果) -> 下一步。
//! 决策服务失败、参数错误、未知操作、后端拒绝都会立即结束本轮并返回错误文本；
//! 达到最大步数返回澄清请求。run 永远返回文本，不向调用方抛错。

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::core::AgentError;
use crate::memory::{Transcript, TranscriptEntry};
use crate::react::{
    enrich_request, Decision, DecisionFunction, ProductIds, ProductRef, QuickCommand, ReactEvent,
    TurnResponse, HELP_TEXT,
};
use crate::tools::{Operation, OperationOutput, ToolExecutor};
use crate::ui::{render_cart, render_orders, render_output, render_wishlist};

/// 单轮最大决策步数
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
/// 对话记录最大条数
pub const DEFAULT_MAX_HISTORY: usize = 20;
/// Observation 预览最大字符数
const OBSERVATION_PREVIEW_CHARS: usize = 200;

/// 循环参数
#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub max_iterations: usize,
    pub max_history_length: usize,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history_length: DEFAULT_MAX_HISTORY,
        }
    }
}

/// 购物智能体：独占对话记录与商品指代上下文，持有决策服务与后端句柄
pub struct ShopAgent {
    decider: Arc<dyn DecisionFunction>,
    executor: ToolExecutor,
    transcript: Transcript,
    /// 最近一次唯一确定的商品；只在详情查询 / 单结果搜索后写入，reset 时清空
    reference: Option<ProductRef>,
    /// 用于识别请求中的显式商品 ID
    product_ids: ProductIds,
    /// 本轮已成功执行的写操作（如 `add_to_cart({"product_id":"P001"})`），每轮开始时清空
    committed: Vec<String>,
    max_iterations: usize,
    event_tx: Option<UnboundedSender<ReactEvent>>,
}

/// 一轮开始前的对话状态；该轮意外中断且未产生副作用时用于回滚
#[derive(Clone, Debug)]
pub struct TurnCheckpoint {
    transcript: Transcript,
    reference: Option<ProductRef>,
}

impl ShopAgent {
    pub fn new(decider: Arc<dyn DecisionFunction>, executor: ToolExecutor, settings: LoopSettings) -> Self {
        Self {
            decider,
            executor,
            transcript: Transcript::new(settings.max_history_length),
            reference: None,
            product_ids: ProductIds::default(),
            committed: Vec::new(),
            max_iterations: settings.max_iterations.max(1),
            event_tx: None,
        }
    }

    /// 设置事件推送通道
    pub fn with_event_tx(mut self, tx: UnboundedSender<ReactEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn with_product_ids(mut self, ids: ProductIds) -> Self {
        self.product_ids = ids;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn reference(&self) -> Option<&ProductRef> {
        self.reference.as_ref()
    }

    /// 本轮（或上一轮）已提交的写操作
    pub fn committed_operations(&self) -> &[String] {
        &self.committed
    }

    pub fn checkpoint(&self) -> TurnCheckpoint {
        TurnCheckpoint {
            transcript: self.transcript.clone(),
            reference: self.reference.clone(),
        }
    }

    pub fn restore(&mut self, checkpoint: TurnCheckpoint) {
        self.transcript = checkpoint.transcript;
        self.reference = checkpoint.reference;
    }

    /// 清空对话记录与指代上下文；后端会话（购物车等）不受影响
    pub fn reset_history(&mut self) {
        self.transcript.clear();
        self.reference = None;
    }

    /// 处理一条用户请求，返回渲染后的文本
    pub async fn run(&mut self, user_request: &str) -> String {
        self.run_turn(user_request).await.render()
    }

    /// 处理一条用户请求，返回结构化结果
    pub async fn run_turn(&mut self, user_request: &str) -> TurnResponse {
        let request = user_request.trim();
        self.committed.clear();
        if let Some(cmd) = QuickCommand::parse(request) {
            tracing::debug!(?cmd, "quick command");
            return self.quick_command(cmd).await;
        }

        let entry = enrich_request(request, self.reference.as_ref(), &self.product_ids);
        if entry.len() != request.len() {
            tracing::debug!(enriched = %entry, "request enriched with product context");
        }
        self.transcript.push(TranscriptEntry::User(entry));

        let mut outputs: Vec<String> = Vec::new();
        for step in 0..self.max_iterations {
            self.send_event(ReactEvent::StepUpdate {
                step,
                max_steps: self.max_iterations,
            });

            let history = self.transcript.render();
            let decision = match self.decider.decide(request, &history).await {
                Ok(d) => d,
                Err(e) => return self.abort(e, outputs),
            };

            self.transcript
                .push(TranscriptEntry::Reasoning(decision.reasoning.clone()));
            self.send_event(ReactEvent::Reasoning {
                text: decision.reasoning.clone(),
            });

            if decision.is_terminal() {
                let message = decision
                    .final_message()
                    .unwrap_or(decision.reasoning.as_str());
                return TurnResponse::answer(message, outputs);
            }

            let output = match self.dispatch(&decision).await {
                Ok(o) => o,
                Err(e) => return self.abort(e, outputs),
            };

            if decision.action.operation_name.is_mutating() {
                self.committed.push(format!(
                    "{}({})",
                    decision.action.operation_name, decision.action.parameters
                ));
            }

            // 指代上下文在格式化之前更新
            if let Some(product) = output.single_product() {
                tracing::debug!(product = %product.id, "reference context updated");
                self.reference = Some(ProductRef::from(product));
            }

            let rendered = render_output(&output);
            self.send_event(ReactEvent::Observation {
                tool: decision.action.operation_name.to_string(),
                preview: rendered.chars().take(OBSERVATION_PREVIEW_CHARS).collect(),
            });
            outputs.push(rendered);
            self.transcript.push(TranscriptEntry::ToolCall {
                operation: decision.action.operation_name.to_string(),
                parameters: decision.action.parameters.clone(),
                result: serde_json::to_string(&output)
                    .unwrap_or_else(|e| format!("<unserializable result: {}>", e)),
            });

            // 操作本身就是最后一步：不再请决策服务复核结果
            if let Some(message) = decision.final_message() {
                return TurnResponse::answer(message, outputs);
            }
        }

        tracing::warn!(max = self.max_iterations, "iteration limit reached");
        TurnResponse::clarification(outputs)
    }

    async fn dispatch(&self, decision: &Decision) -> Result<OperationOutput, AgentError> {
        let name = decision.action.operation_name;
        let operation = Operation::decode(name, &decision.action.parameters)?;
        self.send_event(ReactEvent::ToolCall {
            tool: name.to_string(),
            parameters: decision.action.parameters.clone(),
        });
        tracing::info!(operation = %name, "dispatch");
        self.executor.execute(operation).await.map_err(|e| {
            self.send_event(ReactEvent::ToolFailure {
                tool: name.to_string(),
                reason: e.to_string(),
            });
            e
        })
    }

    fn abort(&self, err: AgentError, outputs: Vec<String>) -> TurnResponse {
        tracing::warn!(error = %err, "turn aborted");
        self.send_event(ReactEvent::Error {
            text: err.to_string(),
        });
        TurnResponse::error(&err, outputs)
    }

    async fn quick_command(&mut self, cmd: QuickCommand) -> TurnResponse {
        let result = match cmd {
            QuickCommand::Help => return TurnResponse::info(HELP_TEXT),
            QuickCommand::ResetHistory => {
                self.reset_history();
                return TurnResponse::info("Conversation history cleared.");
            }
            QuickCommand::ViewCart => self.executor.execute(Operation::ViewCart).await,
            QuickCommand::ViewWishlist => self.executor.execute(Operation::ViewWishlist).await,
            QuickCommand::ViewOrders => self.executor.execute(Operation::ViewOrders).await,
            QuickCommand::ClearCart => self
                .executor
                .execute(Operation::ClearCart)
                .await
                .map(|_| OperationOutput::Nothing),
        };
        match result {
            Ok(OperationOutput::Cart(cart)) => TurnResponse::info(render_cart(&cart)),
            Ok(OperationOutput::Wishlist(list)) => TurnResponse::info(render_wishlist(&list)),
            Ok(OperationOutput::Orders(orders)) => TurnResponse::info(render_orders(&orders)),
            Ok(OperationOutput::Nothing) => TurnResponse::info("Your cart has been cleared."),
            Ok(other) => TurnResponse::info(render_output(&other)),
            Err(e) => TurnResponse::error(&e, Vec::new()),
        }
    }

    fn send_event(&self, ev: ReactEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(ev);
        }
    }
}
