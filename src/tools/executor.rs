//! 工具执行器（操作分发）
//!
//! 持有后端句柄与全局超时，execute(operation) 对每个变体恰好调用一次对应的后端方法；
//! 后端拒绝转为 OperationFailure（消息原样保留），超时转为 OperationTimeout；每次调用输出结构化审计日志（JSON）。
//! 本层不做业务逻辑，只负责路由。

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::AgentError;
use crate::shop::{ShopBackend, ShopError};
use crate::tools::{Operation, OperationOutput};

/// 工具执行器：对每次调用施加超时，并将结果映射为 AgentError
pub struct ToolExecutor {
    backend: Arc<dyn ShopBackend>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(backend: Arc<dyn ShopBackend>, timeout_secs: u64) -> Self {
        Self {
            backend,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn backend(&self) -> &Arc<dyn ShopBackend> {
        &self.backend
    }

    /// 执行已解码的操作；输出 JSON 审计日志
    pub async fn execute(&self, operation: Operation) -> Result<OperationOutput, AgentError> {
        let start = Instant::now();
        let tool = operation.name();
        let args_preview = args_preview(&operation);
        let result = timeout(self.timeout, route(self.backend.as_ref(), operation)).await;

        let (ok, outcome): (bool, &str) = match &result {
            Ok(Ok(_)) => (true, "ok"),
            Ok(Err(_)) => (false, "error"),
            Err(_) => (false, "timeout"),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool.as_str(),
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(AgentError::OperationFailure(e.to_string())),
            Err(_) => Err(AgentError::OperationTimeout(tool.to_string())),
        }
    }
}

/// 名称 -> 处理函数的穷尽映射
async fn route(backend: &dyn ShopBackend, operation: Operation) -> Result<OperationOutput, ShopError> {
    let output = match operation {
        Operation::SearchProducts(p) => {
            OperationOutput::SearchResults(backend.search(&p.query, p.filters()).await?)
        }
        Operation::GetProductDetails(p) => {
            OperationOutput::ProductDetails(backend.product_details(&p.product_id).await?)
        }
        Operation::GetProductReviews(p) => {
            let reviews = backend.product_reviews(&p.product_id).await?;
            OperationOutput::Reviews {
                product_id: p.product_id,
                reviews,
            }
        }
        Operation::CompareProducts(p) => {
            OperationOutput::Comparison(backend.compare(&p.product_ids).await?)
        }
        Operation::AddToCart(p) => {
            OperationOutput::Cart(backend.add_to_cart(&p.product_id, p.quantity).await?)
        }
        Operation::RemoveFromCart(p) => {
            OperationOutput::Cart(backend.remove_from_cart(&p.product_id).await?)
        }
        Operation::ViewCart => OperationOutput::Cart(backend.view_cart().await?),
        Operation::ClearCart => OperationOutput::Cart(backend.clear_cart().await?),
        Operation::AddToWishlist(p) => {
            OperationOutput::Wishlist(backend.add_to_wishlist(&p.product_id).await?)
        }
        Operation::RemoveFromWishlist(p) => {
            OperationOutput::Wishlist(backend.remove_from_wishlist(&p.product_id).await?)
        }
        Operation::ViewWishlist => OperationOutput::Wishlist(backend.view_wishlist().await?),
        Operation::PurchaseProduct(p) => {
            OperationOutput::OrderPlaced(backend.purchase(&p.product_id, p.quantity).await?)
        }
        Operation::Checkout => OperationOutput::OrderPlaced(backend.checkout().await?),
        Operation::ViewOrders => OperationOutput::Orders(backend.view_orders().await?),
        Operation::GetRecommendations(p) => {
            let products = backend.recommendations(&p.product_id, p.limit).await?;
            OperationOutput::Recommendations {
                product_id: p.product_id,
                products,
            }
        }
        Operation::None => OperationOutput::Nothing,
    };
    Ok(output)
}

fn args_preview(operation: &Operation) -> String {
    let s = format!("{:?}", operation);
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
