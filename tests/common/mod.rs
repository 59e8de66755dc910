//! 集成测试公共工具：脚本化决策输出与 Agent 组装

#![allow(dead_code)]

use std::sync::Arc;

use shop_agent::llm::ScriptedLlmClient;
use shop_agent::react::{LoopSettings, Planner, ProductIds, ShopAgent, DEFAULT_SYSTEM_PROMPT};
use shop_agent::shop::{Catalog, InMemoryShop};
use shop_agent::tools::ToolExecutor;

/// 构造一条决策 JSON
pub fn decision(op: &str, params: &str, should_continue: bool, final_response: Option<&str>) -> Result<String, String> {
    Ok(serde_json::json!({
        "reasoning": format!("reasoning for {}", op),
        "action": {
            "operation_name": op,
            "reasoning": "",
            "parameters": params,
        },
        "should_continue": should_continue,
        "final_response": final_response,
    })
    .to_string())
}

/// 直接给出最终回复的决策
pub fn reply(text: &str) -> Result<String, String> {
    decision("none", "{}", false, Some(text))
}

pub struct Harness {
    pub agent: ShopAgent,
    pub llm: Arc<ScriptedLlmClient>,
    pub shop: Arc<InMemoryShop>,
}

pub fn harness(llm: ScriptedLlmClient) -> Harness {
    harness_with(llm, LoopSettings::default())
}

pub fn harness_with(llm: ScriptedLlmClient, settings: LoopSettings) -> Harness {
    let llm = Arc::new(llm);
    let shop = Arc::new(InMemoryShop::new(Catalog::seed()));
    let planner = Planner::new(llm.clone(), DEFAULT_SYSTEM_PROMPT, 5);
    let agent = ShopAgent::new(
        Arc::new(planner),
        ToolExecutor::new(shop.clone(), 5),
        settings,
    )
    .with_product_ids(ProductIds::from_catalog(shop.catalog()));
    Harness { agent, llm, shop }
}

/// 第 n 次调用时发给 LLM 的 user 消息内容
pub fn user_prompt(llm: &ScriptedLlmClient, call: usize) -> String {
    llm.calls()[call]
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default()
}
