//! Agent 组装
//!
//! create_llm_from_config 按配置与环境变量选择 LLM 后端；
//! create_shop_agent 组装 Planner（决策服务）、目录与会话、ToolExecutor 与编排循环。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::llm::{create_deepseek_client, LlmClient, MockLlmClient, OpenAiClient};
use crate::react::{Planner, ProductIds, ShopAgent, DEFAULT_SYSTEM_PROMPT};
use crate::shop::{Catalog, InMemoryShop, ShopBackend};
use crate::tools::ToolExecutor;

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容 / Mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    let has_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok();
    let has_openai = std::env::var("OPENAI_API_KEY").is_ok();

    if provider == "mock" {
        tracing::info!("Using Mock LLM (configured)");
        Arc::new(MockLlmClient)
    } else if has_deepseek && (provider == "deepseek" || !has_openai) {
        tracing::info!("Using DeepSeek LLM ({})", cfg.llm.model);
        let model = if cfg.llm.model.starts_with("deepseek") {
            Some(cfg.llm.model.as_str())
        } else {
            None
        };
        Arc::new(create_deepseek_client(model))
    } else if has_openai {
        tracing::info!("Using OpenAI LLM ({})", cfg.llm.model);
        Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &cfg.llm.model,
            None,
        ))
    } else {
        tracing::warn!("No API key set, using Mock LLM");
        Arc::new(MockLlmClient)
    }
}

/// 加载目录：配置了 [catalog].path 则读取 JSON，否则用内置演示目录
pub fn load_catalog(cfg: &AppConfig) -> Result<Catalog, AgentError> {
    match &cfg.catalog.path {
        Some(path) => {
            let catalog = Catalog::from_json_file(path).map_err(AgentError::ConfigError)?;
            tracing::info!(products = catalog.products().len(), path = %path.display(), "catalog loaded");
            Ok(catalog)
        }
        None => Ok(Catalog::seed()),
    }
}

fn load_system_prompt(cfg: &AppConfig) -> String {
    let configured = cfg.app.system_prompt_path.iter().cloned();
    let defaults = ["config/prompts/system.txt", "../config/prompts/system.txt"]
        .into_iter()
        .map(std::path::PathBuf::from);
    configured
        .chain(defaults)
        .find_map(|p| std::fs::read_to_string(p).ok())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string())
}

/// 用给定的 LLM 与后端组装 Agent
pub fn build_agent(cfg: &AppConfig, llm: Arc<dyn LlmClient>, backend: Arc<dyn ShopBackend>) -> ShopAgent {
    let planner = Planner::new(llm, &load_system_prompt(cfg), cfg.llm.timeouts.request);
    let executor = ToolExecutor::new(backend, cfg.tools.tool_timeout_secs);
    ShopAgent::new(Arc::new(planner), executor, cfg.app.loop_settings())
}

/// 从配置组装完整 Agent（LLM 按环境变量选择，后端为内存会话）
pub fn create_shop_agent(cfg: &AppConfig) -> Result<ShopAgent, AgentError> {
    let catalog = load_catalog(cfg)?;
    let ids = ProductIds::from_catalog(&catalog);
    let backend: Arc<dyn ShopBackend> = Arc::new(InMemoryShop::new(catalog));
    Ok(build_agent(cfg, create_llm_from_config(cfg), backend).with_product_ids(ids))
}
