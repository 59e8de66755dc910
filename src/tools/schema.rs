//! 操作目录 JSON（schemars 自动生成参数 Schema）
//!
//! 拼入 system prompt，让决策服务知道每个操作名及其参数格式，减少参数错误。

use crate::tools::OperationName;

/// 返回 `[{"name", "description", "parameters"}]`，覆盖全部已知操作
pub fn operations_schema_json() -> String {
    let ops: Vec<serde_json::Value> = OperationName::ALL
        .iter()
        .map(|op| {
            serde_json::json!({
                "name": op.as_str(),
                "description": op.description(),
                "parameters": op.parameters_schema(),
            })
        })
        .collect();
    serde_json::to_string_pretty(&ops).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_every_operation() {
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&operations_schema_json()).unwrap();
        assert_eq!(parsed.len(), OperationName::ALL.len());
        let search = parsed
            .iter()
            .find(|v| v["name"] == "search_products")
            .unwrap();
        assert!(search["parameters"]["properties"]["max_price"].is_object());
        assert!(search["parameters"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f == "query"));
    }
}
