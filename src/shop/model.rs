//! 商品、评价、购物车、订单等数据结构
//!
//! 均可序列化为 JSON：工具结果写入对话记录时使用 serde_json 序列化。

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 商品（只读目录中的一项）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: Decimal,
    /// 平均评分 0.0 ~ 5.0
    pub rating: f32,
    #[serde(default)]
    pub stock: u32,
}

/// 单条用户评价
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub rating: u8,
    pub comment: String,
}

/// 购物车中的一行
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// 购物车快照（view / add / remove / clear 的返回值）
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}

impl CartSummary {
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_total).sum();
        Self { lines, total }
    }

    /// 商品件数合计（非行数）
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 已下单记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl Order {
    pub fn new(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(CartLine::line_total).sum();
        Self {
            id: Uuid::new_v4(),
            lines,
            total,
            placed_at: Utc::now(),
        }
    }
}

/// 搜索排序方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    Rating,
    Name,
}

/// 搜索过滤条件
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilters {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<f32>,
    pub sort_by: Option<SortKey>,
}
