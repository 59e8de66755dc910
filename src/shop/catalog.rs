//! 只读商品目录：内置种子数据，或从 JSON 文件加载
//!
//! JSON 格式：`{"products": [...], "reviews": {"P001": [...]}}`。

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::shop::{Product, Review, SearchFilters, SortKey};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
    #[serde(default)]
    reviews: HashMap<String, Vec<Review>>,
}

impl Catalog {
    /// 从 JSON 文件加载目录
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("read {}: {}", path.display(), e))?;
        serde_json::from_str(&raw).map_err(|e| format!("parse {}: {}", path.display(), e))
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id.trim()))
    }

    pub fn reviews(&self, id: &str) -> &[Review] {
        self.reviews.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 关键词匹配 title / description / category（不区分大小写），再按过滤条件与排序输出
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<Product> {
        let needle = query.trim().to_lowercase();
        let mut hits: Vec<Product> = self
            .products
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .filter(|p| filters.min_price.map_or(true, |min| p.price >= min))
            .filter(|p| filters.max_price.map_or(true, |max| p.price <= max))
            .filter(|p| filters.min_rating.map_or(true, |min| p.rating >= min))
            .cloned()
            .collect();

        match filters.sort_by {
            Some(SortKey::PriceAsc) => hits.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(SortKey::PriceDesc) => hits.sort_by(|a, b| b.price.cmp(&a.price)),
            Some(SortKey::Rating) => hits.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            Some(SortKey::Name) => hits.sort_by(|a, b| a.title.cmp(&b.title)),
            None => {}
        }
        hits
    }

    /// 同类目、排除自身、按评分降序
    pub fn related(&self, product: &Product, limit: usize) -> Vec<Product> {
        let mut related: Vec<Product> = self
            .products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .cloned()
            .collect();
        related.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        related.truncate(limit);
        related
    }

    /// 内置演示目录
    pub fn seed() -> Self {
        let products = vec![
            product("P001", "USB-C Charging Cable (1m)", "Fast-charge cable, 60W", "Cables", 999, 4.5, 50),
            product("P002", "USB-A to Micro-USB Cable", "Sync and charge for older devices", "Cables", 649, 4.1, 80),
            product("P003", "Braided USB-C Cable (2m)", "Nylon braided, 100W power delivery", "Cables", 1299, 4.7, 35),
            product("P004", "Thunderbolt 4 Cable", "40Gbps, 0.8m", "Cables", 3999, 4.8, 12),
            product("P005", "Wireless Noise-Cancelling Headphones", "Over-ear, 30h battery", "Audio", 19999, 4.6, 15),
            product("P006", "Wired Studio Headphones", "Closed-back monitoring headphones", "Audio", 7900, 4.3, 20),
            product("P007", "Bluetooth Speaker Mini", "Pocket-sized, water resistant", "Audio", 3450, 4.2, 40),
            product("P008", "Mechanical Keyboard", "Hot-swappable switches, RGB", "Peripherals", 8999, 4.7, 25),
            product("P009", "Wireless Mouse", "Silent clicks, 2.4GHz receiver", "Peripherals", 2499, 4.4, 60),
            product("P010", "27-inch 4K Monitor", "IPS panel, HDMI and DisplayPort", "Displays", 32900, 4.5, 8),
            product("P011", "Aluminium Laptop Stand", "Adjustable height, foldable", "Accessories", 4500, 4.6, 30),
            product("P012", "USB Hub 4-Port", "Bus powered, compact", "Accessories", 1999, 4.0, 45),
            product("P013", "Smartwatch Fitness Tracker", "Heart rate, GPS, sleep tracking", "Wearables", 14900, 4.1, 0),
        ];

        let mut reviews = HashMap::new();
        reviews.insert(
            "P001".to_string(),
            vec![
                review("alice", 5, "Charges my laptop without issues."),
                review("bob", 4, "Solid, a bit stiff."),
            ],
        );
        reviews.insert(
            "P005".to_string(),
            vec![
                review("carol", 5, "Great noise cancelling on flights."),
                review("dave", 4, "Comfortable, case is bulky."),
            ],
        );
        reviews.insert(
            "P008".to_string(),
            vec![review("erin", 5, "Typing feels fantastic.")],
        );

        Self { products, reviews }
    }
}

fn product(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    price_cents: i64,
    rating: f32,
    stock: u32,
) -> Product {
    Product {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price: Decimal::new(price_cents, 2),
        rating,
        stock,
    }
}

fn review(author: &str, rating: u8, comment: &str) -> Review {
    Review {
        author: author.to_string(),
        rating,
        comment: comment.to_string(),
    }
}
