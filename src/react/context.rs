//! 商品指代上下文（单槽）与请求增强
//!
//! 写入时机只有两个：详情查询，或恰好命中一个商品的搜索（见 loop_.rs）。
//! 这里只读：请求含指代短语（it / this / buy now …）且没有显式商品 ID 时，追加机器可读的标注。
//! 显式 ID 按当前目录的商品 ID 集合识别；集合为空时退回内置目录的 `P` + 数字格式。

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::shop::{Catalog, Product};

static REFERENTIAL_RE: OnceLock<Regex> = OnceLock::new();
static PRODUCT_ID_RE: OnceLock<Regex> = OnceLock::new();

/// 最近一次唯一确定的商品
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProductRef {
    pub id: String,
    pub title: String,
}

impl From<&Product> for ProductRef {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
        }
    }
}

pub fn has_referential_phrase(request: &str) -> bool {
    let re = REFERENTIAL_RE.get_or_init(|| {
        Regex::new(r"\b(this|it|that|buy now|buy it|add to cart|purchase|the product)\b")
            .expect("static regex")
    });
    re.is_match(&request.to_lowercase())
}

/// 目录中的商品 ID 集合（大写，不区分大小写匹配）
#[derive(Clone, Debug, Default)]
pub struct ProductIds(HashSet<String>);

impl ProductIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(ids.into_iter().map(|id| id.as_ref().trim().to_uppercase()).collect())
    }

    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::new(catalog.products().iter().map(|p| p.id.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 请求中是否有完整单词等于某个已知 ID
    pub fn mentioned_in(&self, request: &str) -> bool {
        request
            .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
            .filter(|w| !w.is_empty())
            .any(|w| self.0.contains(&w.to_uppercase()))
    }
}

/// 请求中是否已经写明了商品 ID
pub fn has_explicit_product_id(request: &str, known: &ProductIds) -> bool {
    if !known.is_empty() {
        return known.mentioned_in(request);
    }
    let re = PRODUCT_ID_RE.get_or_init(|| Regex::new(r"\b[pP]\d{3,}\b").expect("static regex"));
    re.is_match(request)
}

/// 返回写入对话记录的文本：满足条件时追加 `[context: product_id=..., title="..."]`
pub fn enrich_request(request: &str, reference: Option<&ProductRef>, known: &ProductIds) -> String {
    match reference {
        Some(r) if has_referential_phrase(request) && !has_explicit_product_id(request, known) => {
            format!(
                "{} [context: product_id={}, title=\"{}\"]",
                request, r.id, r.title
            )
        }
        _ => request.to_string(),
    }
}
