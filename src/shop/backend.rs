//! 后端操作集合（Backend Operation Set）
//!
//! 每个具名操作一个方法：要么返回类型化结果，要么返回 ShopError。
//! 会话状态（购物车 / 心愿单 / 订单）只通过这些方法读写，编排循环不直接接触。

use async_trait::async_trait;

use crate::shop::{CartSummary, Order, Product, Review, SearchFilters, ShopError};

#[async_trait]
pub trait ShopBackend: Send + Sync {
    async fn search(&self, query: &str, filters: SearchFilters) -> Result<Vec<Product>, ShopError>;

    async fn product_details(&self, product_id: &str) -> Result<Product, ShopError>;

    async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>, ShopError>;

    async fn compare(&self, product_ids: &[String]) -> Result<Vec<Product>, ShopError>;

    async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<CartSummary, ShopError>;

    async fn remove_from_cart(&self, product_id: &str) -> Result<CartSummary, ShopError>;

    async fn view_cart(&self) -> Result<CartSummary, ShopError>;

    async fn clear_cart(&self) -> Result<CartSummary, ShopError>;

    async fn add_to_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError>;

    async fn remove_from_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError>;

    async fn view_wishlist(&self) -> Result<Vec<Product>, ShopError>;

    /// 直接购买单个商品，不经过购物车
    async fn purchase(&self, product_id: &str, quantity: u32) -> Result<Order, ShopError>;

    /// 将购物车结算为订单并清空购物车
    async fn checkout(&self) -> Result<Order, ShopError>;

    async fn view_orders(&self) -> Result<Vec<Order>, ShopError>;

    async fn recommendations(&self, product_id: &str, limit: usize) -> Result<Vec<Product>, ShopError>;
}
