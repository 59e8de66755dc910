//! 会话状态与内存后端
//!
//! ShopSession 是显式的会话对象（购物车 / 心愿单 / 订单历史），由 InMemoryShop 持有；
//! 每次操作只在方法内部持锁，编排循环拿到的是 `Arc<dyn ShopBackend>` 句柄而非全局变量。
//! 目录中的 stock 是初始库存；下单（purchase / checkout）后按会话内已售数量扣减。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::shop::{
    CartLine, CartSummary, Catalog, Order, Product, Review, SearchFilters, ShopBackend, ShopError,
};

/// 单会话可变状态
#[derive(Clone, Debug, Default)]
pub struct ShopSession {
    pub cart: Vec<CartLine>,
    /// 心愿单只存商品 ID，读取时再到目录中解析
    pub wishlist: Vec<String>,
    pub orders: Vec<Order>,
    /// 已下单数量（按商品 ID）
    pub sold: HashMap<String, u32>,
}

impl ShopSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn cart_summary(&self) -> CartSummary {
        CartSummary::from_lines(self.cart.clone())
    }

    /// 扣除已售后的可用库存
    pub fn available(&self, product: &Product) -> u32 {
        product
            .stock
            .saturating_sub(self.sold.get(&product.id).copied().unwrap_or(0))
    }

    fn record_sale(&mut self, lines: &[CartLine]) {
        for line in lines {
            *self.sold.entry(line.product_id.clone()).or_insert(0) += line.quantity;
        }
    }

    fn wishlist_products(&self, catalog: &Catalog) -> Vec<Product> {
        self.wishlist
            .iter()
            .filter_map(|id| catalog.get(id).cloned())
            .collect()
    }
}

/// 内存后端：只读目录 + 互斥保护的会话
pub struct InMemoryShop {
    catalog: Catalog,
    session: Mutex<ShopSession>,
}

impl InMemoryShop {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_session(catalog, ShopSession::new())
    }

    pub fn with_session(catalog: Catalog, session: ShopSession) -> Self {
        Self {
            catalog,
            session: Mutex::new(session),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 会话快照（测试与调试用）
    pub async fn snapshot(&self) -> ShopSession {
        self.session.lock().await.clone()
    }

    fn find(&self, product_id: &str) -> Result<&Product, ShopError> {
        self.catalog
            .get(product_id)
            .ok_or_else(|| ShopError::ProductNotFound(product_id.trim().to_string()))
    }

    fn check_quantity(session: &ShopSession, product: &Product, requested: u32) -> Result<(), ShopError> {
        if requested == 0 {
            return Err(ShopError::InvalidQuantity(requested));
        }
        let available = session.available(product);
        if requested > available {
            return Err(ShopError::OutOfStock {
                product_id: product.id.clone(),
                requested,
                available,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ShopBackend for InMemoryShop {
    async fn search(&self, query: &str, filters: SearchFilters) -> Result<Vec<Product>, ShopError> {
        Ok(self.catalog.search(query, &filters))
    }

    async fn product_details(&self, product_id: &str) -> Result<Product, ShopError> {
        self.find(product_id).cloned()
    }

    async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>, ShopError> {
        let product = self.find(product_id)?;
        Ok(self.catalog.reviews(&product.id).to_vec())
    }

    async fn compare(&self, product_ids: &[String]) -> Result<Vec<Product>, ShopError> {
        if product_ids.len() < 2 {
            return Err(ShopError::NotEnoughToCompare(product_ids.len()));
        }
        product_ids
            .iter()
            .map(|id| self.find(id).cloned())
            .collect()
    }

    async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<CartSummary, ShopError> {
        let product = self.find(product_id)?;
        let mut session = self.session.lock().await;
        let already = session
            .cart
            .iter()
            .find(|l| l.product_id == product.id)
            .map_or(0, |l| l.quantity);
        if quantity == 0 {
            return Err(ShopError::InvalidQuantity(quantity));
        }
        Self::check_quantity(&session, product, already.saturating_add(quantity))?;

        match session.cart.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => line.quantity += quantity,
            None => session.cart.push(CartLine {
                product_id: product.id.clone(),
                title: product.title.clone(),
                unit_price: product.price,
                quantity,
            }),
        }
        tracing::debug!(product = %product.id, quantity, "cart add");
        Ok(session.cart_summary())
    }

    async fn remove_from_cart(&self, product_id: &str) -> Result<CartSummary, ShopError> {
        let mut session = self.session.lock().await;
        let before = session.cart.len();
        session
            .cart
            .retain(|l| !l.product_id.eq_ignore_ascii_case(product_id.trim()));
        if session.cart.len() == before {
            return Err(ShopError::NotInCart(product_id.trim().to_string()));
        }
        Ok(session.cart_summary())
    }

    async fn view_cart(&self) -> Result<CartSummary, ShopError> {
        Ok(self.session.lock().await.cart_summary())
    }

    async fn clear_cart(&self) -> Result<CartSummary, ShopError> {
        let mut session = self.session.lock().await;
        session.cart.clear();
        Ok(session.cart_summary())
    }

    async fn add_to_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError> {
        let product = self.find(product_id)?;
        let mut session = self.session.lock().await;
        if !session.wishlist.contains(&product.id) {
            session.wishlist.push(product.id.clone());
        }
        Ok(session.wishlist_products(&self.catalog))
    }

    async fn remove_from_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError> {
        let mut session = self.session.lock().await;
        let before = session.wishlist.len();
        session
            .wishlist
            .retain(|id| !id.eq_ignore_ascii_case(product_id.trim()));
        if session.wishlist.len() == before {
            return Err(ShopError::NotInWishlist(product_id.trim().to_string()));
        }
        Ok(session.wishlist_products(&self.catalog))
    }

    async fn view_wishlist(&self) -> Result<Vec<Product>, ShopError> {
        Ok(self.session.lock().await.wishlist_products(&self.catalog))
    }

    async fn purchase(&self, product_id: &str, quantity: u32) -> Result<Order, ShopError> {
        let product = self.find(product_id)?;
        let mut session = self.session.lock().await;
        Self::check_quantity(&session, product, quantity)?;
        let order = Order::new(vec![CartLine {
            product_id: product.id.clone(),
            title: product.title.clone(),
            unit_price: product.price,
            quantity,
        }]);
        session.record_sale(&order.lines);
        session.orders.push(order.clone());
        tracing::info!(order = %order.id, total = %order.total, "direct purchase");
        Ok(order)
    }

    async fn checkout(&self) -> Result<Order, ShopError> {
        let mut session = self.session.lock().await;
        if session.cart.is_empty() {
            return Err(ShopError::EmptyCart);
        }
        // 库存可能在加入购物车之后被直接购买消耗
        for line in &session.cart {
            let product = self.find(&line.product_id)?;
            Self::check_quantity(&session, product, line.quantity)?;
        }
        let lines = std::mem::take(&mut session.cart);
        session.record_sale(&lines);
        let order = Order::new(lines);
        session.orders.push(order.clone());
        tracing::info!(order = %order.id, total = %order.total, "checkout");
        Ok(order)
    }

    async fn view_orders(&self) -> Result<Vec<Order>, ShopError> {
        Ok(self.session.lock().await.orders.clone())
    }

    async fn recommendations(&self, product_id: &str, limit: usize) -> Result<Vec<Product>, ShopError> {
        let product = self.find(product_id)?;
        Ok(self.catalog.related(product, limit))
    }
}
