//! 电商后端：只读目录、会话状态（购物车 / 心愿单 / 订单）与具名操作

pub mod backend;
pub mod catalog;
pub mod error;
pub mod model;
pub mod session;

pub use backend::ShopBackend;
pub use catalog::Catalog;
pub use error::ShopError;
pub use model::{CartLine, CartSummary, Order, Product, Review, SearchFilters, SortKey};
pub use session::{InMemoryShop, ShopSession};
