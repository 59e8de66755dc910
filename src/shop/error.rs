//! 后端操作拒绝输入时的错误（原样透传给用户）

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid quantity: {0} (must be at least 1)")]
    InvalidQuantity(u32),

    #[error("Only {available} of {product_id} in stock (requested {requested})")]
    OutOfStock {
        product_id: String,
        requested: u32,
        available: u32,
    },

    #[error("Product {0} is not in your cart")]
    NotInCart(String),

    #[error("Product {0} is not in your wishlist")]
    NotInWishlist(String),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Comparison needs at least two products (got {0})")]
    NotEnoughToCompare(usize),
}
