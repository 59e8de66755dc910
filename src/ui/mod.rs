//! 展示层：操作结果的纯文本渲染

pub mod render;

pub use render::{render_cart, render_orders, render_output, render_wishlist};
