//! 文本渲染
//!
//! 把操作结果（商品列表、购物车、订单、评价、对比）渲染为终端可读的纯文本。
//! 编排循环把每次成功操作的渲染结果累积到本轮回复中。

use rust_decimal::Decimal;

use crate::shop::{CartSummary, Order, Product, Review};
use crate::tools::OperationOutput;

/// 描述过长时截断
const MAX_DESCRIPTION_CHARS: usize = 80;

fn money(amount: Decimal) -> String {
    format!("${:.2}", amount)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}...", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

fn product_line(p: &Product) -> String {
    let stock = if p.stock == 0 { " (out of stock)" } else { "" };
    format!(
        "  [{}] {} - {} - {:.1}★{}",
        p.id,
        p.title,
        money(p.price),
        p.rating,
        stock
    )
}

fn product_list(header: &str, products: &[Product], empty: &str) -> String {
    if products.is_empty() {
        return empty.to_string();
    }
    let mut out = vec![format!("{} ({}):", header, products.len())];
    out.extend(products.iter().map(product_line));
    out.join("\n")
}

fn product_details(p: &Product) -> String {
    let mut out = vec![
        format!("{} [{}]", p.title, p.id),
        format!("  Price: {}", money(p.price)),
        format!("  Rating: {:.1}/5", p.rating),
        format!("  Category: {}", p.category),
        format!("  In stock: {}", p.stock),
    ];
    if !p.description.is_empty() {
        out.push(format!("  {}", truncate(&p.description, MAX_DESCRIPTION_CHARS)));
    }
    out.join("\n")
}

fn reviews(product_id: &str, reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return format!("No reviews yet for {}.", product_id);
    }
    let mut out = vec![format!("Reviews for {} ({}):", product_id, reviews.len())];
    out.extend(
        reviews
            .iter()
            .map(|r| format!("  {}/5 by {}: {}", r.rating, r.author, r.comment)),
    );
    out.join("\n")
}

fn comparison(products: &[Product]) -> String {
    let mut out = vec!["Comparison:".to_string()];
    out.extend(products.iter().map(|p| {
        format!(
            "  [{}] {} | {} | {:.1}★ | {}",
            p.id,
            p.title,
            money(p.price),
            p.rating,
            p.category
        )
    }));
    if let Some(cheapest) = products.iter().min_by(|a, b| a.price.cmp(&b.price)) {
        out.push(format!("  Lowest price: {}", cheapest.title));
    }
    if let Some(best) = products.iter().max_by(|a, b| a.rating.total_cmp(&b.rating)) {
        out.push(format!("  Highest rated: {}", best.title));
    }
    out.join("\n")
}

pub fn render_cart(cart: &CartSummary) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = vec![format!("Cart ({} items):", cart.item_count())];
    out.extend(cart.lines.iter().map(|l| {
        format!(
            "  [{}] {} x{} - {}",
            l.product_id,
            l.title,
            l.quantity,
            money(l.line_total())
        )
    }));
    out.push(format!("  Total: {}", money(cart.total)));
    out.join("\n")
}

fn order(o: &Order) -> String {
    let mut out = vec![format!(
        "Order {} placed {} - total {}",
        o.id,
        o.placed_at.format("%Y-%m-%d %H:%M"),
        money(o.total)
    )];
    out.extend(
        o.lines
            .iter()
            .map(|l| format!("  {} x{}", l.title, l.quantity)),
    );
    out.join("\n")
}

pub fn render_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "You have no orders yet.".to_string();
    }
    orders.iter().map(order).collect::<Vec<_>>().join("\n")
}

pub fn render_wishlist(products: &[Product]) -> String {
    product_list("Wishlist", products, "Your wishlist is empty.")
}

/// 单个操作结果 -> 文本
pub fn render_output(output: &OperationOutput) -> String {
    match output {
        OperationOutput::SearchResults(hits) => {
            product_list("Search results", hits, "No products matched your search.")
        }
        OperationOutput::ProductDetails(p) => product_details(p),
        OperationOutput::Reviews {
            product_id,
            reviews: list,
        } => reviews(product_id, list),
        OperationOutput::Comparison(products) => comparison(products),
        OperationOutput::Cart(cart) => render_cart(cart),
        OperationOutput::Wishlist(products) => render_wishlist(products),
        OperationOutput::OrderPlaced(o) => format!("Order placed!\n{}", order(o)),
        OperationOutput::Orders(orders) => render_orders(orders),
        OperationOutput::Recommendations {
            product_id,
            products,
        } => product_list(
            &format!("Recommended with {}", product_id),
            products,
            "No recommendations found.",
        ),
        OperationOutput::Nothing => String::new(),
    }
}
