//! 具名操作：名称枚举、各操作的强类型参数，以及一次性解码
//!
//! 决策服务给出的 `(operation_name, parameters 文本)` 在这里被解码为 `Operation` 标签联合，
//! 每个变体携带自己的参数结构；可选参数的默认值（quantity = 1、limit = 3）也在此补齐。

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::shop::{CartSummary, Order, Product, Review, SearchFilters, SortKey};

/// 已知操作名（`none` 为无操作哨兵）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationName {
    SearchProducts,
    GetProductDetails,
    GetProductReviews,
    CompareProducts,
    AddToCart,
    RemoveFromCart,
    ViewCart,
    ClearCart,
    AddToWishlist,
    RemoveFromWishlist,
    ViewWishlist,
    PurchaseProduct,
    Checkout,
    ViewOrders,
    GetRecommendations,
    None,
}

impl OperationName {
    pub const ALL: [OperationName; 16] = [
        OperationName::SearchProducts,
        OperationName::GetProductDetails,
        OperationName::GetProductReviews,
        OperationName::CompareProducts,
        OperationName::AddToCart,
        OperationName::RemoveFromCart,
        OperationName::ViewCart,
        OperationName::ClearCart,
        OperationName::AddToWishlist,
        OperationName::RemoveFromWishlist,
        OperationName::ViewWishlist,
        OperationName::PurchaseProduct,
        OperationName::Checkout,
        OperationName::ViewOrders,
        OperationName::GetRecommendations,
        OperationName::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationName::SearchProducts => "search_products",
            OperationName::GetProductDetails => "get_product_details",
            OperationName::GetProductReviews => "get_product_reviews",
            OperationName::CompareProducts => "compare_products",
            OperationName::AddToCart => "add_to_cart",
            OperationName::RemoveFromCart => "remove_from_cart",
            OperationName::ViewCart => "view_cart",
            OperationName::ClearCart => "clear_cart",
            OperationName::AddToWishlist => "add_to_wishlist",
            OperationName::RemoveFromWishlist => "remove_from_wishlist",
            OperationName::ViewWishlist => "view_wishlist",
            OperationName::PurchaseProduct => "purchase_product",
            OperationName::Checkout => "checkout",
            OperationName::ViewOrders => "view_orders",
            OperationName::GetRecommendations => "get_recommendations",
            OperationName::None => "none",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    pub fn is_no_op(&self) -> bool {
        matches!(self, OperationName::None)
    }

    /// 是否修改会话状态（购物车 / 心愿单 / 订单）
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            OperationName::AddToCart
                | OperationName::RemoveFromCart
                | OperationName::ClearCart
                | OperationName::AddToWishlist
                | OperationName::RemoveFromWishlist
                | OperationName::PurchaseProduct
                | OperationName::Checkout
        )
    }

    /// 操作说明（拼入 system prompt）
    pub fn description(&self) -> &'static str {
        match self {
            OperationName::SearchProducts => "Search the catalog by keyword with optional price/rating filters and sorting",
            OperationName::GetProductDetails => "Show full details of one product",
            OperationName::GetProductReviews => "List customer reviews of one product",
            OperationName::CompareProducts => "Compare two or more products side by side",
            OperationName::AddToCart => "Add a product to the cart (quantity defaults to 1)",
            OperationName::RemoveFromCart => "Remove a product from the cart",
            OperationName::ViewCart => "Show the cart contents and total",
            OperationName::ClearCart => "Remove everything from the cart",
            OperationName::AddToWishlist => "Save a product to the wishlist",
            OperationName::RemoveFromWishlist => "Remove a product from the wishlist",
            OperationName::ViewWishlist => "Show the wishlist",
            OperationName::PurchaseProduct => "Buy one product immediately without using the cart (quantity defaults to 1)",
            OperationName::Checkout => "Place an order for everything in the cart",
            OperationName::ViewOrders => "Show the order history",
            OperationName::GetRecommendations => "Suggest similar products (limit defaults to 3)",
            OperationName::None => "No operation; use when answering directly",
        }
    }

    /// 该操作参数的 JSON Schema
    pub fn parameters_schema(&self) -> serde_json::Value {
        let schema = match self {
            OperationName::SearchProducts => schemars::schema_for!(SearchParams),
            OperationName::GetProductDetails
            | OperationName::GetProductReviews
            | OperationName::RemoveFromCart
            | OperationName::AddToWishlist
            | OperationName::RemoveFromWishlist => schemars::schema_for!(ProductParams),
            OperationName::CompareProducts => schemars::schema_for!(CompareParams),
            OperationName::AddToCart | OperationName::PurchaseProduct => {
                schemars::schema_for!(QuantityParams)
            }
            OperationName::GetRecommendations => schemars::schema_for!(RecommendationParams),
            OperationName::ViewCart
            | OperationName::ClearCart
            | OperationName::ViewWishlist
            | OperationName::Checkout
            | OperationName::ViewOrders
            | OperationName::None => schemars::schema_for!(NoParams),
        };
        serde_json::to_value(schema).unwrap_or_else(|_| serde_json::json!({}))
    }
}

impl std::fmt::Display for OperationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_quantity() -> u32 {
    1
}

fn default_limit() -> usize {
    3
}

#[derive(Clone, Debug, PartialEq, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// 搜索关键词
    #[serde(alias = "term", alias = "searchTerm")]
    pub query: String,
    #[serde(default, alias = "minPrice")]
    #[schemars(with = "Option<f64>")]
    pub min_price: Option<Decimal>,
    #[serde(default, alias = "maxPrice")]
    #[schemars(with = "Option<f64>")]
    pub max_price: Option<Decimal>,
    #[serde(default, alias = "minRating")]
    pub min_rating: Option<f32>,
    #[serde(default, alias = "sortBy")]
    pub sort_by: Option<SortKey>,
}

impl SearchParams {
    pub fn filters(&self) -> SearchFilters {
        SearchFilters {
            min_price: self.min_price,
            max_price: self.max_price,
            min_rating: self.min_rating,
            sort_by: self.sort_by,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct ProductParams {
    #[serde(alias = "productId", alias = "id")]
    pub product_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct CompareParams {
    #[serde(alias = "productIds", alias = "ids")]
    pub product_ids: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct QuantityParams {
    #[serde(alias = "productId", alias = "id")]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct RecommendationParams {
    #[serde(alias = "productId", alias = "id")]
    pub product_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// 无参数操作：接受任意 JSON 对象并忽略其字段
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct NoParams {}

/// 解码后的操作（标签联合）
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    SearchProducts(SearchParams),
    GetProductDetails(ProductParams),
    GetProductReviews(ProductParams),
    CompareProducts(CompareParams),
    AddToCart(QuantityParams),
    RemoveFromCart(ProductParams),
    ViewCart,
    ClearCart,
    AddToWishlist(ProductParams),
    RemoveFromWishlist(ProductParams),
    ViewWishlist,
    PurchaseProduct(QuantityParams),
    Checkout,
    ViewOrders,
    GetRecommendations(RecommendationParams),
    None,
}

impl Operation {
    /// 按操作名解码参数文本；解码失败返回 MalformedParameters（附带原始文本）
    pub fn decode(name: OperationName, raw: &str) -> Result<Self, AgentError> {
        let trimmed = raw.trim();
        let text = if trimmed.is_empty() || trimmed == "null" {
            "{}"
        } else {
            trimmed
        };
        let op = match name {
            OperationName::SearchProducts => Operation::SearchProducts(parse(name, raw, text)?),
            OperationName::GetProductDetails => Operation::GetProductDetails(parse(name, raw, text)?),
            OperationName::GetProductReviews => Operation::GetProductReviews(parse(name, raw, text)?),
            OperationName::CompareProducts => Operation::CompareProducts(parse(name, raw, text)?),
            OperationName::AddToCart => Operation::AddToCart(parse(name, raw, text)?),
            OperationName::RemoveFromCart => Operation::RemoveFromCart(parse(name, raw, text)?),
            OperationName::AddToWishlist => Operation::AddToWishlist(parse(name, raw, text)?),
            OperationName::RemoveFromWishlist => Operation::RemoveFromWishlist(parse(name, raw, text)?),
            OperationName::PurchaseProduct => Operation::PurchaseProduct(parse(name, raw, text)?),
            OperationName::GetRecommendations => Operation::GetRecommendations(parse(name, raw, text)?),
            OperationName::ViewCart
            | OperationName::ClearCart
            | OperationName::ViewWishlist
            | OperationName::Checkout
            | OperationName::ViewOrders
            | OperationName::None => {
                parse::<NoParams>(name, raw, text)?;
                match name {
                    OperationName::ViewCart => Operation::ViewCart,
                    OperationName::ClearCart => Operation::ClearCart,
                    OperationName::ViewWishlist => Operation::ViewWishlist,
                    OperationName::Checkout => Operation::Checkout,
                    OperationName::ViewOrders => Operation::ViewOrders,
                    _ => Operation::None,
                }
            }
        };
        Ok(op)
    }

    /// 以字符串操作名解码；不在操作表中的名字返回 UnknownOperation
    pub fn decode_named(name: &str, raw: &str) -> Result<Self, AgentError> {
        let op = OperationName::from_name(name)
            .ok_or_else(|| AgentError::UnknownOperation(name.trim().to_string()))?;
        Self::decode(op, raw)
    }

    pub fn name(&self) -> OperationName {
        match self {
            Operation::SearchProducts(_) => OperationName::SearchProducts,
            Operation::GetProductDetails(_) => OperationName::GetProductDetails,
            Operation::GetProductReviews(_) => OperationName::GetProductReviews,
            Operation::CompareProducts(_) => OperationName::CompareProducts,
            Operation::AddToCart(_) => OperationName::AddToCart,
            Operation::RemoveFromCart(_) => OperationName::RemoveFromCart,
            Operation::ViewCart => OperationName::ViewCart,
            Operation::ClearCart => OperationName::ClearCart,
            Operation::AddToWishlist(_) => OperationName::AddToWishlist,
            Operation::RemoveFromWishlist(_) => OperationName::RemoveFromWishlist,
            Operation::ViewWishlist => OperationName::ViewWishlist,
            Operation::PurchaseProduct(_) => OperationName::PurchaseProduct,
            Operation::Checkout => OperationName::Checkout,
            Operation::ViewOrders => OperationName::ViewOrders,
            Operation::GetRecommendations(_) => OperationName::GetRecommendations,
            Operation::None => OperationName::None,
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(
    name: OperationName,
    raw: &str,
    text: &str,
) -> Result<T, AgentError> {
    serde_json::from_str(text).map_err(|e| AgentError::MalformedParameters {
        operation: name.to_string(),
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}

/// 操作成功时的类型化结果
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum OperationOutput {
    SearchResults(Vec<Product>),
    ProductDetails(Product),
    Reviews {
        product_id: String,
        reviews: Vec<Review>,
    },
    Comparison(Vec<Product>),
    Cart(CartSummary),
    Wishlist(Vec<Product>),
    OrderPlaced(Order),
    Orders(Vec<Order>),
    Recommendations {
        product_id: String,
        products: Vec<Product>,
    },
    Nothing,
}

impl OperationOutput {
    /// 唯一可识别的商品：详情查询，或恰好命中一个结果的搜索
    pub fn single_product(&self) -> Option<&Product> {
        match self {
            OperationOutput::ProductDetails(p) => Some(p),
            OperationOutput::SearchResults(hits) => match hits.as_slice() {
                [only] => Some(only),
                _ => None,
            },
            _ => None,
        }
    }
}
