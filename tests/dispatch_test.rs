//! 分发层集成测试：每个操作恰好调用一次对应的后端方法；后端超时的处理

mod common;

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use shop_agent::core::AgentError;
    use shop_agent::shop::{
        CartSummary, Catalog, InMemoryShop, Order, Product, Review, SearchFilters, ShopBackend,
        ShopError,
    };
    use shop_agent::llm::ScriptedLlmClient;
    use shop_agent::react::{LoopSettings, Planner, ShopAgent, DEFAULT_SYSTEM_PROMPT};
    use shop_agent::tools::{Operation, OperationName, OperationOutput, ToolExecutor};

    use crate::common::decision;

    /// 记录每次后端调用的包装器
    struct RecordingShop {
        inner: InMemoryShop,
        calls: Mutex<Vec<String>>,
        /// view_cart 的人为延迟
        delay: Option<Duration>,
    }

    impl RecordingShop {
        fn new() -> Self {
            Self {
                inner: InMemoryShop::new(Catalog::seed()),
                calls: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::new()
            }
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    #[async_trait]
    impl ShopBackend for RecordingShop {
        async fn search(&self, query: &str, filters: SearchFilters) -> Result<Vec<Product>, ShopError> {
            self.record(format!("search({})", query));
            self.inner.search(query, filters).await
        }

        async fn product_details(&self, product_id: &str) -> Result<Product, ShopError> {
            self.record(format!("product_details({})", product_id));
            self.inner.product_details(product_id).await
        }

        async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>, ShopError> {
            self.record(format!("product_reviews({})", product_id));
            self.inner.product_reviews(product_id).await
        }

        async fn compare(&self, product_ids: &[String]) -> Result<Vec<Product>, ShopError> {
            self.record(format!("compare({})", product_ids.join(",")));
            self.inner.compare(product_ids).await
        }

        async fn add_to_cart(&self, product_id: &str, quantity: u32) -> Result<CartSummary, ShopError> {
            self.record(format!("add_to_cart({},{})", product_id, quantity));
            self.inner.add_to_cart(product_id, quantity).await
        }

        async fn remove_from_cart(&self, product_id: &str) -> Result<CartSummary, ShopError> {
            self.record(format!("remove_from_cart({})", product_id));
            self.inner.remove_from_cart(product_id).await
        }

        async fn view_cart(&self) -> Result<CartSummary, ShopError> {
            self.record("view_cart".into());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.view_cart().await
        }

        async fn clear_cart(&self) -> Result<CartSummary, ShopError> {
            self.record("clear_cart".into());
            self.inner.clear_cart().await
        }

        async fn add_to_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError> {
            self.record(format!("add_to_wishlist({})", product_id));
            self.inner.add_to_wishlist(product_id).await
        }

        async fn remove_from_wishlist(&self, product_id: &str) -> Result<Vec<Product>, ShopError> {
            self.record(format!("remove_from_wishlist({})", product_id));
            self.inner.remove_from_wishlist(product_id).await
        }

        async fn view_wishlist(&self) -> Result<Vec<Product>, ShopError> {
            self.record("view_wishlist".into());
            self.inner.view_wishlist().await
        }

        async fn purchase(&self, product_id: &str, quantity: u32) -> Result<Order, ShopError> {
            self.record(format!("purchase({},{})", product_id, quantity));
            self.inner.purchase(product_id, quantity).await
        }

        async fn checkout(&self) -> Result<Order, ShopError> {
            self.record("checkout".into());
            self.inner.checkout().await
        }

        async fn view_orders(&self) -> Result<Vec<Order>, ShopError> {
            self.record("view_orders".into());
            self.inner.view_orders().await
        }

        async fn recommendations(&self, product_id: &str, limit: usize) -> Result<Vec<Product>, ShopError> {
            self.record(format!("recommendations({},{})", product_id, limit));
            self.inner.recommendations(product_id, limit).await
        }
    }

    fn setup() -> (ToolExecutor, Arc<RecordingShop>) {
        let shop = Arc::new(RecordingShop::new());
        (ToolExecutor::new(shop.clone(), 5), shop)
    }

    async fn dispatch(
        executor: &ToolExecutor,
        name: &str,
        params: &str,
    ) -> Result<OperationOutput, AgentError> {
        executor.execute(Operation::decode_named(name, params)?).await
    }

    #[tokio::test]
    async fn test_each_operation_calls_backend_exactly_once() {
        let (executor, shop) = setup();
        let cases: Vec<(&str, &str, &str)> = vec![
            ("search_products", r#"{"query":"usb"}"#, "search(usb)"),
            ("get_product_details", r#"{"product_id":"P001"}"#, "product_details(P001)"),
            ("get_product_reviews", r#"{"product_id":"P001"}"#, "product_reviews(P001)"),
            ("compare_products", r#"{"product_ids":["P005","P006"]}"#, "compare(P005,P006)"),
            ("add_to_cart", r#"{"product_id":"P001"}"#, "add_to_cart(P001,1)"),
            ("view_cart", "{}", "view_cart"),
            ("remove_from_cart", r#"{"product_id":"P001"}"#, "remove_from_cart(P001)"),
            ("add_to_wishlist", r#"{"product_id":"P008"}"#, "add_to_wishlist(P008)"),
            ("view_wishlist", "", "view_wishlist"),
            ("remove_from_wishlist", r#"{"product_id":"P008"}"#, "remove_from_wishlist(P008)"),
            ("purchase_product", r#"{"product_id":"P009","quantity":2}"#, "purchase(P009,2)"),
            ("add_to_cart", r#"{"product_id":"P003","quantity":3}"#, "add_to_cart(P003,3)"),
            ("checkout", "{}", "checkout"),
            ("clear_cart", "null", "clear_cart"),
            ("view_orders", "{}", "view_orders"),
            ("get_recommendations", r#"{"product_id":"P005"}"#, "recommendations(P005,3)"),
        ];

        for (name, params, expected) in cases {
            let result = dispatch(&executor, name, params).await;
            assert!(result.is_ok(), "{} failed: {:?}", name, result);
            assert_eq!(shop.take(), vec![expected.to_string()], "operation {}", name);
        }
    }

    #[tokio::test]
    async fn test_none_touches_no_backend() {
        let (executor, shop) = setup();

        let out = dispatch(&executor, "none", "{}").await.unwrap();

        assert!(matches!(out, OperationOutput::Nothing));
        assert!(shop.take().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_name_is_rejected_before_backend() {
        let (executor, shop) = setup();

        let err = dispatch(&executor, "teleport", "{}").await.unwrap_err();

        assert_eq!(err, AgentError::UnknownOperation("teleport".into()));
        assert!(shop.take().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_parameters_never_reach_backend() {
        let (executor, shop) = setup();

        let err = dispatch(&executor, "add_to_cart", "not json").await.unwrap_err();

        match err {
            AgentError::MalformedParameters { operation, raw, .. } => {
                assert_eq!(operation, "add_to_cart");
                assert_eq!(raw, "not json");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(shop.take().is_empty());
    }

    #[tokio::test]
    async fn test_backend_rejection_is_passed_through_verbatim() {
        let (executor, shop) = setup();

        let err = dispatch(&executor, "get_product_details", r#"{"product_id":"P999"}"#)
            .await
            .unwrap_err();

        assert_eq!(err, AgentError::OperationFailure("Product not found: P999".into()));
        assert_eq!(err.to_string(), "Product not found: P999");
        assert_eq!(shop.take().len(), 1);
    }

    #[tokio::test]
    async fn test_camel_case_field_aliases_decode() {
        let op = Operation::decode(
            OperationName::AddToCart,
            r#"{"productId":"P002","quantity":4}"#,
        )
        .unwrap();
        let (executor, shop) = setup();

        executor.execute(op).await.unwrap();

        assert_eq!(shop.take(), vec!["add_to_cart(P002,4)".to_string()]);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let shop = Arc::new(RecordingShop::slow(Duration::from_secs(3)));
        let executor = ToolExecutor::new(shop.clone(), 1);

        let err = executor.execute(Operation::ViewCart).await.unwrap_err();

        assert_eq!(err, AgentError::OperationTimeout("view_cart".into()));
        assert_eq!(shop.take(), vec!["view_cart".to_string()]);
    }

    #[tokio::test]
    async fn test_backend_timeout_ends_turn_with_error() {
        let shop = Arc::new(RecordingShop::slow(Duration::from_secs(3)));
        let llm = Arc::new(ScriptedLlmClient::new(vec![
            decision("view_cart", "{}", true, None),
            decision("none", "{}", false, Some("never reached")),
        ]));
        let planner = Planner::new(llm.clone(), DEFAULT_SYSTEM_PROMPT, 5);
        let mut agent = ShopAgent::new(
            Arc::new(planner),
            ToolExecutor::new(shop, 1),
            LoopSettings::default(),
        );

        let text = agent.run("what is in my basket?").await;

        assert_eq!(text, "Error: Operation timed out: view_cart");
        assert_eq!(llm.call_count(), 1);
    }
}
