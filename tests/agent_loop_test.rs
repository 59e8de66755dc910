//! 编排主循环集成测试（脚本化决策服务 + 内存后端）

mod common;

#[cfg(test)]
mod tests {
    use shop_agent::llm::ScriptedLlmClient;
    use shop_agent::memory::TranscriptEntry;
    use shop_agent::react::{LoopSettings, ProductRef, ResponseKind, CLARIFICATION_MESSAGE};
    use shop_agent::shop::ShopBackend;

    use crate::common::{decision, harness, harness_with, reply, user_prompt};

    #[tokio::test]
    async fn test_usb_cable_scenario() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("search_products", r#"{"query":"USB","maxPrice":15}"#, true, None),
            decision("none", "{}", false, Some("Found 3 cables")),
        ]));

        let resp = h.agent.run_turn("find usb cables under $15").await;

        assert_eq!(resp.kind, ResponseKind::Answer);
        assert_eq!(resp.message, "Found 3 cables");
        assert_eq!(resp.tool_outputs.len(), 1);
        let text = resp.render();
        assert!(text.contains("Search results (3):"));
        assert!(text.contains("[P001]") && text.contains("[P002]") && text.contains("[P003]"));
        assert!(text.ends_with("Found 3 cables"));
        assert_eq!(h.agent.reference(), None);
        assert_eq!(h.llm.call_count(), 2);

        // 第二次决策能看到第一次的工具结果
        assert!(user_prompt(&h.llm, 1).contains("Tool search_products("));
    }

    #[tokio::test]
    async fn test_terminates_within_max_iterations() {
        let llm = ScriptedLlmClient::repeating(
            decision("view_cart", "{}", true, None).unwrap(),
        );
        let mut h = harness_with(
            llm,
            LoopSettings {
                max_iterations: 4,
                max_history_length: 50,
            },
        );

        let resp = h.agent.run_turn("keep going forever").await;

        assert_eq!(resp.kind, ResponseKind::Clarification);
        assert_eq!(resp.message, CLARIFICATION_MESSAGE);
        assert_eq!(resp.tool_outputs.len(), 4);
        assert_eq!(h.llm.call_count(), 4);
    }

    #[tokio::test]
    async fn test_context_carry_over_enriches_pronoun_request() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("get_product_details", r#"{"product_id":"P008"}"#, true, None),
            reply("Here is the keyboard"),
            reply("Buying it"),
        ]));

        h.agent.run("show me the mechanical keyboard").await;
        assert_eq!(
            h.agent.reference(),
            Some(&ProductRef {
                id: "P008".into(),
                title: "Mechanical Keyboard".into()
            })
        );

        h.agent.run("buy it now").await;

        let prompt = user_prompt(&h.llm, 2);
        assert!(prompt.contains("User: buy it now [context: product_id=P008"));
        // 名义请求仍是原文
        assert!(prompt.ends_with("Current request: buy it now"));
    }

    #[tokio::test]
    async fn test_multi_result_search_keeps_existing_context() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("get_product_details", r#"{"product_id":"P008"}"#, true, Some("Keyboard")),
            decision("search_products", r#"{"query":"headphones"}"#, true, Some("Two options")),
        ]));

        h.agent.run("show me P008").await;
        let resp = h.agent.run_turn("search for headphones").await;

        assert!(resp.render().contains("Search results (2):"));
        assert_eq!(h.agent.reference().map(|r| r.id.as_str()), Some("P008"));
    }

    #[tokio::test]
    async fn test_single_result_search_sets_context() {
        let mut h = harness(ScriptedLlmClient::new(vec![decision(
            "search_products",
            r#"{"query":"keyboard"}"#,
            true,
            Some("One match"),
        )]));

        h.agent.run("find a keyboard").await;

        assert_eq!(h.agent.reference().map(|r| r.id.as_str()), Some("P008"));
    }

    #[tokio::test]
    async fn test_transcript_never_exceeds_history_bound() {
        let llm = ScriptedLlmClient::repeating(
            decision("view_cart", "{}", true, Some("Here is your cart")).unwrap(),
        );
        let mut h = harness_with(
            llm,
            LoopSettings {
                max_iterations: 10,
                max_history_length: 5,
            },
        );

        for i in 0..12 {
            h.agent.run(&format!("request number {}", i)).await;
            assert!(h.agent.transcript().len() <= 5);
        }
        // 最新的工具记录仍在
        assert!(matches!(
            h.agent.transcript().entries().last(),
            Some(TranscriptEntry::ToolCall { .. })
        ));
    }

    #[tokio::test]
    async fn test_reset_clears_transcript_and_context_only() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("add_to_cart", r#"{"product_id":"P008"}"#, true, Some("Added")),
        ]));
        h.agent.run("add P008 to my cart").await;
        assert!(h.agent.reference().is_none());
        assert!(!h.agent.transcript().is_empty());

        for _ in 0..2 {
            let resp = h.agent.run_turn("  Clear History ").await;
            assert_eq!(resp.kind, ResponseKind::Info);
            assert_eq!(h.agent.transcript().len(), 0);
            assert_eq!(h.agent.reference(), None);
        }
        assert_eq!(h.llm.call_count(), 1);
        assert_eq!(h.shop.view_cart().await.unwrap().item_count(), 1);
    }

    #[tokio::test]
    async fn test_decision_failure_keeps_only_user_entry() {
        let mut h = harness(ScriptedLlmClient::new(vec![Err("upstream timeout".to_string())]));

        let resp = h.agent.run_turn("find usb cables").await;

        assert!(resp.is_error());
        assert!(resp.render().starts_with("Error: Decision service unavailable"));
        assert_eq!(
            h.agent.transcript().entries(),
            &[TranscriptEntry::User("find usb cables".into())]
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_from_decision_aborts_turn() {
        let bad = r#"{"reasoning":"r","action":{"operation_name":"teleport","reasoning":"","parameters":"{}"},"should_continue":true}"#;
        let mut h = harness(ScriptedLlmClient::new(vec![Ok(bad.to_string())]));

        let resp = h.agent.run_turn("beam me up").await;

        assert!(resp.is_error());
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_parameters_abort_without_mutation() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("add_to_cart", "{product_id: P001", true, None),
            reply("never reached"),
        ]));

        let text = h.agent.run("add the usb cable").await;

        assert!(text.starts_with("Error: Malformed parameters for add_to_cart"));
        assert!(text.contains("{product_id: P001"));
        assert!(h.shop.view_cart().await.unwrap().is_empty());
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_operation_failure_surfaces_backend_message() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("checkout", "{}", true, None),
            reply("never reached"),
        ]));

        let text = h.agent.run("checkout please").await;

        assert_eq!(text, "Error: Your cart is empty");
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_operation_with_final_response_ends_turn() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("add_to_cart", r#"{"product_id":"P001","quantity":2}"#, true, Some("Added 2 cables")),
            reply("never reached"),
        ]));

        let resp = h.agent.run_turn("add two usb-c cables").await;

        assert_eq!(resp.message, "Added 2 cables");
        assert!(resp.render().contains("Cart (2 items):"));
        assert_eq!(h.llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_via_loop_empties_cart() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("add_to_cart", r#"{"product_id":"P003"}"#, true, None),
            decision("checkout", "{}", true, Some("Order placed")),
        ]));

        let resp = h.agent.run_turn("buy the braided cable").await;
        assert!(resp.render().contains("Order placed!"));

        let cart = h.agent.run("view cart").await;
        assert_eq!(cart, "Your cart is empty.");
        assert_eq!(h.shop.view_cart().await.unwrap().item_count(), 0);
        assert_eq!(h.shop.view_orders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quick_commands_bypass_decision_function() {
        let mut h = harness(ScriptedLlmClient::new(Vec::new()));

        let help = h.agent.run_turn("HELP").await;
        assert_eq!(help.kind, ResponseKind::Info);
        assert!(help.message.contains("Quick commands"));
        assert_eq!(h.agent.run("wishlist").await, "Your wishlist is empty.");
        assert_eq!(h.agent.run("orders").await, "You have no orders yet.");
        assert_eq!(h.agent.run("empty cart").await, "Your cart has been cleared.");

        assert_eq!(h.llm.call_count(), 0);
        assert!(h.agent.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_reasoning_used_when_final_response_missing() {
        let mut h = harness(ScriptedLlmClient::new(vec![decision("none", "{}", false, None)]));

        let resp = h.agent.run_turn("hello").await;

        assert_eq!(resp.kind, ResponseKind::Answer);
        assert_eq!(resp.message, "reasoning for none");
    }

    #[tokio::test]
    async fn test_committed_operations_tracked_per_turn() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("view_cart", "{}", true, None),
            decision("add_to_wishlist", r#"{"product_id":"P005"}"#, true, Some("Saved")),
            reply("You're welcome"),
        ]));

        h.agent.run("save the wireless headphones for later").await;
        assert_eq!(
            h.agent.committed_operations(),
            &[r#"add_to_wishlist({"product_id":"P005"})"#.to_string()]
        );

        h.agent.run("thanks").await;
        assert!(h.agent.committed_operations().is_empty());
    }

    #[tokio::test]
    async fn test_explicit_catalog_id_suppresses_context() {
        let mut h = harness(ScriptedLlmClient::new(vec![
            decision("get_product_details", r#"{"product_id":"P008"}"#, true, Some("Keyboard")),
            reply("Added the hub"),
        ]));

        h.agent.run("show me the mechanical keyboard").await;
        h.agent.run("purchase p012 instead").await;

        assert!(!user_prompt(&h.llm, 1).contains("[context:"));
    }
}
