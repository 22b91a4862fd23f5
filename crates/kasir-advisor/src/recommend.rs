//! Upsell suggestions for the cart being rung up.
//!
//! The oracle answers with product names; only names that are in the
//! catalog, in stock and not already in the cart survive.

use std::collections::HashSet;

use kasir_core::{Cart, Catalog, Product};
use tracing::{debug, warn};

use crate::error::{AdvisorError, AdvisorResult};
use crate::oracle::{Oracle, OracleRequest};
use kasir_core::import::ocr::strip_code_fence;

/// Up to `limit` catalog products to suggest alongside `cart`.
///
/// Never fails: any oracle or parsing problem yields an empty list.
pub async fn recommend_upsell(
    oracle: &dyn Oracle,
    cart: &Cart,
    catalog: &Catalog,
    limit: usize,
) -> Vec<Product> {
    if cart.is_empty() || limit == 0 {
        return Vec::new();
    }

    match try_recommend(oracle, cart, catalog, limit).await {
        Ok(products) => {
            debug!(count = products.len(), "Upsell recommendations ready");
            products
        }
        Err(e) => {
            warn!(oracle = oracle.name(), error = %e, "Upsell recommendation failed");
            Vec::new()
        }
    }
}

async fn try_recommend(
    oracle: &dyn Oracle,
    cart: &Cart,
    catalog: &Catalog,
    limit: usize,
) -> AdvisorResult<Vec<Product>> {
    let reply = oracle
        .generate(OracleRequest::json(build_prompt(cart, catalog, limit)))
        .await?;
    let names: Vec<String> = serde_json::from_str(strip_code_fence(&reply))
        .map_err(|e| AdvisorError::InvalidResponse(format!("expected a JSON array of names: {}", e)))?;

    Ok(select_products(&names, cart, catalog, limit))
}

fn build_prompt(cart: &Cart, catalog: &Catalog, limit: usize) -> String {
    let in_cart = cart
        .lines()
        .iter()
        .map(|l| format!("- {} x{}", l.name, l.quantity))
        .collect::<Vec<_>>()
        .join("\n");
    let available = catalog
        .products()
        .iter()
        .filter(|p| p.stock > 0 && !cart.contains(&p.id))
        .map(|p| format!("- {} ({}, {})", p.name, p.category, p.price))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a cashier assistant in a small Indonesian grocery store.\n\
         The customer's cart contains:\n{in_cart}\n\n\
         Products available in the store:\n{available}\n\n\
         Suggest up to {limit} products from the available list that the customer \
         is likely to buy together with the cart. Answer with a JSON array of exact \
         product names and nothing else."
    )
}

/// Maps names to catalog products, dropping unknown, out-of-stock, already
/// carted and duplicate entries.
fn select_products(names: &[String], cart: &Cart, catalog: &Catalog, limit: usize) -> Vec<Product> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter_map(|name| catalog.find_by_name(name))
        .filter(|p| p.stock > 0 && !cart.contains(&p.id))
        .filter(|p| seen.insert(p.id.clone()))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedOracle;
    use kasir_core::seed;

    fn cart_with(catalog: &Catalog, skus: &[&str]) -> Cart {
        let mut cart = Cart::new();
        for sku in skus {
            cart.add_item(catalog.find_by_sku(sku).unwrap()).unwrap();
        }
        cart
    }

    #[tokio::test]
    async fn test_filters_to_catalog_items_not_in_cart() {
        let catalog = seed::demo_catalog();
        let cart = cart_with(&catalog, &["RICE-005"]);
        let oracle = ScriptedOracle::replying(
            r#"["Cooking Oil 2L", "Premium Rice", "Caviar", "granulated sugar 1kg", "Cooking Oil 2L"]"#,
        );

        let products = recommend_upsell(&oracle, &cart, &catalog, 3).await;
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, vec!["Cooking Oil 2L", "Granulated Sugar 1kg"]);
        assert_eq!(oracle.calls(), 1);
        let prompt = oracle.last_prompt().unwrap();
        assert!(prompt.expect_json);
        assert!(prompt.prompt.contains("Premium Rice x1"));
    }

    #[tokio::test]
    async fn test_failing_oracle_yields_empty_list() {
        let catalog = seed::demo_catalog();
        let cart = cart_with(&catalog, &["TEA-006"]);

        let oracle = ScriptedOracle::failing();
        assert!(recommend_upsell(&oracle, &cart, &catalog, 3).await.is_empty());

        let chatty = ScriptedOracle::replying("Try the coffee!");
        assert!(recommend_upsell(&chatty, &cart, &catalog, 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_skips_oracle() {
        let catalog = seed::demo_catalog();
        let oracle = ScriptedOracle::replying(r#"["Jasmine Tea"]"#);

        assert!(recommend_upsell(&oracle, &Cart::new(), &catalog, 3).await.is_empty());
        assert_eq!(oracle.calls(), 0);
    }

    #[tokio::test]
    async fn test_limit_and_fenced_reply() {
        let catalog = seed::demo_catalog();
        let cart = cart_with(&catalog, &["COFF-004"]);
        let oracle = ScriptedOracle::replying(
            "```json\n[\"UHT Milk 1L\", \"Granulated Sugar 1kg\", \"Jasmine Tea\"]\n```",
        );

        let products = recommend_upsell(&oracle, &cart, &catalog, 2).await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].sku, "MILK-007");
    }
}
