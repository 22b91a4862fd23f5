//! # Advisor Commands
//!
//! Upsell suggestions for the open cart and questions for the analyst.
//! Neither ever fails: without a working oracle the operator gets an empty
//! list or the neutral "unavailable" message.

use kasir_advisor::ask_analyst;
use kasir_core::Product;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::state::{AdvisorState, RegisterState, StoreState};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub products: Vec<Product>,
    /// False when the suggestions were computed for a different cart.
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalystAnswer {
    pub question: String,
    pub answer: String,
}

/// Queues a debounced recommendation for the current cart. Call after
/// every cart edit; only the last request in a burst reaches the oracle.
pub fn refresh_recommendations(
    advisor: &AdvisorState,
    store: &StoreState,
    register: &RegisterState,
) -> JoinHandle<()> {
    debug!("refresh_recommendations command");
    let cart = register.with_register(|r| r.cart().clone());
    store.with_catalog(|c| advisor.scheduler().schedule(&cart, c))
}

/// The most recent published suggestions.
pub fn latest_recommendations(
    advisor: &AdvisorState,
    register: &RegisterState,
) -> RecommendationsResponse {
    debug!("latest_recommendations command");
    let latest = advisor.scheduler().latest();
    let fingerprint = register.with_register(|r| r.cart().fingerprint());
    RecommendationsResponse {
        current: latest.fingerprint == fingerprint,
        products: latest.products,
    }
}

/// Answers a free-text question about the store's numbers.
pub async fn ask(advisor: &AdvisorState, store: &StoreState, question: &str) -> AnalystAnswer {
    debug!(question_len = question.len(), "ask command");
    let recent = advisor.config().analyst.recent_transactions;
    let snapshot = store.with_books(|c, l| l.snapshot(c, recent));

    let answer = ask_analyst(advisor.oracle(), question, &snapshot).await;
    AnalystAnswer {
        question: question.to_string(),
        answer,
    }
}
