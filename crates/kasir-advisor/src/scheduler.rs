//! # Debounced Recommendation Scheduler
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Recommendation Lifecycle                           │
//! │                                                                         │
//! │   cart edit ──► schedule() ──► token = n ──► sleep(debounce)            │
//! │                                                  │                      │
//! │                             token still n? ──no──┴──► exit (no call)    │
//! │                                  │ yes                                  │
//! │                                  ▼                                      │
//! │                          recommend_upsell()                             │
//! │                                  │                                      │
//! │                             token still n? ──no──► drop result          │
//! │                                  │ yes                                  │
//! │                                  ▼                                      │
//! │                        watch::Sender::send_replace                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! In-flight oracle calls are never aborted; a stale answer is simply not
//! published.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kasir_core::{Cart, Catalog, Product};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::RecommendationSettings;
use crate::oracle::Oracle;
use crate::recommend::recommend_upsell;

/// The most recently published suggestions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recommendations {
    /// Token of the request that produced these suggestions. Zero before the
    /// first publish.
    pub token: u64,
    /// [`Cart::fingerprint`] of the cart they were computed for.
    pub fingerprint: u64,
    pub products: Vec<Product>,
}

pub struct RecommendationScheduler {
    oracle: Arc<dyn Oracle>,
    debounce: Duration,
    limit: usize,
    token: Arc<AtomicU64>,
    sender: watch::Sender<Recommendations>,
}

impl RecommendationScheduler {
    pub fn new(oracle: Arc<dyn Oracle>, debounce: Duration, limit: usize) -> Self {
        let (sender, _) = watch::channel(Recommendations::default());
        RecommendationScheduler {
            oracle,
            debounce,
            limit,
            token: Arc::new(AtomicU64::new(0)),
            sender,
        }
    }

    pub fn from_settings(oracle: Arc<dyn Oracle>, settings: &RecommendationSettings) -> Self {
        Self::new(oracle, settings.debounce(), settings.max_suggestions)
    }

    /// Queues a recommendation for the current cart, superseding any earlier
    /// request. Must be called inside a tokio runtime.
    pub fn schedule(&self, cart: &Cart, catalog: &Catalog) -> JoinHandle<()> {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.token);
        let oracle = Arc::clone(&self.oracle);
        let sender = self.sender.clone();
        let cart = cart.clone();
        let catalog = catalog.clone();
        let debounce = self.debounce;
        let limit = self.limit;

        debug!(token, fingerprint = cart.fingerprint(), "Recommendation scheduled");

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if latest.load(Ordering::SeqCst) != token {
                debug!(token, "Recommendation superseded before the oracle call");
                return;
            }

            let products = recommend_upsell(oracle.as_ref(), &cart, &catalog, limit).await;

            if latest.load(Ordering::SeqCst) != token {
                debug!(token, "Discarding stale recommendation");
                return;
            }
            sender.send_replace(Recommendations {
                token,
                fingerprint: cart.fingerprint(),
                products,
            });
        })
    }

    /// Invalidates every pending request. Results already in flight are
    /// dropped when they arrive.
    pub fn cancel(&self) {
        let token = self.token.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(token, "Recommendations cancelled");
    }

    pub fn subscribe(&self) -> watch::Receiver<Recommendations> {
        self.sender.subscribe()
    }

    pub fn latest(&self) -> Recommendations {
        self.sender.borrow().clone()
    }

    /// Token of the newest request.
    pub fn current_token(&self) -> u64 {
        self.token.load(Ordering::SeqCst)
    }
}
