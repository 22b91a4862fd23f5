//! # Advisor State
//!
//! The oracle client and the recommendation scheduler built on it.

use std::sync::Arc;

use kasir_advisor::{AdvisorConfig, HttpOracle, Oracle, RecommendationScheduler};
use tracing::info;

use crate::error::ApiError;

pub struct AdvisorState {
    oracle: Arc<dyn Oracle>,
    config: AdvisorConfig,
    scheduler: RecommendationScheduler,
}

impl AdvisorState {
    pub fn new(oracle: Arc<dyn Oracle>, config: AdvisorConfig) -> Self {
        let scheduler =
            RecommendationScheduler::from_settings(Arc::clone(&oracle), &config.recommendations);
        AdvisorState {
            oracle,
            config,
            scheduler,
        }
    }

    /// Builds the HTTP oracle from configuration.
    ///
    /// A missing API key is not an error here; advisory commands degrade to
    /// empty or neutral answers until one is configured.
    pub fn from_config(config: AdvisorConfig) -> Result<Self, ApiError> {
        let oracle = HttpOracle::new(&config.oracle)?;
        info!(
            model = %config.oracle.model,
            credential = config.oracle.has_credential(),
            "Oracle client ready"
        );
        Ok(Self::new(Arc::new(oracle), config))
    }

    pub fn oracle(&self) -> &dyn Oracle {
        self.oracle.as_ref()
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &RecommendationScheduler {
        &self.scheduler
    }
}
