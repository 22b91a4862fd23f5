//! # kasir-advisor: Oracle-Backed Assistance for Kasir POS
//!
//! Upsell suggestions, a business analyst chat and receipt extraction, all
//! answered by a generative model behind the [`Oracle`] trait.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Advisor Data Flow                              │
//! │                                                                         │
//! │   Cart + Catalog ──► RecommendationScheduler ──► recommend_upsell ──┐   │
//! │   AnalystSnapshot ─────────────────────────────► ask_analyst ───────┤   │
//! │   InlineImage ─────────────────────────────────► extract_document ──┤   │
//! │                                                                     │   │
//! │                                      ┌──────────────────────────────▼┐  │
//! │                                      │  dyn Oracle (HttpOracle)      │  │
//! │                                      │  reqwest + timeout + API key  │  │
//! │                                      └───────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of the public advisory functions return an error. Failures are
//! logged and turned into an empty list, [`UNAVAILABLE_MESSAGE`] or
//! [`kasir_core::OcrOutcome::Failed`].

pub mod analyst;
pub mod config;
pub mod error;
pub mod ocr;
pub mod oracle;
pub mod recommend;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use analyst::{ask_analyst, UNAVAILABLE_MESSAGE};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, AdvisorResult};
pub use ocr::extract_document;
pub use oracle::{HttpOracle, InlineImage, Oracle, OracleRequest};
pub use recommend::recommend_upsell;
pub use scheduler::{RecommendationScheduler, Recommendations};
