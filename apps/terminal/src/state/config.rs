//! # Configuration State
//!
//! Store settings read at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KASIR_*`)
//! 2. Defaults (this file)
//!
//! Oracle settings live in `advisor.toml`, see [`kasir_advisor::AdvisorConfig`].

use std::time::Duration;

use kasir_core::validation::validate_tax_rate_bps;
use kasir_core::{CheckoutPolicy, Money, TaxRate, ANOMALY_THRESHOLD, DEFAULT_TAX_RATE_BPS};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Printed on receipts
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    pub currency_symbol: String,

    /// Tax rate in basis points, e.g. 1100 = 11%
    pub tax_rate_bps: u32,

    /// Sales with a total strictly above this need confirming
    pub anomaly_threshold: Money,

    /// Simulated card/QR processing time before a sale commits
    pub processing_delay_ms: u64,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Toko Kasir".to_string(),
            currency_code: "IDR".to_string(),
            currency_symbol: "Rp".to_string(),
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            anomaly_threshold: ANOMALY_THRESHOLD,
            processing_delay_ms: 800,
        }
    }
}

impl ConfigState {
    /// Builds the configuration from `KASIR_*` environment variables.
    ///
    /// ## Environment Variables
    /// - `KASIR_STORE_NAME`
    /// - `KASIR_CURRENCY` / `KASIR_CURRENCY_SYMBOL`
    /// - `KASIR_TAX_RATE_BPS`: e.g. "1100"
    /// - `KASIR_ANOMALY_THRESHOLD`: whole rupiah
    /// - `KASIR_PROCESSING_DELAY_MS`
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("KASIR_STORE_NAME") {
            config.store_name = name;
        }
        if let Some(code) = lookup("KASIR_CURRENCY") {
            config.currency_code = code;
        }
        if let Some(symbol) = lookup("KASIR_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(raw) = lookup("KASIR_TAX_RATE_BPS") {
            match raw.trim().parse::<u32>() {
                Ok(bps) if validate_tax_rate_bps(bps).is_ok() => config.tax_rate_bps = bps,
                _ => warn!(value = %raw, "Ignoring invalid KASIR_TAX_RATE_BPS"),
            }
        }

        if let Some(raw) = lookup("KASIR_ANOMALY_THRESHOLD") {
            match raw.trim().parse::<i64>() {
                Ok(minor) if minor > 0 => config.anomaly_threshold = Money::from_minor(minor),
                _ => warn!(value = %raw, "Ignoring invalid KASIR_ANOMALY_THRESHOLD"),
            }
        }

        if let Some(raw) = lookup("KASIR_PROCESSING_DELAY_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.processing_delay_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring invalid KASIR_PROCESSING_DELAY_MS"),
            }
        }

        config
    }

    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            tax_rate: TaxRate::from_bps(self.tax_rate_bps),
            anomaly_threshold: self.anomaly_threshold,
        }
    }

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }

    /// Formats whole rupiah with dot thousands separators.
    ///
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_minor(72_150)), "Rp72.150");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let minor = amount.minor();
        let digits = minor.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        format!(
            "{}{}{}",
            if minor < 0 { "-" } else { "" },
            self.currency_symbol,
            grouped
        )
    }
}
