//! # Kasir Terminal Library
//!
//! State holders and commands behind the `kasir` binary.
//!
//! ## Module Organization
//! ```text
//! kasir_terminal/
//! ├── lib.rs          ◄─── You are here (tracing setup, startup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports, lock helper
//! │   ├── store.rs    ◄─── Catalog + ledger
//! │   ├── register.rs ◄─── Cart + payment draft
//! │   ├── import.rs   ◄─── Staged import records
//! │   ├── advisor.rs  ◄─── Oracle + recommendation scheduler
//! │   └── config.rs   ◄─── Store configuration
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use kasir_advisor::AdvisorConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::{AdvisorState, ConfigState, ImportState, RegisterState, StoreState};

/// Every state holder, built once at startup.
pub struct Terminal {
    pub config: ConfigState,
    pub store: StoreState,
    pub register: RegisterState,
    pub import: ImportState,
    pub advisor: AdvisorState,
}

impl Terminal {
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │  1. Store config ───► KASIR_* env over defaults                        │
    /// │  2. Advisor config ─► advisor.toml (or --config) then KASIR_* env      │
    /// │  3. Store state ────► seed catalog + seeded financial summary          │
    /// │  4. Register ───────► empty cart with the configured tax/threshold     │
    /// │  5. Advisor ────────► HTTP oracle client + scheduler                   │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub fn start(advisor_config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = ConfigState::from_env();
        let advisor_config = AdvisorConfig::load_or_default(advisor_config_path);

        let terminal = Terminal {
            register: RegisterState::new(config.checkout_policy()),
            store: StoreState::seeded(),
            import: ImportState::default(),
            advisor: AdvisorState::from_config(advisor_config)?,
            config,
        };

        info!(
            store = %terminal.config.store_name,
            products = terminal.store.with_catalog(|c| c.len()),
            "Terminal ready"
        );
        Ok(terminal)
    }
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kasir_core=trace` - Trace the core only
/// - Default: `info,kasir=debug,reqwest=warn`
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kasir=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
