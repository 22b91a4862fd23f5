//! # Commands Module
//!
//! Every operation the terminal exposes. `main.rs` calls these; so would
//! any other front end.
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here
//! ├── catalog.rs   ◄─── Product lookup, CRUD, stock adjustment
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── checkout.rs  ◄─── Payment, commit, high-value confirmation
//! ├── import.rs    ◄─── CSV and receipt staging, review, commit
//! ├── advisor.rs   ◄─── Upsell suggestions and analyst questions
//! ├── report.rs    ◄─── Financial summary and recent sales
//! └── config.rs    ◄─── Store configuration
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the register
//! fn get_cart(register: &RegisterState) -> CartResponse
//!
//! // Needs the catalog and the register
//! fn add_to_cart(store: &StoreState, register: &RegisterState, product_id: &str)
//! ```

pub mod advisor;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod import;
pub mod report;
