//! # Core Logic - Shared Building Blocks for Service Automation
//!
//! This crate provides the service-agnostic pieces used by each automation
//! crate under `chains/`: outcome types, the bounded-retry driver, proxy
//! resolution and logging.
//!
//! ## Modules
//!
//! - [`config`] - Proxy route definition
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Task and account-loader traits, task outcomes
//! - `utils` - Retry driver, proxy resolvers, logger, shutdown signal

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::ProxyRoute;
pub use error::{ConfigError, NetworkError};
pub use traits::{AccountLoader, Task, TaskOutcome, TerminalReason};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    colorize, parse_proxy_line, setup_logger, shutdown_on_ctrl_c, JsonProxyFile, ProxyManager,
    ProxyResolver, StaticProxy,
};

// Retry driver shared by the service crates
pub use utils::retry::{with_retry, Attempt, RetryPolicy, RetryState};
