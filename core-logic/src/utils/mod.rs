//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod logger;
pub(crate) mod proxy_manager;
pub(crate) mod retry;
pub(crate) mod runner;

// Selective exports - only public utilities
pub use logger::{colorize, setup_logger};
pub use proxy_manager::{parse_proxy_line, JsonProxyFile, ProxyManager, ProxyResolver, StaticProxy};
pub use runner::shutdown_on_ctrl_c;
