//! Kaisar ZeroNode automation
//!
//! Runs a fixed sequence of authenticated calls against the Kaisar API for
//! every configured account, once per session, forever.
//!
//! # Architecture
//!
//! - [`client::ResilientHttpInvoker`]: one HTTP call under a bounded retry
//!   policy with uniform status classification
//! - [`tasks`]: the six task definitions built on the invoker
//! - [`pipeline::AccountTaskPipeline`]: all tasks, in order, for one account
//! - [`scheduler::SessionScheduler`]: all accounts, then a fixed sleep
//!
//! Proxy routing comes from a [`core_logic::ProxyResolver`]; nothing runs
//! concurrently, which keeps the outbound request rate bounded.

pub mod accounts;
pub mod client;
pub mod config;
pub mod pipeline;
pub mod scheduler;
pub mod tasks;
pub mod utils;

pub use accounts::{Account, JsonAccountLoader};
pub use client::{PreconditionRule, RequestSpec, ResilientHttpInvoker};
pub use config::KaisarConfig;
pub use pipeline::{AccountTaskPipeline, PipelineReport};
pub use scheduler::{SessionReport, SessionScheduler};
pub use tasks::{KaisarTask, TaskContext};
