//! # fintools-agent
//!
//! The agent-facing surface: 30 string-returning tools over cryptocurrency
//! and forex market data.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`args`] | Raw named arguments of a call |
//! | [`schemas`] | One validated input type per tool |
//! | [`context`] | Providers and translators shared by all tools |
//! | [`crypto_tools`] | CoinMarketCap tools |
//! | [`forex_tools`] | Massive forex tools |
//! | [`format`] | Text helpers for tool output |
//! | [`monitor`] | Invocation logging and panic containment |
//! | [`registry`] | Tool catalogue and dispatch |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fintools_agent::{ToolContext, ToolRegistry};
//! use fintools_core::{ReqwestHttpClient, Settings};
//!
//! let settings = Settings::from_env()?;
//! let http = Arc::new(ReqwestHttpClient::new());
//! let registry = ToolRegistry::new(Arc::new(ToolContext::from_settings(&settings, http)?));
//!
//! let text = registry.call("get_forex_snapshot", json!({ "ticker": "EURUSD" })).await;
//! ```

pub mod args;
pub mod context;
pub mod crypto_tools;
pub mod forex_tools;
pub mod format;
pub mod monitor;
pub mod registry;
pub mod schemas;

pub use args::ToolArgs;
pub use context::ToolContext;
pub use monitor::{InvocationId, InvocationStatus};
pub use registry::{dispatch, Domain, ParamKind, ParamSpec, Tool, ToolRegistry};
