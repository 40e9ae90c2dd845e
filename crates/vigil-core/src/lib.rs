//! Core engine of the vigil account monitor.
//!
//! This crate is intentionally platform-agnostic. The messaging platform
//! (Telegram today) lives behind ports (traits) in [`client`], implemented by
//! adapter crates. Whitelist construction, the polling direct-message
//! scanner, the event-driven group monitor, connection retry and the
//! supervisor all work against those ports, which is also how the tests
//! drive them.

pub mod alert;
pub mod client;
pub mod config;
pub mod connect;
pub mod context;
pub mod domain;
pub mod errlog;
pub mod errors;
pub mod logging;
pub mod monitor;
pub mod registry;
pub mod scanner;
pub mod supervisor;
pub mod whitelist;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::{Error, Result};
