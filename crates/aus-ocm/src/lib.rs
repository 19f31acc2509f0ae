//! AUS OCM
//!
//! Blocking client for the OCM accounts and clusters management APIs,
//! providing the label store and directory the AUS policy backend runs on.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod client;
mod model;

pub mod search;

pub use client::{OcmClient, DEFAULT_API_URL, DEFAULT_TIMEOUT};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
