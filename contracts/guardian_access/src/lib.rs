#![no_std]

//! # Guardian Access
//!
//! Building blocks linked into every Guardian contract:
//!
//! - [`roles`]: principal-to-role registry with Admin bootstrap and
//!   last-Admin protection.
//! - [`circuit`]: per-function and per-contract circuit breaker state with
//!   lazy auto-restore.
//! - [`call`]: the `Call` payload and fallible invoke used by delayed
//!   execution.
//! - [`storage`]: persistent record helpers with TTL bumps.
//!
//! None of these modules defines a contract. Contracts compose them by calling the
//! module functions from their own entry points, so every contract keeps its
//! own role table and circuit table in its own storage.

pub mod call;
pub mod circuit;
pub mod roles;
pub mod storage;

pub use call::Call;
pub use circuit::{Circuit, CircuitState};
pub use roles::Role;

#[cfg(test)]
mod test_helpers;
