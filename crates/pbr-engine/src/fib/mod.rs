//! Forwarding information bases.
//!
//! The engine only reads FIBs. Building them from routing tables happens
//! upstream; a [`Fib`] here is a snapshot of resolved entries per prefix.
//! `NextVrf` entries let one VRF's lookup continue in another, so the
//! per-VRF tables together form a graph that may contain cycles.

mod table;
mod types;

pub use table::{Fib, FibsByVrf};
pub use types::{FibAction, FibEntry, RouteProtocol};
