//! Flutter-facing bindings for notegraph.

pub mod api;
pub mod cache;
