//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate note source reads into graph build use-cases.
//! - Keep UI/FFI/CLI layers decoupled from storage and graph internals.

pub mod graph_service;
