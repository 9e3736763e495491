//! Core graph construction for notegraph.
//! This crate turns a Bear note export into a pruned note/tag graph.

pub mod config;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{resolve_db_path, GraphConfig, DB_PATH_ENV, DEFAULT_BACKLINKS_HEADER};
pub use db::{list_tables, open_note_store, StoreError, StoreResult, TableInfo};
pub use graph::{BacklinkEdge, BacklinkExtractor, GraphAssembler, TagHierarchy};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LoggingStatus,
};
pub use model::graph::{EdgeKind, Graph, GraphEdge, GraphNode, NodeId, NodeKind};
pub use model::note::{NoteId, NoteRecord, TagAssignment};
pub use repo::memory_repo::MemoryNoteSource;
pub use repo::note_repo::{NoteSource, SqliteNoteSource};
pub use service::graph_service::{build_graph, BuildFingerprint, GraphBuildError, GraphService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
