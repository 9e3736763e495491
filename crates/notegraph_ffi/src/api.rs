//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Flatten graph results into plain string records for the graph view.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in-band through response envelopes.
//! - Graph builds share one process-wide memo.

use crate::cache::GraphCache;
use log::warn;
use notegraph_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_note_store,
    ping as ping_inner, resolve_db_path, Graph, GraphBuildError, GraphConfig, GraphEdge, GraphNode,
    GraphService, SqliteNoteSource,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static GRAPH_CACHE: OnceLock<Mutex<GraphCache>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Reconfiguration attempts with different level or directory return error.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Graph node as seen by the graph view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNodeItem {
    /// `note:<id>` or `tag:<path>`.
    pub id: String,
    pub label: String,
    /// `note|tag`.
    pub kind: String,
    pub color: String,
}

/// Directed graph edge as seen by the graph view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdgeItem {
    pub source: String,
    pub target: String,
    /// `containment|assignment|backlink`.
    pub kind: String,
    /// `None` means renderer default.
    pub color: Option<String>,
}

/// Response envelope for graph builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphResponse {
    /// Whether the build succeeded.
    pub ok: bool,
    pub nodes: Vec<GraphNodeItem>,
    pub edges: Vec<GraphEdgeItem>,
    /// Summary line on success, error description on failure.
    pub message: String,
    /// Whether the graph was served from the memo.
    pub cached: bool,
}

impl GraphResponse {
    fn success(graph: &Graph, cached: bool) -> Self {
        Self {
            ok: true,
            nodes: graph.nodes().iter().map(to_node_item).collect(),
            edges: graph.edges().iter().map(to_edge_item).collect(),
            message: graph.summary(),
            cached,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            message: message.into(),
            cached: false,
        }
    }
}

/// Builds the note/tag graph from a Bear database.
///
/// Input semantics:
/// - `db_path`: store location; `None` or blank falls back to
///   `NOTEGRAPH_DB_PATH`, then Bear's default location.
/// - `backlinks_header`: annotation delimiter; `None` uses `\n## Backlinks`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unchanged store and header are served from the memo (`cached = true`).
#[flutter_rust_bridge::frb(sync)]
pub fn graph_build(db_path: Option<String>, backlinks_header: Option<String>) -> GraphResponse {
    let cache = GRAPH_CACHE.get_or_init(|| Mutex::new(GraphCache::new()));
    graph_build_with(cache, db_path, backlinks_header)
}

fn graph_build_with(
    cache: &Mutex<GraphCache>,
    db_path: Option<String>,
    backlinks_header: Option<String>,
) -> GraphResponse {
    let explicit = db_path
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from);
    let Some(path) = resolve_db_path(explicit) else {
        return GraphResponse::failure("graph_build failed: no note store path could be resolved");
    };
    let config = backlinks_header
        .map(GraphConfig::with_backlinks_header)
        .unwrap_or_default();

    let conn = match open_note_store(&path) {
        Ok(conn) => conn,
        Err(err) => return build_failure(err.into()),
    };
    let source = match SqliteNoteSource::try_new(&conn) {
        Ok(source) => source,
        Err(err) => return build_failure(err.into()),
    };
    let service = GraphService::new(source);

    let mut guard = cache.lock().unwrap_or_else(|poisoned| {
        warn!("event=graph_cache module=ffi status=degraded reason=poisoned");
        poisoned.into_inner()
    });
    match guard.get_or_build(&service, &config) {
        Ok(result) => GraphResponse::success(&result.graph, result.cached),
        Err(err) => build_failure(err),
    }
}

fn build_failure(err: GraphBuildError) -> GraphResponse {
    warn!("event=graph_build module=ffi status=error error={err}");
    GraphResponse::failure(format!("graph_build failed: {err}"))
}

fn to_node_item(node: &GraphNode) -> GraphNodeItem {
    GraphNodeItem {
        id: node.id.to_string(),
        label: node.label.clone(),
        kind: node.kind.as_str().to_string(),
        color: node.kind.color().to_string(),
    }
}

fn to_edge_item(edge: &GraphEdge) -> GraphEdgeItem {
    GraphEdgeItem {
        source: edge.source.to_string(),
        target: edge.target.to_string(),
        kind: edge.kind.as_str().to_string(),
        color: edge.kind.color().map(str::to_string),
    }
}
