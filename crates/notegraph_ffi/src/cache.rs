//! Single-slot graph build memo.
//!
//! # Responsibility
//! - Serve repeated builds of an unchanged store from memory.
//!
//! # Invariants
//! - The slot holds at most one graph, tagged with the fingerprint it was
//!   built under.
//! - A fingerprint mismatch rebuilds and replaces the slot; a failed build
//!   leaves the previous slot untouched.

use log::debug;
use notegraph_core::{
    BuildFingerprint, Graph, GraphBuildError, GraphConfig, GraphService, NoteSource,
};

/// Memo of the most recent successful build.
#[derive(Debug, Default)]
pub struct GraphCache {
    slot: Option<(BuildFingerprint, Graph)>,
}

/// Graph returned by the cache and whether it was served from the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedGraph {
    pub graph: Graph,
    pub cached: bool,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized graph when `service` still fingerprints to the
    /// slot's key, otherwise builds and stores a fresh one.
    ///
    /// Fingerprint and build share one source snapshot.
    pub fn get_or_build<S: NoteSource>(
        &mut self,
        service: &GraphService<S>,
        config: &GraphConfig,
    ) -> Result<CachedGraph, GraphBuildError> {
        config.validate().map_err(GraphBuildError::InvalidConfig)?;
        service.with_snapshot(|service| self.lookup_or_build(service, config))
    }

    fn lookup_or_build<S: NoteSource>(
        &mut self,
        service: &GraphService<S>,
        config: &GraphConfig,
    ) -> Result<CachedGraph, GraphBuildError> {
        let fingerprint = service.fingerprint(config)?;

        if let Some((key, graph)) = &self.slot {
            if *key == fingerprint {
                debug!("event=graph_cache module=ffi status=hit fingerprint={fingerprint}");
                return Ok(CachedGraph {
                    graph: graph.clone(),
                    cached: true,
                });
            }
        }

        debug!("event=graph_cache module=ffi status=miss fingerprint={fingerprint}");
        let graph = service.build_graph(config)?;
        self.slot = Some((fingerprint, graph.clone()));
        Ok(CachedGraph {
            graph,
            cached: false,
        })
    }

    pub fn fingerprint(&self) -> Option<BuildFingerprint> {
        self.slot.as_ref().map(|(key, _)| *key)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
