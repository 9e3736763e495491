//! Graph build use-case service.
//!
//! # Responsibility
//! - Orchestrate note source reads, tag hierarchy inference, backlink
//!   extraction and graph assembly into one batch build.
//! - Compute the fingerprint callers use to memoize builds.
//!
//! # Invariants
//! - A build either returns a complete graph or an error; never a partial one.
//! - A build is a pure function of source contents and `GraphConfig`.
//! - Logged events carry counts and timings only, never note content.

use crate::config::GraphConfig;
use crate::db::StoreError;
use crate::graph::{BacklinkExtractor, GraphAssembler, TagHierarchy};
use crate::model::graph::Graph;
use crate::repo::note_repo::NoteSource;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use xxhash_rust::xxh3::xxh3_64;

/// Service error for graph builds.
#[derive(Debug)]
pub enum GraphBuildError {
    /// Note store could not be opened, validated, or read.
    DataSourceUnavailable(StoreError),
    /// Build options are unusable.
    InvalidConfig(String),
}

impl Display for GraphBuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DataSourceUnavailable(err) => write!(f, "data source unavailable: {err}"),
            Self::InvalidConfig(message) => write!(f, "invalid graph config: {message}"),
        }
    }
}

impl Error for GraphBuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataSourceUnavailable(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<StoreError> for GraphBuildError {
    fn from(value: StoreError) -> Self {
        Self::DataSourceUnavailable(value)
    }
}

/// Memoization key for one build: store content plus build options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuildFingerprint {
    source_digest: u64,
    config_digest: u64,
}

impl BuildFingerprint {
    pub fn new(source_digest: u64, config: &GraphConfig) -> Self {
        Self {
            source_digest,
            config_digest: xxh3_64(config.backlinks_header.as_bytes()),
        }
    }

    pub fn source_digest(&self) -> u64 {
        self.source_digest
    }
}

impl Display for BuildFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}-{:016x}", self.source_digest, self.config_digest)
    }
}

/// Graph build service over one note source.
pub struct GraphService<S: NoteSource> {
    source: S,
}

impl<S: NoteSource> GraphService<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fingerprint of the current source contents under `config`.
    pub fn fingerprint(&self, config: &GraphConfig) -> Result<BuildFingerprint, GraphBuildError> {
        let digest = self
            .source
            .with_snapshot(|source| source.content_digest())?;
        Ok(BuildFingerprint::new(digest, config))
    }

    /// Runs several service calls against one point-in-time view of the
    /// source, e.g. a fingerprint followed by the build it keys.
    pub fn with_snapshot<T>(
        &self,
        read: impl FnOnce(&Self) -> Result<T, GraphBuildError>,
    ) -> Result<T, GraphBuildError> {
        self.source.with_snapshot(|_| read(self))
    }

    /// Builds the pruned note/tag graph from one point-in-time read.
    ///
    /// # Errors
    /// - `InvalidConfig` when `config` fails validation.
    /// - `DataSourceUnavailable` when any source read fails.
    pub fn build_graph(&self, config: &GraphConfig) -> Result<Graph, GraphBuildError> {
        let started_at = Instant::now();
        info!("event=graph_build module=service status=start");

        let result = self.with_snapshot(|service| service.build_inner(config));
        match &result {
            Ok(graph) => info!(
                "event=graph_build module=service status=ok nodes={} edges={} duration_ms={}",
                graph.nodes().len(),
                graph.edges().len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=graph_build module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn build_inner(&self, config: &GraphConfig) -> Result<Graph, GraphBuildError> {
        config.validate().map_err(GraphBuildError::InvalidConfig)?;

        let notes = self.source.fetch_all_notes()?;
        let assignments = self.source.fetch_tag_assignments()?;
        let hierarchy = TagHierarchy::build(&assignments);
        debug!(
            "event=tag_hierarchy module=service status=ok notes={} assignments={} containment_edges={}",
            notes.len(),
            assignments.len(),
            hierarchy.containment_edge_count()
        );

        let extractor = BacklinkExtractor::new(&config.backlinks_header);
        let mut backlinks = Vec::new();
        for note in &notes {
            let candidates = self.source.fetch_inbound_links(note.id)?;
            backlinks.extend(extractor.extract(note, &candidates));
        }

        let mut assembler = GraphAssembler::new(&notes);
        assembler.add_assignments(&hierarchy);
        assembler.add_backlinks(&backlinks);
        assembler.add_containment(&hierarchy);
        if assembler.dangling_count() > 0 {
            debug!(
                "event=graph_assemble module=service status=degraded dangling_refs={}",
                assembler.dangling_count()
            );
        }

        Ok(assembler.finish())
    }
}

/// Builds the graph from `source` in one call.
pub fn build_graph(
    source: impl NoteSource,
    config: &GraphConfig,
) -> Result<Graph, GraphBuildError> {
    GraphService::new(source).build_graph(config)
}
