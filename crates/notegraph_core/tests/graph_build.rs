mod common;

use common::{bear_file, bear_in_memory, insert_note, link_notes, tag_note, trash_note};
use notegraph_core::{
    build_graph, open_note_store, EdgeKind, Graph, GraphBuildError, GraphConfig, GraphService,
    MemoryNoteSource, NodeId, NodeKind, NoteId, NoteRecord, NoteSource, SqliteNoteSource,
    StoreError, StoreResult, TagAssignment,
};
use rusqlite::Connection;
use std::cell::Cell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Note source that saves a new note through `writer` on its first inbound
/// link lookup, like the note app writing while a build is running.
struct ConcurrentWriteSource<'a> {
    inner: SqliteNoteSource<'a>,
    writer: &'a Connection,
    written: Cell<bool>,
}

impl ConcurrentWriteSource<'_> {
    fn write_once(&self) {
        if !self.written.replace(true) {
            insert_note(self.writer, 9, "Late", "[[B]]", 9.0);
            link_notes(self.writer, 9, 2);
        }
    }
}

impl NoteSource for ConcurrentWriteSource<'_> {
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>> {
        self.inner.fetch_all_notes()
    }

    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>> {
        self.inner.fetch_tag_assignments()
    }

    fn fetch_inbound_links(&self, note_id: NoteId) -> StoreResult<Vec<NoteRecord>> {
        self.write_once();
        self.inner.fetch_inbound_links(note_id)
    }

    fn content_digest(&self) -> StoreResult<u64> {
        self.inner.content_digest()
    }

    fn with_snapshot<T, E, F>(&self, read: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&Self) -> Result<T, E>,
    {
        self.inner.with_snapshot(|_| read(self))
    }
}

/// Note source whose inbound link lookups fail after notes were read.
struct FailingLinksSource {
    inner: MemoryNoteSource,
}

impl NoteSource for FailingLinksSource {
    fn fetch_all_notes(&self) -> StoreResult<Vec<NoteRecord>> {
        self.inner.fetch_all_notes()
    }

    fn fetch_tag_assignments(&self) -> StoreResult<Vec<TagAssignment>> {
        self.inner.fetch_tag_assignments()
    }

    fn fetch_inbound_links(&self, _note_id: NoteId) -> StoreResult<Vec<NoteRecord>> {
        Err(StoreError::DataSourceUnavailable {
            path: PathBuf::from("database.sqlite"),
            reason: "disk I/O error".to_string(),
        })
    }

    fn content_digest(&self) -> StoreResult<u64> {
        self.inner.content_digest()
    }
}

/// On-disk store in WAL mode plus an open writer connection.
fn wal_store(dir: &Path) -> (PathBuf, Connection) {
    let path = bear_file(dir, |conn| {
        insert_note(conn, 1, "A", "See [[B]]", 1.0);
        insert_note(conn, 2, "B", "", 2.0);
        link_notes(conn, 1, 2);
    });
    let writer = Connection::open(&path).unwrap();
    let mode: String = writer
        .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(mode, "wal");
    (path, writer)
}

fn build(conn: &Connection) -> Graph {
    let source = SqliteNoteSource::try_new(conn).unwrap();
    build_graph(source, &GraphConfig::default()).unwrap()
}

fn edge_pairs(graph: &Graph, kind: EdgeKind) -> Vec<(NodeId, NodeId)> {
    graph
        .edges_of_kind(kind)
        .map(|edge| (edge.source.clone(), edge.target.clone()))
        .collect()
}

fn assert_every_node_has_an_edge(graph: &Graph) {
    let endpoints = graph
        .edges()
        .iter()
        .flat_map(|edge| [&edge.source, &edge.target])
        .collect::<HashSet<_>>();
    for node in graph.nodes() {
        assert!(endpoints.contains(&node.id), "isolated node {}", node.id);
    }
}

#[test]
fn nested_tags_attach_only_the_leaf_to_the_note() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "N1", "body", 1.0);
    tag_note(&conn, 1, "work/clients/acme");
    tag_note(&conn, 1, "work/clients");

    let graph = build(&conn);
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Containment),
        vec![
            (NodeId::tag("work"), NodeId::tag("work/clients")),
            (NodeId::tag("work/clients"), NodeId::tag("work/clients/acme")),
        ]
    );
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Assignment),
        vec![(NodeId::tag("work/clients/acme"), NodeId::Note(1))]
    );
}

#[test]
fn backlink_before_annotation_section_is_detected() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "A", "See [[B]]\n## Backlinks", 1.0);
    insert_note(&conn, 2, "B", "# B", 2.0);
    link_notes(&conn, 1, 2);

    let graph = build(&conn);
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Backlink),
        vec![(NodeId::Note(1), NodeId::Note(2))]
    );
    assert_eq!(graph.node(&NodeId::Note(1)).unwrap().label, "A");
    assert_eq!(graph.node(&NodeId::Note(2)).unwrap().kind, NodeKind::Note);
}

#[test]
fn backlink_inside_annotation_section_is_ignored() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "A", "Intro\n## Backlinks\n* [[B]]", 1.0);
    insert_note(&conn, 2, "B", "# B", 2.0);
    link_notes(&conn, 1, 2);

    let graph = build(&conn);
    assert!(graph.is_empty());
}

#[test]
fn single_segment_tag_connects_without_containment() {
    let conn = bear_in_memory();
    insert_note(&conn, 3, "C", "misc things", 1.0);
    tag_note(&conn, 3, "misc");

    let graph = build(&conn);
    assert_eq!(graph.nodes().len(), 2);
    assert!(graph.contains_node(&NodeId::Note(3)));
    assert_eq!(graph.node(&NodeId::tag("misc")).unwrap().kind, NodeKind::Tag);
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Assignment),
        vec![(NodeId::tag("misc"), NodeId::Note(3))]
    );
    assert!(graph
        .edges()
        .iter()
        .all(|edge| edge.kind != EdgeKind::Containment));
}

#[test]
fn note_tagged_only_with_ancestor_is_pruned() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "Leaf holder", "", 1.0);
    insert_note(&conn, 4, "D", "", 2.0);
    tag_note(&conn, 1, "projects/alpha");
    tag_note(&conn, 4, "projects");

    let graph = build(&conn);
    assert!(!graph.contains_node(&NodeId::Note(4)));
    assert!(graph.contains_node(&NodeId::tag("projects")));
    assert_every_node_has_an_edge(&graph);
}

#[test]
fn trashed_notes_never_appear() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "Live", "[[Target]]", 1.0);
    insert_note(&conn, 2, "Target", "", 2.0);
    insert_note(&conn, 3, "Trashed", "[[Target]]", 3.0);
    tag_note(&conn, 3, "old");
    link_notes(&conn, 1, 2);
    link_notes(&conn, 3, 2);
    trash_note(&conn, 3);

    let graph = build(&conn);
    assert!(!graph.contains_node(&NodeId::Note(3)));
    assert!(!graph.contains_node(&NodeId::tag("old")));
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Backlink),
        vec![(NodeId::Note(1), NodeId::Note(2))]
    );
}

#[test]
fn backlinks_for_one_target_follow_creation_order() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "Hub", "", 1.0);
    insert_note(&conn, 2, "Late", "[[Hub]]", 500.0);
    insert_note(&conn, 3, "Early", "[[Hub]]", 100.0);
    insert_note(&conn, 4, "Middle", "[[Hub]]", 250.0);
    for source in [2, 3, 4] {
        link_notes(&conn, source, 1);
    }

    let graph = build(&conn);
    let sources = graph
        .edges_of_kind(EdgeKind::Backlink)
        .map(|edge| edge.source.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        sources,
        vec![NodeId::Note(3), NodeId::Note(4), NodeId::Note(2)]
    );
    assert!(graph
        .edges_of_kind(EdgeKind::Backlink)
        .all(|edge| edge.target == NodeId::Note(1)));
}

#[test]
fn rebuilding_unchanged_store_is_identical() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "A", "[[B]] [[C]]", 1.0);
    insert_note(&conn, 2, "B", "[[C]]\n## Backlinks\n[[A]]", 2.0);
    insert_note(&conn, 3, "C", "", 3.0);
    insert_note(&conn, 4, "Orphan", "", 4.0);
    tag_note(&conn, 1, "work/clients/acme");
    tag_note(&conn, 2, "work/internal");
    tag_note(&conn, 2, "work");
    tag_note(&conn, 3, "misc");
    tag_note(&conn, 3, "broken//path");
    link_notes(&conn, 1, 2);
    link_notes(&conn, 1, 3);
    link_notes(&conn, 2, 3);
    link_notes(&conn, 2, 1);

    let first = build(&conn);
    let second = build(&conn);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_every_node_has_an_edge(&first);
    assert!(!first.contains_node(&NodeId::Note(4)));
    assert!(first.contains_node(&NodeId::tag("broken//path")));
    assert_eq!(edge_pairs(&first, EdgeKind::Backlink).len(), 3);
}

#[test]
fn graph_serializes_for_the_renderer() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "A", "[[B]]", 1.0);
    insert_note(&conn, 2, "B", "", 2.0);
    tag_note(&conn, 2, "topics/rust");
    link_notes(&conn, 1, 2);

    let json = serde_json::to_value(build(&conn)).unwrap();
    let nodes = json["nodes"].as_array().unwrap();
    let edges = json["edges"].as_array().unwrap();
    assert_eq!(nodes.len(), 4);
    assert_eq!(edges.len(), 3);
    assert_eq!(nodes[0]["id"], "note:2");
    assert_eq!(nodes[0]["color"], "#453d3c");
    assert!(edges
        .iter()
        .any(|edge| edge["kind"] == "containment" && edge["source"] == "tag:topics"));
}

#[test]
fn fingerprint_is_stable_until_the_store_changes() {
    let conn = bear_in_memory();
    insert_note(&conn, 1, "A", "[[B]]", 1.0);
    insert_note(&conn, 2, "B", "", 2.0);
    link_notes(&conn, 1, 2);
    let config = GraphConfig::default();

    let service = GraphService::new(SqliteNoteSource::try_new(&conn).unwrap());
    let first = service.fingerprint(&config).unwrap();
    assert_eq!(first, service.fingerprint(&config).unwrap());

    link_notes(&conn, 2, 1);
    assert_ne!(first, service.fingerprint(&config).unwrap());
}

#[test]
fn missing_store_surfaces_as_data_source_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_note_store(dir.path().join("missing.sqlite"))
        .map_err(GraphBuildError::from)
        .err()
        .unwrap();
    assert!(matches!(err, GraphBuildError::DataSourceUnavailable(_)));
    assert!(err.to_string().contains("data source unavailable"));
}

#[test]
fn build_from_file_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = bear_file(dir.path(), |conn| {
        insert_note(conn, 1, "A", "See [[B]]\n## Backlinks", 1.0);
        insert_note(conn, 2, "B", "", 2.0);
        tag_note(conn, 2, "misc");
        link_notes(conn, 1, 2);
    });

    let conn = open_note_store(&path).unwrap();
    let graph = build(&conn);
    assert_eq!(graph.summary(), "There are 3 nodes and 2 edges");
}

#[test]
fn build_reads_one_point_in_time_view() {
    let dir = tempfile::tempdir().unwrap();
    let (path, writer) = wal_store(dir.path());
    let reader = open_note_store(&path).unwrap();
    let source = ConcurrentWriteSource {
        inner: SqliteNoteSource::try_new(&reader).unwrap(),
        writer: &writer,
        written: Cell::new(false),
    };

    let graph = build_graph(&source, &GraphConfig::default()).unwrap();
    assert!(source.written.get());
    assert!(!graph.contains_node(&NodeId::Note(9)));
    assert_eq!(
        edge_pairs(&graph, EdgeKind::Backlink),
        vec![(NodeId::Note(1), NodeId::Note(2))]
    );

    let later = build(&reader);
    assert!(later.contains_node(&NodeId::Note(9)));
}

#[test]
fn fingerprint_and_build_share_one_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let (path, writer) = wal_store(dir.path());
    let reader = open_note_store(&path).unwrap();
    let service = GraphService::new(SqliteNoteSource::try_new(&reader).unwrap());
    let config = GraphConfig::default();

    let (before, after, graph) = service
        .with_snapshot(|service| {
            let before = service.fingerprint(&config)?;
            insert_note(&writer, 9, "Late", "[[B]]", 9.0);
            link_notes(&writer, 9, 2);
            let after = service.fingerprint(&config)?;
            let graph = service.build_graph(&config)?;
            Ok((before, after, graph))
        })
        .unwrap();
    assert_eq!(before, after);
    assert!(!graph.contains_node(&NodeId::Note(9)));

    assert_ne!(service.fingerprint(&config).unwrap(), before);
}

#[test]
fn failed_read_mid_build_returns_no_graph() {
    let mut inner = MemoryNoteSource::new();
    inner
        .add_note(NoteRecord::new(1, "U1", "A", "[[B]]"), 1)
        .add_note(NoteRecord::new(2, "U2", "B", ""), 2)
        .add_tag(2, "misc")
        .add_link(1, 2);
    let source = FailingLinksSource { inner };

    let err = build_graph(&source, &GraphConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        GraphBuildError::DataSourceUnavailable(StoreError::DataSourceUnavailable { .. })
    ));
}
