//! Graph assembly from tag hierarchy and backlink results.
//!
//! # Responsibility
//! - Merge assignment, backlink and containment edges into one graph.
//! - Deduplicate nodes and edges by identity.
//! - Prune isolated nodes once every edge is known.
//!
//! # Invariants
//! - Only leaf tags produce assignment edges.
//! - Edges referencing notes outside the note set are dropped, not fatal.
//! - `finish` is the only place nodes are removed.

use crate::graph::backlinks::BacklinkEdge;
use crate::graph::tag_hierarchy::TagHierarchy;
use crate::model::graph::{EdgeKind, Graph, GraphEdge, GraphNode, NodeId};
use crate::model::note::{NoteId, NoteRecord};
use std::collections::{BTreeMap, HashSet};

/// Incremental graph builder over one note set.
pub struct GraphAssembler<'n> {
    notes: &'n [NoteRecord],
    titles: BTreeMap<NoteId, &'n str>,
    nodes: Vec<GraphNode>,
    node_ids: HashSet<NodeId>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<GraphEdge>,
    dangling: usize,
}

impl<'n> GraphAssembler<'n> {
    pub fn new(notes: &'n [NoteRecord]) -> Self {
        let titles = notes
            .iter()
            .map(|note| (note.id, note.title.as_str()))
            .collect();
        Self {
            notes,
            titles,
            nodes: Vec::new(),
            node_ids: HashSet::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            dangling: 0,
        }
    }

    /// Adds one note node and one assignment edge per leaf tag, for every
    /// note carrying at least one leaf tag.
    ///
    /// Leaf tags assigned to ids outside the note set are counted as
    /// dangling and skipped.
    pub fn add_assignments(&mut self, hierarchy: &TagHierarchy) {
        for note in self.notes {
            let tags = hierarchy.leaf_tags(note.id);
            if tags.is_empty() {
                continue;
            }
            self.push_node(GraphNode::note(note.id, note.title.as_str()));
            for tag in tags {
                self.push_node(GraphNode::tag(tag));
                self.push_edge(GraphEdge::new(
                    NodeId::tag(tag.as_str()),
                    NodeId::Note(note.id),
                    EdgeKind::Assignment,
                ));
            }
        }

        self.dangling += hierarchy
            .leaf_tags_by_note()
            .iter()
            .filter(|(note_id, _)| !self.titles.contains_key(note_id))
            .map(|(_, tags)| tags.len())
            .sum::<usize>();
    }

    /// Adds backlink edges and ensures both endpoints exist as note nodes.
    ///
    /// Edges with either endpoint outside the note set are counted as
    /// dangling.
    pub fn add_backlinks(&mut self, backlinks: &[BacklinkEdge]) {
        for backlink in backlinks {
            let (Some(source_title), Some(target_title)) = (
                self.titles.get(&backlink.source).copied(),
                self.titles.get(&backlink.target).copied(),
            ) else {
                self.dangling += 1;
                continue;
            };

            self.push_node(GraphNode::note(backlink.source, source_title));
            self.push_node(GraphNode::note(backlink.target, target_title));
            self.push_edge(GraphEdge::new(
                NodeId::Note(backlink.source),
                NodeId::Note(backlink.target),
                EdgeKind::Backlink,
            ));
        }
    }

    /// Adds every forest tag as a node and every containment edge.
    pub fn add_containment(&mut self, hierarchy: &TagHierarchy) {
        for tag in hierarchy.forest_tags() {
            self.push_node(GraphNode::tag(tag));
        }
        for (parent, child) in hierarchy.containment_edges() {
            self.push_edge(GraphEdge::new(
                NodeId::tag(parent),
                NodeId::tag(child),
                EdgeKind::Containment,
            ));
        }
    }

    /// Number of assignments/backlinks dropped for referencing unknown notes.
    pub fn dangling_count(&self) -> usize {
        self.dangling
    }

    /// Prunes nodes without incident edges and publishes the graph.
    pub fn finish(self) -> Graph {
        let connected = self
            .edges
            .iter()
            .flat_map(|edge| [&edge.source, &edge.target])
            .collect::<HashSet<_>>();
        let nodes = self
            .nodes
            .iter()
            .filter(|node| connected.contains(&node.id))
            .cloned()
            .collect::<Vec<_>>();
        Graph::from_parts(nodes, self.edges)
    }

    fn push_node(&mut self, node: GraphNode) {
        if self.node_ids.insert(node.id.clone()) {
            self.nodes.push(node);
        }
    }

    fn push_edge(&mut self, edge: GraphEdge) {
        if self.edge_keys.insert(edge.clone()) {
            self.edges.push(edge);
        }
    }
}

/// Assembles the final graph in one call: assignments, then backlinks,
/// then containment, then pruning.
pub fn assemble(
    notes: &[NoteRecord],
    hierarchy: &TagHierarchy,
    backlinks: &[BacklinkEdge],
) -> Graph {
    let mut assembler = GraphAssembler::new(notes);
    assembler.add_assignments(hierarchy);
    assembler.add_backlinks(backlinks);
    assembler.add_containment(hierarchy);
    assembler.finish()
}
