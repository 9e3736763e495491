//! Abstract node/edge graph handed to the rendering layer.
//!
//! # Responsibility
//! - Define node/edge identities and their style tags.
//! - Carry the rendering colors used by the graph view as hints only.
//!
//! # Invariants
//! - Note ids and tag paths live in separate identity namespaces.
//! - A published `Graph` has no isolated node (enforced by the assembler).
//! - Node and edge order is deterministic for identical inputs.

use crate::model::note::NoteId;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};

const NOTE_NODE_COLOR: &str = "#453d3c";
const TAG_NODE_COLOR: &str = "#db230b";
const BACKLINK_EDGE_COLOR: &str = "#385385";
const CONTAINMENT_EDGE_COLOR: &str = "#d3d3d3";

/// Identity of one graph node.
///
/// Rendered as `note:<id>` or `tag:<path>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    Note(NoteId),
    Tag(String),
}

impl NodeId {
    pub fn tag(path: impl Into<String>) -> Self {
        Self::Tag(path.into())
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Note(id) => write!(f, "note:{id}"),
            Self::Tag(path) => write!(f, "tag:{path}"),
        }
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Node style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Note,
    Tag,
}

impl NodeKind {
    pub fn color(self) -> &'static str {
        match self {
            Self::Note => NOTE_NODE_COLOR,
            Self::Tag => TAG_NODE_COLOR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tag => "tag",
        }
    }
}

/// Edge style tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Parent tag prefix -> nested child tag.
    Containment,
    /// Leaf tag -> note carrying it.
    Assignment,
    /// Referencing note -> referenced note.
    Backlink,
}

impl EdgeKind {
    /// Returns `None` when the renderer default should be used.
    pub fn color(self) -> Option<&'static str> {
        match self {
            Self::Containment => Some(CONTAINMENT_EDGE_COLOR),
            Self::Assignment => None,
            Self::Backlink => Some(BACKLINK_EDGE_COLOR),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Assignment => "assignment",
            Self::Backlink => "backlink",
        }
    }
}

/// One graph node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: NodeId,
    /// Note title, or full tag path for tag nodes.
    pub label: String,
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn note(id: NoteId, title: impl Into<String>) -> Self {
        Self {
            id: NodeId::Note(id),
            label: title.into(),
            kind: NodeKind::Note,
        }
    }

    pub fn tag(path: &str) -> Self {
        Self {
            id: NodeId::tag(path),
            label: path.to_string(),
            kind: NodeKind::Tag,
        }
    }
}

impl Serialize for GraphNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GraphNode", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("color", self.kind.color())?;
        state.end()
    }
}

/// One directed graph edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }
}

impl Serialize for GraphEdge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GraphEdge", 4)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("target", &self.target)?;
        state.serialize_field("kind", &self.kind)?;
        state.serialize_field("color", &self.kind.color())?;
        state.end()
    }
}

/// Final pruned note/tag graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl Graph {
    pub(crate) fn from_parts(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self { nodes, edges }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Edges of one kind, in graph order.
    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// One-line size summary for status displays.
    pub fn summary(&self) -> String {
        format!(
            "There are {} nodes and {} edges",
            self.nodes.len(),
            self.edges.len()
        )
    }
}
