//! Tag forest inference from flat slash-delimited tag paths.
//!
//! # Responsibility
//! - Derive parent -> child containment edges from tag path prefix chains.
//! - Decide which tags are leaves and expose per-note leaf tag lists.
//!
//! # Invariants
//! - Containment is acyclic: every edge goes from a shorter prefix to a
//!   strictly longer one.
//! - A tag is a leaf iff it is the source of no containment edge.
//! - Paths with an empty segment contribute no edge.

use crate::model::note::{NoteId, TagAssignment};
use std::collections::{BTreeMap, BTreeSet};

const TAG_SEPARATOR: char = '/';

/// Containment forest plus per-note leaf tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagHierarchy {
    /// parent prefix -> child prefixes
    children: BTreeMap<String, BTreeSet<String>>,
    /// child prefix -> parent prefix
    parents: BTreeMap<String, String>,
    leaf_tags_by_note: BTreeMap<NoteId, Vec<String>>,
}

impl TagHierarchy {
    /// Builds the forest from every observed assignment.
    ///
    /// Blank tag paths are ignored. Per-note tag lists keep assignment order
    /// with duplicates removed, then drop every non-leaf tag.
    pub fn build(assignments: &[TagAssignment]) -> Self {
        let mut hierarchy = Self::default();

        let distinct_paths = assignments
            .iter()
            .map(|assignment| assignment.tag_path.as_str())
            .filter(|path| !path.trim().is_empty())
            .collect::<BTreeSet<_>>();
        for path in distinct_paths {
            hierarchy.insert_path(path);
        }

        let mut assigned: BTreeMap<NoteId, Vec<&str>> = BTreeMap::new();
        for assignment in assignments {
            let path = assignment.tag_path.as_str();
            if path.trim().is_empty() {
                continue;
            }
            let tags = assigned.entry(assignment.note_id).or_default();
            if !tags.contains(&path) {
                tags.push(path);
            }
        }

        for (note_id, tags) in assigned {
            let leaves = tags
                .into_iter()
                .filter(|tag| hierarchy.is_leaf(tag))
                .map(str::to_string)
                .collect::<Vec<_>>();
            if !leaves.is_empty() {
                hierarchy.leaf_tags_by_note.insert(note_id, leaves);
            }
        }

        hierarchy
    }

    fn insert_path(&mut self, path: &str) {
        let Some(segments) = split_tag_path(path) else {
            return;
        };
        if segments.len() < 2 {
            return;
        }

        for end in 1..segments.len() {
            let parent = segments[..end].join("/");
            let child = segments[..=end].join("/");
            self.parents.insert(child.clone(), parent.clone());
            self.children.entry(parent).or_default().insert(child);
        }
    }

    /// Whether `tag` has no nested child tag.
    pub fn is_leaf(&self, tag: &str) -> bool {
        self.children
            .get(tag)
            .map_or(true, |children| children.is_empty())
    }

    /// Direct parent of `tag` in the forest, if any.
    pub fn parent_of(&self, tag: &str) -> Option<&str> {
        self.parents.get(tag).map(String::as_str)
    }

    /// Direct children of `tag`, sorted.
    pub fn children_of(&self, tag: &str) -> impl Iterator<Item = &str> {
        self.children
            .get(tag)
            .into_iter()
            .flat_map(|children| children.iter().map(String::as_str))
    }

    /// Every tag that is an endpoint of a containment edge, sorted.
    pub fn forest_tags(&self) -> BTreeSet<&str> {
        self.children
            .keys()
            .chain(self.parents.keys())
            .map(String::as_str)
            .collect()
    }

    /// Containment edges as `(parent, child)` in lexicographic order.
    pub fn containment_edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.children.iter().flat_map(|(parent, children)| {
            children
                .iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }

    pub fn containment_edge_count(&self) -> usize {
        self.parents.len()
    }

    /// Leaf tags assigned to `note_id`, in assignment order.
    pub fn leaf_tags(&self, note_id: NoteId) -> &[String] {
        self.leaf_tags_by_note
            .get(&note_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Note id -> leaf tags, for every note with at least one leaf tag.
    pub fn leaf_tags_by_note(&self) -> &BTreeMap<NoteId, Vec<String>> {
        &self.leaf_tags_by_note
    }
}

/// Splits a tag path into segments; `None` when any segment is empty.
pub fn split_tag_path(path: &str) -> Option<Vec<&str>> {
    let segments = path.split(TAG_SEPARATOR).collect::<Vec<_>>();
    if segments.iter().any(|segment| segment.is_empty()) {
        return None;
    }
    Some(segments)
}
