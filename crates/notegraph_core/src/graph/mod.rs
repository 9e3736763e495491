//! Graph construction core.
//!
//! # Responsibility
//! - Infer the tag forest from flat tag paths (`tag_hierarchy`).
//! - Detect note-to-note backlinks from raw note text (`backlinks`).
//! - Merge both into one pruned node/edge graph (`assembler`).
//!
//! # Invariants
//! - Every step is a pure function of its inputs.
//! - Pruning runs once, after all edges are known.

pub mod assembler;
pub mod backlinks;
pub mod tag_hierarchy;

pub use assembler::{assemble, GraphAssembler};
pub use backlinks::{reference_token, BacklinkEdge, BacklinkExtractor};
pub use tag_hierarchy::{split_tag_path, TagHierarchy};
