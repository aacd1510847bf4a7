//! Semantic element mapping.
//!
//! A snapshot of the render tree is walked host-side: the visibility
//! oracle prunes it, the classifier picks interactive elements, the ID
//! allocator names them and the walker renders the manifest.

pub mod cache;
pub mod classify;
pub mod labels;
pub mod manifest;
pub mod semantic_id;
pub mod snapshot;
pub mod visibility;
pub mod walker;

pub use cache::ManifestCache;
pub use classify::{classify, ActionKind, Classification, TagKind};
pub use manifest::{CurrentValue, InteractiveElement, Manifest, ManifestDiff};
pub use semantic_id::{slugify, IdAllocator};
pub use snapshot::{DomTree, ElementNode, SnapshotNode, StyleInfo};
pub use visibility::is_visible;
pub use walker::{ElementTag, PageWalker, WalkOutput};
