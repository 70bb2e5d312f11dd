mod builder;
mod catalog;
pub mod document;
mod node;

pub use builder::{SceneGraphBuilder, RESERVED_FIELD_PREFIX};
pub use catalog::{ClassIdCatalog, BEHAVIOUR_CLASS_ID, TRANSFORM_CLASS_ID};
pub use document::{DocumentError, RawDocument, RecordKind, SceneDocument};
pub use node::{BehaviourRecord, ClassId, FileId, GameObjectNode, Guid, ROOT_FILE_ID};

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that make a whole scene file unusable
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Object hierarchy and attached behaviours of one scene.
///
/// Nodes and behaviours are addressed by document anchor; no record holds a
/// reference to another, so parent/child links are plain ids into `nodes`.
/// Immutable once the builder returns it.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// Scene file name, e.g. `Main.unity`
    name: String,

    /// Source file, if parsed from disk
    path: Option<PathBuf>,

    /// Anchor -> class id, from the first pass
    catalog: ClassIdCatalog,

    /// Game objects keyed by transform anchor
    nodes: BTreeMap<FileId, GameObjectNode>,

    /// Attached behaviours in visitation order
    behaviours: Vec<BehaviourRecord>,

    /// Behaviour anchor -> index into `behaviours`
    behaviour_index: HashMap<FileId, usize>,

    /// Documents skipped in the second pass
    skipped_documents: usize,
}

impl SceneGraph {
    pub(crate) fn new(name: impl Into<String>, path: Option<PathBuf>, catalog: ClassIdCatalog) -> Self {
        Self {
            name: name.into(),
            path,
            catalog,
            nodes: BTreeMap::new(),
            behaviours: Vec::new(),
            behaviour_index: HashMap::new(),
            skipped_documents: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn catalog(&self) -> &ClassIdCatalog {
        &self.catalog
    }

    pub fn node(&self, id: FileId) -> Option<&GameObjectNode> {
        self.nodes.get(&id)
    }

    /// All nodes, ordered by id
    pub fn nodes(&self) -> impl Iterator<Item = &GameObjectNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes without a parent, ordered by id
    pub fn roots(&self) -> impl Iterator<Item = &GameObjectNode> {
        self.nodes.values().filter(|node| node.is_root())
    }

    pub fn behaviours(&self) -> &[BehaviourRecord] {
        &self.behaviours
    }

    /// Behaviour recorded for the given anchor
    pub fn behaviour(&self, file_id: FileId) -> Option<&BehaviourRecord> {
        self.behaviour_index
            .get(&file_id)
            .and_then(|&index| self.behaviours.get(index))
    }

    pub fn behaviour_count(&self) -> usize {
        self.behaviours.len()
    }

    /// Whether some behaviour in this scene instantiates the given script
    pub fn has_attached(&self, script: &Guid) -> bool {
        !script.is_empty() && self.behaviours.iter().any(|b| &b.script == script)
    }

    pub fn skipped_documents(&self) -> usize {
        self.skipped_documents
    }

    pub(crate) fn node_or_stub(&mut self, id: FileId) -> &mut GameObjectNode {
        self.nodes
            .entry(id)
            .or_insert_with(|| GameObjectNode::stub(id))
    }

    pub(crate) fn add_behaviour(&mut self, record: BehaviourRecord) {
        let index = self.behaviours.len();
        self.behaviour_index.insert(record.file_id, index);
        self.behaviours.push(record);
    }

    pub(crate) fn mark_skipped(&mut self) {
        self.skipped_documents += 1;
    }
}
