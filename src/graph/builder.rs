use super::catalog::{ClassIdCatalog, BEHAVIOUR_CLASS_ID, TRANSFORM_CLASS_ID};
use super::document::{
    reference_file_id, reference_guid, scalar_text, split_documents, DocumentError, RecordKind,
    SceneDocument,
};
use super::node::{BehaviourRecord, FileId, Guid, ROOT_FILE_ID};
use super::{SceneError, SceneGraph};
use serde_yaml::Value;
use std::path::Path;
use tracing::{debug, trace};

/// Prefix of engine-owned fields that never hold script references
pub const RESERVED_FIELD_PREFIX: &str = "m_";

/// Field of a behaviour naming the script it instantiates
const SCRIPT_FIELD: &str = "m_Script";

/// How deep nested serializable structures are searched for references
const MAX_FIELD_NESTING: usize = 32;

/// Builds a `SceneGraph` from a scene file in two passes: class ids first,
/// then objects, transforms and behaviours.
pub struct SceneGraphBuilder;

impl SceneGraphBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a scene file
    pub fn parse_file(&self, path: &Path) -> Result<SceneGraph, SceneError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let mut graph = self.parse_str(&name, &contents);
        graph.path = Some(path.to_path_buf());
        Ok(graph)
    }

    /// Parse scene content. Malformed documents are skipped, never fatal.
    pub fn parse_str(&self, name: &str, contents: &str) -> SceneGraph {
        let documents = split_documents(contents);
        let catalog = ClassIdCatalog::build(&documents);
        let mut graph = SceneGraph::new(name, None, catalog);

        for raw in &documents {
            let result = raw.parse().and_then(|doc| self.visit(&mut graph, &doc));
            if let Err(e) = result {
                debug!("{}: skipping document: {}", name, e);
                graph.mark_skipped();
            }
        }

        debug!(
            "Parsed scene {}: {} documents, {} objects, {} behaviours, {} skipped",
            name,
            documents.len(),
            graph.node_count(),
            graph.behaviour_count(),
            graph.skipped_documents()
        );

        graph
    }

    fn visit(&self, graph: &mut SceneGraph, doc: &SceneDocument) -> Result<(), DocumentError> {
        match doc.kind {
            RecordKind::Object => self.visit_object(graph, doc),
            RecordKind::Transform => self.visit_transform(graph, doc),
            RecordKind::Behaviour => self.visit_behaviour(graph, doc),
            RecordKind::Other => Ok(()),
        }
    }

    /// Name the node keyed by this object's transform component
    fn visit_object(&self, graph: &mut SceneGraph, doc: &SceneDocument) -> Result<(), DocumentError> {
        let components = doc
            .field("m_Component")
            .and_then(Value::as_sequence)
            .ok_or(DocumentError::MissingField {
                file_id: doc.file_id,
                field: "m_Component",
            })?;

        let name = match doc.field("m_Name") {
            Some(Value::Null) => Some(String::new()),
            Some(value) => scalar_text(value),
            None => None,
        }
        .ok_or(DocumentError::MissingField {
                file_id: doc.file_id,
                field: "m_Name",
            })?;

        let transform = components
            .iter()
            .filter_map(component_file_id)
            .find(|&id| graph.catalog().is_class(id, TRANSFORM_CLASS_ID));

        match transform {
            Some(transform_id) => {
                graph.node_or_stub(transform_id).name = name;
            }
            None => {
                debug!("Object '{}' (&{}) has no transform, dropping it", name, doc.file_id);
            }
        }

        Ok(())
    }

    /// Link the node keyed by this transform to its parent and children
    fn visit_transform(&self, graph: &mut SceneGraph, doc: &SceneDocument) -> Result<(), DocumentError> {
        let parent = doc
            .field("m_Father")
            .and_then(reference_file_id)
            .ok_or(DocumentError::MissingField {
                file_id: doc.file_id,
                field: "m_Father",
            })?;

        let children: Vec<FileId> = doc
            .field("m_Children")
            .and_then(Value::as_sequence)
            .map(|seq| seq.iter().filter_map(reference_file_id).collect())
            .unwrap_or_default();

        let node = graph.node_or_stub(doc.file_id);
        node.parent = parent;
        node.children.extend(children);

        Ok(())
    }

    /// Record the script a behaviour instantiates and the scripts its fields point at
    fn visit_behaviour(&self, graph: &mut SceneGraph, doc: &SceneDocument) -> Result<(), DocumentError> {
        let script = doc
            .field(SCRIPT_FIELD)
            .and_then(reference_guid)
            .map(Guid::new)
            .filter(|guid| !guid.is_empty())
            .ok_or(DocumentError::MissingField {
                file_id: doc.file_id,
                field: "m_Script.guid",
            })?;

        let mut record = BehaviourRecord::new(doc.file_id, script);

        for (key, value) in &doc.fields {
            let Some(field) = key.as_str() else {
                continue;
            };
            if field == SCRIPT_FIELD || field.starts_with(RESERVED_FIELD_PREFIX) {
                continue;
            }
            self.collect_references(graph, value, field, &mut record, 0);
        }

        trace!(
            "Behaviour &{} ({}) holds {} script references",
            record.file_id,
            record.script,
            record.serialized_fields_by_guid.len()
        );

        graph.add_behaviour(record);
        Ok(())
    }

    /// Find script references inside a field value, attributing every one of
    /// them to the top-level field name
    fn collect_references(
        &self,
        graph: &SceneGraph,
        value: &Value,
        field: &str,
        record: &mut BehaviourRecord,
        depth: usize,
    ) {
        if depth > MAX_FIELD_NESTING {
            return;
        }

        match value {
            Value::Mapping(map) => {
                if map.contains_key("guid") {
                    if let Some(guid) = reference_guid(value) {
                        record.add_reference(Guid::new(guid), field);
                    }
                } else if map.contains_key("fileID") {
                    if let Some(guid) = self.resolve_local_behaviour(graph, value) {
                        record.add_reference(guid, field);
                    }
                } else {
                    for nested in map.values() {
                        self.collect_references(graph, nested, field, record, depth + 1);
                    }
                }
            }
            Value::Sequence(items) => {
                for item in items {
                    self.collect_references(graph, item, field, record, depth + 1);
                }
            }
            Value::Tagged(tagged) => {
                self.collect_references(graph, &tagged.value, field, record, depth + 1);
            }
            _ => {}
        }
    }

    /// Resolve an intra-scene `{fileID: n}` reference to the script of the
    /// behaviour it points at. Behaviours not visited yet resolve to nothing.
    fn resolve_local_behaviour(&self, graph: &SceneGraph, value: &Value) -> Option<Guid> {
        let file_id = reference_file_id(value)?;
        if file_id == ROOT_FILE_ID || !graph.catalog().is_class(file_id, BEHAVIOUR_CLASS_ID) {
            return None;
        }
        graph.behaviour(file_id).map(|b| b.script.clone())
    }
}

impl Default for SceneGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Target of one `m_Component` entry. Current files write
/// `- component: {fileID: n}`, older ones key the entry by class id.
fn component_file_id(entry: &Value) -> Option<FileId> {
    let map = entry.as_mapping()?;
    match map.get("component") {
        Some(component) => reference_file_id(component),
        None => map.values().next().and_then(reference_file_id),
    }
}
