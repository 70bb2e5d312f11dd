use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Anchor of a document inside one scene file (`&1234` in the document header)
pub type FileId = i64;

/// Numeric class identifier from a document's type tag (`!u!4` -> 4)
pub type ClassId = i32;

/// Anchor value meaning "no parent"
pub const ROOT_FILE_ID: FileId = 0;

/// Stable identity correlating a script asset with its instances in scenes
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Identity of a script whose companion identity file could not be read
    pub fn empty() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A game object in the scene hierarchy.
///
/// Nodes are keyed by the anchor of their transform record rather than their
/// own anchor, because parent/child links live on the transform. Either the
/// object record or the transform record may be visited first, so a node can
/// start as a stub and be completed by the other visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObjectNode {
    /// Anchor of the attached transform record
    pub id: FileId,

    /// Display name (`m_Name`)
    pub name: String,

    /// Transform anchor of the parent, `ROOT_FILE_ID` for roots
    pub parent: FileId,

    /// Transform anchors of the children, in declaration order
    pub children: Vec<FileId>,
}

impl GameObjectNode {
    pub fn stub(id: FileId) -> Self {
        Self {
            id,
            name: String::new(),
            parent: ROOT_FILE_ID,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent == ROOT_FILE_ID
    }
}

/// One attached script instance inside a scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviourRecord {
    /// Anchor of the behaviour document
    pub file_id: FileId,

    /// GUID of the script this behaviour instantiates
    pub script: Guid,

    /// Referenced script GUID -> name of the field holding the reference
    pub serialized_fields_by_guid: BTreeMap<Guid, String>,
}

impl BehaviourRecord {
    pub fn new(file_id: FileId, script: Guid) -> Self {
        Self {
            file_id,
            script,
            serialized_fields_by_guid: BTreeMap::new(),
        }
    }

    /// Record an outgoing reference. Empty GUIDs are never recorded so they
    /// cannot collide with scripts that have no identity.
    pub fn add_reference(&mut self, guid: Guid, field: &str) {
        if guid.is_empty() {
            return;
        }
        self.serialized_fields_by_guid.insert(guid, field.to_string());
    }

    /// Field name referencing the given script, if any
    pub fn field_referencing(&self, guid: &Guid) -> Option<&str> {
        self.serialized_fields_by_guid.get(guid).map(String::as_str)
    }
}
