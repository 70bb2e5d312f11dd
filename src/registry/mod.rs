mod builder;
mod meta;

pub use builder::{ParallelRegistryBuilder, RegistryBuild};
pub use meta::{parse_meta_guid, read_meta_guid, MetaError};

use crate::graph::Guid;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Index of a script inside its `ScriptRegistry`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ScriptId(usize);

impl ScriptId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One attachable script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptRecord {
    /// File name, e.g. `Player.cs`
    pub name: String,

    pub path: PathBuf,

    /// Identity from the companion file; empty if that file was unusable
    pub guid: Guid,

    /// Serialized field names of the script's primary type
    pub serialized_fields: BTreeSet<String>,
}

impl ScriptRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, guid: Guid) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            guid,
            serialized_fields: BTreeSet::new(),
        }
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.serialized_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn has_identity(&self) -> bool {
        !self.guid.is_empty()
    }
}

/// Every attachable script of a project. Frozen after build and shared
/// read-only by all scene evaluations.
#[derive(Debug, Clone, Default)]
pub struct ScriptRegistry {
    records: Vec<ScriptRecord>,

    /// Union of every record's serialized field names
    declared_fields: HashSet<String>,
}

impl ScriptRegistry {
    /// Freeze a set of records. Records are ordered by path so ids do not
    /// depend on discovery order.
    pub fn from_records(mut records: Vec<ScriptRecord>) -> Self {
        records.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));

        let declared_fields = records
            .iter()
            .flat_map(|r| r.serialized_fields.iter().cloned())
            .collect();

        Self {
            records,
            declared_fields,
        }
    }

    pub fn get(&self, id: ScriptId) -> Option<&ScriptRecord> {
        self.records.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScriptId, &ScriptRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (ScriptId(index), record))
    }

    pub fn ids(&self) -> impl Iterator<Item = ScriptId> {
        (0..self.records.len()).map(ScriptId)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any script in the registry declares a serialized field with this name
    pub fn declares_field(&self, field: &str) -> bool {
        self.declared_fields.contains(field)
    }

    pub fn find_by_name(&self, name: &str) -> Option<ScriptId> {
        self.iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| id)
    }
}
