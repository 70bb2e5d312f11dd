use super::document::RawDocument;
use super::node::{ClassId, FileId};
use std::collections::HashMap;
use tracing::debug;

/// Class id of transform records
pub const TRANSFORM_CLASS_ID: ClassId = 4;

/// Class id of behaviour (attached script) records
pub const BEHAVIOUR_CLASS_ID: ClassId = 114;

/// Anchor -> class id for every well-formed document of one scene file.
///
/// Built in a first pass over the whole file so that forward references can
/// be classified before any of them is resolved.
#[derive(Debug, Clone, Default)]
pub struct ClassIdCatalog {
    classes: HashMap<FileId, ClassId>,
    skipped: usize,
}

impl ClassIdCatalog {
    /// Visit every document once. Documents whose tag or anchor does not parse
    /// are left out; references to them later resolve to nothing.
    pub fn build(documents: &[RawDocument<'_>]) -> Self {
        let mut catalog = Self::default();

        for doc in documents {
            let entry = doc.class_id().and_then(|class_id| Ok((doc.file_id()?, class_id)));
            match entry {
                Ok((file_id, class_id)) => {
                    catalog.classes.insert(file_id, class_id);
                }
                Err(e) => {
                    debug!("Skipping document in class id pass: {}", e);
                    catalog.skipped += 1;
                }
            }
        }

        catalog
    }

    pub fn class_of(&self, file_id: FileId) -> Option<ClassId> {
        self.classes.get(&file_id).copied()
    }

    pub fn is_class(&self, file_id: FileId, class_id: ClassId) -> bool {
        self.class_of(file_id) == Some(class_id)
    }

    pub fn contains(&self, file_id: FileId) -> bool {
        self.classes.contains_key(&file_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of documents left out because of a malformed header
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.classes.keys().copied()
    }
}
