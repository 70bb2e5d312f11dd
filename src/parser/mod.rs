mod common;
mod csharp;
mod serialization;
mod type_index;

pub use csharp::{CSharpParser, CSharpSymbolProvider, ParsedScript, PrimaryClass, ScriptParseError};
pub use serialization::{FieldDecl, SerializationRules};
pub use type_index::{DeclaredType, TypeIndex, TypeKind, TypeRef};

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

/// What the analysis needs to know about one script file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSymbols {
    /// The file's primary type transitively derives from a behaviour base type
    pub is_behaviour_type: bool,

    /// Names of the primary type's serialized fields
    pub serialized_field_names: BTreeSet<String>,
}

/// Source of per-script symbol information
pub trait ScriptSymbolProvider: Send + Sync {
    /// Symbols for a script file, `None` if the file is unknown to the provider
    fn symbols(&self, path: &Path) -> Option<&ScriptSymbols>;
}

/// Fixed symbols keyed by path
impl ScriptSymbolProvider for HashMap<PathBuf, ScriptSymbols> {
    fn symbols(&self, path: &Path) -> Option<&ScriptSymbols> {
        self.get(path)
    }
}
