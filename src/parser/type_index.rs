use super::common::{first_child_of_kind, named_children, node_text};
use std::collections::{HashMap, HashSet};
use tracing::trace;
use tree_sitter::Node;

/// Kind of a type declared in project scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

impl TypeKind {
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" | "record_declaration" => Some(TypeKind::Class),
            "struct_declaration" | "record_struct_declaration" => Some(TypeKind::Struct),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "delegate_declaration" => Some(TypeKind::Delegate),
            _ => None,
        }
    }
}

/// A type declared somewhere in the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Simple name, without namespace or type parameters
    pub name: String,
    pub kind: TypeKind,

    /// Base types as written, generic arguments removed
    pub bases: Vec<String>,

    /// Marked `[Serializable]`
    pub serializable: bool,
}

/// A type as written at a use site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// Built-in keyword type (`int`, `string`, `object`)
    Predefined(String),

    /// Named type, optionally qualified and with type arguments
    Named {
        qualifier: Option<String>,
        name: String,
        args: Vec<TypeRef>,
    },

    /// `T[]`; `rank` counts dimensions, so `T[,]` has rank 2
    Array { element: Box<TypeRef>, rank: usize },

    /// `T?`
    Nullable(Box<TypeRef>),

    /// Anything else: tuples, pointers, function pointers
    Other(String),
}

impl TypeRef {
    pub fn named(name: &str) -> Self {
        TypeRef::Named {
            qualifier: None,
            name: name.to_string(),
            args: Vec::new(),
        }
    }

    pub fn from_node(node: Node<'_>, source: &str) -> Self {
        match node.kind() {
            "predefined_type" => TypeRef::Predefined(node_text(node, source).to_string()),
            "identifier" => TypeRef::named(node_text(node, source)),
            "generic_name" => {
                let name = first_child_of_kind(node, "identifier")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_default();
                let args = first_child_of_kind(node, "type_argument_list")
                    .map(|list| {
                        named_children(list)
                            .into_iter()
                            .map(|arg| TypeRef::from_node(arg, source))
                            .collect()
                    })
                    .unwrap_or_default();
                TypeRef::Named {
                    qualifier: None,
                    name,
                    args,
                }
            }
            "qualified_name" | "alias_qualified_name" => {
                let qualifier = node
                    .child_by_field_name(if node.kind() == "qualified_name" { "qualifier" } else { "alias" })
                    .map(|q| node_text(q, source).to_string());
                match node.child_by_field_name("name").map(|n| TypeRef::from_node(n, source)) {
                    Some(TypeRef::Named { name, args, .. }) => TypeRef::Named {
                        qualifier,
                        name,
                        args,
                    },
                    _ => TypeRef::Other(node_text(node, source).to_string()),
                }
            }
            "array_type" => {
                let element = node.child_by_field_name("type");
                let rank = node
                    .child_by_field_name("rank")
                    .map(|r| node_text(r, source).matches(',').count() + 1)
                    .unwrap_or(1);
                match element {
                    Some(element) => TypeRef::Array {
                        element: Box::new(TypeRef::from_node(element, source)),
                        rank,
                    },
                    None => TypeRef::Other(node_text(node, source).to_string()),
                }
            }
            "nullable_type" => match node.child_by_field_name("type") {
                Some(inner) => TypeRef::Nullable(Box::new(TypeRef::from_node(inner, source))),
                None => TypeRef::Other(node_text(node, source).to_string()),
            },
            _ => TypeRef::Other(node_text(node, source).to_string()),
        }
    }

    /// Name as written without generic arguments, e.g. `UnityEngine.MonoBehaviour`
    pub fn written_name(&self) -> Option<String> {
        match self {
            TypeRef::Predefined(name) => Some(name.clone()),
            TypeRef::Named {
                qualifier: Some(q),
                name,
                ..
            } => Some(format!("{}.{}", q, name)),
            TypeRef::Named { name, .. } => Some(name.clone()),
            _ => None,
        }
    }

    /// Last name segment of a named type
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Last segment of a dotted type name
pub fn simple_name(written: &str) -> &str {
    let written = written.rsplit("::").next().unwrap_or(written);
    written.rsplit('.').next().unwrap_or(written)
}

/// Whether a base type as written names one of `targets`, directly or in
/// its engine-namespace-qualified form
fn matches_target(written: &str, targets: &HashSet<String>) -> bool {
    let written = written.trim_start_matches("global::");
    targets.contains(written)
        || written
            .strip_prefix("UnityEngine.")
            .is_some_and(|unqualified| targets.contains(unqualified))
}

/// Every type declared across all project scripts, keyed by simple name.
/// Frozen once built.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    types: HashMap<String, DeclaredType>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types(types: impl IntoIterator<Item = DeclaredType>) -> Self {
        let mut index = Self::new();
        for declared in types {
            index.insert(declared);
        }
        index
    }

    /// Add a declaration. Partial declarations of one type are merged.
    pub fn insert(&mut self, declared: DeclaredType) {
        match self.types.get_mut(&declared.name) {
            Some(existing) if existing.kind == declared.kind => {
                for base in declared.bases {
                    if !existing.bases.contains(&base) {
                        existing.bases.push(base);
                    }
                }
                existing.serializable |= declared.serializable;
            }
            Some(existing) => {
                trace!(
                    "Type {} declared as both {:?} and {:?}, keeping the first",
                    declared.name,
                    existing.kind,
                    declared.kind
                );
            }
            None => {
                self.types.insert(declared.name.clone(), declared);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&DeclaredType> {
        self.types.get(simple_name(name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn is_kind(&self, name: &str, kind: TypeKind) -> bool {
        self.get(name).is_some_and(|t| t.kind == kind)
    }

    /// Whether a type with the given bases transitively derives from one of
    /// `targets`. Bases are followed through project declarations by simple
    /// name; inheritance cycles terminate.
    pub fn derives_from(&self, bases: &[String], targets: &HashSet<String>) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = bases.iter().map(String::as_str).collect();

        while let Some(base) = pending.pop() {
            if matches_target(base, targets) {
                return true;
            }

            let name = simple_name(base);
            if !visited.insert(name) {
                continue;
            }

            if let Some(declared) = self.types.get(name) {
                pending.extend(declared.bases.iter().map(String::as_str));
            }
        }

        false
    }

    /// Whether a declared type derives from one of `targets`
    pub fn type_derives_from(&self, name: &str, targets: &HashSet<String>) -> bool {
        self.get(name)
            .is_some_and(|declared| self.derives_from(&declared.bases, targets))
    }
}
