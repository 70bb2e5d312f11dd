use super::common::{
    attribute_names, children_of_kind, descendants, first_child_of_kind, is_attribute, modifiers,
    named_children, node_text,
};
use super::serialization::{FieldDecl, SerializationRules};
use super::type_index::{DeclaredType, TypeIndex, TypeKind, TypeRef};
use super::{ScriptSymbolProvider, ScriptSymbols};
use crate::config::ScriptConfig;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use tree_sitter::{Node, Parser as TsParser};

#[derive(Debug, Error)]
pub enum ScriptParseError {
    #[error("failed to read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script {}", path.display())]
    Parse { path: PathBuf },
}

impl ScriptParseError {
    pub fn path(&self) -> &Path {
        match self {
            ScriptParseError::Io { path, .. } | ScriptParseError::Parse { path } => path,
        }
    }
}

/// First class declared in a script file, with the fields of its own body
#[derive(Debug, Clone)]
pub struct PrimaryClass {
    pub name: String,
    pub bases: Vec<String>,
    pub fields: Vec<FieldDecl>,
}

/// Declarations extracted from one script file
#[derive(Debug, Clone)]
pub struct ParsedScript {
    pub path: PathBuf,
    pub types: Vec<DeclaredType>,
    pub primary: Option<PrimaryClass>,
}

/// C# source parser using tree-sitter
pub struct CSharpParser {
    parser: TsParser,
}

impl CSharpParser {
    pub fn new() -> Self {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .expect("Failed to load C# grammar");
        Self { parser }
    }

    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedScript, ScriptParseError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScriptParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &contents)
    }

    pub fn parse(&mut self, path: &Path, source: &str) -> Result<ParsedScript, ScriptParseError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| ScriptParseError::Parse {
                path: path.to_path_buf(),
            })?;

        let mut types = Vec::new();
        let mut primary = None;

        for node in descendants(tree.root_node()) {
            let Some(kind) = TypeKind::from_node_kind(node.kind()) else {
                continue;
            };
            let Some(declared) = extract_type(node, kind, source) else {
                continue;
            };

            if primary.is_none() && node.kind() == "class_declaration" {
                primary = Some(PrimaryClass {
                    name: declared.name.clone(),
                    bases: declared.bases.clone(),
                    fields: extract_fields(node, source),
                });
            }

            types.push(declared);
        }

        Ok(ParsedScript {
            path: path.to_path_buf(),
            types,
            primary,
        })
    }
}

impl Default for CSharpParser {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_type(node: Node<'_>, kind: TypeKind, source: &str) -> Option<DeclaredType> {
    let name = node_text(node.child_by_field_name("name")?, source).to_string();

    let bases = first_child_of_kind(node, "base_list")
        .map(|list| {
            named_children(list)
                .into_iter()
                .filter_map(|base| {
                    // `class Foo(int x) : Base(x)` wraps the type
                    let base = if base.kind() == "primary_constructor_base_type" {
                        base.named_child(0)?
                    } else {
                        base
                    };
                    TypeRef::from_node(base, source).written_name()
                })
                .collect()
        })
        .unwrap_or_default();

    let serializable = attribute_names(node, source)
        .iter()
        .any(|a| is_attribute(a, "Serializable"));

    Some(DeclaredType {
        name,
        kind,
        bases,
        serializable,
    })
}

/// Fields declared directly in a class body; nested types keep their own
fn extract_fields(class: Node<'_>, source: &str) -> Vec<FieldDecl> {
    let body = class
        .child_by_field_name("body")
        .filter(|b| b.kind() == "declaration_list")
        .or_else(|| first_child_of_kind(class, "declaration_list"));
    let Some(body) = body else {
        return Vec::new();
    };

    let mut fields = Vec::new();

    for declaration in children_of_kind(body, "field_declaration") {
        let Some(variables) = first_child_of_kind(declaration, "variable_declaration") else {
            continue;
        };
        let Some(ty) = variables.child_by_field_name("type") else {
            continue;
        };

        let ty = TypeRef::from_node(ty, source);
        let field_modifiers: Vec<String> = modifiers(declaration, source)
            .into_iter()
            .map(str::to_string)
            .collect();
        let attributes = attribute_names(declaration, source);

        for declarator in children_of_kind(variables, "variable_declarator") {
            let name = declarator
                .child_by_field_name("name")
                .or_else(|| first_child_of_kind(declarator, "identifier"));
            if let Some(name) = name {
                fields.push(FieldDecl {
                    name: node_text(name, source).to_string(),
                    ty: ty.clone(),
                    modifiers: field_modifiers.clone(),
                    attributes: attributes.clone(),
                });
            }
        }
    }

    fields
}

/// Symbol provider backed by tree-sitter parses of every project script.
///
/// All scripts are parsed up front so base types can be followed across
/// files; afterwards the provider is read-only.
pub struct CSharpSymbolProvider {
    symbols: HashMap<PathBuf, ScriptSymbols>,
    index: TypeIndex,
    failures: Vec<ScriptParseError>,
}

impl CSharpSymbolProvider {
    /// Parse `paths` in parallel on the current rayon pool
    pub fn build(paths: &[PathBuf], config: &ScriptConfig) -> Self {
        info!("Parsing {} scripts in parallel...", paths.len());

        let results: Vec<Result<ParsedScript, ScriptParseError>> = paths
            .par_iter()
            .map_init(CSharpParser::new, |parser, path| parser.parse_file(path))
            .collect();

        let mut parsed = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(script) => parsed.push(script),
                Err(e) => {
                    debug!("Script parse error (continuing): {}", e);
                    failures.push(e);
                }
            }
        }

        let index = TypeIndex::from_types(parsed.iter().flat_map(|p| p.types.iter().cloned()));
        let rules = SerializationRules::new(config);

        let mut symbols: HashMap<PathBuf, ScriptSymbols> = parsed
            .par_iter()
            .map(|script| (script.path.clone(), resolve_symbols(script, &index, &rules)))
            .collect();

        for failure in &failures {
            symbols.insert(failure.path().to_path_buf(), ScriptSymbols::default());
        }

        info!(
            "Indexed {} types from {} scripts ({} failed)",
            index.len(),
            parsed.len(),
            failures.len()
        );

        Self {
            symbols,
            index,
            failures,
        }
    }

    pub fn type_index(&self) -> &TypeIndex {
        &self.index
    }

    pub fn failures(&self) -> &[ScriptParseError] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl ScriptSymbolProvider for CSharpSymbolProvider {
    fn symbols(&self, path: &Path) -> Option<&ScriptSymbols> {
        self.symbols.get(path)
    }
}

fn resolve_symbols(script: &ParsedScript, index: &TypeIndex, rules: &SerializationRules) -> ScriptSymbols {
    let Some(primary) = &script.primary else {
        return ScriptSymbols::default();
    };

    ScriptSymbols {
        is_behaviour_type: rules.is_behaviour(&primary.bases, index),
        serialized_field_names: primary
            .fields
            .iter()
            .filter(|field| rules.is_serialized_field(field, index))
            .map(|field| field.name.clone())
            .collect(),
    }
}
