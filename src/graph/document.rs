//! Splitting of scene files into their serialized documents.
//!
//! Scene files are multi-document YAML where every document header carries a
//! type tag and an anchor, e.g. `--- !u!4 &1234`. Generic YAML loaders either
//! drop or resolve those, so headers are read here directly and only the
//! document bodies go through `serde_yaml`.

use super::node::{ClassId, FileId};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::borrow::Cow;
use std::sync::OnceLock;
use thiserror::Error;

/// Tag prefix every scene document type tag is namespaced under
pub const UNITY_TAG_PREFIX: &str = "tag:unity3d.com,2011:";

/// Tag handle used by scene files for the prefix above
const UNITY_TAG_HANDLE: &str = "!u!";

/// Errors scoped to a single document. The document is skipped; the rest of
/// the scene keeps parsing.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("line {line}: invalid type tag {tag:?}")]
    InvalidTag { line: usize, tag: String },

    #[error("line {line}: invalid anchor {anchor:?}")]
    InvalidAnchor { line: usize, anchor: String },

    #[error("line {line}: malformed document body: {source}")]
    Yaml {
        line: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("line {line}: document body is not a single type mapping")]
    MalformedBody { line: usize },

    #[error("document &{file_id}: missing field `{field}`")]
    MissingField { file_id: FileId, field: &'static str },
}

/// Semantic kind of a record, decided from its type name.
///
/// Matching is by substring: exported type names vary their suffixes, so
/// `RectTransform` is handled as a transform, for example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Object,
    Transform,
    Behaviour,
    Other,
}

impl RecordKind {
    pub fn from_type_name(type_name: &str) -> Self {
        if type_name.contains("GameObject") {
            RecordKind::Object
        } else if type_name.contains("Transform") {
            RecordKind::Transform
        } else if type_name.contains("MonoBehaviour") {
            RecordKind::Behaviour
        } else {
            RecordKind::Other
        }
    }
}

/// A document as found in the file: header fields plus the unparsed body
#[derive(Debug, Clone)]
pub struct RawDocument<'a> {
    /// 1-based line of the `---` header
    pub line: usize,

    /// Fully resolved type tag, e.g. `tag:unity3d.com,2011:4`
    pub tag: Option<String>,

    /// Anchor text without the leading `&`
    pub anchor: Option<&'a str>,

    /// Body text following the header
    pub body: &'a str,
}

impl<'a> RawDocument<'a> {
    /// Parse the numeric class id out of the type tag
    pub fn class_id(&self) -> Result<ClassId, DocumentError> {
        let tag = self.tag.as_deref().unwrap_or_default();
        tag.strip_prefix(UNITY_TAG_PREFIX)
            .and_then(|id| id.parse::<ClassId>().ok())
            .ok_or_else(|| DocumentError::InvalidTag {
                line: self.line,
                tag: tag.to_string(),
            })
    }

    /// Parse the anchor as a file id
    pub fn file_id(&self) -> Result<FileId, DocumentError> {
        let anchor = self.anchor.unwrap_or_default();
        anchor
            .parse::<FileId>()
            .map_err(|_| DocumentError::InvalidAnchor {
                line: self.line,
                anchor: anchor.to_string(),
            })
    }

    /// Parse header and body into a `SceneDocument`
    pub fn parse(&self) -> Result<SceneDocument, DocumentError> {
        let class_id = self.class_id()?;
        let file_id = self.file_id()?;

        let body = quote_guids(self.body);
        let root: Mapping = serde_yaml::from_str(&body).map_err(|source| {
            DocumentError::Yaml {
                line: self.line,
                source,
            }
        })?;

        let mut entries = root.into_iter();
        let (type_name, fields) = match (entries.next(), entries.next()) {
            (Some((Value::String(name), Value::Mapping(fields))), None) => (name, fields),
            // Stripped documents may carry an empty body
            (Some((Value::String(name), Value::Null)), None) => (name, Mapping::new()),
            _ => return Err(DocumentError::MalformedBody { line: self.line }),
        };

        Ok(SceneDocument {
            file_id,
            class_id,
            kind: RecordKind::from_type_name(&type_name),
            type_name,
            fields,
        })
    }
}

/// One serialized record of a scene. Only lives for a single parse pass.
#[derive(Debug, Clone)]
pub struct SceneDocument {
    pub file_id: FileId,
    pub class_id: ClassId,
    pub type_name: String,
    pub kind: RecordKind,

    /// Record fields in declaration order
    pub fields: Mapping,
}

impl SceneDocument {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

fn header_regex() -> &'static Regex {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    HEADER.get_or_init(|| {
        Regex::new(r"^---(?:[ \t]+(?P<tag>!\S*))?(?:[ \t]+&(?P<anchor>\S+))?(?:[ \t]+stripped)?[ \t]*$")
            .expect("valid document header regex")
    })
}

fn tag_directive_regex() -> &'static Regex {
    static DIRECTIVE: OnceLock<Regex> = OnceLock::new();
    DIRECTIVE.get_or_init(|| {
        Regex::new(r"^%TAG[ \t]+(?P<handle>!\S*)[ \t]+(?P<prefix>\S+)").expect("valid tag directive regex")
    })
}

fn guid_value_regex() -> &'static Regex {
    static GUID: OnceLock<Regex> = OnceLock::new();
    GUID.get_or_init(|| {
        Regex::new(r"(?m)\b(?P<key>guid:[ \t]*)(?P<value>[0-9a-fA-F]+)(?P<end>[ \t]*(?:[,}\]\r\n]|$))")
            .expect("valid guid value regex")
    })
}

/// Quote plain `guid:` values so the loader keeps them as text. Unquoted,
/// an all-digit guid overflows the integer types and one with a single `e`
/// reads as a float.
pub fn quote_guids(body: &str) -> Cow<'_, str> {
    guid_value_regex().replace_all(body, "${key}'${value}'${end}")
}

fn is_document_start(line: &str) -> bool {
    line == "---" || line.starts_with("--- ") || line.starts_with("---\t")
}

/// Tag handles declared by `%TAG` directives
#[derive(Debug, Clone)]
struct TagHandles {
    handles: Vec<(String, String)>,
}

impl TagHandles {
    fn new() -> Self {
        Self {
            handles: vec![("!!".to_string(), "tag:yaml.org,2002:".to_string())],
        }
    }

    fn declare(&mut self, handle: &str, prefix: &str) {
        self.handles.retain(|(h, _)| h != handle);
        self.handles.push((handle.to_string(), prefix.to_string()));
    }

    fn ensure(&mut self, handle: &str, prefix: &str) {
        if !self.handles.iter().any(|(h, _)| h == handle) {
            self.declare(handle, prefix);
        }
    }

    fn resolve(&self, tag: &str) -> String {
        if let Some(verbatim) = tag.strip_prefix("!<").and_then(|t| t.strip_suffix('>')) {
            return verbatim.to_string();
        }

        self.handles
            .iter()
            .filter(|(handle, _)| tag.starts_with(handle.as_str()))
            .max_by_key(|(handle, _)| handle.len())
            .map(|(handle, prefix)| format!("{}{}", prefix, &tag[handle.len()..]))
            .unwrap_or_else(|| tag.to_string())
    }
}

/// Header of a document whose body is still being scanned
struct OpenDocument<'a> {
    line: usize,
    tag: Option<String>,
    anchor: Option<&'a str>,
    body_start: usize,
}

impl<'a> OpenDocument<'a> {
    fn close(self, content: &'a str, body_end: usize) -> RawDocument<'a> {
        RawDocument {
            line: self.line,
            tag: self.tag,
            anchor: self.anchor,
            body: &content[self.body_start..body_end],
        }
    }
}

/// Split scene file content into raw documents, in file order
pub fn split_documents(content: &str) -> Vec<RawDocument<'_>> {
    let mut handles = TagHandles::new();
    let mut documents = Vec::new();
    let mut current: Option<OpenDocument> = None;
    let mut offset = 0;

    for (index, raw_line) in content.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw_line.len();
        let line = raw_line.trim_end_matches(['\n', '\r']);

        if is_document_start(line) {
            if let Some(open) = current.take() {
                documents.push(open.close(content, line_start));
            }

            // Scene files always declare the handle, but tolerate files that don't
            handles.ensure(UNITY_TAG_HANDLE, UNITY_TAG_PREFIX);

            let (tag, anchor) = match header_regex().captures(line) {
                Some(caps) => (
                    caps.name("tag").map(|t| handles.resolve(t.as_str())),
                    caps.name("anchor").map(|a| a.as_str()),
                ),
                None => (None, None),
            };

            current = Some(OpenDocument {
                line: index + 1,
                tag,
                anchor,
                body_start: offset,
            });
            continue;
        }

        match current.take() {
            Some(open) if line == "..." => documents.push(open.close(content, line_start)),
            Some(open) => current = Some(open),
            None => {
                if let Some(caps) = tag_directive_regex().captures(line) {
                    handles.declare(&caps["handle"], &caps["prefix"]);
                }
            }
        }
    }

    if let Some(open) = current.take() {
        documents.push(open.close(content, content.len()));
    }

    documents
}

/// Render a scalar as text. Numeric-looking scalars come back from the YAML
/// loader as numbers, so they are formatted back.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read the `fileID` of a reference map such as `{fileID: 1234}`
pub fn reference_file_id(value: &Value) -> Option<FileId> {
    match value.get("fileID")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Read the `guid` of a reference map such as `{fileID: 11500000, guid: abc, type: 3}`
pub fn reference_guid(value: &Value) -> Option<String> {
    value.get("guid").and_then(scalar_text)
}
