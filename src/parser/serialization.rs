//! Engine serialization rules: which fields of a behaviour end up in scene
//! files, and therefore which field names a scene reference can arrive through.

use super::common::is_attribute;
use super::type_index::{TypeIndex, TypeKind, TypeRef};
use crate::config::ScriptConfig;
use std::collections::HashSet;

/// Keyword types the engine serializes
const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "sbyte", "char", "short", "ushort", "int", "uint", "long", "ulong", "float",
    "double", "string",
];

/// Framework names of the primitive types
const PRIMITIVE_ALIASES: &[&str] = &[
    "Boolean", "Byte", "SByte", "Char", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64",
    "Single", "Double", "String",
];

/// Engine value types with built-in serialization support
const ENGINE_VALUE_TYPES: &[&str] = &[
    "Vector2",
    "Vector3",
    "Vector4",
    "Vector2Int",
    "Vector3Int",
    "Quaternion",
    "Color",
    "Color32",
    "Rect",
    "RectInt",
    "Bounds",
    "BoundsInt",
    "AnimationCurve",
    "Gradient",
    "LayerMask",
    "Matrix4x4",
    "UnityEvent",
];

/// Engine types deriving from the engine's root object type
const ENGINE_OBJECT_TYPES: &[&str] = &[
    "Object",
    "GameObject",
    "Component",
    "Behaviour",
    "MonoBehaviour",
    "ScriptableObject",
    "Transform",
    "RectTransform",
    "Material",
    "Shader",
    "Texture",
    "Texture2D",
    "RenderTexture",
    "Sprite",
    "AudioClip",
    "AudioSource",
    "Mesh",
    "MeshRenderer",
    "MeshFilter",
    "Renderer",
    "SpriteRenderer",
    "Collider",
    "Collider2D",
    "Rigidbody",
    "Rigidbody2D",
    "Animator",
    "AnimationClip",
    "RuntimeAnimatorController",
    "Camera",
    "Light",
    "Canvas",
    "Font",
    "TextAsset",
    "PhysicMaterial",
    "ParticleSystem",
];

/// Callback-shaped types, never serialized
const DELEGATE_TYPES: &[&str] = &[
    "Action",
    "Func",
    "Predicate",
    "EventHandler",
    "Delegate",
    "MulticastDelegate",
];

/// Dictionary-shaped types, never serialized
const DICTIONARY_TYPES: &[&str] = &[
    "Dictionary",
    "SortedDictionary",
    "IDictionary",
    "ConcurrentDictionary",
    "Hashtable",
];

/// Field modifiers that keep a field out of serialization
const NON_INSTANCE_MODIFIERS: &[&str] = &["static", "const", "readonly"];

/// A field as declared in a class body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Vec<String>,
    pub attributes: Vec<String>,
}

impl FieldDecl {
    pub fn is_public(&self) -> bool {
        self.modifiers.iter().any(|m| m == "public")
    }

    pub fn is_instance(&self) -> bool {
        !self
            .modifiers
            .iter()
            .any(|m| NON_INSTANCE_MODIFIERS.contains(&m.as_str()))
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| is_attribute(a, attribute))
    }
}

/// Serialization rules, extended by configuration
#[derive(Debug, Clone)]
pub struct SerializationRules {
    behaviour_types: HashSet<String>,
    value_types: HashSet<String>,
    object_types: HashSet<String>,
}

impl SerializationRules {
    pub fn new(config: &ScriptConfig) -> Self {
        let value_types = ENGINE_VALUE_TYPES
            .iter()
            .map(|t| t.to_string())
            .chain(config.extra_serializable_types.iter().cloned())
            .collect();

        let object_types = ENGINE_OBJECT_TYPES
            .iter()
            .map(|t| t.to_string())
            .chain(config.extra_engine_object_types.iter().cloned())
            .collect();

        Self {
            behaviour_types: config.base_behaviour_types.iter().cloned().collect(),
            value_types,
            object_types,
        }
    }

    /// Whether a class with these bases can be attached to game objects
    pub fn is_behaviour(&self, bases: &[String], index: &TypeIndex) -> bool {
        index.derives_from(bases, &self.behaviour_types)
    }

    /// Whether the engine serializes this field
    pub fn is_serialized_field(&self, field: &FieldDecl, index: &TypeIndex) -> bool {
        if !field.is_instance() || field.has_attribute("NonSerialized") {
            return false;
        }

        if !field.is_public() && !field.has_attribute("SerializeField") {
            return false;
        }

        self.is_eligible(&field.ty, index, false)
    }

    /// Whether values of this type can be serialized. Collections may not
    /// nest: an element type must not itself be an array or list.
    pub fn is_eligible(&self, ty: &TypeRef, index: &TypeIndex, in_collection: bool) -> bool {
        match ty {
            TypeRef::Predefined(name) => PRIMITIVE_TYPES.contains(&name.as_str()),

            TypeRef::Array { element, rank } => {
                !in_collection
                    && *rank == 1
                    && !matches!(**element, TypeRef::Array { .. })
                    && self.is_eligible(element, index, true)
            }

            TypeRef::Named { name, args, .. } => {
                let name = name.as_str();

                if DELEGATE_TYPES.contains(&name) || index.is_kind(name, TypeKind::Delegate) {
                    return false;
                }
                if DICTIONARY_TYPES.contains(&name) {
                    return false;
                }
                if name == "List" {
                    return !in_collection
                        && args.len() == 1
                        && self.is_eligible(&args[0], index, true);
                }

                self.is_eligible_named(name, index)
            }

            TypeRef::Nullable(_) | TypeRef::Other(_) => false,
        }
    }

    fn is_eligible_named(&self, name: &str, index: &TypeIndex) -> bool {
        if PRIMITIVE_ALIASES.contains(&name)
            || self.value_types.contains(name)
            || self.object_types.contains(name)
        {
            return true;
        }

        match index.get(name) {
            Some(declared) => match declared.kind {
                TypeKind::Enum => true,
                TypeKind::Class | TypeKind::Struct if declared.serializable => true,
                TypeKind::Class => index.derives_from(&declared.bases, &self.object_types),
                _ => false,
            },
            None => false,
        }
    }
}
