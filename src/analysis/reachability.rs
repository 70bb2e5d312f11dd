use crate::graph::SceneGraph;
use crate::registry::{ScriptRecord, ScriptRegistry};
use serde::Serialize;

/// How one scene relates to one script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptUsage {
    /// A behaviour in the scene instantiates the script
    Attached,

    /// The first behaviour referencing the script does so through a field
    /// name some registered script declares
    ReferencedByDeclaredField { field: String },

    /// The first behaviour referencing the script does so through a field
    /// name no registered script declares
    ReferencedByUndeclaredField { field: String },

    /// Nothing in the scene instantiates or references the script
    Unreferenced,

    /// The script has no identity to match against
    NoIdentity,
}

impl ScriptUsage {
    pub fn is_unused(&self) -> bool {
        !matches!(
            self,
            ScriptUsage::Attached | ScriptUsage::ReferencedByDeclaredField { .. }
        )
    }
}

/// Decides, per scene, whether a script is used
pub struct ReachabilityAnalyzer<'r> {
    registry: &'r ScriptRegistry,
}

impl<'r> ReachabilityAnalyzer<'r> {
    pub fn new(registry: &'r ScriptRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r ScriptRegistry {
        self.registry
    }

    /// Classify a script against one scene.
    ///
    /// Attachment anywhere in the scene wins. Otherwise only the first
    /// behaviour (in document order) holding a reference to the script is
    /// considered: its field name must be declared by some script in the
    /// registry, not necessarily the referencing one.
    pub fn usage(&self, scene: &SceneGraph, script: &ScriptRecord) -> ScriptUsage {
        if !script.has_identity() {
            return ScriptUsage::NoIdentity;
        }

        if scene.has_attached(&script.guid) {
            return ScriptUsage::Attached;
        }

        let first_reference = scene
            .behaviours()
            .iter()
            .find_map(|behaviour| behaviour.field_referencing(&script.guid));

        match first_reference {
            Some(field) if self.registry.declares_field(field) => ScriptUsage::ReferencedByDeclaredField {
                field: field.to_string(),
            },
            Some(field) => ScriptUsage::ReferencedByUndeclaredField {
                field: field.to_string(),
            },
            None => ScriptUsage::Unreferenced,
        }
    }

    pub fn is_unused(&self, scene: &SceneGraph, script: &ScriptRecord) -> bool {
        self.usage(scene, script).is_unused()
    }
}
