//! SearchDeadScripts - Fast unused script detection for Unity projects
//!
//! This library finds behaviour scripts that no scene ever uses: never
//! attached to a game object and never referenced by a serialized field of an
//! attached script.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find all scenes and `.cs` scripts under `Assets`
//! 2. **Script Parsing** - Parse scripts with tree-sitter, resolve behaviour
//!    types and serialized fields, read script GUIDs from `.meta` files
//! 3. **Scene Parsing** - Build each scene's object hierarchy and attached
//!    behaviours in two passes over its documents
//! 4. **Reachability Analysis** - Shrink the set of unused scripts scene by scene
//! 5. **Reporting** - Unused-script report and per-scene hierarchy dumps

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod report;

pub use analysis::{AggregationSummary, Aggregator, ReachabilityAnalyzer, ScriptUsage, UnusedSet};
pub use config::Config;
pub use discovery::{FileFinder, ProjectError, UnityProject};
pub use graph::{BehaviourRecord, ClassIdCatalog, GameObjectNode, Guid, SceneGraph, SceneGraphBuilder};
pub use parser::{CSharpSymbolProvider, ScriptSymbolProvider, ScriptSymbols};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, PipelineError};
pub use registry::{ScriptId, ScriptRecord, ScriptRegistry};
pub use report::{HierarchyReporter, ReportFormat, Reporter};
