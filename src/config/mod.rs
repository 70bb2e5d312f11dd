mod loader;

pub use loader::{Config, PipelineConfig, ReportConfig, ScriptConfig};
