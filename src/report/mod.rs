mod hierarchy;
mod json;
mod terminal;
mod text;

pub use hierarchy::{HierarchyReporter, DUMP_EXTENSION, MAX_DUMP_DEPTH};
pub use json::{JsonReporter, JSON_REPORT_FILE};
pub use terminal::TerminalReporter;
pub use text::{TextReporter, TEXT_REPORT_FILE};

use crate::pipeline::AnalysisOutcome;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;
use tracing::info;

/// Output format for the unused-script report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    /// Parse a configured format name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Writes the report files of a run into one output directory
pub struct Reporter {
    format: ReportFormat,
    output_dir: PathBuf,
    dump_hierarchy: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_dir: PathBuf) -> Self {
        Self {
            format,
            output_dir,
            dump_hierarchy: true,
        }
    }

    pub fn with_hierarchy_dumps(mut self, enabled: bool) -> Self {
        self.dump_hierarchy = enabled;
        self
    }

    /// Write the unused-script report and, if enabled, one dump per scene.
    /// Returns every file written.
    pub fn report(&self, outcome: &AnalysisOutcome) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create output directory: {}", self.output_dir.display()))?;

        let mut written = Vec::new();

        if self.dump_hierarchy {
            written.extend(HierarchyReporter::new().write_all(&outcome.scenes, &self.output_dir)?);
        }

        let report = match self.format {
            ReportFormat::Text => TextReporter::new().write(outcome, &self.output_dir)?,
            ReportFormat::Json => JsonReporter::new().write(outcome, &self.output_dir)?,
        };
        info!("Report written to: {}", report.display());
        written.push(report);

        Ok(written)
    }
}
