use crate::pipeline::{AnalysisOutcome, FileFailure, PipelineSummary};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the JSON unused-script report
pub const JSON_REPORT_FILE: &str = "unused_scripts.json";

/// JSON reporter for programmatic output
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, outcome: &AnalysisOutcome) -> Result<String> {
        let report = JsonReport::from_outcome(outcome);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }

    pub fn write(&self, outcome: &AnalysisOutcome, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(JSON_REPORT_FILE);
        let json = self.render(outcome)?;
        std::fs::write(&path, json)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
        Ok(path)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_scripts: usize,
    unused_count: usize,
    scripts: Vec<JsonScript<'a>>,
    failures: &'a [FileFailure],
    summary: &'a PipelineSummary,
}

#[derive(Serialize)]
struct JsonScript<'a> {
    name: &'a str,
    path: String,
    guid: &'a str,
}

impl<'a> JsonReport<'a> {
    fn from_outcome(outcome: &'a AnalysisOutcome) -> Self {
        let scripts: Vec<JsonScript<'a>> = outcome
            .reported_scripts()
            .map(|script| JsonScript {
                name: &script.name,
                path: script.path.to_string_lossy().to_string(),
                guid: script.guid.as_str(),
            })
            .collect();

        Self {
            version: "1.0",
            total_scripts: outcome.registry.len(),
            unused_count: scripts.len(),
            scripts,
            failures: &outcome.failures,
            summary: &outcome.summary,
        }
    }
}
