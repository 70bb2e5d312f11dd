use crate::pipeline::AnalysisOutcome;
use crate::registry::ScriptRecord;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::{Path, PathBuf};

/// File name of the plain unused-script report
pub const TEXT_REPORT_FILE: &str = "unused_scripts.txt";

/// One `Script name: <name> GUID: <guid>` line per unused script
pub struct TextReporter;

impl TextReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn render<'a>(&self, scripts: impl IntoIterator<Item = &'a ScriptRecord>) -> String {
        scripts
            .into_iter()
            .map(|script| format!("Script name: {} GUID: {}\n", script.name, script.guid))
            .collect()
    }

    pub fn write(&self, outcome: &AnalysisOutcome, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(TEXT_REPORT_FILE);
        std::fs::write(&path, self.render(outcome.reported_scripts()))
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
        Ok(path)
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}
