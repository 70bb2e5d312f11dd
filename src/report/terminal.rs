use crate::pipeline::AnalysisOutcome;
use colored::Colorize;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List every failed file, not just the count
    show_failures: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_failures: false,
        }
    }

    pub fn with_failures(mut self, show: bool) -> Self {
        self.show_failures = show;
        self
    }

    pub fn report(&self, outcome: &AnalysisOutcome) {
        let scripts: Vec<_> = outcome.reported_scripts().collect();

        println!();
        if scripts.is_empty() {
            println!("{}", "No unused scripts found!".green().bold());
        } else {
            println!(
                "{}",
                format!("Found {} unused scripts:", scripts.len()).yellow().bold()
            );
            println!();
            for script in &scripts {
                let guid = if script.guid.is_empty() {
                    "<no identity>".red().to_string()
                } else {
                    script.guid.to_string().dimmed().to_string()
                };
                println!("  {} {}", script.name.white().bold(), guid);
                println!("    {} {}", "→".dimmed(), script.path.display().to_string().dimmed());
            }
        }

        if self.show_failures && !outcome.failures.is_empty() {
            println!();
            println!("{}", "Skipped files:".yellow());
            for failure in &outcome.failures {
                println!("  {} {}", failure.path.display().to_string().cyan(), failure.message.dimmed());
            }
        }

        self.print_summary(outcome);
    }

    fn print_summary(&self, outcome: &AnalysisOutcome) {
        let summary = &outcome.summary;

        println!();
        println!("{}", "─".repeat(60).dimmed());
        println!(
            "Scenes: {} found, {} parsed, {} evaluated{}",
            summary.scene_files,
            summary.scenes_parsed,
            summary.scenes_evaluated,
            if summary.early_exit {
                " (stopped early: every script is used)".green().to_string()
            } else {
                String::new()
            }
        );
        println!(
            "Scripts: {} found, {} behaviours, {} unused",
            summary.script_files,
            summary.behaviour_scripts,
            outcome.unused.len().to_string().yellow()
        );
        if summary.retained > 0 {
            println!("{}", format!("{} unused scripts retained by pattern", summary.retained).dimmed());
        }
        if !outcome.failures.is_empty() {
            println!(
                "{}",
                format!("{} files could not be read and were skipped", outcome.failures.len()).yellow()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
