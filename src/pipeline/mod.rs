//! End-to-end run over one project.
//!
//! Two parallel phases feed the aggregation: scripts are parsed on the
//! script pool and frozen into a `ScriptRegistry`, then scenes are parsed on
//! a small fixed pool. Each phase collects per-file results and only hands
//! immutable data to the next. Failing files are recorded and skipped.

use crate::analysis::Aggregator;
use crate::config::Config;
use crate::discovery::{FileFinder, FileStats, FileType, ProjectFile, UnityProject};
use crate::graph::{SceneError, SceneGraph, SceneGraphBuilder};
use crate::parser::CSharpSymbolProvider;
use crate::registry::{ParallelRegistryBuilder, RegistryBuild, ScriptId, ScriptRecord, ScriptRegistry};
use indicatif::ProgressBar;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Conditions that stop a run before any parsing
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no scene files found under {}", .0.display())]
    NoScenes(PathBuf),

    #[error("no script files found under {}", .0.display())]
    NoScripts(PathBuf),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// A file that was skipped, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

impl FileFailure {
    fn new(path: impl Into<PathBuf>, error: &dyn std::error::Error) -> Self {
        Self {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Counts describing one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub scene_files: usize,
    pub script_files: usize,

    /// Scripts registered as attachable behaviours
    pub behaviour_scripts: usize,

    pub scenes_parsed: usize,
    pub scenes_evaluated: usize,

    /// Aggregation stopped once every script was proven used
    pub early_exit: bool,

    /// Unused scripts hidden from the report by retain patterns
    pub retained: usize,
}

/// Everything a run produced
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub registry: ScriptRegistry,

    /// Successfully parsed scenes, ordered by path
    pub scenes: Vec<SceneGraph>,

    /// Scripts no scene uses, in id order
    pub unused: Vec<ScriptId>,

    /// Unused scripts to report: retain patterns applied, ordered by name
    pub reported: Vec<ScriptId>,

    pub failures: Vec<FileFailure>,
    pub summary: PipelineSummary,
}

impl AnalysisOutcome {
    /// Records of the reported scripts, ordered by name
    pub fn reported_scripts(&self) -> impl Iterator<Item = &ScriptRecord> {
        self.reported.iter().filter_map(|&id| self.registry.get(id))
    }

    pub fn is_unused(&self, name: &str) -> bool {
        self.registry
            .find_by_name(name)
            .is_some_and(|id| self.unused.contains(&id))
    }
}

pub struct AnalysisPipeline<'c> {
    config: &'c Config,
    progress: ProgressBar,
}

impl<'c> AnalysisPipeline<'c> {
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report scene parsing progress on this bar; its length is set by the run
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, project: &UnityProject) -> Result<AnalysisOutcome, PipelineError> {
        info!("Discovering files...");
        let files = FileFinder::new(self.config).find_project_files(project);
        let stats = FileStats::from_files(&files);
        info!("Found {} scenes and {} scripts", stats.scene_files, stats.script_files);

        let (scenes, scripts): (Vec<ProjectFile>, Vec<ProjectFile>) = files
            .into_iter()
            .partition(|f| f.file_type == FileType::Scene);

        if scenes.is_empty() {
            return Err(PipelineError::NoScenes(project.assets_dir()));
        }
        if scripts.is_empty() {
            return Err(PipelineError::NoScripts(project.assets_dir()));
        }

        let mut failures = Vec::new();

        let build = self.build_registry(&scripts, &mut failures)?;
        let registry = build.registry;

        let scene_graphs = self.parse_scenes(&scenes, &mut failures)?;

        let aggregation = Aggregator::new(&registry).run(&scene_graphs);

        let mut reported: Vec<ScriptId> = aggregation
            .unused
            .iter()
            .copied()
            .filter(|&id| {
                registry
                    .get(id)
                    .is_some_and(|record| !self.config.should_retain(&record.name))
            })
            .collect();
        reported.sort_by(|&a, &b| {
            let (a, b) = (registry.get(a), registry.get(b));
            let key = |r: Option<&ScriptRecord>| r.map(|r| (r.name.clone(), r.path.clone()));
            key(a).cmp(&key(b))
        });

        failures.sort_by(|a, b| a.path.cmp(&b.path));

        let summary = PipelineSummary {
            scene_files: stats.scene_files,
            script_files: stats.script_files,
            behaviour_scripts: registry.len(),
            scenes_parsed: scene_graphs.len(),
            scenes_evaluated: aggregation.scenes_evaluated,
            early_exit: aggregation.early_exit,
            retained: aggregation.unused.len() - reported.len(),
        };

        Ok(AnalysisOutcome {
            registry,
            scenes: scene_graphs,
            unused: aggregation.unused,
            reported,
            failures,
            summary,
        })
    }

    /// Script phase: symbols for every script, then one record per behaviour
    fn build_registry(
        &self,
        scripts: &[ProjectFile],
        failures: &mut Vec<FileFailure>,
    ) -> Result<RegistryBuild, PipelineError> {
        let paths: Vec<PathBuf> = scripts.iter().map(|f| f.path.clone()).collect();

        let phase = || {
            let provider = CSharpSymbolProvider::build(&paths, &self.config.scripts);
            let build = ParallelRegistryBuilder::new().build(scripts, &provider);
            (provider, build)
        };

        let threads = self.config.pipeline.script_threads;
        let (provider, build) = if threads == 0 {
            phase()
        } else {
            ThreadPoolBuilder::new().num_threads(threads).build()?.install(phase)
        };

        failures.extend(
            provider
                .failures()
                .iter()
                .map(|e| FileFailure::new(e.path(), e)),
        );
        failures.extend(
            build
                .meta_failures
                .iter()
                .map(|e| FileFailure::new(e.path(), e)),
        );

        Ok(build)
    }

    /// Scene phase: parse on a pool bounded to the configured concurrency
    fn parse_scenes(
        &self,
        scenes: &[ProjectFile],
        failures: &mut Vec<FileFailure>,
    ) -> Result<Vec<SceneGraph>, PipelineError> {
        let concurrency = self.config.pipeline.scene_concurrency.max(1);
        info!("Parsing {} scenes ({} at a time)...", scenes.len(), concurrency);

        let pool = ThreadPoolBuilder::new().num_threads(concurrency).build()?;
        let builder = SceneGraphBuilder::new();

        self.progress.set_length(scenes.len() as u64);
        let results: Vec<Result<SceneGraph, SceneError>> = pool.install(|| {
            scenes
                .par_iter()
                .map(|scene| {
                    let result = builder.parse_file(&scene.path);
                    self.progress.inc(1);
                    result
                })
                .collect()
        });
        self.progress.finish_and_clear();

        let mut graphs = Vec::with_capacity(results.len());
        for (scene, result) in scenes.iter().zip(results) {
            match result {
                Ok(graph) => {
                    if graph.skipped_documents() > 0 {
                        debug!(
                            "{}: {} malformed documents skipped",
                            graph.name(),
                            graph.skipped_documents()
                        );
                    }
                    graphs.push(graph);
                }
                Err(e) => {
                    warn!("Scene parse error (continuing): {}", e);
                    failures.push(FileFailure::new(&scene.path, &e));
                }
            }
        }

        Ok(graphs)
    }
}
