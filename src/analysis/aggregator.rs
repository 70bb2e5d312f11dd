use super::reachability::ReachabilityAnalyzer;
use crate::graph::SceneGraph;
use crate::registry::{ScriptId, ScriptRegistry};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Scripts not yet proven used by any scene. Starts full and only shrinks.
#[derive(Debug, Default)]
pub struct UnusedSet {
    ids: Mutex<BTreeSet<ScriptId>>,
}

impl UnusedSet {
    /// Every script of the registry
    pub fn full(registry: &ScriptRegistry) -> Self {
        Self::from_ids(registry.ids())
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ScriptId>) -> Self {
        Self {
            ids: Mutex::new(ids.into_iter().collect()),
        }
    }

    /// Current members, in id order
    pub fn snapshot(&self) -> Vec<ScriptId> {
        self.ids.lock().iter().copied().collect()
    }

    pub fn contains(&self, id: ScriptId) -> bool {
        self.ids.lock().contains(&id)
    }

    /// Remove every given id in one step. Returns how many were still present.
    pub fn remove_all(&self, used: impl IntoIterator<Item = ScriptId>) -> usize {
        let mut ids = self.ids.lock();
        used.into_iter().filter(|id| ids.remove(id)).count()
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }

    pub fn into_sorted_vec(self) -> Vec<ScriptId> {
        self.ids.into_inner().into_iter().collect()
    }
}

/// Result of evaluating every scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSummary {
    /// Scripts no scene uses, in id order
    pub unused: Vec<ScriptId>,

    /// Scenes actually evaluated before stopping
    pub scenes_evaluated: usize,

    pub scenes_total: usize,

    /// Stopped because nothing was left to prove used
    pub early_exit: bool,
}

/// Runs the reachability check over every scene, shrinking the unused set
pub struct Aggregator<'r> {
    analyzer: ReachabilityAnalyzer<'r>,
}

impl<'r> Aggregator<'r> {
    pub fn new(registry: &'r ScriptRegistry) -> Self {
        Self {
            analyzer: ReachabilityAnalyzer::new(registry),
        }
    }

    /// Evaluate scenes in order until all are done or no candidate is left.
    /// The result does not depend on scene order.
    pub fn run(&self, scenes: &[SceneGraph]) -> AggregationSummary {
        let unused = UnusedSet::full(self.analyzer.registry());
        let mut scenes_evaluated = 0;
        let mut early_exit = false;

        for scene in scenes {
            if unused.is_empty() {
                early_exit = true;
                debug!(
                    "Every script is used, skipping the remaining {} scenes",
                    scenes.len() - scenes_evaluated
                );
                break;
            }

            self.evaluate_scene(scene, &unused);
            scenes_evaluated += 1;
        }

        let unused = unused.into_sorted_vec();
        info!(
            "Evaluated {}/{} scenes, {} unused scripts",
            scenes_evaluated,
            scenes.len(),
            unused.len()
        );

        AggregationSummary {
            unused,
            scenes_evaluated,
            scenes_total: scenes.len(),
            early_exit,
        }
    }

    /// Remove every candidate this scene proves used. Candidates are checked
    /// in parallel; removal happens under one lock. Safe to call from several
    /// scenes at once.
    pub fn evaluate_scene(&self, scene: &SceneGraph, unused: &UnusedSet) -> usize {
        let registry = self.analyzer.registry();
        let candidates = unused.snapshot();

        let used: Vec<ScriptId> = candidates
            .par_iter()
            .copied()
            .filter(|&id| {
                let Some(script) = registry.get(id) else {
                    return false;
                };
                let usage = self.analyzer.usage(scene, script);
                if !usage.is_unused() {
                    debug!("{}: {} is used ({:?})", scene.name(), script.name, usage);
                }
                !usage.is_unused()
            })
            .collect();

        let removed = unused.remove_all(used);
        debug!(
            "{}: {} of {} candidates used, {} remain",
            scene.name(),
            removed,
            candidates.len(),
            unused.len()
        );
        removed
    }
}
