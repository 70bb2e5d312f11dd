use crate::graph::{FileId, GameObjectNode, SceneGraph};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Deepest level written before a branch is cut off
pub const MAX_DUMP_DEPTH: usize = 512;

/// Extension of hierarchy dump files
pub const DUMP_EXTENSION: &str = "dump";

/// Writes a scene's object tree as an indented list:
///
/// ```text
/// - Root
///   - Child
/// ```
pub struct HierarchyReporter {
    max_depth: usize,
}

impl HierarchyReporter {
    pub fn new() -> Self {
        Self {
            max_depth: MAX_DUMP_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Depth-first dump from every root, roots in anchor order. Each node is
    /// written at most once; children missing from the scene are skipped.
    pub fn render(&self, scene: &SceneGraph) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();

        for root in scene.roots() {
            self.render_node(scene, root, 0, &mut visited, &mut out);
        }

        out
    }

    fn render_node<'s>(
        &self,
        scene: &'s SceneGraph,
        node: &'s GameObjectNode,
        depth: usize,
        visited: &mut HashSet<FileId>,
        out: &mut String,
    ) {
        if depth > self.max_depth {
            warn!("{}: hierarchy deeper than {} levels, cut at {}", scene.name(), self.max_depth, node.id);
            return;
        }
        if !visited.insert(node.id) {
            debug!("{}: node {} reached twice, skipping", scene.name(), node.id);
            return;
        }

        let _ = writeln!(out, "{}- {}", "  ".repeat(depth), node.name);

        for &child_id in &node.children {
            match scene.node(child_id) {
                Some(child) => self.render_node(scene, child, depth + 1, visited, out),
                None => debug!("{}: child {} of {} not in scene", scene.name(), child_id, node.id),
            }
        }
    }

    /// Write `<dir>/<scene name>.dump`
    pub fn write(&self, scene: &SceneGraph, dir: &Path) -> Result<PathBuf> {
        self.write_as(scene, &dump_file_name(scene.name(), 1), dir)
    }

    /// Write one dump per scene. Scenes sharing a file name are told apart by
    /// a counter, in scene order: `Main.unity.dump`, `Main.unity.2.dump`.
    pub fn write_all(&self, scenes: &[SceneGraph], dir: &Path) -> Result<Vec<PathBuf>> {
        scenes
            .iter()
            .zip(unique_dump_names(scenes))
            .map(|(scene, file_name)| self.write_as(scene, &file_name, dir))
            .collect()
    }

    fn write_as(&self, scene: &SceneGraph, file_name: &str, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(file_name);
        std::fs::write(&path, self.render(scene))
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write hierarchy dump: {}", path.display()))?;
        Ok(path)
    }
}

fn dump_file_name(scene_name: &str, occurrence: usize) -> String {
    if occurrence <= 1 {
        format!("{}.{}", scene_name, DUMP_EXTENSION)
    } else {
        format!("{}.{}.{}", scene_name, occurrence, DUMP_EXTENSION)
    }
}

fn unique_dump_names(scenes: &[SceneGraph]) -> Vec<String> {
    let mut taken = HashSet::new();

    scenes
        .iter()
        .map(|scene| {
            let mut occurrence = 1;
            let mut file_name = dump_file_name(scene.name(), occurrence);
            while !taken.insert(file_name.clone()) {
                occurrence += 1;
                file_name = dump_file_name(scene.name(), occurrence);
            }
            if occurrence > 1 {
                debug!("{}: name already dumped, writing {}", scene.name(), file_name);
            }
            file_name
        })
        .collect()
}

impl Default for HierarchyReporter {
    fn default() -> Self {
        Self::new()
    }
}
