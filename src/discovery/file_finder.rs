use super::project::UnityProject;
use crate::config::Config;
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Extension of the companion identity file written next to every asset
pub const META_EXTENSION: &str = "meta";

/// Type of project file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Scene,
    Script,
}

impl FileType {
    /// Determine file type from path
    pub fn from_path(path: &Path, config: &Config) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        if extension.eq_ignore_ascii_case("cs") {
            Some(FileType::Script)
        } else if config.is_scene_extension(extension) {
            Some(FileType::Scene)
        } else {
            None
        }
    }
}

/// Represents a discovered scene or script
#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Type of file
    pub file_type: FileType,
}

impl ProjectFile {
    pub fn new(path: PathBuf, file_type: FileType) -> Self {
        Self { path, file_type }
    }

    /// File name including extension, e.g. `Player.cs`
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Path of the companion identity file, `<file>.meta`
    pub fn meta_path(&self) -> PathBuf {
        meta_path_for(&self.path)
    }
}

/// `Assets/Player.cs` -> `Assets/Player.cs.meta`
pub fn meta_path_for(path: &Path) -> PathBuf {
    let mut meta = path.as_os_str().to_owned();
    meta.push(".");
    meta.push(META_EXTENSION);
    PathBuf::from(meta)
}

/// File finder for discovering scenes and scripts under `Assets`
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all scenes and scripts of a project
    pub fn find_project_files(&self, project: &UnityProject) -> Vec<ProjectFile> {
        self.find_files(&project.assets_dir())
    }

    /// Find all scenes and scripts in the given path
    pub fn find_files(&self, root: &Path) -> Vec<ProjectFile> {
        debug!("Scanning for files in: {}", root.display());

        let targets = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config
                .targets
                .iter()
                .map(|t| root.join(t))
                .collect()
        };

        let mut files: Vec<ProjectFile> = targets
            .par_iter()
            .flat_map(|target| self.scan_directory(target))
            .collect();

        // Walk order is not stable across runs; everything downstream keys off paths
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);

        debug!("Found {} files", files.len());
        files
    }

    /// Scan a single directory for project files
    fn scan_directory(&self, dir: &Path) -> Vec<ProjectFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(dir)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(true)       // Respect global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(true)          // Check parent directories for ignore files
            .follow_links(false)    // Don't follow symlinks
            .build();

        walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();

                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                let file_type = FileType::from_path(path, self.config)?;

                trace!("Found {:?}: {}", file_type, path.display());
                Some(ProjectFile::new(path.to_path_buf(), file_type))
            })
            .collect()
    }
}

/// Statistics about discovered files
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStats {
    pub scene_files: usize,
    pub script_files: usize,
}

impl FileStats {
    pub fn from_files(files: &[ProjectFile]) -> Self {
        let mut stats = Self::default();
        for file in files {
            match file.file_type {
                FileType::Scene => stats.scene_files += 1,
                FileType::Script => stats.script_files += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.scene_files + self.script_files
    }
}
