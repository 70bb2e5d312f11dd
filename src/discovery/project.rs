use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding every scene and script of a project
pub const ASSETS_DIR: &str = "Assets";

/// Directory holding project-wide engine settings
pub const PROJECT_SETTINGS_DIR: &str = "ProjectSettings";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project path does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("project path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("{} is not a Unity project: missing `{dir}` directory", root.display())]
    MissingDirectory { root: PathBuf, dir: &'static str },
}

/// A validated project root
#[derive(Debug, Clone)]
pub struct UnityProject {
    root: PathBuf,
}

impl UnityProject {
    /// Validate that `path` looks like a project root: it must contain both
    /// `Assets` and `ProjectSettings`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = path.as_ref().to_path_buf();

        if !root.exists() {
            return Err(ProjectError::NotFound(root));
        }
        if !root.is_dir() {
            return Err(ProjectError::NotADirectory(root));
        }

        for dir in [ASSETS_DIR, PROJECT_SETTINGS_DIR] {
            if !root.join(dir).is_dir() {
                return Err(ProjectError::MissingDirectory { root, dir });
            }
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }
}
