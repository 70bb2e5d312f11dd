mod file_finder;
mod project;

pub use file_finder::{meta_path_for, FileFinder, FileStats, FileType, ProjectFile, META_EXTENSION};
pub use project::{ProjectError, UnityProject, ASSETS_DIR, PROJECT_SETTINGS_DIR};
