use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for SearchDeadScripts analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories under `Assets` to analyze (empty = all of `Assets`)
    pub targets: Vec<PathBuf>,

    /// Patterns to exclude from analysis
    pub exclude: Vec<String>,

    /// Script name patterns never reported as unused
    pub retain_patterns: Vec<String>,

    /// Extensions of scene files, without the dot
    pub scene_extensions: Vec<String>,

    /// Worker pool configuration
    pub pipeline: PipelineConfig,

    /// Script symbol configuration
    pub scripts: ScriptConfig,

    /// Report configuration
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Scenes parsed at once
    pub scene_concurrency: usize,

    /// Threads for script parsing, 0 = available parallelism
    pub script_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Base type names a script must derive from to be attachable
    pub base_behaviour_types: Vec<String>,

    /// Additional type names treated as serializable value types
    pub extra_serializable_types: Vec<String>,

    /// Additional type names treated as engine object types
    pub extra_engine_object_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: text, json
    pub format: String,

    /// Write a hierarchy dump per scene
    pub dump_hierarchy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/Library/**".to_string(),
                "**/Temp/**".to_string(),
                "**/Packages/**".to_string(),
            ],
            retain_patterns: vec![],
            scene_extensions: vec!["unity".to_string()],
            pipeline: PipelineConfig::default(),
            scripts: ScriptConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scene_concurrency: 3,
            script_threads: 0,
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            base_behaviour_types: vec![
                "MonoBehaviour".to_string(),
                "UnityEngine.MonoBehaviour".to_string(),
            ],
            extra_serializable_types: vec![],
            extra_engine_object_types: vec![],
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            dump_hierarchy: true,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".deadscripts.yml",
            ".deadscripts.yaml",
            ".deadscripts.toml",
            "deadscripts.yml",
            "deadscripts.yaml",
            "deadscripts.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if a pattern matches for exclusion
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }

    /// Check if a script should never be reported as unused
    pub fn should_retain(&self, name: &str) -> bool {
        self.retain_patterns.iter().any(|p| glob_match(p, name))
    }

    /// Whether a file extension marks a scene file
    pub fn is_scene_extension(&self, extension: &str) -> bool {
        self.scene_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }
}

/// Simple glob matching for patterns like "*Editor.cs" or "**/Plugins/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    // Handle simple wildcard patterns
    if pattern.starts_with('*') && !pattern.contains('/') {
        // Pattern like "*Editor.cs" matches "LevelEditor.cs"
        let suffix = &pattern[1..];
        return text.ends_with(suffix);
    }

    if pattern.ends_with('*') && !pattern.contains('/') {
        // Pattern like "Debug*" matches "DebugOverlay.cs"
        let prefix = &pattern[..pattern.len() - 1];
        return text.starts_with(prefix);
    }

    // Handle path patterns with **
    if pattern.contains("**") {
        let cleaned = pattern.replace("**/", "").replace("/**", "");

        // "**/Plugins/**" must match a whole directory name, not a substring
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = cleaned.trim_matches('/');
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern);
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true; // Pattern is just "**"
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            // Both prefix and suffix
            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    // Exact match
    text == pattern
}
