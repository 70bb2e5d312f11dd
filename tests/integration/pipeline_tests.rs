//! End-to-end pipeline tests
//!
//! These tests run the full analysis against the fixture Unity project and
//! against small projects written to a temporary directory.

use searchdeadscripts::config::Config;
use searchdeadscripts::report::{JSON_REPORT_FILE, TEXT_REPORT_FILE};
use searchdeadscripts::{AnalysisPipeline, PipelineError, ReportFormat, Reporter, UnityProject};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_project() -> UnityProject {
    UnityProject::open(fixtures_path().join("unity_project")).expect("fixture project should open")
}

fn write_script(assets: &Path, name: &str, source: &str, guid: &str) {
    fs::write(assets.join(format!("{}.cs", name)), source).unwrap();
    fs::write(
        assets.join(format!("{}.cs.meta", name)),
        format!("fileFormatVersion: 2\nguid: {}\n", guid),
    )
    .unwrap();
}

fn temp_project(dir: &TempDir) -> UnityProject {
    fs::create_dir_all(dir.path().join("Assets")).unwrap();
    fs::create_dir_all(dir.path().join("ProjectSettings")).unwrap();
    UnityProject::open(dir.path()).unwrap()
}

#[test]
fn test_fixture_project_unused_scripts() {
    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&fixture_project()).unwrap();

    // MathUtil is not a behaviour and never enters the registry
    assert_eq!(outcome.registry.len(), 4);
    assert!(outcome.registry.find_by_name("MathUtil.cs").is_none());

    assert!(!outcome.is_unused("Player.cs"), "attached to Level");
    assert!(!outcome.is_unused("Spawnable.cs"), "referenced through Player.spawnable");
    assert!(outcome.is_unused("Weapon.cs"), "weapon field holds no reference");
    assert!(outcome.is_unused("Legacy.cs"), "never attached or referenced");

    assert_eq!(outcome.summary.scene_files, 2);
    assert_eq!(outcome.summary.script_files, 5);
    assert_eq!(outcome.summary.scenes_parsed, 2);
    assert!(outcome.failures.is_empty(), "unexpected failures: {:?}", outcome.failures);
}

#[test]
fn test_fixture_project_serialized_fields() {
    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&fixture_project()).unwrap();

    let player = outcome
        .registry
        .get(outcome.registry.find_by_name("Player.cs").unwrap())
        .unwrap();
    let fields: Vec<&str> = player.serialized_fields.iter().map(String::as_str).collect();
    assert_eq!(fields, vec!["spawnable", "weapon"]);
}

#[test]
fn test_fixture_project_reports() {
    let out = TempDir::new().unwrap();
    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&fixture_project()).unwrap();

    let written = Reporter::new(ReportFormat::Text, out.path().to_path_buf())
        .report(&outcome)
        .unwrap();
    assert_eq!(written.len(), 3);

    let report = fs::read_to_string(out.path().join(TEXT_REPORT_FILE)).unwrap();
    assert_eq!(
        report,
        "Script name: Legacy.cs GUID: 4d5e6f7a8b9c40d1e2f3a4b5c6d7e8f9\n\
         Script name: Weapon.cs GUID: 3c4d5e6f7a8b49c0d1e2f3a4b5c6d7e8\n"
    );

    let main = fs::read_to_string(out.path().join("Main.unity.dump")).unwrap();
    assert_eq!(main, "- Level\n  - Spawn Point\n");
    let menu = fs::read_to_string(out.path().join("Menu.unity.dump")).unwrap();
    assert_eq!(menu, "- Menu Root\n");
}

#[test]
fn test_json_report_lists_unused_scripts() {
    let out = TempDir::new().unwrap();
    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&fixture_project()).unwrap();

    Reporter::new(ReportFormat::Json, out.path().to_path_buf())
        .with_hierarchy_dumps(false)
        .report(&outcome)
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.path().join(JSON_REPORT_FILE)).unwrap()).unwrap();
    assert_eq!(json["unused_count"], 2);
    assert_eq!(json["scripts"][0]["name"], "Legacy.cs");
    assert!(!out.path().join("Main.unity.dump").exists());
}

#[test]
fn test_missing_meta_reports_script_without_identity() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    let assets = dir.path().join("Assets");

    fs::write(
        assets.join("Main.unity"),
        "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n\
         --- !u!114 &1\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: aaaa, type: 3}\n",
    )
    .unwrap();
    write_script(&assets, "Attached", "public class Attached : MonoBehaviour {}", "aaaa");
    fs::write(assets.join("NoMeta.cs"), "public class NoMeta : MonoBehaviour {}").unwrap();

    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&project).unwrap();

    assert!(!outcome.is_unused("Attached.cs"));
    assert!(outcome.is_unused("NoMeta.cs"));
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.failures[0].path.ends_with("NoMeta.cs.meta"));
}

#[test]
fn test_numeric_looking_guids_survive_end_to_end() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    let assets = dir.path().join("Assets");

    fs::write(
        assets.join("Main.unity"),
        "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n\
         --- !u!114 &1\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: 98765432109876543210987654321098, type: 3}\n",
    )
    .unwrap();
    write_script(
        &assets,
        "Digits",
        "public class Digits : MonoBehaviour {}",
        "98765432109876543210987654321098",
    );
    write_script(
        &assets,
        "Exponent",
        "public class Exponent : MonoBehaviour {}",
        "12345678901234567890123456789e12",
    );

    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&project).unwrap();
    assert!(outcome.failures.is_empty(), "unexpected failures: {:?}", outcome.failures);
    assert!(!outcome.is_unused("Digits.cs"));
    assert!(outcome.is_unused("Exponent.cs"));

    let out = TempDir::new().unwrap();
    Reporter::new(ReportFormat::Text, out.path().to_path_buf())
        .with_hierarchy_dumps(false)
        .report(&outcome)
        .unwrap();
    let report = fs::read_to_string(out.path().join(TEXT_REPORT_FILE)).unwrap();
    assert_eq!(report, "Script name: Exponent.cs GUID: 12345678901234567890123456789e12\n");
}

#[test]
fn test_bad_scene_does_not_stop_run() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    let assets = dir.path().join("Assets");

    fs::write(assets.join("Broken.unity"), [0xff, 0xfe, 0x00]).unwrap();
    fs::write(
        assets.join("Good.unity"),
        "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n\
         --- !u!114 &1\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: aaaa, type: 3}\n",
    )
    .unwrap();
    write_script(&assets, "Used", "public class Used : MonoBehaviour {}", "aaaa");
    write_script(&assets, "Idle", "public class Idle : MonoBehaviour {}", "bbbb");

    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&project).unwrap();

    assert_eq!(outcome.summary.scene_files, 2);
    assert_eq!(outcome.summary.scenes_parsed, 1);
    assert!(!outcome.is_unused("Used.cs"));
    assert!(outcome.is_unused("Idle.cs"));
    assert!(outcome.failures.iter().any(|f| f.path.ends_with("Broken.unity")));
}

#[test]
fn test_same_named_scenes_keep_both_dumps() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    let assets = dir.path().join("Assets");
    write_script(&assets, "Idle", "public class Idle : MonoBehaviour {}", "aaaa");

    for (folder, name) in [("A", "Alpha"), ("B", "Beta")] {
        fs::create_dir_all(assets.join(folder)).unwrap();
        fs::write(
            assets.join(folder).join("Main.unity"),
            format!(
                "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n\
                 --- !u!1 &1\nGameObject:\n  m_Component:\n  - component: {{fileID: 2}}\n  m_Name: {}\n\
                 --- !u!4 &2\nTransform:\n  m_Children: []\n  m_Father: {{fileID: 0}}\n",
                name
            ),
        )
        .unwrap();
    }

    let config = Config::default();
    let outcome = AnalysisPipeline::new(&config).run(&project).unwrap();
    let out = TempDir::new().unwrap();
    let written = Reporter::new(ReportFormat::Text, out.path().to_path_buf())
        .report(&outcome)
        .unwrap();

    assert_eq!(written.len(), 3);
    assert_eq!(fs::read_to_string(out.path().join("Main.unity.dump")).unwrap(), "- Alpha\n");
    assert_eq!(fs::read_to_string(out.path().join("Main.unity.2.dump")).unwrap(), "- Beta\n");
}

#[test]
fn test_excluded_directories_are_not_scanned() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    let assets = dir.path().join("Assets");
    let vendored = assets.join("Plugins/Vendor");
    fs::create_dir_all(&vendored).unwrap();

    fs::write(assets.join("Main.unity"), "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n").unwrap();
    write_script(&assets, "Mine", "public class Mine : MonoBehaviour {}", "aaaa");
    write_script(&vendored, "Theirs", "public class Theirs : MonoBehaviour {}", "bbbb");

    let mut config = Config::default();
    config.exclude.push("**/Plugins/**".to_string());
    let outcome = AnalysisPipeline::new(&config).run(&project).unwrap();

    assert_eq!(outcome.registry.len(), 1);
    assert!(outcome.is_unused("Mine.cs"));
    assert!(!outcome.is_unused("Theirs.cs"));
}

#[test]
fn test_single_scene_worker() {
    let mut config = Config::default();
    config.pipeline.scene_concurrency = 1;
    config.pipeline.script_threads = 2;
    let outcome = AnalysisPipeline::new(&config).run(&fixture_project()).unwrap();

    assert!(outcome.is_unused("Legacy.cs"));
    assert!(!outcome.is_unused("Spawnable.cs"));
}

#[test]
fn test_project_without_scenes_fails() {
    let dir = TempDir::new().unwrap();
    let project = temp_project(&dir);
    write_script(&dir.path().join("Assets"), "Lonely", "public class Lonely : MonoBehaviour {}", "aaaa");

    let config = Config::default();
    let err = AnalysisPipeline::new(&config).run(&project).unwrap_err();
    assert!(matches!(err, PipelineError::NoScenes(_)));
}
