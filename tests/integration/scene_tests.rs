//! Scene parsing integration tests
//!
//! These tests drive the two-pass scene parser over whole scene files and
//! check the resulting hierarchy and behaviour records.

use searchdeadscripts::graph::{BEHAVIOUR_CLASS_ID, TRANSFORM_CLASS_ID};
use searchdeadscripts::{Guid, HierarchyReporter, SceneGraphBuilder};
use std::path::PathBuf;

const HEADER: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

/// Get the path to the test fixtures directory
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn parse(body: &str) -> searchdeadscripts::SceneGraph {
    SceneGraphBuilder::new().parse_str("Test.unity", &format!("{}{}", HEADER, body))
}

#[test]
fn test_root_and_child_round_trip() {
    let graph = parse(
        "--- !u!1 &1\nGameObject:\n  m_Component:\n  - component: {fileID: 2}\n  m_Name: Root\n\
         --- !u!4 &2\nTransform:\n  m_Children:\n  - {fileID: 4}\n  m_Father: {fileID: 0}\n\
         --- !u!1 &3\nGameObject:\n  m_Component:\n  - component: {fileID: 4}\n  m_Name: Child\n\
         --- !u!4 &4\nTransform:\n  m_Children: []\n  m_Father: {fileID: 2}\n",
    );

    let anchors: Vec<i64> = graph.catalog().file_ids().collect();
    assert_eq!(anchors.len(), 4);
    for id in [1, 2, 3, 4] {
        assert!(anchors.contains(&id), "anchor {} missing from catalog", id);
    }
    assert!(graph.catalog().is_class(2, TRANSFORM_CLASS_ID));

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.node(4).unwrap().parent, 2);
    assert_eq!(graph.node(2).unwrap().children, vec![4]);

    let dump = HierarchyReporter::new().render(&graph);
    assert_eq!(dump, "- Root\n  - Child\n");
}

#[test]
fn test_malformed_document_does_not_stop_scene() {
    let graph = parse(
        "--- !u!1 &1\nGameObject:\n  m_Component:\n  - component: {fileID: 2}\n  m_Name: Kept\n\
         --- !u!4 &2\nTransform:\n  m_Father: {fileID: 0}\n\
         --- !u!1 &5\nGameObject:\n  m_Component: [unclosed\n\
         --- !u!x &9\nGameObject:\n  m_Component: []\n  m_Name: BadTag\n\
         --- !u!4 &6\nTransform:\n  m_Children: []\n",
    );

    assert_eq!(graph.node(2).unwrap().name, "Kept");
    assert!(!graph.catalog().contains(9));
    assert_eq!(graph.catalog().skipped(), 1);
    assert_eq!(graph.skipped_documents(), 3);
}

#[test]
fn test_stripped_documents_are_cataloged() {
    let graph = parse(
        "--- !u!114 &7 stripped\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: aaa, type: 3}\n\
         --- !u!114 &8\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: bbb, type: 3}\n  prefabLink: {fileID: 7}\n",
    );

    assert!(graph.catalog().is_class(7, BEHAVIOUR_CLASS_ID));
    let link = graph.behaviour(8).unwrap();
    assert_eq!(link.field_referencing(&Guid::new("aaa")), Some("prefabLink"));
}

#[test]
fn test_numeric_looking_guids_keep_their_text() {
    let graph = parse(
        "--- !u!114 &3\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: 98765432109876543210987654321098, type: 3}\n  \
         target: {fileID: 11500000, guid: 12345678901234567890123456789e12, type: 3}\n",
    );

    assert_eq!(graph.skipped_documents(), 0);
    assert_eq!(graph.behaviour_count(), 1);
    let behaviour = graph.behaviour(3).unwrap();
    assert_eq!(behaviour.script.as_str(), "98765432109876543210987654321098");
    assert_eq!(
        behaviour.field_referencing(&Guid::new("12345678901234567890123456789e12")),
        Some("target")
    );
}

#[test]
fn test_unknown_record_types_are_ignored() {
    let graph = parse(
        "--- !u!29 &1\nOcclusionCullingSettings:\n  serializedVersion: 2\n\
         --- !u!104 &2\nRenderSettings:\n  m_Fog: 0\n",
    );

    assert_eq!(graph.catalog().len(), 2);
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.behaviour_count(), 0);
    assert_eq!(graph.skipped_documents(), 0);
}

#[test]
fn test_parse_fixture_scene() {
    let path = fixtures_path().join("unity_project/Assets/Scenes/Main.unity");
    let graph = SceneGraphBuilder::new().parse_file(&path).unwrap();

    assert_eq!(graph.name(), "Main.unity");
    assert_eq!(graph.path(), Some(path.as_path()));
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.behaviour_count(), 1);

    let player = Guid::new("1a2b3c4d5e6f47a8b9c0d1e2f3a4b5c6");
    assert!(graph.has_attached(&player));

    let behaviour = graph.behaviour(102).unwrap();
    assert_eq!(
        behaviour.field_referencing(&Guid::new("2b3c4d5e6f7a48b9c0d1e2f3a4b5c6d7")),
        Some("spawnable")
    );

    let dump = HierarchyReporter::new().render(&graph);
    assert_eq!(dump, "- Level\n  - Spawn Point\n");
}

#[test]
fn test_missing_scene_file_is_an_error() {
    let path = fixtures_path().join("unity_project/Assets/Scenes/Missing.unity");
    let err = SceneGraphBuilder::new().parse_file(&path).unwrap_err();
    assert!(err.to_string().contains("Missing.unity"));
}
