//! Reachability integration tests
//!
//! Scenes are parsed from text and checked against a hand-built registry.

use searchdeadscripts::{
    Aggregator, Guid, ReachabilityAnalyzer, SceneGraph, SceneGraphBuilder, ScriptRecord, ScriptRegistry, ScriptUsage,
};

const HEADER: &str = "%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n";

fn scene(name: &str, body: &str) -> SceneGraph {
    SceneGraphBuilder::new().parse_str(name, &format!("{}{}", HEADER, body))
}

/// One object carrying a behaviour of `script`, with extra field lines
fn attached(script: &str, fields: &str) -> String {
    format!(
        "--- !u!1 &1\nGameObject:\n  m_Component:\n  - component: {{fileID: 2}}\n  - component: {{fileID: 3}}\n  m_Name: Holder\n\
         --- !u!4 &2\nTransform:\n  m_Children: []\n  m_Father: {{fileID: 0}}\n\
         --- !u!114 &3\nMonoBehaviour:\n  m_GameObject: {{fileID: 1}}\n  m_Script: {{fileID: 11500000, guid: {}, type: 3}}\n{}",
        script, fields
    )
}

fn names(registry: &ScriptRegistry, ids: &[searchdeadscripts::ScriptId]) -> Vec<String> {
    let mut names: Vec<String> = ids
        .iter()
        .filter_map(|&id| registry.get(id))
        .map(|r| r.name.clone())
        .collect();
    names.sort();
    names
}

/// A attached, B untouched, C referenced from A's `target` field. Only the
/// unrelated D declares a field named `target`.
fn scenario() -> (ScriptRegistry, SceneGraph) {
    let registry = ScriptRegistry::from_records(vec![
        ScriptRecord::new("A.cs", "Assets/A.cs", Guid::new("aaaa")),
        ScriptRecord::new("B.cs", "Assets/B.cs", Guid::new("bbbb")),
        ScriptRecord::new("C.cs", "Assets/C.cs", Guid::new("cccc")),
        ScriptRecord::new("D.cs", "Assets/D.cs", Guid::new("dddd")).with_fields(["target"]),
    ]);
    let scene = scene(
        "Main.unity",
        &attached("aaaa", "  target: {fileID: 11500000, guid: cccc, type: 3}\n"),
    );
    (registry, scene)
}

#[test]
fn test_attached_script_is_used() {
    let (registry, scene) = scenario();
    let analyzer = ReachabilityAnalyzer::new(&registry);
    let a = registry.get(registry.find_by_name("A.cs").unwrap()).unwrap();

    assert_eq!(analyzer.usage(&scene, a), ScriptUsage::Attached);
}

#[test]
fn test_untouched_script_is_unused() {
    let (registry, scene) = scenario();
    let analyzer = ReachabilityAnalyzer::new(&registry);
    let b = registry.get(registry.find_by_name("B.cs").unwrap()).unwrap();

    assert!(analyzer.is_unused(&scene, b));
}

#[test]
fn test_field_declared_by_unrelated_script_marks_reference_used() {
    // `target` is declared by D, not by A which holds the reference. The
    // field check consults the whole registry, so C counts as used anyway.
    let (registry, scene) = scenario();
    let analyzer = ReachabilityAnalyzer::new(&registry);
    let c = registry.get(registry.find_by_name("C.cs").unwrap()).unwrap();

    assert_eq!(
        analyzer.usage(&scene, c),
        ScriptUsage::ReferencedByDeclaredField {
            field: "target".to_string()
        }
    );

    let summary = Aggregator::new(&registry).run(&[scene]);
    assert_eq!(names(&registry, &summary.unused), vec!["B.cs", "D.cs"]);
}

#[test]
fn test_reference_through_undeclared_field_is_unused() {
    let registry = ScriptRegistry::from_records(vec![
        ScriptRecord::new("A.cs", "Assets/A.cs", Guid::new("aaaa")),
        ScriptRecord::new("C.cs", "Assets/C.cs", Guid::new("cccc")),
    ]);
    let scene = scene(
        "Main.unity",
        &attached("aaaa", "  target: {fileID: 11500000, guid: cccc, type: 3}\n"),
    );
    let analyzer = ReachabilityAnalyzer::new(&registry);
    let c = registry.get(registry.find_by_name("C.cs").unwrap()).unwrap();

    assert_eq!(
        analyzer.usage(&scene, c),
        ScriptUsage::ReferencedByUndeclaredField {
            field: "target".to_string()
        }
    );
    assert!(analyzer.is_unused(&scene, c));
}

#[test]
fn test_script_without_identity_does_not_match_empty_reference() {
    let registry = ScriptRegistry::from_records(vec![
        ScriptRecord::new("A.cs", "Assets/A.cs", Guid::new("aaaa")).with_fields(["target"]),
        ScriptRecord::new("Orphan.cs", "Assets/Orphan.cs", Guid::empty()).with_fields(["target"]),
    ]);
    let scene = scene(
        "Main.unity",
        &attached("aaaa", "  target: {fileID: 11400000, guid: '', type: 2}\n  blank: {fileID: 0}\n"),
    );
    let analyzer = ReachabilityAnalyzer::new(&registry);
    let orphan = registry.get(registry.find_by_name("Orphan.cs").unwrap()).unwrap();

    assert!(!orphan.has_identity());
    assert_eq!(analyzer.usage(&scene, orphan), ScriptUsage::NoIdentity);

    let summary = Aggregator::new(&registry).run(&[scene]);
    assert_eq!(names(&registry, &summary.unused), vec!["Orphan.cs"]);
}

#[test]
fn test_local_reference_to_attached_behaviour() {
    // B's behaviour is visited first, so A's field resolves through the catalog
    let registry = ScriptRegistry::from_records(vec![
        ScriptRecord::new("A.cs", "Assets/A.cs", Guid::new("aaaa")).with_fields(["partner"]),
        ScriptRecord::new("B.cs", "Assets/B.cs", Guid::new("bbbb")),
    ]);
    let main = scene(
        "Main.unity",
        "--- !u!114 &10\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: bbbb, type: 3}\n\
         --- !u!114 &11\nMonoBehaviour:\n  m_Script: {fileID: 11500000, guid: aaaa, type: 3}\n  partner: {fileID: 10}\n",
    );

    let behaviour = main.behaviour(11).unwrap();
    assert_eq!(behaviour.field_referencing(&Guid::new("bbbb")), Some("partner"));

    let summary = Aggregator::new(&registry).run(&[main, scene("Other.unity", "")]);
    assert!(summary.unused.is_empty());
    assert!(summary.early_exit);
    assert_eq!(summary.scenes_evaluated, 1);
}

#[test]
fn test_aggregation_is_order_independent() {
    let registry = ScriptRegistry::from_records(
        ["A", "B", "C", "D", "E"]
            .iter()
            .map(|n| ScriptRecord::new(format!("{}.cs", n), format!("Assets/{}.cs", n), Guid::new(n.repeat(4))))
            .collect(),
    );
    let scenes = vec![
        scene("One.unity", &attached("AAAA", "")),
        scene("Two.unity", &attached("CCCC", "")),
        scene("Three.unity", &attached("AAAA", "  extra: {fileID: 11500000, guid: EEEE, type: 3}\n")),
    ];

    let forward = Aggregator::new(&registry).run(&scenes);
    let mut reversed_scenes = scenes.clone();
    reversed_scenes.reverse();
    let reversed = Aggregator::new(&registry).run(&reversed_scenes);

    assert_eq!(names(&registry, &forward.unused), vec!["B.cs", "D.cs", "E.cs"]);
    assert_eq!(names(&registry, &forward.unused), names(&registry, &reversed.unused));
    assert_eq!(forward.scenes_evaluated, 3);
    assert!(!forward.early_exit);
}
