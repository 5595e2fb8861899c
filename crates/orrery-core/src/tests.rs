//! Unit tests for orrery-core module

use crate::test_utils::{chain, scenario_a, wide_repo};
use crate::*;

fn dump(graph: &Graph) -> String {
    let nodes = graph
        .nodes()
        .map(|n| format!("{} {} {}", n.kind.tag(), n.id, n.color));
    let edges = graph
        .edges()
        .map(|e| format!("{} w={} ext={}", e.id, e.weight, e.is_external));
    nodes.chain(edges).collect::<Vec<_>>().join("\n")
}

#[test]
fn test_scenario_a_graph() {
    let (files, edges) = scenario_a();
    let outcome = build(&files, &edges, DEFAULT_NODE_BUDGET);
    let graph = &outcome.graph;

    insta::assert_snapshot!(dump(graph), @r"
    root root #9aa0a6
    folder dir:src #4e79a7
    file src/a.ts #4e79a7
    file src/b.ts #4e79a7
    folder dir:lib #f28e2b
    file lib/c.ts #f28e2b
    package pkg:react #6b6ecf
    tree:root->dir:src w=1 ext=false
    tree:dir:src->src/a.ts w=1 ext=false
    tree:dir:src->src/b.ts w=1 ext=false
    tree:root->dir:lib w=1 ext=false
    tree:dir:lib->lib/c.ts w=1 ext=false
    dep:src/a.ts->src/b.ts w=1 ext=false
    dep:src/a.ts->pkg:react w=1 ext=true
    ");

    let react = graph.node(&NodeId::package("react")).unwrap();
    assert_eq!(react.label, "react");
    assert_eq!(react.kind, NodeKind::Package { name: "react".to_string() });
    assert_eq!(outcome.report.pruned, 0);
    assert!(!outcome.report.degraded);

    let unpruned = build_graph(&files, &edges).graph;
    assert_eq!(dump(&unpruned), dump(graph));
}

#[test]
fn test_scenario_b_budget() {
    let files = wide_repo(400);
    let first = build(&files, &[], 300);
    let second = build(&files, &[], 300);

    assert!(first.graph.node_count() <= 300);
    assert!(first.report.degraded);
    assert_eq!(first.report.pruned, 449 - first.graph.node_count());
    assert!(first.graph.contains_node(&NodeId::root()));
    for top in 0..8 {
        assert!(first.graph.contains_node(&NodeId::folder(&format!("mod{top}"))));
    }
    // Equal degrees fall back to encounter order: the earliest files survive.
    assert!(first.graph.contains_node(&NodeId::file("mod0/part0/file000.ts")));
    assert!(!first.graph.contains_node(&NodeId::file("mod7/part4/file399.ts")));
    assert_eq!(dump(&first.graph), dump(&second.graph));
    assert!(first.graph.is_referentially_sound());
}

#[test]
fn test_every_kept_node_has_a_path_to_root() {
    let files = wide_repo(200);
    let graph = build(&files, &[], 60).graph;
    for node in graph.nodes().filter(|n| !n.kind.is_root() && !n.kind.is_package()) {
        let ancestors = graph.ancestors(&node.id);
        assert_eq!(ancestors.last(), Some(&NodeId::root()), "{} is detached", node.id);
    }
}

#[test]
fn test_referential_integrity_with_noise() {
    let mut files = wide_repo(50);
    files.push(FileEntry::file("./weird//path.ts"));
    let edges = vec![
        RawEdge::import("mod0/part0/file000.ts", "mod1/part0/file001.ts"),
        RawEdge::import("mod0/part0/file000.ts", "../nowhere"),
        RawEdge::import("nobody.ts", "react"),
        RawEdge::import("weird/path.ts", "@types/node/fs"),
        RawEdge::import("weird/path.ts", "lodash/fp"),
    ];
    for budget in [1, 5, 20, 300] {
        let graph = build(&files, &edges, budget).graph;
        assert!(graph.is_referentially_sound(), "budget {budget}");
        assert!(graph.node_count() <= budget.max(1));
        assert!(graph.edges().all(|e| e.weight >= 1));
    }
    let graph = build_graph(&files, &edges).graph;
    assert!(graph.contains_node(&NodeId::package("@types/node")));
    assert!(graph.contains_node(&NodeId::package("lodash")));
}

#[test]
fn test_label_truncation_and_size() {
    let files = [FileEntry::file("src/averyveryverylongfilename.tsx")];
    let graph = build_graph(&files, &[]).graph;
    let node = graph.node(&NodeId::file("src/averyveryverylongfilename.tsx")).unwrap();
    assert_eq!(node.label, "averyveryverylongfilename.tsx");
    assert_eq!(node.display_name, "averyver…me.tsx");
    assert_eq!(node.visual_size, 90.0);

    let short = graph.node(&NodeId::folder("src")).unwrap();
    assert_eq!(short.display_name, "src");
    assert_eq!(short.visual_size, 30.5);
}

#[test]
fn test_folder_path_is_prefix_of_path() {
    let graph = build_graph(&wide_repo(30), &[]).graph;
    for node in graph.nodes() {
        if let Some(path) = node.kind.path() {
            assert!(path.starts_with(&node.folder_path));
        }
    }
}

#[test]
fn test_stats() {
    let (files, edges) = chain(5);
    let mut edges = edges;
    edges.push(RawEdge::import("n0.ts", "serde"));
    let stats = build_graph(&files, &edges).graph.stats();
    assert_eq!(
        stats,
        GraphStats {
            files: 5,
            folders: 0,
            packages: 1,
            internal_edges: 4,
            external_edges: 1,
            contains_edges: 5,
        }
    );
}

#[test]
fn test_layout_mode_names() {
    for mode in LayoutMode::ALL {
        assert_eq!(mode.as_str().parse::<LayoutMode>().unwrap(), mode);
        let json = serde_json::to_string(&mode).unwrap();
        assert_eq!(json, format!("\"{}\"", mode.as_str()));
    }
    assert!("spiral".parse::<LayoutMode>().is_err());
}

#[test]
fn test_node_serialization_is_tagged() {
    let (files, edges) = scenario_a();
    let graph = build_graph(&files, &edges).graph;
    let value = serde_json::to_value(graph.node(&NodeId::folder("src")).unwrap()).unwrap();
    assert_eq!(value["kind"], "folder");
    assert_eq!(value["depth"], 0);
    assert_eq!(value["color"], "#4e79a7");
}
