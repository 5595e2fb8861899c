//! Integration tests for Orrery
//!
//! These tests drive the crates together: source loading, graph building,
//! the interactive session, the HTTP surface and the CLI binary.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use orrery_core::{LayoutMode, NodeId, OrreryConfig};
use orrery_interact::{Interaction, Session, SessionConfig};
use orrery_layout::Point;
use orrery_server::{ServerState, SimulationLoop, router::create_router};
use orrery_watcher::{RebuildService, Source};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

const SNAPSHOT: &str = r#"{
    "files": [
        {"path": "src/a.ts", "type": "blob"},
        {"path": "src/b.ts", "type": "blob"},
        {"path": "lib/c.ts", "type": "blob"}
    ],
    "edges": [
        {"from": "src/a.ts", "to": "src/b.ts"},
        {"from": "src/a.ts", "to": "react"}
    ]
}"#;

fn write_repo(dir: &Path) {
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::create_dir_all(dir.join("lib")).unwrap();
    std::fs::write(dir.join("src/a.ts"), "import './b'").unwrap();
    std::fs::write(dir.join("src/b.ts"), "").unwrap();
    std::fs::write(dir.join("lib/c.ts"), "").unwrap();
    std::fs::write(dir.join("edges.json"), r#"{"edges": [{"from": "src/a.ts", "to": "src/b.ts"}]}"#).unwrap();
}

fn snapshot_session(dir: &Path, config: &OrreryConfig) -> Session {
    let path = dir.join("snapshot.json");
    std::fs::write(&path, SNAPSHOT).unwrap();
    let outcome = Source::Snapshot(path).build(config.node_budget).unwrap();
    Session::new(outcome, SessionConfig::from(config))
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[test]
fn test_walked_tree_with_edge_snapshot() {
    let dir = TempDir::new().unwrap();
    write_repo(dir.path());
    let source = Source::Tree {
        root: dir.path().to_path_buf(),
        edges: Some(dir.path().join("edges.json")),
    };
    let graph = source.build(300).unwrap().graph;

    assert!(graph.contains_node(&NodeId::file("src/a.ts")));
    assert!(graph.contains_node(&NodeId::folder("lib")));
    assert_eq!(graph.stats().internal_edges, 1);
    assert!(graph.is_referentially_sound());
}

#[test]
fn test_configured_session_settles_inside_viewport() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("orrery.toml"),
        "layout_mode = \"radial\"\n\n[viewport]\nwidth = 800.0\nheight = 600.0\n",
    )
    .unwrap();
    let config = OrreryConfig::discover(dir.path()).unwrap();
    let mut session = snapshot_session(dir.path(), &config);

    let mut frame = session.frame();
    while session.is_active() && frame.tick < 5000 {
        frame = session.frame();
    }
    assert!(!session.is_active());
    assert_eq!(frame.mode, LayoutMode::Radial);
    assert_eq!(frame.nodes.len(), 7);
    for node in &frame.nodes {
        assert!((0.0..=800.0).contains(&node.x), "{} x={}", node.id, node.x);
        assert!((0.0..=600.0).contains(&node.y), "{} y={}", node.id, node.y);
    }
}

#[test]
fn test_drag_then_rebuild_keeps_session_consistent() {
    let dir = TempDir::new().unwrap();
    let config = OrreryConfig::default();
    let mut session = snapshot_session(dir.path(), &config);
    let a = NodeId::file("src/a.ts");
    let start = session.simulation().world().position(&a).unwrap();

    session.submit(Interaction::PointerDown {
        at: Point::new(100.0, 100.0),
        node: Some(a.clone()),
    });
    session.submit(Interaction::PointerMove {
        at: Point::new(160.0, 140.0),
    });
    let dragging = session.frame();
    assert!(dragging.node(&a).unwrap().selected);
    assert_ne!(session.simulation().world().position(&a).unwrap(), start);
    session.submit(Interaction::PointerUp);
    session.frame();

    let smaller = Source::Snapshot(dir.path().join("snapshot.json"));
    std::fs::write(
        dir.path().join("snapshot.json"),
        r#"{"files": [{"path": "src/a.ts", "type": "blob"}], "edges": []}"#,
    )
    .unwrap();
    let diff = session.rebuild(smaller.build(300).unwrap());
    assert!(diff.is_structural());
    let frame = session.frame();
    assert!(frame.node(&NodeId::file("lib/c.ts")).is_none());
    assert!(frame.node(&a).is_some());
    assert!(frame.edges.iter().all(|e| frame.node(&e.source).is_some() && frame.node(&e.target).is_some()));
}

#[tokio::test]
async fn test_http_endpoints() {
    let dir = TempDir::new().unwrap();
    let session = snapshot_session(dir.path(), &OrreryConfig::default());
    let state = Arc::new(ServerState::new(session));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_router(state);
    let server = tokio::spawn(async move { axum_serve(listener, app).await });

    let health = http_get(addr, "/api/health").await;
    assert!(health.starts_with("HTTP/1.1 200"));
    assert!(health.contains("\"status\":\"ok\""));

    let stats = http_get(addr, "/api/stats").await;
    assert!(stats.contains("\"files\":3"));

    let blast = http_get(addr, "/api/blast/src/b.ts").await;
    assert!(blast.contains("src/a.ts"));
    assert!(blast.contains("pkg:react"));

    let missing = http_get(addr, "/api/blast/nope.ts").await;
    assert!(missing.starts_with("HTTP/1.1 404"));

    server.abort();
}

async fn axum_serve(listener: TcpListener, app: axum::Router) {
    let _ = axum::serve(listener, app).await;
}

#[tokio::test]
async fn test_watcher_rebuild_reaches_loop() {
    let dir = TempDir::new().unwrap();
    let config = OrreryConfig::default();
    let session = snapshot_session(dir.path(), &config);
    let state = Arc::new(ServerState::new(session));

    let (tx, rx) = mpsc::unbounded_channel();
    let service = RebuildService::new(&Source::Snapshot(dir.path().join("snapshot.json")), 300, tx).unwrap();
    let sim = SimulationLoop::spawn(state.clone(), rx, Duration::from_millis(5));

    std::fs::write(
        dir.path().join("snapshot.json"),
        r#"{"files": [{"path": "x.ts", "type": "blob"}, {"path": "y.ts", "type": "blob"}], "edges": []}"#,
    )
    .unwrap();
    assert!(service.rebuild_now());

    let mut merged = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if state.session.lock().await.graph().contains_node(&NodeId::file("x.ts")) {
            merged = true;
            break;
        }
    }
    assert!(merged);
    sim.stop(&state).await;
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .arg("version")
        .output()
        .expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Orrery v"));
}

#[test]
fn test_cli_stats_and_layout() {
    let dir = TempDir::new().unwrap();
    write_repo(dir.path());
    let root = dir.path().to_str().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .args(["--root", root, "stats", "--edges"])
        .arg(dir.path().join("edges.json"))
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("internal:     1"), "{stdout}");

    let frame_path = dir.path().join("frame.json");
    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .args(["--root", root, "layout", "--mode", "grid", "--output"])
        .arg(&frame_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let frame: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&frame_path).unwrap()).unwrap();
    assert_eq!(frame["mode"], "grid");
    assert!(frame["nodes"].as_array().unwrap().len() >= 4);
}

#[test]
fn test_cli_stats_reports_missing_edges() {
    let dir = TempDir::new().unwrap();
    write_repo(dir.path());

    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .args(["--root", dir.path().to_str().unwrap(), "stats"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pruned nodes:   0"), "{stdout}");
    assert!(stdout.contains("Degraded: no files or no dependency edges"), "{stdout}");
    assert!(!stdout.contains("budget"), "{stdout}");
}

#[test]
fn test_cli_rejects_bad_mode() {
    let output = Command::new(env!("CARGO_BIN_EXE_orrery"))
        .args(["stats", "--mode", "spiral"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}
