//! End-to-end tests running the `callflow` binary

use std::fs;
use std::process::Command;
use tempfile::tempdir;

const TRACE: &str = r#"[
  {
    "call_id": 1,
    "response_id": 2,
    "source": {"kind": "Person", "system": "shop", "label": "user"},
    "target": {"kind": "System", "system": "shop", "label": "api"},
    "operation": "checkout",
    "inputs": [{"cart": 7}],
    "start_time": 0,
    "outcome": {"type": "completed", "time": 10, "result": "ok"}
  }
]"#;

fn callflow() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_callflow"));
    command.args(["--log-level", "error"]);
    command
}

#[test]
fn render_to_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trace.json");
    let output = dir.path().join("trace.puml");
    fs::write(&input, TRACE).unwrap();

    let status = callflow()
        .arg("render")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(["--format", "plantuml", "--name", "Shop"])
        .status()
        .unwrap();
    assert!(status.success());

    let diagram = fs::read_to_string(&output).unwrap();
    assert!(diagram.starts_with("@startuml Shop"));
    assert!(diagram.contains("actor shop.user"));
    assert!(diagram.contains("shop.user -> shop.api : checkout({\"cart\":7})"));
    assert!(diagram.ends_with("@enduml"));
}

#[test]
fn messages_to_stdout() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trace.json");
    fs::write(&input, TRACE).unwrap();

    let output = callflow()
        .arg("messages")
        .arg("--input")
        .arg(&input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let messages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(messages.as_array().unwrap().len(), 2);
    assert_eq!(messages[1]["arrow"], "sync_return");
}

#[test]
fn invalid_input_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("trace.json");
    fs::write(&input, "{\"call_id\": \"one\"}").unwrap();

    let output = callflow()
        .arg("validate")
        .arg("--input")
        .arg(&input)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}
