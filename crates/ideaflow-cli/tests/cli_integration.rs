//! Integration tests for the ideaflow binary.
//!
//! These run the compiled CLI in a scratch directory with `--dry-run`, so no
//! API key or network access is needed.

use std::process::{Command, Output};

fn ideaflow(dir: &std::path::Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ideaflow"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("IDEAFLOW_PIPELINE")
        .output()
        .expect("Failed to run ideaflow binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_prompt_mode_prints_the_workflow_log() {
    let dir = tempfile::tempdir().unwrap();
    let output = ideaflow(dir.path(), &["-p", "eco-friendly water bottle", "--dry-run"]);

    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "[Design] received: eco-friendly water bottle");
    assert_eq!(lines[7], "[Support] response: Support says: ok");
}

#[test]
fn test_run_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = ideaflow(dir.path(), &["run", "smart bottle", "--dry-run", "--json"]);

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(body["workflow"].as_array().unwrap().len(), 8);
    assert!(body.get("error").is_none());
}

#[test]
fn test_empty_idea_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = ideaflow(dir.path(), &["run", "  ", "--dry-run"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Empty idea provided"));
}

#[test]
fn test_custom_pipeline_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pipeline.yaml"),
        "name: \"Short\"\nagents:\n  - name: Design\n  - name: Legal\n    system_prompt: \"Check claims.\"\n",
    )
    .unwrap();

    let output = ideaflow(
        dir.path(),
        &["run", "bottle", "--dry-run", "--pipeline", "pipeline.yaml"],
    );
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "[Design] received: bottle\n\
         [Design] response: Design says: ok\n\
         [Legal] received: Design says: ok\n\
         [Legal] response: Legal says: ok"
    );

    let output = ideaflow(dir.path(), &["validate", "pipeline.yaml"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Pipeline 'Short' is valid"));
}

#[test]
fn test_decode_prints_responses_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("log.txt"),
        "[Design] received: bottle\n[Design] response: Ripple\n[Marketing] received: Ripple\n",
    )
    .unwrap();

    let output = ideaflow(dir.path(), &["decode", "log.txt", "--json"]);
    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let steps = body["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0]["agentName"], "Design");
    assert_eq!(steps[0]["content"], "Ripple");

    let output = ideaflow(dir.path(), &["decode", "log.txt", "--all", "--json"]);
    let body: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(body["steps"].as_array().unwrap().len(), 3);
    assert_eq!(body["steps"][2]["content"], "Ripple\n");
}

#[test]
fn test_validate_rejects_bad_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.yaml"), "name: \"Empty\"\nagents: []\n").unwrap();

    let output = ideaflow(dir.path(), &["validate", "bad.yaml"]);
    assert!(!output.status.success());
}
