//! Integration tests for the idea pipeline.
//!
//! These tests drive the executor through the public API with deterministic
//! capabilities and check the shape of the resulting workflow logs, then
//! decode those logs the way a display client would.

use std::sync::Arc;

use ideaflow_core::workflow::codec::{decode, encode_log};
use ideaflow_core::workflow::decoder::{response_steps, response_steps_from_lines};
use ideaflow_core::workflow::{
    AgentSpec, Direction, EchoCapability, OnFailure, PipelineDefinition, PipelineExecutor,
    PipelineStatus, ScriptedCapability, SpecialistLoader, WorkflowLogEntry,
};
use ideaflow_core::PipelineError;

const AGENTS: [&str; 4] = ["Design", "Marketing", "Sales", "Support"];

fn executor_for(names: &[&str], capability: ScriptedCapability) -> PipelineExecutor {
    let agents = names.iter().map(|n| AgentSpec::new(*n, "")).collect();
    PipelineExecutor::from_agents("test", agents, Arc::new(capability))
        .expect("Failed to build executor")
}

#[tokio::test]
async fn test_success_log_alternates_in_agent_order() {
    let names = ["A", "B", "C", "D", "E"];
    let executor = executor_for(&names, ScriptedCapability::new());
    let result = executor.run("seed").await.unwrap();

    assert_eq!(result.status, PipelineStatus::Success);
    assert_eq!(result.log.len(), 2 * names.len());
    for (i, entry) in result.log.entries().iter().enumerate() {
        assert_eq!(entry.agent, names[i / 2]);
        let expected = if i % 2 == 0 { Direction::Received } else { Direction::Response };
        assert_eq!(entry.direction, expected);
    }
}

#[tokio::test]
async fn test_failure_at_each_position_truncates_log() {
    for (k, failing) in AGENTS.iter().enumerate() {
        let executor = executor_for(&AGENTS, ScriptedCapability::new().fail(failing, "down"));
        let result = executor.run("idea").await.unwrap();

        assert_eq!(result.status, PipelineStatus::Failure);
        assert_eq!(result.failed_at.as_deref(), Some(*failing));
        assert_eq!(result.log.len(), 2 * k + 1, "failing agent {}", failing);

        let last = result.log.last().unwrap();
        assert_eq!(last.agent, *failing);
        assert_eq!(last.direction, Direction::Received);
        assert!(result
            .log
            .entries()
            .iter()
            .all(|e| !AGENTS[k + 1..].contains(&e.agent.as_str())));
    }
}

#[tokio::test]
async fn test_dangling_log_decodes_without_the_failed_response() {
    let executor = executor_for(&AGENTS, ScriptedCapability::new().fail("Marketing", "down"));
    let result = executor.run("eco-friendly water bottle").await.unwrap();

    let steps = response_steps(&result.log.to_text());
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].agent_name, "Design");

    let wire = result.to_response_body();
    let lines: Vec<String> = serde_json::from_value(wire["workflow"].clone()).unwrap();
    assert_eq!(response_steps_from_lines(&lines), steps);
}

#[tokio::test]
async fn test_eco_bottle_scenario_end_to_end() {
    let executor = PipelineExecutor::new(
        &PipelineDefinition::default_strategy(),
        &SpecialistLoader::with_builtins(),
        Arc::new(EchoCapability),
    )
    .unwrap();

    let result = executor.run("eco-friendly water bottle").await.unwrap();
    let lines = result.log.to_lines();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[7], "[Support] response: Support says: ok");

    let steps = response_steps_from_lines(&lines);
    let agents: Vec<_> = steps.iter().map(|s| s.agent_name.as_str()).collect();
    assert_eq!(agents, AGENTS);
}

#[tokio::test]
async fn test_runs_are_idempotent_with_fixed_outputs() {
    let capability = ScriptedCapability::new()
        .reply("Design", "Direction 1: Ripple\nDirection 2: Canopy")
        .reply("Sales", "Tiered pricing");
    let executor = executor_for(&AGENTS, capability);

    let first = executor.run("eco-friendly water bottle").await.unwrap();
    let second = executor.run("eco-friendly water bottle").await.unwrap();
    assert_eq!(first.log.to_text(), second.log.to_text());
    assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_multiline_responses_survive_the_round_trip() {
    let capability = ScriptedCapability::new()
        .reply("Design", "### Direction 1\n- recycled steel\n\n### Direction 2")
        .reply("Marketing", "**Brand**\nExplorer archetype\n");
    let executor = executor_for(&AGENTS, capability);
    let result = executor.run("bottle").await.unwrap();

    let decoded: Vec<WorkflowLogEntry> = decode(&result.log.to_text())
        .into_iter()
        .map(Into::into)
        .collect();
    assert_eq!(decoded, result.log.entries());
    assert_eq!(encode_log(&decoded).unwrap(), result.log.to_text());
}

#[tokio::test]
async fn test_empty_idea_produces_no_result() {
    let executor = executor_for(&AGENTS, ScriptedCapability::new());
    assert!(matches!(executor.run("").await, Err(PipelineError::EmptyIdea)));
}

#[tokio::test]
async fn test_concurrent_runs_do_not_share_logs() {
    let executor = Arc::new(executor_for(&AGENTS, ScriptedCapability::new()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let executor = executor.clone();
            tokio::spawn(async move { executor.run(&format!("idea {}", i)).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.log.len(), 8);
        assert_eq!(result.log.entries()[0].content, format!("idea {}", i));
    }
}

#[tokio::test]
async fn test_pipeline_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.yaml");
    std::fs::write(
        &path,
        r#"
name: "Launch Review"
on_failure: continue
timeout_secs: 30
agents:
  - name: Design
  - name: Legal
    system_prompt: "You are product counsel."
  - name: Sales
"#,
    )
    .unwrap();

    let definition = PipelineDefinition::from_file(path.to_str().unwrap()).unwrap();
    let capability = ScriptedCapability::new().fail("Legal", "unavailable");
    let executor = PipelineExecutor::new(
        &definition,
        &SpecialistLoader::with_builtins(),
        Arc::new(capability),
    )
    .unwrap();
    assert_eq!(executor.failure_policy(), OnFailure::Continue);

    let result = executor.run("smart bottle").await.unwrap();
    assert_eq!(result.status, PipelineStatus::PartialFailure);
    assert_eq!(result.failed_at.as_deref(), Some("Legal"));
    assert_eq!(
        result.log.to_lines(),
        vec![
            "[Design] received: smart bottle",
            "[Design] response: Design says: ok",
            "[Legal] received: Design says: ok",
            "[Sales] received: Design says: ok",
            "[Sales] response: Sales says: ok",
        ]
    );
}
