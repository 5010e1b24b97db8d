//! `ideaflow decode` — Decode a serialized workflow log.

use std::io::Read;

use ideaflow_core::workflow::codec::{decode, decode_lines, DecodedStep};
use ideaflow_core::workflow::Direction;

pub fn run(file: &str, all: bool, json: bool) -> Result<(), String> {
    let input = read_input(file)?;
    let steps: Vec<DecodedStep> = parse_steps(&input)?
        .into_iter()
        .filter(|step| all || step.step_type == Direction::Response)
        .collect();

    if json {
        let value = serde_json::to_value(&steps).map_err(|e| e.to_string())?;
        super::print_json(&serde_json::json!({ "steps": value }));
        return Ok(());
    }

    if steps.is_empty() {
        println!("(no steps)");
        return Ok(());
    }
    for step in &steps {
        println!("── {} ({}) ──", step.agent_name, step.step_type);
        println!("{}", step.content);
        println!();
    }
    Ok(())
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {}", e))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).map_err(|e| format!("Failed to read '{}': {}", file, e))
    }
}

/// Decode either a raw serialized log or its JSON wire form.
///
/// JSON input may be the `{"workflow": [...]}` response body or the bare
/// array of encoded entries; anything else is treated as plain text.
fn parse_steps(input: &str) -> Result<Vec<DecodedStep>, String> {
    let trimmed = input.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Ok(decode(input));
    }

    let value: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        // A log whose first entry starts with '[' is plain text, not JSON.
        Err(_) => return Ok(decode(input)),
    };

    let lines = match &value {
        serde_json::Value::Object(map) => map
            .get("workflow")
            .ok_or_else(|| "JSON input has no 'workflow' field".to_string())?,
        serde_json::Value::Array(_) => &value,
        _ => return Err("Unsupported JSON input".to_string()),
    };
    let lines: Vec<String> = serde_json::from_value(lines.clone())
        .map_err(|e| format!("'workflow' must be an array of strings: {}", e))?;
    Ok(decode_lines(&lines))
}
