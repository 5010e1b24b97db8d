//! `ideaflow validate` / `ideaflow specialists` — Inspect pipeline configuration.

use ideaflow_core::workflow::{PipelineDefinition, SpecialistLoader};

/// Validate a pipeline YAML file without executing it.
///
/// Besides the structural checks, every agent must resolve to a specialist
/// (built-in or from the default directories) or carry its own prompt.
pub fn validate(pipeline_file: &str) -> Result<(), String> {
    let pipeline = PipelineDefinition::from_file(pipeline_file).map_err(|e| e.to_string())?;

    let mut specialists = SpecialistLoader::new();
    specialists.load_default_dirs();
    specialists.add_builtins();

    println!("✅ Pipeline '{}' is valid", pipeline.name);
    println!("   Version: {}", pipeline.version);
    println!("   On failure: {:?}", pipeline.on_failure);
    println!("   Agents: {}", pipeline.agents.len());

    let mut unresolved = Vec::new();
    for (i, agent) in pipeline.agents.iter().enumerate() {
        let specialist = agent.specialist_id();
        let source = if agent.system_prompt.is_some() {
            "inline prompt".to_string()
        } else if specialists.get(&specialist).is_some() {
            format!("specialist: {}", specialist)
        } else {
            unresolved.push(agent.name.clone());
            format!("specialist: {} (not found)", specialist)
        };
        println!(
            "   {}. {} ({}, timeout: {}s)",
            i + 1,
            agent.name,
            source,
            agent.timeout_secs.unwrap_or(pipeline.timeout_secs)
        );
    }

    if unresolved.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "Unknown specialist for agent(s): {}",
            unresolved.join(", ")
        ))
    }
}

/// List available specialist definitions.
pub fn list_specialists(specialist_dir: Option<&str>) -> Result<(), String> {
    let mut loader = SpecialistLoader::new();

    if let Some(dir) = specialist_dir {
        let count = loader.load_dir(dir).map_err(|e| e.to_string())?;
        println!("Loaded {} specialist(s) from '{}'", count, dir);
    } else {
        let count = loader.load_default_dirs();
        println!("Loaded {} specialist(s) from default directories", count);
    }

    let builtins = SpecialistLoader::builtin_specialists();

    println!();
    println!("┌──────────────────┬──────────────────────────┬──────────┐");
    println!("│ ID               │ Name                     │ Source   │");
    println!("├──────────────────┼──────────────────────────┼──────────┤");

    let mut loaded: Vec<_> = loader.all().values().collect();
    loaded.sort_by(|a, b| a.id.cmp(&b.id));
    for spec in loaded {
        println!(
            "│ {:<16} │ {:<24} │ {:<8} │",
            truncate(&spec.id, 16),
            truncate(&spec.name, 24),
            "file"
        );
    }

    for spec in &builtins {
        if loader.get(&spec.id).is_none() {
            println!(
                "│ {:<16} │ {:<24} │ {:<8} │",
                truncate(&spec.id, 16),
                truncate(&spec.name, 24),
                "builtin"
            );
        }
    }

    println!("└──────────────────┴──────────────────────────┴──────────┘");
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("design", 16), "design");
        assert_eq!(truncate("Chief Customer Officer", 10), "Chief Cus…");
        assert_eq!(truncate("Ünïcödé naming", 4), "Ünï…");
    }

    #[test]
    fn test_validate_reports_unknown_specialist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(
            &path,
            "name: \"Odd\"\nagents:\n  - name: Design\n  - name: Astrologer\n",
        )
        .unwrap();

        let err = validate(path.to_str().unwrap()).unwrap_err();
        assert!(err.contains("Astrologer"));
    }

    #[test]
    fn test_validate_accepts_inline_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(
            &path,
            "name: \"Legal\"\nagents:\n  - name: Legal\n    system_prompt: \"Review it.\"\n",
        )
        .unwrap();

        assert!(validate(path.to_str().unwrap()).is_ok());
    }
}
