//! Specialist definitions — the role prompts behind each pipeline agent.
//!
//! Specialists can be defined in YAML:
//!
//! ```yaml
//! id: "design"
//! name: "Design Theorist"
//! description: "Turns a raw idea into design directions"
//! system_prompt: |
//!   You are a world-renowned Design Theorist and Innovator.
//!   ...
//! ```
//!
//! or as Markdown with YAML frontmatter, where the body is the prompt.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// A specialist definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistDef {
    /// Specialist ID (e.g., "design", "marketing")
    pub id: String,

    /// Display name
    pub name: String,

    /// Description of what this specialist does
    #[serde(default)]
    pub description: Option<String>,

    /// The system prompt for this specialist
    pub system_prompt: String,

    /// Custom metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl SpecialistDef {
    /// Parse a specialist definition from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PipelineError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| PipelineError::Specialist(format!("Failed to parse specialist YAML: {}", e)))
    }

    /// Load a specialist definition from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Specialist(format!(
                "Failed to read specialist file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a specialist from a Markdown file with YAML frontmatter.
    /// The ID comes from the file stem, the prompt from the body.
    pub fn from_markdown(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Specialist(format!(
                "Failed to read specialist markdown '{}': {}",
                path.display(),
                e
            ))
        })?;

        let parts: Vec<&str> = content.splitn(3, "---").collect();
        if parts.len() < 3 {
            return Err(PipelineError::Specialist(format!(
                "Invalid specialist markdown '{}': missing YAML frontmatter",
                path.display()
            )));
        }

        #[derive(Deserialize)]
        struct FrontMatter {
            name: String,
            description: Option<String>,
        }

        let fm: FrontMatter = serde_yaml::from_str(parts[1].trim()).map_err(|e| {
            PipelineError::Specialist(format!(
                "Failed to parse frontmatter in '{}': {}",
                path.display(),
                e
            ))
        })?;

        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self {
            id,
            name: fm.name,
            description: fm.description,
            system_prompt: parts[2].trim().to_string(),
            metadata: HashMap::new(),
        })
    }
}

/// Specialist catalogue, indexed by ID.
#[derive(Debug, Clone, Default)]
pub struct SpecialistLoader {
    pub specialists: HashMap<String, SpecialistDef>,
}

impl SpecialistLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader holding only the built-in specialists.
    pub fn with_builtins() -> Self {
        let mut loader = Self::new();
        loader.add_builtins();
        loader
    }

    /// Add built-ins for every ID not already loaded from files.
    pub fn add_builtins(&mut self) {
        for builtin in Self::builtin_specialists() {
            self.specialists.entry(builtin.id.clone()).or_insert(builtin);
        }
    }

    /// Load all specialists from a directory.
    /// Supports both `.yaml`/`.yml` and `.md` (markdown with frontmatter) files.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, PipelineError> {
        let dir_path = dir.as_ref();
        if !dir_path.is_dir() {
            return Err(PipelineError::Specialist(format!(
                "Specialist directory '{}' does not exist",
                dir_path.display()
            )));
        }

        let mut count = 0;
        for entry in std::fs::read_dir(dir_path)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

            let specialist = match ext {
                "yaml" | "yml" => SpecialistDef::from_file(&path)?,
                "md" => SpecialistDef::from_markdown(&path)?,
                _ => continue,
            };

            tracing::info!(
                "[SpecialistLoader] Loaded specialist: {} ({})",
                specialist.id,
                specialist.name
            );
            self.specialists.insert(specialist.id.clone(), specialist);
            count += 1;
        }

        Ok(count)
    }

    /// Search the default directories for specialist files.
    /// Checks `./specialists/` and `~/.ideaflow/specialists/`.
    pub fn load_default_dirs(&mut self) -> usize {
        let mut search_paths = vec![PathBuf::from("specialists")];
        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".ideaflow").join("specialists"));
        }

        let mut total = 0;
        for dir in search_paths.iter().filter(|d| d.is_dir()) {
            match self.load_dir(dir) {
                Ok(n) => {
                    tracing::info!(
                        "[SpecialistLoader] Loaded {} specialists from '{}'",
                        n,
                        dir.display()
                    );
                    total += n;
                }
                Err(e) => {
                    tracing::warn!(
                        "[SpecialistLoader] Failed to load from '{}': {}",
                        dir.display(),
                        e
                    );
                }
            }
        }

        total
    }

    /// Get a specialist by ID.
    pub fn get(&self, id: &str) -> Option<&SpecialistDef> {
        self.specialists.get(id)
    }

    /// Get all loaded specialists.
    pub fn all(&self) -> &HashMap<String, SpecialistDef> {
        &self.specialists
    }

    /// The four strategy roles (hardcoded, no files needed).
    pub fn builtin_specialists() -> Vec<SpecialistDef> {
        vec![
            builtin(
                "design",
                "Design Theorist",
                "Deconstructs an idea into detailed design directions",
                "You are a world-renowned Design Theorist and Innovator. Your thinking is deep, \
                 philosophical, and visionary.\n\
                 Take a simple product idea, deconstruct it into its core concepts, then rebuild it \
                 into several highly detailed, innovative design philosophies.\n\
                 - Open with a brief introduction about the potential of the idea.\n\
                 - Present at least three distinct 'Design Directions'. For each, give a name, a \
                 core philosophy, material suggestions, form and function analysis, and the target \
                 emotional response.\n\
                 - Close with an open-ended question for your marketing counterpart about the \
                 brand's soul, not just its features.",
            ),
            builtin(
                "marketing",
                "Chief Marketing Officer",
                "Builds the brand and go-to-market strategy from the design analysis",
                "You are the Chief Marketing Officer of a Fortune 500 company, known for legendary \
                 brand building. You will receive a visionary design analysis.\n\
                 Produce an exhaustive marketing and brand strategy with clear headings and lists \
                 covering:\n\
                 1. Brand identity and archetype.\n\
                 2. A deep target audience persona: daily life, aspirations, pain points.\n\
                 3. A complete go-to-market plan for pre-launch, launch, and post-launch.\n\
                 4. Content and storytelling pillars per platform.\n\
                 Close with a strategic question for the sales division about channels and customer \
                 experience.",
            ),
            builtin(
                "sales",
                "Head of Sales",
                "Turns the brand strategy into an actionable sales blueprint",
                "You are a global Head of Sales, famous for scaling businesses from zero to a \
                 billion. You will receive a design and marketing strategy.\n\
                 Convert it into a detailed, actionable global sales blueprint with bold headings \
                 covering:\n\
                 1. A multi-tiered pricing and revenue model, with justification per tier and \
                 upsell/cross-sell potential.\n\
                 2. Channel strategy for direct-to-consumer, B2B, and retail: regions, team \
                 structure, expected sales cycle.\n\
                 3. Sales enablement: tools, training, and compensation plan.\n\
                 The result should be ready for a boardroom presentation.",
            ),
            builtin(
                "support",
                "Chief Customer Officer",
                "Designs the customer support and success strategy",
                "You are a Chief Customer Officer obsessed with a frictionless, delightful customer \
                 journey. You have the complete product, marketing, and sales plan.\n\
                 Create a proactive customer support and success strategy, structured with bold \
                 headings and empathetic in tone, including:\n\
                 1. A customer journey map from first awareness to loyal advocate.\n\
                 2. At least three proactive support initiatives that solve problems before they \
                 happen.\n\
                 3. Multi-channel support: self-service, human-assisted, and community-led.\n\
                 4. The KPIs you will track (CSAT, NPS, first contact resolution).",
            ),
        ]
    }
}

fn builtin(id: &str, name: &str, description: &str, system_prompt: &str) -> SpecialistDef {
    SpecialistDef {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        system_prompt: system_prompt.to_string(),
        metadata: HashMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_specialist_yaml() {
        let yaml = r#"
id: "legal"
name: "Legal Counsel"
description: "Reviews regulatory exposure"
system_prompt: |
  You are a product lawyer.
  Flag regulatory risks.
"#;
        let spec = SpecialistDef::from_yaml(yaml).unwrap();
        assert_eq!(spec.id, "legal");
        assert_eq!(spec.name, "Legal Counsel");
        assert!(spec.system_prompt.contains("regulatory risks"));
    }

    #[test]
    fn test_builtin_specialists() {
        let builtins = SpecialistLoader::builtin_specialists();
        assert_eq!(builtins.len(), 4);
        for id in ["design", "marketing", "sales", "support"] {
            assert!(builtins.iter().any(|s| s.id == id), "missing builtin {}", id);
        }
    }

    #[test]
    fn test_load_dir_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("sales.yaml"),
            "id: sales\nname: Channel Partner Lead\nsystem_prompt: Sell through partners.\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("legal.md"),
            "---\nname: Legal Counsel\ndescription: Compliance review\n---\nCheck the claims.\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut loader = SpecialistLoader::new();
        assert_eq!(loader.load_dir(dir.path()).unwrap(), 2);
        loader.add_builtins();

        assert_eq!(loader.get("sales").unwrap().name, "Channel Partner Lead");
        assert_eq!(loader.get("legal").unwrap().system_prompt, "Check the claims.");
        assert_eq!(loader.get("design").unwrap().name, "Design Theorist");
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let mut loader = SpecialistLoader::new();
        assert!(loader.load_dir("/definitely/not/here").is_err());
    }
}
