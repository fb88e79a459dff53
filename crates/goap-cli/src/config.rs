//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use goap_core::{drift_pipeline, Action, ActionCatalog, Goal, GoalCatalog, WorldState};
use goap_planner::PlannerConfig;

/// CLI configuration, loaded from .goap/config.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoapConfig {
    /// Search limits and tuning
    pub planner: PlannerConfig,

    /// Optional catalog file replacing the built-in drift pipeline
    pub catalog: Option<PathBuf>,
}

/// On-disk catalog. Goal predicates cannot be expressed here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub actions: Vec<Action>,
    pub goals: Vec<Goal>,
}

impl GoapConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .planner
            .validate()
            .with_context(|| format!("Invalid planner settings in {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .goap/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(".goap/config.yaml");
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        if let Some(catalog) = self.catalog.as_mut() {
            *catalog = project_root.join(&*catalog);
        }
    }

    /// The configured catalogs, or the built-in drift pipeline.
    pub fn catalogs(&self) -> Result<(ActionCatalog, GoalCatalog)> {
        let Some(path) = self.catalog.as_deref() else {
            return Ok(drift_pipeline());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        let file: CatalogFile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse catalog from {}", path.display()))?;
        let actions = ActionCatalog::new(file.actions)
            .with_context(|| format!("Invalid actions in {}", path.display()))?;
        let goals = GoalCatalog::new(file.goals)
            .with_context(|| format!("Invalid goals in {}", path.display()))?;
        Ok((actions, goals))
    }
}

/// Read a world state from YAML or JSON; unlisted fields keep their defaults.
pub fn load_state(path: Option<&Path>) -> Result<WorldState> {
    let Some(path) = path else {
        return Ok(WorldState::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state from {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse state from {}", path.display()))
}

pub const DEFAULT_CONFIG: &str = r#"# GOAP planner configuration

planner:
  max_iterations: 1000
  max_plan_length: 20
  heuristic_weight: 1.0
  prefer_parallel: true
  timeout_ms: 5000

# Replace the built-in drift pipeline with a custom catalog:
# catalog: .goap/catalog.yaml
"#;
