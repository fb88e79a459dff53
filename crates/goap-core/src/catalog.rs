use std::collections::BTreeSet;
use std::time::Duration;

use thiserror::Error;

use crate::{Action, Field, Goal, InvalidValue, PartialState, Phase, Priority, WorldState};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("duplicate action id `{0}`")]
    DuplicateAction(String),

    #[error("duplicate goal id `{0}`")]
    DuplicateGoal(String),

    #[error("action `{id}` has invalid cost {cost} (must be finite and non-negative)")]
    InvalidCost { id: String, cost: f64 },

    #[error("action `{id}` preconditions: {source}")]
    Precondition {
        id: String,
        #[source]
        source: InvalidValue,
    },

    #[error("action `{id}` effects: {source}")]
    Effect {
        id: String,
        #[source]
        source: InvalidValue,
    },

    #[error("goal `{id}` target: {source}")]
    Target {
        id: String,
        #[source]
        source: InvalidValue,
    },
}

/// Ordered, read-only collection of actions.
///
/// Catalog order is significant: the planner expands successors in this order, which decides
/// ties between equally-priced plans.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl ActionCatalog {
    pub fn new(actions: Vec<Action>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for action in &actions {
            if !seen.insert(action.id.as_str()) {
                return Err(CatalogError::DuplicateAction(action.id.clone()));
            }
            if !action.cost.is_finite() || action.cost < 0.0 {
                return Err(CatalogError::InvalidCost {
                    id: action.id.clone(),
                    cost: action.cost,
                });
            }
            action
                .preconditions
                .validate()
                .map_err(|source| CatalogError::Precondition {
                    id: action.id.clone(),
                    source,
                })?;
            action
                .effects
                .validate()
                .map_err(|source| CatalogError::Effect {
                    id: action.id.clone(),
                    source,
                })?;
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Actions whose preconditions hold in `state`, in catalog order.
    pub fn executable<'a, 's>(
        &'a self,
        state: &'s WorldState,
    ) -> impl Iterator<Item = &'a Action> + use<'a, 's> {
        self.actions
            .iter()
            .filter(move |action| action.is_applicable(state))
    }
}

/// Ordered, read-only collection of goals.
#[derive(Debug, Clone, Default)]
pub struct GoalCatalog {
    goals: Vec<Goal>,
}

impl GoalCatalog {
    /// Dependency ids that name no goal in the catalog are allowed.
    pub fn new(goals: Vec<Goal>) -> Result<Self, CatalogError> {
        let mut seen = BTreeSet::new();
        for goal in &goals {
            if !seen.insert(goal.id.as_str()) {
                return Err(CatalogError::DuplicateGoal(goal.id.clone()));
            }
            goal.target.validate().map_err(|source| CatalogError::Target {
                id: goal.id.clone(),
                source,
            })?;
        }
        Ok(Self { goals })
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Goal> {
        self.goals.iter()
    }

    /// Goals not yet satisfied whose predicate (if any) holds, in catalog order.
    pub fn achievable<'a, 's>(
        &'a self,
        state: &'s WorldState,
    ) -> impl Iterator<Item = &'a Goal> + use<'a, 's> {
        self.goals.iter().filter(move |goal| goal.is_achievable(state))
    }

    /// Highest-priority achievable goal; ties go to the more desirable, then the earlier one.
    pub fn next_goal(&self, state: &WorldState) -> Option<&Goal> {
        self.achievable(state).reduce(|best, goal| {
            let better = goal.priority > best.priority
                || (goal.priority == best.priority && goal.desirability > best.desirability);
            if better {
                goal
            } else {
                best
            }
        })
    }
}

/// The default repository drift-analysis pipeline.
pub fn drift_pipeline() -> (ActionCatalog, GoalCatalog) {
    let actions = ActionCatalog {
        actions: pipeline_actions(),
    };
    let goals = GoalCatalog {
        goals: pipeline_goals(),
    };
    (actions, goals)
}

fn flags(fields: &[Field]) -> PartialState {
    fields
        .iter()
        .fold(PartialState::empty(), |partial, &field| partial.with(field, true))
}

fn pipeline_actions() -> Vec<Action> {
    use Field::*;

    vec![
        Action::new("scan_repository", Phase::Scan)
            .with_effects(flags(&[RepoScanned]))
            .with_cost(2.0)
            .with_timeout(Duration::from_secs(30))
            .with_executor("repo-scanner"),
        Action::new("map_dependencies", Phase::Scan)
            .with_preconditions(flags(&[RepoScanned]))
            .with_effects(flags(&[DependenciesMapped]))
            .with_cost(3.0)
            .with_timeout(Duration::from_secs(45))
            .parallel()
            .with_executor("dependency-mapper"),
        Action::new("generate_embeddings", Phase::Index)
            .with_preconditions(flags(&[RepoScanned]))
            .with_effects(flags(&[EmbeddingsGenerated]))
            .with_cost(5.0)
            .with_timeout(Duration::from_secs(120))
            .parallel()
            .with_executor("embedder"),
        Action::new("load_baseline", Phase::Index)
            .with_effects(flags(&[BaselineLoaded]))
            .with_cost(1.0)
            .with_timeout(Duration::from_secs(10))
            .parallel()
            .with_executor("baseline-store"),
        Action::new("extract_patterns", Phase::Analyze)
            .with_preconditions(flags(&[RepoScanned, EmbeddingsGenerated]))
            .with_effects(flags(&[PatternsExtracted]))
            .with_cost(4.0)
            .with_timeout(Duration::from_secs(60))
            .with_executor("pattern-miner"),
        Action::new("analyze_drift", Phase::Analyze)
            .with_preconditions(flags(&[PatternsExtracted, BaselineLoaded]))
            .with_effects(flags(&[DriftAnalyzed]))
            .with_cost(4.0)
            .with_timeout(Duration::from_secs(90))
            .with_executor("drift-scorer"),
        Action::new("quick_drift_check", Phase::Analyze)
            .with_preconditions(flags(&[RepoScanned, BaselineLoaded]))
            .with_effects(flags(&[DriftAnalyzed]))
            .with_cost(14.0)
            .with_timeout(Duration::from_secs(30))
            .with_executor("drift-scorer"),
        Action::new("classify_violations", Phase::Analyze)
            .with_preconditions(flags(&[DriftAnalyzed]))
            .with_effects(flags(&[ViolationsClassified]))
            .with_cost(2.0)
            .with_timeout(Duration::from_secs(20))
            .parallel()
            .with_executor("violation-classifier"),
        Action::new("generate_report", Phase::Report)
            .with_preconditions(flags(&[DriftAnalyzed]))
            .with_effects(flags(&[ReportGenerated]))
            .with_cost(2.0)
            .with_timeout(Duration::from_secs(15))
            .parallel()
            .with_executor("report-renderer"),
        Action::new("update_dashboard", Phase::Report)
            .with_preconditions(flags(&[ReportGenerated]))
            .with_effects(flags(&[DashboardUpdated]))
            .with_cost(1.0)
            .with_timeout(Duration::from_secs(10))
            .parallel()
            .with_executor("dashboard"),
        Action::new("auto_fix_violations", Phase::Remediate)
            .with_preconditions(flags(&[ViolationsClassified]))
            .with_effects(PartialState::empty().with(OpenViolations, 0u32))
            .with_cost(6.0)
            .with_timeout(Duration::from_secs(180))
            .with_executor("violation-fixer"),
        Action::new("sync_results", Phase::Sync)
            .with_preconditions(flags(&[ReportGenerated]))
            .with_effects(flags(&[ResultsSynced]))
            .with_cost(1.0)
            .with_timeout(Duration::from_secs(10))
            .parallel()
            .with_executor("result-sync"),
    ]
}

fn has_open_violations(state: &WorldState) -> bool {
    state.metric(Field::OpenViolations) > 0.0
}

fn pipeline_goals() -> Vec<Goal> {
    use Field::*;

    vec![
        Goal::new(
            "repository_indexed",
            flags(&[RepoScanned, EmbeddingsGenerated]),
        )
        .with_priority(Priority::High)
        .with_desirability(0.6),
        Goal::new("drift_analyzed", flags(&[DriftAnalyzed]))
            .depends_on(["repository_indexed"])
            .with_priority(Priority::High)
            .with_desirability(0.8),
        Goal::new(
            "drift_report_published",
            flags(&[ReportGenerated, DashboardUpdated]),
        )
        .depends_on(["drift_analyzed"])
        .with_priority(Priority::Medium)
        .with_desirability(0.7),
        Goal::new(
            "violations_remediated",
            PartialState::empty().with(OpenViolations, 0u32),
        )
        .with_precondition(has_open_violations)
        .depends_on(["drift_analyzed"])
        .with_priority(Priority::Critical)
        .with_desirability(0.9),
        Goal::new("results_synced", flags(&[ResultsSynced]))
            .depends_on(["drift_report_published"])
            .with_priority(Priority::Low)
            .with_desirability(0.4),
    ]
}
