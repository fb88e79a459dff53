use std::collections::HashSet;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace};

use goap_core::{ActionCatalog, Goal, GoalCatalog, StateKey, WorldState};

use crate::frontier::Frontier;
use crate::heuristic::Heuristic;
use crate::{ConfigError, Plan, PlannerConfig};

/// Why a search ended without a plan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchFailure {
    #[error("goal `{goal_id}` is unreachable ({nodes_explored} nodes explored)")]
    Unreachable {
        goal_id: String,
        nodes_explored: usize,
    },

    #[error("goal `{goal_id}`: iteration budget of {nodes_explored} expansions exhausted")]
    IterationBudget {
        goal_id: String,
        nodes_explored: usize,
    },

    #[error("goal `{goal_id}`: search timed out after {elapsed:?} ({nodes_explored} nodes explored)")]
    Timeout {
        goal_id: String,
        nodes_explored: usize,
        elapsed: Duration,
    },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl SearchFailure {
    pub fn nodes_explored(&self) -> usize {
        match self {
            SearchFailure::Unreachable { nodes_explored, .. }
            | SearchFailure::IterationBudget { nodes_explored, .. }
            | SearchFailure::Timeout { nodes_explored, .. } => *nodes_explored,
            SearchFailure::InvalidConfig(_) => 0,
        }
    }
}

/// Search-tree node. `parent` and `action` index into the node arena and the action catalog.
#[derive(Debug, Clone)]
struct PlanNode {
    state: WorldState,
    action: Option<usize>,
    parent: Option<usize>,
    g: f64,
    h: f64,
    depth: usize,
}

/// Weighted A* planner over a fixed action catalog.
///
/// With `heuristic_weight > 1` and an inadmissible heuristic this is a greedy best-first search:
/// plans are valid but not guaranteed cost-optimal. States are never reopened once expanded.
#[derive(Debug, Clone)]
pub struct Planner {
    actions: ActionCatalog,
    goals: GoalCatalog,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(actions: ActionCatalog, goals: GoalCatalog) -> Self {
        Self {
            actions,
            goals,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn actions(&self) -> &ActionCatalog {
        &self.actions
    }

    pub fn goals(&self) -> &GoalCatalog {
        &self.goals
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Heuristic estimate of the cost from `state` to `goal`.
    pub fn calculate_heuristic(&self, state: &WorldState, goal: &Goal) -> f64 {
        Heuristic::new(&self.actions, goal).estimate(state)
    }

    pub fn plan(&self, goal: &Goal, start: &WorldState) -> Option<Plan> {
        self.search(goal, start).ok()
    }

    /// Plan for the catalog goal named `goal_id`; unknown ids yield `None`.
    pub fn plan_goal_id(&self, goal_id: &str, start: &WorldState) -> Option<Plan> {
        let goal = self.goals.get(goal_id)?;
        self.plan(goal, start)
    }

    pub fn search(&self, goal: &Goal, start: &WorldState) -> Result<Plan, SearchFailure> {
        self.search_with(goal, start, &self.config)
    }

    /// Run the search with explicit options instead of the planner's own.
    ///
    /// The options are validated first; nothing is searched under an invalid config.
    pub fn search_with(
        &self,
        goal: &Goal,
        start: &WorldState,
        config: &PlannerConfig,
    ) -> Result<Plan, SearchFailure> {
        config.validate()?;
        let started = Instant::now();

        if goal.is_satisfied(start) {
            debug!(goal = %goal.id, "goal already satisfied");
            return Ok(Plan::new(
                goal.id.clone(),
                Vec::new(),
                start.clone(),
                start.clone(),
                started.elapsed(),
                0,
            ));
        }

        let heuristic = Heuristic::new(&self.actions, goal);
        let timeout = config.timeout();
        let weight = config.heuristic_weight;

        let mut nodes: Vec<PlanNode> = Vec::new();
        let mut frontier = Frontier::default();
        let mut closed: HashSet<StateKey> = HashSet::new();

        let h = heuristic.estimate(start);
        nodes.push(PlanNode {
            state: start.clone(),
            action: None,
            parent: None,
            g: 0.0,
            h,
            depth: 0,
        });
        frontier.insert(start.key(), 0, 0.0, weight * h);

        debug!(
            goal = %goal.id,
            h,
            actions = self.actions.len(),
            "starting search"
        );

        let mut explored: usize = 0;
        loop {
            let Some(index) = frontier.pop() else {
                debug!(goal = %goal.id, explored, "frontier exhausted");
                return Err(SearchFailure::Unreachable {
                    goal_id: goal.id.clone(),
                    nodes_explored: explored,
                });
            };
            if explored >= config.max_iterations {
                debug!(goal = %goal.id, explored, "iteration budget exhausted");
                return Err(SearchFailure::IterationBudget {
                    goal_id: goal.id.clone(),
                    nodes_explored: explored,
                });
            }
            let elapsed = started.elapsed();
            if elapsed >= timeout {
                debug!(goal = %goal.id, explored, ?elapsed, "search timed out");
                return Err(SearchFailure::Timeout {
                    goal_id: goal.id.clone(),
                    nodes_explored: explored,
                    elapsed,
                });
            }
            explored += 1;

            let node = &nodes[index];
            if goal.is_satisfied(&node.state) {
                let plan = self.reconstruct(goal, start, &nodes, index, started, explored);
                debug!(
                    goal = %goal.id,
                    explored,
                    steps = plan.len(),
                    cost = plan.total_cost(),
                    "plan found"
                );
                return Ok(plan);
            }

            if !closed.insert(node.state.key()) {
                continue;
            }
            if node.depth >= config.max_plan_length {
                continue;
            }

            trace!(
                depth = node.depth,
                g = node.g,
                h = node.h,
                open = frontier.len(),
                "expanding"
            );

            let state = node.state.clone();
            let (g, depth) = (node.g, node.depth);

            for (action_index, action) in self.actions.iter().enumerate() {
                if !action.is_applicable(&state) {
                    continue;
                }
                let next = action.apply(&state);
                let key = next.key();
                if closed.contains(&key) {
                    continue;
                }

                let next_g = g + config.effective_cost(action);
                if !frontier.improves(&key, next_g) {
                    continue;
                }
                let next_h = heuristic.estimate(&next);

                let child = nodes.len();
                nodes.push(PlanNode {
                    state: next,
                    action: Some(action_index),
                    parent: Some(index),
                    g: next_g,
                    h: next_h,
                    depth: depth + 1,
                });
                frontier.insert(key, child, next_g, next_g + weight * next_h);
            }
        }
    }

    fn reconstruct(
        &self,
        goal: &Goal,
        start: &WorldState,
        nodes: &[PlanNode],
        mut index: usize,
        started: Instant,
        explored: usize,
    ) -> Plan {
        let end_state = nodes[index].state.clone();
        let mut steps = Vec::new();
        while let Some(action_index) = nodes[index].action {
            steps.push(self.actions.actions()[action_index].clone());
            match nodes[index].parent {
                Some(parent) => index = parent,
                None => break,
            }
        }
        steps.reverse();

        Plan::new(
            goal.id.clone(),
            steps,
            start.clone(),
            end_state,
            started.elapsed(),
            explored,
        )
    }
}
