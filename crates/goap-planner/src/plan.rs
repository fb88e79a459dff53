use core::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::Serialize;

use goap_core::{sequence_cost, sequence_duration, Action, WorldState};

/// A successful planning result. Immutable once built.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Plan {
    goal_id: String,
    actions: Vec<Action>,
    total_cost: f64,
    #[cfg_attr(feature = "serde", serde(with = "goap_core::action::duration_secs"))]
    estimated_duration: Duration,
    start_state: WorldState,
    end_state: WorldState,
    #[cfg_attr(feature = "serde", serde(with = "goap_core::action::duration_secs"))]
    planning_time: Duration,
    nodes_explored: usize,
}

impl Plan {
    pub(crate) fn new(
        goal_id: String,
        actions: Vec<Action>,
        start_state: WorldState,
        end_state: WorldState,
        planning_time: Duration,
        nodes_explored: usize,
    ) -> Self {
        Self {
            total_cost: sequence_cost(&actions),
            estimated_duration: sequence_duration(&actions),
            goal_id,
            actions,
            start_state,
            end_state,
            planning_time,
            nodes_explored,
        }
    }

    pub fn goal_id(&self) -> &str {
        &self.goal_id
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action_ids(&self) -> Vec<&str> {
        self.actions.iter().map(|action| action.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Sum of the undiscounted action costs.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn estimated_duration(&self) -> Duration {
        self.estimated_duration
    }

    pub fn start_state(&self) -> &WorldState {
        &self.start_state
    }

    pub fn end_state(&self) -> &WorldState {
        &self.end_state
    }

    pub fn planning_time(&self) -> Duration {
        self.planning_time
    }

    pub fn planning_time_ms(&self) -> f64 {
        self.planning_time.as_secs_f64() * 1000.0
    }

    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// States visited when simulating the plan: the start state followed by the state after each
    /// action. The last entry equals [`Plan::end_state`].
    pub fn replay(&self) -> Vec<WorldState> {
        let mut states = Vec::with_capacity(self.actions.len() + 1);
        states.push(self.start_state.clone());
        for action in &self.actions {
            let next = action.apply(states.last().unwrap_or(&self.start_state));
            states.push(next);
        }
        states
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} actions, cost {:.2}, ~{}",
            self.goal_id,
            self.actions.len(),
            self.total_cost,
            format_duration(self.estimated_duration)
        )
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan for goal `{}`", self.goal_id)?;
        writeln!(f, "  total cost:         {:.2}", self.total_cost)?;
        writeln!(
            f,
            "  estimated duration: {}",
            format_duration(self.estimated_duration)
        )?;
        writeln!(
            f,
            "  search:             {} nodes explored in {:.2} ms",
            self.nodes_explored,
            self.planning_time_ms()
        )?;
        if self.actions.is_empty() {
            return writeln!(f, "  steps:              none (goal already satisfied)");
        }
        writeln!(f, "  steps:")?;
        for (i, action) in self.actions.iter().enumerate() {
            write!(f, "    {:>2}. {} [{}]", i + 1, action.id, action.phase)?;
            if action.parallelizable {
                write!(f, " (parallel)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// `1h 2m 5s`, `2m 5s`, `45s`, or `250ms` for sub-second durations.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs == 0 {
        return format!("{}ms", duration.as_millis());
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s}s"),
        _ => format!("{h}h {m}m {s}s"),
    }
}
