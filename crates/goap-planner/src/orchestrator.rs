use thiserror::Error;
use tracing::{debug, warn};

use goap_core::{Goal, WorldState};

use crate::{Plan, Planner, SearchFailure};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrchestrationError {
    #[error("unknown goal `{0}`")]
    UnknownGoal(String),

    #[error(transparent)]
    GoalFailed(#[from] SearchFailure),
}

/// Order goals so each comes after the goals it depends on.
///
/// Greedy readiness scan: repeatedly take the first goal none of whose dependencies is still
/// waiting. Dependencies outside `goals` count as met. If nothing is ready (a cycle), the first
/// remaining goal is taken so the scan always terminates.
pub fn order_by_dependencies<'a, I>(goals: I) -> Vec<&'a Goal>
where
    I: IntoIterator<Item = &'a Goal>,
{
    let mut remaining: Vec<&Goal> = goals.into_iter().collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let ready = remaining.iter().position(|goal| {
            goal.depends_on
                .iter()
                .all(|dep| remaining.iter().all(|other| other.id != *dep))
        });
        let next = match ready {
            Some(index) => index,
            None => {
                warn!(goal = %remaining[0].id, "dependency cycle; taking first remaining goal");
                0
            }
        };
        ordered.push(remaining.remove(next));
    }

    ordered
}

impl Planner {
    /// Plan several goals in dependency order, chaining each plan's end state into the next
    /// search. Any failure fails the whole request.
    pub fn plan_multiple<'a, I>(&self, goals: I, start: &WorldState) -> Option<Vec<Plan>>
    where
        I: IntoIterator<Item = &'a Goal>,
    {
        self.orchestrate(goals, start).ok()
    }

    /// [`Planner::plan_multiple`] over catalog goal ids.
    pub fn plan_multiple_ids(&self, goal_ids: &[&str], start: &WorldState) -> Option<Vec<Plan>> {
        self.orchestrate_ids(goal_ids, start).ok()
    }

    pub fn orchestrate_ids(
        &self,
        goal_ids: &[&str],
        start: &WorldState,
    ) -> Result<Vec<Plan>, OrchestrationError> {
        let goals = goal_ids
            .iter()
            .map(|id| {
                self.goals()
                    .get(id)
                    .ok_or_else(|| OrchestrationError::UnknownGoal((*id).to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.orchestrate(goals, start)
    }

    pub fn orchestrate<'a, I>(
        &self,
        goals: I,
        start: &WorldState,
    ) -> Result<Vec<Plan>, OrchestrationError>
    where
        I: IntoIterator<Item = &'a Goal>,
    {
        let mut current = start.clone();
        let mut plans = Vec::new();

        for goal in order_by_dependencies(goals) {
            if goal.is_satisfied(&current) {
                debug!(goal = %goal.id, "already satisfied; skipping");
                continue;
            }
            let plan = self.search(goal, &current)?;
            debug!(goal = %goal.id, summary = %plan.summary(), "planned");
            current = plan.end_state().clone();
            plans.push(plan);
        }

        Ok(plans)
    }
}
