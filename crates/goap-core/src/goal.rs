use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PartialState, WorldState};

/// Gate evaluated against the full state to decide whether a goal is worth pursuing.
pub type GoalPredicate = fn(&WorldState) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        })
    }
}

/// Immutable catalog entry: a partial target state plus selection metadata.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Goal {
    pub id: String,
    pub target: PartialState,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub precondition: Option<GoalPredicate>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub depends_on: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default = "default_desirability"))]
    pub desirability: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
}

#[cfg(feature = "serde")]
fn default_desirability() -> f64 {
    DEFAULT_DESIRABILITY
}

const DEFAULT_DESIRABILITY: f64 = 0.5;

impl Goal {
    pub fn new(id: impl Into<String>, target: PartialState) -> Self {
        Self {
            id: id.into(),
            target,
            precondition: None,
            depends_on: Vec::new(),
            desirability: DEFAULT_DESIRABILITY,
            priority: Priority::Medium,
        }
    }

    pub fn with_precondition(mut self, predicate: GoalPredicate) -> Self {
        self.precondition = Some(predicate);
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_desirability(mut self, desirability: f64) -> Self {
        self.desirability = desirability;
        self
    }

    /// Every target field equals the state's value; other fields are ignored.
    pub fn is_satisfied(&self, state: &WorldState) -> bool {
        self.target.matches(state)
    }

    /// Number of target fields the state does not yet match. Zero iff satisfied.
    pub fn distance(&self, state: &WorldState) -> usize {
        self.target.mismatches(state).count()
    }

    /// The optional predicate holds (or is absent).
    pub fn is_pursuable(&self, state: &WorldState) -> bool {
        self.precondition.map_or(true, |predicate| predicate(state))
    }

    /// Not yet satisfied and pursuable.
    pub fn is_achievable(&self, state: &WorldState) -> bool {
        !self.is_satisfied(state) && self.is_pursuable(state)
    }
}
