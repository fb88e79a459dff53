use core::fmt;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{PartialState, WorldState};

/// Pipeline stage an action belongs to. Informational only; the planner never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Phase {
    Scan,
    Index,
    Analyze,
    Report,
    Remediate,
    Sync,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Phase::Scan => "scan",
            Phase::Index => "index",
            Phase::Analyze => "analyze",
            Phase::Report => "report",
            Phase::Remediate => "remediate",
            Phase::Sync => "sync",
        })
    }
}

/// Immutable catalog entry describing a simulated pipeline step.
///
/// `executor` names the external skill module a caller should invoke to perform the action for
/// real. Planning only ever reasons about the declared `effects`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Action {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub preconditions: PartialState,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: PartialState,
    pub cost: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parallelizable: bool,
    #[cfg_attr(feature = "serde", serde(with = "duration_secs"))]
    pub timeout: Duration,
    pub phase: Phase,
    #[cfg_attr(feature = "serde", serde(default))]
    pub executor: Option<String>,
}

impl Action {
    pub fn new(id: impl Into<String>, phase: Phase) -> Self {
        Self {
            id: id.into(),
            preconditions: PartialState::empty(),
            effects: PartialState::empty(),
            cost: 1.0,
            parallelizable: false,
            timeout: Duration::ZERO,
            phase,
            executor: None,
        }
    }

    pub fn with_preconditions(mut self, preconditions: PartialState) -> Self {
        self.preconditions = preconditions;
        self
    }

    pub fn with_effects(mut self, effects: PartialState) -> Self {
        self.effects = effects;
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.parallelizable = true;
        self
    }

    pub fn with_executor(mut self, executor: impl Into<String>) -> Self {
        self.executor = Some(executor.into());
        self
    }

    /// True iff every listed precondition holds in `state`. Empty preconditions always hold.
    pub fn is_applicable(&self, state: &WorldState) -> bool {
        self.preconditions.matches(state)
    }

    /// Returns `state` with the action's effects written over it; the input is untouched.
    pub fn apply(&self, state: &WorldState) -> WorldState {
        state.overlay(&self.effects)
    }
}

/// Sum of the actions' costs.
pub fn sequence_cost<'a>(actions: impl IntoIterator<Item = &'a Action>) -> f64 {
    actions.into_iter().map(|action| action.cost).sum()
}

/// Parallel-aware duration of an ordered action sequence.
///
/// Consecutive parallelizable actions form one run that costs its longest timeout; every
/// serial action is a run of its own. The total saturates at [`Duration::MAX`].
pub fn sequence_duration<'a>(actions: impl IntoIterator<Item = &'a Action>) -> Duration {
    let mut total = Duration::ZERO;
    // Longest timeout of the open parallel run, if one is open.
    let mut run: Option<Duration> = None;

    for action in actions {
        if action.parallelizable {
            run = Some(run.map_or(action.timeout, |longest| longest.max(action.timeout)));
            continue;
        }
        if let Some(longest) = run.take() {
            total = total.saturating_add(longest);
        }
        total = total.saturating_add(action.timeout);
    }

    total.saturating_add(run.unwrap_or(Duration::ZERO))
}

/// Serde adapter writing a [`Duration`] as fractional seconds.
#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
