use goap_core::{ActionCatalog, Field, Goal, PartialState, WorldState};

/// Estimate charged for a target field that no action in the catalog can set.
pub const FALLBACK_COST: f64 = 10.0;

/// Per-goal cost-to-go estimate.
///
/// Each unmet target field costs the cheapest single action that writes the required value,
/// regardless of whether that action is currently executable. Prerequisite chains are ignored,
/// so the estimate is not admissible.
#[derive(Debug, Clone)]
pub struct Heuristic<'a> {
    target: &'a PartialState,
    field_cost: [f64; Field::COUNT],
}

impl<'a> Heuristic<'a> {
    pub fn new(actions: &ActionCatalog, goal: &'a Goal) -> Self {
        let mut field_cost = [0.0; Field::COUNT];
        for (field, wanted) in goal.target.iter() {
            field_cost[field.index()] = actions
                .iter()
                .filter(|action| action.effects.get(field) == Some(wanted))
                .map(|action| action.cost)
                .min_by(f64::total_cmp)
                .unwrap_or(FALLBACK_COST);
        }
        Self {
            target: &goal.target,
            field_cost,
        }
    }

    pub fn estimate(&self, state: &WorldState) -> f64 {
        self.target
            .mismatches(state)
            .map(|(field, _)| self.field_cost[field.index()])
            .sum()
    }
}
