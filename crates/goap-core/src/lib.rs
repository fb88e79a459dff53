//! World-state model and action/goal catalogs for goal-oriented pipeline planning.
//!
//! Everything here is plain immutable data. Planning lives in `goap-planner`; executing actions
//! for real is the caller's job.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod catalog;
pub mod goal;
pub mod state;

pub use action::{sequence_cost, sequence_duration, Action, Phase};
pub use catalog::{drift_pipeline, ActionCatalog, CatalogError, GoalCatalog};
pub use goal::{Goal, GoalPredicate, Priority};
pub use state::{
    Field, FieldKind, InvalidValue, PartialState, StateKey, UnknownField, Value, WorldState,
};
