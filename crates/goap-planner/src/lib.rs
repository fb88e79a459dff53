//! Weighted A* GOAP planner over `goap-core` catalogs.
//!
//! The planner only simulates declared action effects. Callers execute the returned actions
//! themselves and plan again from whatever state the real world ends up in.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod config;
mod frontier;
pub mod heuristic;
pub mod orchestrator;
pub mod plan;
pub mod planner;

pub use config::{ConfigError, PlannerConfig, PARALLEL_DISCOUNT};
pub use heuristic::{Heuristic, FALLBACK_COST};
pub use orchestrator::{order_by_dependencies, OrchestrationError};
pub use plan::{format_duration, Plan};
pub use planner::{Planner, SearchFailure};
