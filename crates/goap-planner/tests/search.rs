use std::collections::BTreeSet;

use goap_core::{
    drift_pipeline, Action, ActionCatalog, Field, Goal, GoalCatalog, PartialState, Phase,
    WorldState,
};
use goap_planner::{ConfigError, Planner, PlannerConfig, SearchFailure, FALLBACK_COST};

fn set(field: Field) -> PartialState {
    PartialState::empty().with(field, true)
}

fn planner(actions: Vec<Action>) -> Planner {
    Planner::new(ActionCatalog::new(actions).unwrap(), GoalCatalog::default())
}

fn drift_planner(config: PlannerConfig) -> Planner {
    let (actions, goals) = drift_pipeline();
    Planner::new(actions, goals).with_config(config)
}

fn pipeline_goal(planner: &Planner, id: &str) -> Goal {
    planner.goals().get(id).unwrap().clone()
}

#[test]
fn satisfied_goal_yields_empty_plan_without_search() {
    let planner = drift_planner(PlannerConfig::default());
    let goal = pipeline_goal(&planner, "drift_analyzed");
    let start = WorldState::new().with(Field::DriftAnalyzed, true);

    let plan = planner.plan(&goal, &start).unwrap();

    assert!(plan.is_empty());
    assert_eq!(plan.total_cost(), 0.0);
    assert_eq!(plan.nodes_explored(), 0);
    assert_eq!(plan.end_state(), &start);
}

#[test]
fn single_action_plan() {
    let planner = planner(vec![Action::new("A", Phase::Scan)
        .with_effects(set(Field::RepoScanned))
        .with_cost(3.0)]);
    let goal = Goal::new("g", set(Field::RepoScanned));

    let plan = planner.plan(&goal, &WorldState::new()).unwrap();

    assert_eq!(plan.action_ids(), vec!["A"]);
    assert_eq!(plan.total_cost(), 3.0);
    assert_eq!(plan.nodes_explored(), 2);
    assert_eq!(plan.goal_id(), "g");
}

#[test]
fn unsettable_field_fails_within_budget() {
    let config = PlannerConfig {
        max_iterations: 50,
        ..PlannerConfig::default()
    };
    let planner = drift_planner(config);
    let goal = Goal::new(
        "impossible",
        PartialState::empty().with(Field::FilesScanned, 10u32),
    );

    let err = planner.search(&goal, &WorldState::new()).unwrap_err();

    assert!(err.nodes_explored() <= 50);
    assert!(planner.plan(&goal, &WorldState::new()).is_none());
}

#[test]
fn exhausted_frontier_reports_unreachable() {
    let planner = planner(vec![
        Action::new("scan", Phase::Scan).with_effects(set(Field::RepoScanned))
    ]);
    let goal = Goal::new("g", set(Field::DriftAnalyzed));

    let err = planner.search(&goal, &WorldState::new()).unwrap_err();

    assert_eq!(
        err,
        SearchFailure::Unreachable {
            goal_id: "g".into(),
            nodes_explored: 2
        }
    );
}

#[test]
fn frontier_emptied_on_the_last_allowed_expansion_is_unreachable() {
    let planner = planner(vec![
        Action::new("scan", Phase::Scan).with_effects(set(Field::RepoScanned))
    ])
    .with_config(PlannerConfig {
        max_iterations: 2,
        ..PlannerConfig::default()
    });
    let goal = Goal::new("g", set(Field::DriftAnalyzed));

    let err = planner.search(&goal, &WorldState::new()).unwrap_err();

    assert_eq!(
        err,
        SearchFailure::Unreachable {
            goal_id: "g".into(),
            nodes_explored: 2
        }
    );
}

#[test]
fn zero_timeout_stops_search_before_expanding() {
    let planner = drift_planner(PlannerConfig {
        timeout_ms: 0,
        ..PlannerConfig::default()
    });
    let goal = pipeline_goal(&planner, "drift_analyzed");

    let err = planner.search(&goal, &WorldState::new()).unwrap_err();

    assert!(matches!(
        err,
        SearchFailure::Timeout { ref goal_id, nodes_explored: 0, .. } if goal_id == "drift_analyzed"
    ));
}

#[test]
fn invalid_config_is_rejected_before_searching() {
    let negative = drift_planner(PlannerConfig {
        heuristic_weight: -3.0,
        ..PlannerConfig::default()
    });
    let goal = pipeline_goal(&negative, "drift_analyzed");

    assert_eq!(
        negative.search(&goal, &WorldState::new()).unwrap_err(),
        SearchFailure::InvalidConfig(ConfigError::HeuristicWeight(-3.0))
    );
    assert!(negative.plan(&goal, &WorldState::new()).is_none());

    let nan = PlannerConfig {
        heuristic_weight: f64::NAN,
        ..PlannerConfig::default()
    };
    let err = negative
        .search_with(&goal, &WorldState::new(), &nan)
        .unwrap_err();
    assert!(matches!(
        err,
        SearchFailure::InvalidConfig(ConfigError::HeuristicWeight(_))
    ));
    assert_eq!(err.nodes_explored(), 0);
}

#[test]
fn expanded_states_are_not_reopened_by_cheaper_paths() {
    // `direct` reaches {scanned} at cost 5; the detour reaches the same state at cost 2, but
    // only after the weighted heuristic has already expanded it.
    let not = |field| PartialState::empty().with(field, false);
    let actions = vec![
        Action::new("direct", Phase::Scan)
            .with_preconditions(not(Field::BaselineLoaded))
            .with_effects(set(Field::RepoScanned))
            .with_cost(5.0),
        Action::new("detour_a", Phase::Index)
            .with_preconditions(not(Field::RepoScanned))
            .with_effects(set(Field::BaselineLoaded))
            .with_cost(1.0),
        Action::new("detour_b", Phase::Index)
            .with_preconditions(set(Field::BaselineLoaded))
            .with_effects(set(Field::RepoScanned).with(Field::BaselineLoaded, false))
            .with_cost(1.0),
        Action::new("prep", Phase::Analyze)
            .with_preconditions(set(Field::RepoScanned))
            .with_effects(set(Field::PatternsExtracted))
            .with_cost(1.0),
        Action::new("finish", Phase::Analyze)
            .with_preconditions(set(Field::RepoScanned).with(Field::PatternsExtracted, true))
            .with_effects(set(Field::DriftAnalyzed))
            .with_cost(1.0),
    ];
    let goal = Goal::new("g", set(Field::RepoScanned).with(Field::DriftAnalyzed, true));

    let plan = planner(actions)
        .with_config(PlannerConfig {
            heuristic_weight: 4.5,
            ..PlannerConfig::default()
        })
        .plan(&goal, &WorldState::new())
        .unwrap();

    assert_eq!(plan.action_ids(), vec!["direct", "prep", "finish"]);
    assert_eq!(plan.total_cost(), 7.0);
    assert_eq!(plan.nodes_explored(), 5);
}

#[test]
fn iteration_budget_stops_search() {
    let config = PlannerConfig {
        max_iterations: 2,
        ..PlannerConfig::default()
    };
    let planner = drift_planner(config);
    let goal = pipeline_goal(&planner, "drift_analyzed");

    let err = planner.search(&goal, &WorldState::new()).unwrap_err();

    assert_eq!(
        err,
        SearchFailure::IterationBudget {
            goal_id: "drift_analyzed".into(),
            nodes_explored: 2
        }
    );
}

#[test]
fn depth_cap_prunes_long_branches() {
    let actions = vec![
        Action::new("scan", Phase::Scan).with_effects(set(Field::RepoScanned)),
        Action::new("analyze", Phase::Analyze)
            .with_preconditions(set(Field::RepoScanned))
            .with_effects(set(Field::DriftAnalyzed)),
    ];
    let goal = Goal::new("g", set(Field::DriftAnalyzed));

    let short = planner(actions.clone()).with_config(PlannerConfig {
        max_plan_length: 1,
        ..PlannerConfig::default()
    });
    assert!(matches!(
        short.search(&goal, &WorldState::new()),
        Err(SearchFailure::Unreachable { .. })
    ));

    let long = planner(actions).with_config(PlannerConfig {
        max_plan_length: 2,
        ..PlannerConfig::default()
    });
    let plan = long.plan(&goal, &WorldState::new()).unwrap();
    assert_eq!(plan.action_ids(), vec!["scan", "analyze"]);
}

#[test]
fn parallel_discount_changes_the_choice() {
    let actions = vec![
        Action::new("serial", Phase::Scan)
            .with_effects(set(Field::RepoScanned))
            .with_cost(1.0),
        Action::new("parallel", Phase::Scan)
            .with_effects(set(Field::RepoScanned).with(Field::DependenciesMapped, true))
            .with_cost(1.05)
            .parallel(),
    ];
    let goal = Goal::new("g", set(Field::RepoScanned));

    let preferring = planner(actions.clone());
    assert_eq!(
        preferring.plan(&goal, &WorldState::new()).unwrap().action_ids(),
        vec!["parallel"]
    );

    let plain = planner(actions).with_config(PlannerConfig {
        prefer_parallel: false,
        ..PlannerConfig::default()
    });
    let plan = plain.plan(&goal, &WorldState::new()).unwrap();
    assert_eq!(plan.action_ids(), vec!["serial"]);
    assert_eq!(plan.total_cost(), 1.0);
}

#[test]
fn equal_f_ties_go_to_earliest_insertion() {
    let actions = vec![
        Action::new("first", Phase::Scan)
            .with_effects(set(Field::RepoScanned).with(Field::BaselineLoaded, true))
            .with_cost(2.0),
        Action::new("second", Phase::Scan)
            .with_effects(set(Field::RepoScanned))
            .with_cost(2.0),
    ];
    let goal = Goal::new("g", set(Field::RepoScanned));

    let plan = planner(actions).plan(&goal, &WorldState::new()).unwrap();

    assert_eq!(plan.action_ids(), vec!["first"]);
}

#[test]
fn drift_analysis_takes_the_cheaper_pipeline() {
    let planner = drift_planner(PlannerConfig::default());
    let goal = pipeline_goal(&planner, "drift_analyzed");
    let start = WorldState::new();

    let plan = planner.plan(&goal, &start).unwrap();

    let ids: BTreeSet<_> = plan.action_ids().into_iter().collect();
    let expected: BTreeSet<_> = [
        "scan_repository",
        "generate_embeddings",
        "load_baseline",
        "extract_patterns",
        "analyze_drift",
    ]
    .into_iter()
    .collect();
    assert_eq!(ids, expected);
    assert_eq!(plan.total_cost(), 16.0);
    assert_eq!(plan.action_ids().last(), Some(&"analyze_drift"));

    let states = plan.replay();
    for (action, state) in plan.actions().iter().zip(&states) {
        assert!(action.is_applicable(state), "{} not applicable", action.id);
    }
    assert_eq!(states.last(), Some(plan.end_state()));
    assert!(goal.is_satisfied(plan.end_state()));
    assert_eq!(plan.start_state(), &start);
}

#[test]
fn heavy_heuristic_weight_goes_greedy() {
    let planner = drift_planner(PlannerConfig {
        heuristic_weight: 3.0,
        ..PlannerConfig::default()
    });
    let goal = pipeline_goal(&planner, "drift_analyzed");

    let plan = planner.plan(&goal, &WorldState::new()).unwrap();

    assert_eq!(
        plan.action_ids(),
        vec!["load_baseline", "scan_repository", "quick_drift_check"]
    );
    assert_eq!(plan.total_cost(), 17.0);
}

#[test]
fn unknown_goal_id_yields_no_plan() {
    let planner = drift_planner(PlannerConfig::default());
    assert!(planner.plan_goal_id("nope", &WorldState::new()).is_none());
    assert!(planner
        .plan_goal_id("repository_indexed", &WorldState::new())
        .is_some());
}

#[test]
fn search_with_overrides_planner_config() {
    let planner = drift_planner(PlannerConfig::default());
    let goal = pipeline_goal(&planner, "drift_analyzed");
    let tight = PlannerConfig {
        max_iterations: 1,
        ..PlannerConfig::default()
    };

    assert!(planner.search_with(&goal, &WorldState::new(), &tight).is_err());
    assert!(planner.search(&goal, &WorldState::new()).is_ok());
}

#[test]
fn heuristic_charges_cheapest_setter_or_fallback() {
    let planner = drift_planner(PlannerConfig::default());
    let goal = Goal::new(
        "g",
        set(Field::RepoScanned).with(Field::DriftAnalyzed, true),
    );
    assert_eq!(planner.calculate_heuristic(&WorldState::new(), &goal), 6.0);

    let scanned = WorldState::new().with(Field::RepoScanned, true);
    assert_eq!(planner.calculate_heuristic(&scanned, &goal), 4.0);

    let unsettable = Goal::new("u", PartialState::empty().with(Field::DriftScore, 0.5));
    assert_eq!(
        planner.calculate_heuristic(&WorldState::new(), &unsettable),
        FALLBACK_COST
    );
}

#[test]
fn config_validation() {
    assert!(PlannerConfig::default().validate().is_ok());
    let low_weight = PlannerConfig {
        heuristic_weight: 0.5,
        ..PlannerConfig::default()
    };
    assert!(low_weight.validate().is_err());
    let no_iterations = PlannerConfig {
        max_iterations: 0,
        ..PlannerConfig::default()
    };
    assert!(no_iterations.validate().is_err());
}
