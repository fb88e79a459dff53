use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goap_core::{
    drift_pipeline, Action, ActionCatalog, Field, FieldKind, Goal, GoalCatalog, PartialState,
    Phase, WorldState,
};
use goap_planner::{Planner, PlannerConfig};

/// One action per flag, each with no preconditions.
fn flag_planner() -> (Planner, Goal) {
    let flags: Vec<Field> = Field::ALL
        .into_iter()
        .filter(|field| field.kind() == FieldKind::Flag)
        .collect();
    let actions = flags
        .iter()
        .map(|&field| {
            Action::new(format!("set_{field}"), Phase::Scan)
                .with_effects(PartialState::empty().with(field, true))
        })
        .collect();
    let target = flags
        .iter()
        .fold(PartialState::empty(), |partial, &field| partial.with(field, true));

    let planner = Planner::new(
        ActionCatalog::new(actions).expect("catalog"),
        GoalCatalog::default(),
    )
    .with_config(PlannerConfig {
        max_iterations: 100_000,
        ..PlannerConfig::default()
    });
    (planner, Goal::new("all_flags", target))
}

fn bench_goap_planner(c: &mut Criterion) {
    let (actions, goals) = drift_pipeline();
    let planner = Planner::new(actions, goals.clone());
    let start = WorldState::new();

    c.bench_function("goap-planner/plan(drift_analyzed)", |b| {
        b.iter(|| {
            let plan = planner
                .plan_goal_id("drift_analyzed", &start)
                .expect("plan");
            black_box(plan.len());
        })
    });

    c.bench_function("goap-planner/plan_multiple(all goals)", |b| {
        b.iter(|| {
            let plans = planner.plan_multiple(goals.iter(), &start).expect("plans");
            black_box(plans.len());
        })
    });

    let (flag_planner, all_flags) = flag_planner();
    c.bench_function("goap-planner/plan(flags=10)", |b| {
        b.iter(|| {
            let plan = flag_planner.plan(&all_flags, &start).expect("plan");
            black_box(plan.len());
        })
    });
}

criterion_group!(benches, bench_goap_planner);
criterion_main!(benches);
