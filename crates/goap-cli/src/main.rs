//! GOAP CLI - plan drift-analysis pipeline runs.
//!
//! Single binary that provides:
//! - `goap plan` - plan a single goal
//! - `goap plan-all` - plan several goals in dependency order
//! - `goap next` - plan the most pressing achievable goal
//! - `goap goals` / `goap actions` - inspect the catalogs
//! - `goap init` - write a default configuration

mod config;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use goap_core::WorldState;
use goap_planner::{format_duration, Plan, Planner};

use crate::config::{load_state, GoapConfig, DEFAULT_CONFIG};

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Goal-oriented planner for the drift-analysis pipeline", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Config file (defaults to <project>/.goap/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a single goal
    Plan {
        /// Goal id from the catalog
        #[arg(short, long)]
        goal: String,

        /// World state file (YAML or JSON)
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Plan several goals in dependency order
    PlanAll {
        /// Goal ids (defaults to every catalog goal)
        #[arg(short, long)]
        goal: Vec<String>,

        #[arg(short, long)]
        state: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// Plan the highest-priority achievable goal
    Next {
        #[arg(short, long)]
        state: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },

    /// List goals and their status against a state
    Goals {
        #[arg(short, long)]
        state: Option<PathBuf>,
    },

    /// List the action catalog
    Actions,

    /// Write a default configuration file
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let project_root = match cli.project {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if let Commands::Init = cli.command {
        return init_project(&project_root);
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => GoapConfig::load(path)?,
        None => GoapConfig::load_from_project(&project_root)?,
    };
    config.resolve_paths(&project_root);

    let (actions, goals) = config.catalogs()?;
    let planner = Planner::new(actions, goals).with_config(config.planner.clone());

    match cli.command {
        Commands::Plan { goal, state, json } => {
            let start = load_state(state.as_deref())?;
            plan_one(&planner, &goal, &start, json)
        }
        Commands::PlanAll { goal, state, json } => {
            let start = load_state(state.as_deref())?;
            plan_all(&planner, &goal, &start, json)
        }
        Commands::Next { state, json } => {
            let start = load_state(state.as_deref())?;
            let Some(goal) = planner.goals().next_goal(&start) else {
                println!("No achievable goals.");
                return Ok(());
            };
            let goal_id = goal.id.clone();
            plan_one(&planner, &goal_id, &start, json)
        }
        Commands::Goals { state } => {
            let start = load_state(state.as_deref())?;
            list_goals(&planner, &start);
            Ok(())
        }
        Commands::Actions => {
            list_actions(&planner);
            Ok(())
        }
        Commands::Init => Ok(()),
    }
}

fn plan_one(planner: &Planner, goal_id: &str, start: &WorldState, json: bool) -> Result<()> {
    let Some(goal) = planner.goals().get(goal_id) else {
        bail!("Unknown goal `{goal_id}`");
    };

    tracing::info!(goal = %goal_id, "Planning");
    let plan = planner.search(goal, start)?;
    print_plans(std::slice::from_ref(&plan), json)
}

fn plan_all(planner: &Planner, goal_ids: &[String], start: &WorldState, json: bool) -> Result<()> {
    let ids: Vec<&str> = if goal_ids.is_empty() {
        planner.goals().iter().map(|goal| goal.id.as_str()).collect()
    } else {
        goal_ids.iter().map(String::as_str).collect()
    };

    tracing::info!(goals = ids.len(), "Planning goal set");
    let plans = planner.orchestrate_ids(&ids, start)?;

    if !json {
        let cost: f64 = plans.iter().map(Plan::total_cost).sum();
        let duration = plans
            .iter()
            .map(Plan::estimated_duration)
            .fold(Duration::ZERO, Duration::saturating_add);
        println!(
            "{} plans, total cost {:.2}, ~{}",
            plans.len(),
            cost,
            format_duration(duration)
        );
        println!();
    }
    print_plans(&plans, json)
}

fn print_plans(plans: &[Plan], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plans)?);
        return Ok(());
    }
    for plan in plans {
        println!("{plan}");
    }
    Ok(())
}

fn list_goals(planner: &Planner, state: &WorldState) {
    println!("Goals");
    println!("=====");
    for goal in planner.goals().iter() {
        let status = if goal.is_satisfied(state) {
            "satisfied"
        } else if goal.is_pursuable(state) {
            "achievable"
        } else {
            "gated"
        };
        println!(
            "  {:<24} {:<10} priority={:<8} distance={}",
            goal.id,
            status,
            goal.priority,
            goal.distance(state)
        );
        if !goal.depends_on.is_empty() {
            println!("  {:<24} depends on: {}", "", goal.depends_on.join(", "));
        }
    }
}

fn list_actions(planner: &Planner) {
    println!("Actions");
    println!("=======");
    for action in planner.actions().iter() {
        let parallel = if action.parallelizable { " parallel" } else { "" };
        println!(
            "  {:<22} [{}] cost={:<5} timeout={}{}",
            action.id,
            action.phase,
            action.cost,
            format_duration(action.timeout),
            parallel
        );
        if let Some(executor) = &action.executor {
            println!("  {:<22} executor: {}", "", executor);
        }
    }
}

fn init_project(project_root: &Path) -> Result<()> {
    let goap_dir = project_root.join(".goap");
    std::fs::create_dir_all(&goap_dir)
        .with_context(|| format!("Failed to create {}", goap_dir.display()))?;

    let config_path = goap_dir.join("config.yaml");
    if !config_path.exists() {
        std::fs::write(&config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    println!("Initialized planner config at {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Describe the current pipeline state in a YAML file");
    println!("  2. Run: goap next --state state.yaml");

    Ok(())
}
