//! Command-line front end for the gridplan planners.
//!
//! Loads a scenario (grid, start, goal, goal conditions), runs one of the
//! planners, prints the grid with the result overlaid, and optionally
//! appends the path to a record file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path as FsPath, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;

use gridplan_core::{Cell, Environment, Grid, Path};
use gridplan_paths::{GoalConditions, PlannerConfig, RuleSet, RuledPather, SearchSpace};

/// The 5x5 map used when no scenario file is given.
pub const BUILTIN_GRID: &str = "\
...#.
##.#.
.....
.###.
.....";

#[derive(Parser, Debug)]
#[command(author, version, about = "Hybrid A* / backward-chaining grid planner", long_about = None)]
pub struct Cli {
    /// Scenario file (TOML). Defaults to the built-in 5x5 map.
    #[arg(long)]
    pub scenario: Option<PathBuf>,

    /// Append each computed path to this file.
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Override the scenario's expansion budget.
    #[arg(long)]
    pub max_expansions: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chain to a subgoal, then route start -> subgoal -> goal.
    Plan,
    /// Shortest path between two cells (default: start to goal).
    Search {
        /// Source cell as ROW,COL.
        #[arg(long, value_parser = parse_cell)]
        from: Option<Cell>,
        /// Destination cell as ROW,COL.
        #[arg(long, value_parser = parse_cell)]
        to: Option<Cell>,
    },
    /// Backward chain from the goal only.
    Chain,
}

/// Parse `ROW,COL` into a cell.
pub fn parse_cell(s: &str) -> std::result::Result<Cell, String> {
    let (r, c) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {s:?}"))?;
    let row = r.trim().parse().map_err(|e| format!("bad row {r:?}: {e}"))?;
    let col = c.trim().parse().map_err(|e| format!("bad column {c:?}: {e}"))?;
    Ok(Cell::new(row, col))
}

/// A planning request as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Text map, `.` free and `#` blocked.
    pub grid: String,
    pub start: Cell,
    pub goal: Cell,
    #[serde(default)]
    pub goal_conditions: Vec<Cell>,
    /// Extra cells the planners must not enter.
    #[serde(default)]
    pub avoid: Vec<Cell>,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl Scenario {
    /// The 5x5 example: start top-left, goal bottom-right.
    pub fn builtin() -> Self {
        Self {
            grid: BUILTIN_GRID.to_string(),
            start: Cell::new(0, 0),
            goal: Cell::new(4, 4),
            goal_conditions: vec![Cell::new(3, 4), Cell::new(2, 4)],
            avoid: Vec::new(),
            planner: PlannerConfig::default(),
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).context("invalid scenario")
    }

    pub fn load(path: &FsPath) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn build_grid(&self) -> Result<Grid> {
        self.grid.parse().context("invalid scenario grid")
    }

    pub fn rules(&self) -> RuleSet {
        if self.avoid.is_empty() {
            RuleSet::default()
        } else {
            RuleSet::default().avoiding(self.avoid.iter().copied())
        }
    }

    pub fn goal_conditions(&self) -> GoalConditions {
        self.goal_conditions.iter().copied().collect()
    }
}

/// Draw the grid with a path overlaid: `S` start, `G` goal, `*` path,
/// `?` goal conditions off the path, `x` avoided cells.
pub fn render(grid: &Grid, scenario: &Scenario, path: Option<&Path>) -> String {
    let mut out = String::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let c = Cell::new(row, col);
            let ch = if c == scenario.start {
                'S'
            } else if c == scenario.goal {
                'G'
            } else if path.is_some_and(|p| p.contains(&c)) {
                '*'
            } else if scenario.goal_conditions.contains(&c) {
                '?'
            } else if scenario.avoid.contains(&c) {
                'x'
            } else if grid.is_free(c) {
                '.'
            } else {
                '#'
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}

/// Append `Path: [...]` to the record file, creating it if needed.
pub fn record_path(file: &FsPath, path: &Path) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("opening record file {}", file.display()))?;
    writeln!(f, "Path: {path}")?;
    Ok(())
}

/// Execute one command and return the text to print.
pub fn run(cli: &Cli) -> Result<String> {
    let mut scenario = match &cli.scenario {
        Some(p) => {
            log::info!("loading scenario from {}", p.display());
            Scenario::load(p)?
        }
        None => Scenario::builtin(),
    };
    if let Some(n) = cli.max_expansions {
        scenario.planner.max_expansions = Some(n);
    }

    let grid = scenario.build_grid()?;
    let env = Environment::new(&grid, scenario.start, scenario.goal)
        .context("invalid start or goal")?;
    let rules = scenario.rules();
    let goals = scenario.goal_conditions();
    let mut space = SearchSpace::with_config(grid.bounds(), scenario.planner);

    let mut out = String::new();
    let path = match cli.command {
        Command::Plan => {
            if goals.is_empty() {
                bail!("scenario has no goal conditions");
            }
            let plan = space.plan_detailed(&env, &goals, &rules)?;
            out.push_str(&format!("Backward chain: {}\n", plan.chain));
            out.push_str(&format!("Subgoal: {}\n", plan.chain.destination()));
            plan.path
        }
        Command::Search { from, to } => {
            let from = from.unwrap_or(env.start());
            let to = to.unwrap_or(env.goal());
            space.astar_path(&RuledPather::new(&env, &rules), from, to)?
        }
        Command::Chain => space.chain(&RuledPather::new(&env, &rules), &goals)?,
    };
    log::info!("{} cells, {} steps", path.len(), path.edges());

    out.push_str(&format!("Path: {path}\n"));
    out.push_str(&render(&grid, &scenario, Some(&path)));

    if let Some(file) = &cli.record {
        record_path(file, &path)?;
        log::info!("recorded path to {}", file.display());
    }
    Ok(out)
}
