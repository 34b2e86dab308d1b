use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};
use serde::{Deserialize, Serialize};

use memplan_core::{aligned_size, LiveRange, ManagedValue, OpNode, PlanInputs, ValueId};
use memplan_strategy::{MemoryPlan, Strategy};
use memplan_trace::{EventKind, FrameNodeId, TraceEvent};

/// memplan -- static memory planner for tensor dataflow graphs
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input problem description (JSON)
    input: Option<PathBuf>,

    /// Packing strategy
    #[arg(short, long, default_value = "greedy-by-size", value_parser = parse_strategy)]
    strategy: Strategy,

    /// Output path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the plan as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Round input sizes up to this alignment before planning
    /// (liveness inputs only; traces carry allocator-aligned sizes)
    #[arg(long)]
    align: Option<i64>,

    /// List all packing strategies and exit
    #[arg(long)]
    list_strategies: bool,
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    Strategy::from_str_name(s).ok_or_else(|| {
        let known: Vec<_> = Strategy::ALL.iter().map(|s| s.name()).collect();
        format!("unknown strategy '{s}', expected one of: {}", known.join(", "))
    })
}

/// Input file: either `values` (+ optional `operators`) for the
/// liveness path, or `events` (+ `graph_outputs`) for the tracing path.
#[derive(Debug, Deserialize)]
struct ProblemFile {
    #[serde(default)]
    values: Vec<ValueEntry>,
    #[serde(default)]
    operators: Vec<OperatorEntry>,
    #[serde(default)]
    events: Vec<EventEntry>,
    /// Node handles whose outputs are graph outputs (leak tolerance).
    #[serde(default)]
    graph_outputs: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct ValueEntry {
    begin: i64,
    end: i64,
    size: i64,
}

#[derive(Debug, Deserialize)]
struct OperatorEntry {
    name: String,
    /// Indices into `values`.
    outputs: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct EventEntry {
    time: i64,
    ptr: String,
    size: i64,
    kind: EventKindEntry,
    #[serde(default)]
    frame: Option<FrameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EventKindEntry {
    Allocate,
    Free,
}

#[derive(Debug, Deserialize)]
struct FrameEntry {
    pc: u64,
    node_schema: String,
    node_header: String,
    node: u64,
}

#[derive(Serialize)]
struct PlanFile {
    strategy: &'static str,
    peak_bytes: i64,
    allocations: Vec<AllocationEntry>,
}

#[derive(Serialize)]
struct AllocationEntry {
    begin: i64,
    end: i64,
    offset: i64,
    size: i64,
}

impl PlanFile {
    fn new(strategy: Strategy, plan: &MemoryPlan) -> Self {
        Self {
            strategy: strategy.name(),
            peak_bytes: plan.arena_size,
            allocations: plan
                .allocations
                .iter()
                .map(|a| AllocationEntry {
                    begin: a.lvr.begin,
                    end: a.lvr.end,
                    offset: a.reg.offset,
                    size: a.reg.size,
                })
                .collect(),
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    env_logger::try_init().ok();

    let cli = Cli::parse();

    if cli.list_strategies {
        for s in Strategy::ALL {
            println!("{s}");
        }
        return Ok(());
    }

    let input = cli.input.clone().ok_or_else(|| {
        miette::miette!("input file is required (use --list-strategies to list strategies)")
    })?;
    let text = std::fs::read_to_string(&input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", input.display()))?;
    let problem: ProblemFile = serde_json::from_str(&text)
        .into_diagnostic()
        .wrap_err("failed to parse problem description")?;

    let plan = if problem.events.is_empty() {
        plan_from_values(&problem, &cli)?
    } else {
        plan_from_trace(&problem, &cli)?
    };

    let mut rendered = if cli.json {
        serde_json::to_string_pretty(&PlanFile::new(cli.strategy, &plan)).into_diagnostic()?
    } else {
        format!("{plan}")
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}

fn plan_from_values(problem: &ProblemFile, cli: &Cli) -> miette::Result<MemoryPlan> {
    let mut values = Vec::with_capacity(problem.values.len());
    for (index, v) in problem.values.iter().enumerate() {
        let size = match cli.align {
            Some(alignment) => aligned_size(v.size, alignment).ok_or_else(|| {
                miette::miette!("cannot align size {} to {alignment} bytes", v.size)
            })?,
            None => v.size,
        };
        values.push(ManagedValue {
            id: ValueId(index),
            lvr: LiveRange::new(v.begin, v.end),
            size,
        });
    }
    let operators = problem
        .operators
        .iter()
        .map(|op| OpNode {
            name: op.name.clone(),
            outputs: op.outputs.iter().map(|&i| ValueId(i)).collect(),
        })
        .collect();
    let inputs = PlanInputs::with_operators(values, operators).into_diagnostic()?;
    memplan_strategy::plan(&inputs, cli.strategy).into_diagnostic()
}

fn plan_from_trace(problem: &ProblemFile, cli: &Cli) -> miette::Result<MemoryPlan> {
    let events: Vec<TraceEvent> = problem
        .events
        .iter()
        .map(|e| TraceEvent {
            time: e.time,
            ptr: e.ptr.clone(),
            size: e.size,
            kind: match e.kind {
                EventKindEntry::Allocate => EventKind::Allocate,
                EventKindEntry::Free => EventKind::Free,
            },
            frame: e.frame.as_ref().map(|f| FrameNodeId {
                pc: f.pc,
                node_schema: f.node_schema.clone(),
                node_header: f.node_header.clone(),
                node: f.node,
            }),
        })
        .collect();
    let outputs: HashSet<u64> = problem.graph_outputs.iter().copied().collect();
    let traced = memplan_trace::plan_from_events(
        &events,
        |frame| outputs.contains(&frame.node),
        cli.strategy,
    )
    .into_diagnostic()?;
    Ok(traced.plan)
}
