//! Solver for the shift assignment model.
//!
//! Two phases: a greedy construction heuristic gives a quick complete
//! assignment when one is easy to find, then an exact MILP (good_lp over the
//! pure-Rust microlp backend) minimises the workload spread under a time
//! limit.

use good_lp::{
    constraint, microlp, variable, variables, Expression, ResolutionError, Solution as _,
    SolverModel, Variable,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

#[cfg(feature = "console")]
use crate::console::{self, PhaseTimer};
use crate::config::{SchedulerConfig, DEFAULT_MAX_EXACT_SOLVES};
use crate::constraints::{self, AssignmentModel};
use crate::diagnosis::{self, Diagnosis};
use crate::domain::Solution;
use crate::error::DataFormatError;
use crate::input::{self, Workbook};
use crate::schedule::{self, ScheduleReport};

/// Outcome of a solver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolverStatus {
    /// Feasible with the minimal spread.
    Optimal,
    /// Feasible, spread not proven minimal.
    Feasible,
    /// No assignment satisfies the hard constraints.
    Infeasible,
    /// Budget exhausted or the backend failed without an answer.
    Unknown,
}

impl SolverStatus {
    /// Returns the status as a SCREAMING_SNAKE_CASE string for API responses.
    ///
    /// ```
    /// use shift_scheduling::solver::SolverStatus;
    ///
    /// assert_eq!(SolverStatus::Optimal.as_str(), "OPTIMAL");
    /// assert_eq!(SolverStatus::Unknown.as_str(), "UNKNOWN");
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::Optimal => "OPTIMAL",
            SolverStatus::Feasible => "FEASIBLE",
            SolverStatus::Infeasible => "INFEASIBLE",
            SolverStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn has_solution(self) -> bool {
        matches!(self, SolverStatus::Optimal | SolverStatus::Feasible)
    }
}

/// Status plus the bound solution, present only for OPTIMAL and FEASIBLE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    pub status: SolverStatus,
    pub solution: Option<Solution>,
    pub duration: Duration,
}

/// Bounds the number of exact-phase threads alive at once.
///
/// A permit is held by the solver thread itself, so a run that timed out keeps
/// its slot until microlp actually returns. Clones share the same count.
#[derive(Debug, Clone)]
pub struct ExactGate {
    running: Arc<AtomicUsize>,
    limit: usize,
}

impl ExactGate {
    pub fn new(limit: usize) -> Self {
        Self {
            running: Arc::new(AtomicUsize::new(0)),
            limit: limit.max(1),
        }
    }

    /// Exact phases currently running, including detached ones.
    pub fn running(&self) -> usize {
        self.running.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Takes a slot, or `None` when all are in use.
    pub fn try_acquire(&self) -> Option<ExactPermit> {
        self.running
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.limit).then_some(n + 1)
            })
            .ok()
            .map(|_| ExactPermit {
                running: Arc::clone(&self.running),
            })
    }
}

impl Default for ExactGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXACT_SOLVES)
    }
}

/// A slot of an [`ExactGate`], released on drop.
#[derive(Debug)]
pub struct ExactPermit {
    running: Arc<AtomicUsize>,
}

impl Drop for ExactPermit {
    fn drop(&mut self) {
        self.running.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Solves the model, blocking the caller until done or out of budget.
///
/// `time_limit` bounds the exact phase only; the construction phase is linear.
/// A zero budget skips the exact phase, as does a full `gate`.
pub fn solve(
    model: &AssignmentModel,
    time_limit: Option<Duration>,
    gate: &ExactGate,
) -> SolveResult {
    let start = Instant::now();
    let finish = |status: SolverStatus, solution: Option<Solution>| SolveResult {
        status,
        solution,
        duration: start.elapsed(),
    };

    if model.coverage.is_empty() {
        return finish(SolverStatus::Optimal, Some(Solution::new(Vec::new())));
    }

    // An empty exactly-one row reads 0 == 1.
    let uncoverable = model.uncoverable().count();
    if uncoverable > 0 {
        info!(uncoverable, "Coverage rows without candidates, model is infeasible");
        return finish(SolverStatus::Infeasible, None);
    }

    // Phase 1: construction heuristic
    #[cfg(feature = "console")]
    let timer = PhaseTimer::start("Construction", 0);
    let constructed = construction_heuristic(model);
    let constructed_spread = constructed.as_ref().map(|s| s.spread(model.worker_count));
    #[cfg(feature = "console")]
    timer.finish(&spread_label(constructed_spread));
    debug!(?constructed_spread, "Construction phase done");

    if constructed_spread == Some(0) {
        return finish(SolverStatus::Optimal, constructed);
    }

    // Phase 2: exact MILP
    #[cfg(feature = "console")]
    let timer = PhaseTimer::start("Exact", 1);
    let outcome = run_exact(model, time_limit, gate);
    #[cfg(feature = "console")]
    timer.finish(outcome.label());

    match outcome {
        ExactOutcome::Solved(values) => match model.decode(&values) {
            Some(solution) if model.is_feasible(&solution) => {
                finish(SolverStatus::Optimal, Some(solution))
            }
            _ => {
                warn!("Backend values violate the model, falling back to construction");
                fallback(constructed, finish)
            }
        },
        ExactOutcome::Infeasible => match constructed {
            Some(solution) => {
                warn!("Backend reported infeasible for a covered model");
                finish(SolverStatus::Feasible, Some(solution))
            }
            None => finish(SolverStatus::Infeasible, None),
        },
        ExactOutcome::TimedOut => {
            info!(?time_limit, "Exact phase hit the time limit");
            fallback(constructed, finish)
        }
        ExactOutcome::Busy => {
            warn!(
                running = gate.running(),
                limit = gate.limit(),
                "Exact phase skipped, all solver slots busy"
            );
            fallback(constructed, finish)
        }
        ExactOutcome::Failed(reason) => {
            warn!(%reason, "Exact phase failed");
            fallback(constructed, finish)
        }
    }
}

fn fallback(
    constructed: Option<Solution>,
    finish: impl Fn(SolverStatus, Option<Solution>) -> SolveResult,
) -> SolveResult {
    match constructed {
        Some(solution) => finish(SolverStatus::Feasible, Some(solution)),
        None => finish(SolverStatus::Unknown, None),
    }
}

/// Construction heuristic: least-loaded eligible worker, in occurrence order.
///
/// Ties go to the lowest worker index; a worker at the daily cap is skipped.
/// Returns `None` if some occurrence is left without a worker.
fn construction_heuristic(model: &AssignmentModel) -> Option<Solution> {
    let mut cap_of_var = vec![usize::MAX; model.var_count()];
    for (idx, cap) in model.daily_caps.iter().enumerate() {
        for &v in &cap.vars {
            cap_of_var[v] = idx;
        }
    }

    let mut loads = vec![0usize; model.worker_count];
    let mut day_loads = vec![0usize; model.daily_caps.len()];
    let mut assignments = Vec::with_capacity(model.coverage.len());

    for row in &model.coverage {
        let chosen = row
            .iter()
            .copied()
            .filter(|&v| {
                let cap = cap_of_var[v];
                day_loads[cap] < model.daily_caps[cap].limit
            })
            .min_by_key(|&v| {
                let worker = model.vars[v].worker;
                (loads[worker], worker)
            })?;

        let worker = model.vars[chosen].worker;
        loads[worker] += 1;
        day_loads[cap_of_var[chosen]] += 1;
        assignments.push(worker);
    }

    Some(Solution::new(assignments))
}

#[derive(Debug)]
enum ExactOutcome {
    Solved(Vec<bool>),
    Infeasible,
    TimedOut,
    /// No gate slot was free.
    Busy,
    Failed(String),
}

#[cfg(feature = "console")]
impl ExactOutcome {
    fn label(&self) -> &str {
        match self {
            ExactOutcome::Solved(_) => "optimal",
            ExactOutcome::Infeasible => "infeasible",
            ExactOutcome::TimedOut => "time limit",
            ExactOutcome::Busy => "skipped",
            ExactOutcome::Failed(_) => "failed",
        }
    }
}

/// Runs the MILP on a worker thread and waits at most `time_limit`.
///
/// microlp cannot be interrupted, so on timeout the thread is left to finish on
/// its own and its result is dropped. It keeps its gate permit until then.
fn run_exact(
    model: &AssignmentModel,
    time_limit: Option<Duration>,
    gate: &ExactGate,
) -> ExactOutcome {
    if time_limit == Some(Duration::ZERO) {
        return ExactOutcome::TimedOut;
    }
    let Some(permit) = gate.try_acquire() else {
        return ExactOutcome::Busy;
    };

    let owned = model.clone();
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("shift-milp".to_string())
        .spawn(move || {
            let outcome = solve_milp(&owned);
            drop(permit);
            let _ = tx.send(outcome);
        });
    if let Err(e) = spawned {
        return ExactOutcome::Failed(e.to_string());
    }

    let received = match time_limit {
        Some(limit) => rx.recv_timeout(limit),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(outcome) => outcome,
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                running = gate.running(),
                "Solver thread still running after the time limit, left detached"
            );
            ExactOutcome::TimedOut
        }
        Err(RecvTimeoutError::Disconnected) => {
            ExactOutcome::Failed("solver thread exited without a result".to_string())
        }
    }
}

/// Lowers the model to a MILP and solves it.
///
/// ```text
/// x[v]  ∈ {0,1}                       per assignment variable
/// Σ x[row] == 1                       per coverage row
/// Σ x[cap] <= limit                   per daily cap
/// count[w] == Σ x[workload w]         per worker
/// max >= count[w], min <= count[w]    per worker
/// minimise max − min
/// ```
fn solve_milp(model: &AssignmentModel) -> ExactOutcome {
    let upper = model.coverage.len() as f64;
    let mut vars = variables!();

    let x: Vec<Variable> = model
        .vars
        .iter()
        .map(|_| vars.add(variable().binary()))
        .collect();
    let counts: Vec<Variable> = (0..model.worker_count)
        .map(|_| vars.add(variable().integer().min(0.0).max(upper)))
        .collect();
    let max_load = vars.add(variable().integer().min(0.0).max(upper));
    let min_load = vars.add(variable().integer().min(0.0).max(upper));

    let mut problem = vars.minimise(max_load - min_load).using(microlp);

    for row in &model.coverage {
        problem = problem.with(constraint!(sum_of(&x, row) == 1.0));
    }
    for cap in &model.daily_caps {
        let limit = cap.limit as f64;
        problem = problem.with(constraint!(sum_of(&x, &cap.vars) <= limit));
    }
    for (worker, terms) in model.workloads.iter().enumerate() {
        let count = counts[worker];
        problem = problem
            .with(constraint!(count == sum_of(&x, terms)))
            .with(constraint!(max_load >= count))
            .with(constraint!(min_load <= count));
    }

    match problem.solve() {
        Ok(solution) => ExactOutcome::Solved(x.iter().map(|&v| solution.value(v) > 0.5).collect()),
        Err(ResolutionError::Infeasible) => ExactOutcome::Infeasible,
        Err(e) => ExactOutcome::Failed(e.to_string()),
    }
}

fn sum_of(x: &[Variable], vars: &[usize]) -> Expression {
    vars.iter().fold(Expression::from(0.0), |acc, &v| acc + x[v])
}

#[cfg(feature = "console")]
fn spread_label(spread: Option<usize>) -> String {
    match spread {
        Some(spread) => format!("spread {}", spread),
        None => "incomplete".to_string(),
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// OPTIMAL or FEASIBLE: the materialized schedule.
    Scheduled(ScheduleReport),
    /// INFEASIBLE or UNKNOWN: the eligibility diagnosis.
    Diagnosed {
        status: SolverStatus,
        diagnosis: Diagnosis,
    },
}

impl PipelineOutcome {
    pub fn status(&self) -> SolverStatus {
        match self {
            PipelineOutcome::Scheduled(report) => report.status,
            PipelineOutcome::Diagnosed { status, .. } => *status,
        }
    }
}

/// Build, compile, solve, then materialize or diagnose.
///
/// Only malformed input is an error. Every run builds its own model; runs
/// share nothing but the `gate`.
pub fn run_pipeline(
    workbook: &Workbook,
    config: &SchedulerConfig,
    gate: &ExactGate,
) -> Result<PipelineOutcome, DataFormatError> {
    let run_id = uuid::Uuid::new_v4();
    let span = info_span!("pipeline", %run_id);
    let _guard = span.enter();

    let plan = input::build_plan(workbook, config.marker())?;
    let model = constraints::compile(&plan, config.daily_cap);

    info!(
        tasks = plan.tasks.len(),
        occurrences = plan.occurrences.len(),
        workers = plan.workers.len(),
        variables = model.var_count(),
        constraints = model.constraint_count(),
        "Starting shift solver"
    );
    #[cfg(feature = "console")]
    console::print_model(
        plan.occurrences.len(),
        plan.workers.len(),
        model.var_count(),
        model.constraint_count(),
    );

    let result = solve(&model, config.time_limit(), gate);
    let spread = result.solution.as_ref().map(|s| s.spread(model.worker_count));

    info!(
        status = result.status.as_str(),
        ?spread,
        duration_ms = result.duration.as_millis() as u64,
        "Solving complete"
    );
    #[cfg(feature = "console")]
    console::print_solving_ended(result.duration, result.status.as_str(), spread);

    match result.solution {
        Some(solution) if result.status.has_solution() => Ok(PipelineOutcome::Scheduled(
            schedule::materialize(&plan, &solution, result.status),
        )),
        _ => Ok(PipelineOutcome::Diagnosed {
            status: result.status,
            diagnosis: diagnosis::diagnose(&plan),
        }),
    }
}
