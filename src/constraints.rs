//! Constraint model for shift assignment.
//!
//! The model is solver-agnostic: plain index lists that the solver lowers to
//! its own representation. Variables exist only for eligible
//! (occurrence, worker) pairs, so an occurrence nobody can cover ends up with
//! an empty coverage row.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::domain::{ShiftPlan, Solution};

/// Boolean decision: `worker` covers `occurrence`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentVar {
    pub occurrence: usize,
    pub worker: usize,
}

/// Sum of `vars` must not exceed `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCap {
    pub date: NaiveDate,
    pub worker: usize,
    pub vars: Vec<usize>,
    pub limit: usize,
}

/// Compiled assignment problem.
///
/// Hard constraints: exactly one true variable per coverage row, and each
/// daily cap. Objective: minimise max − min over the workload sums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentModel {
    pub worker_count: usize,
    pub vars: Vec<AssignmentVar>,
    /// One row per occurrence, indexed like `ShiftPlan.occurrences`.
    pub coverage: Vec<Vec<usize>>,
    pub daily_caps: Vec<DailyCap>,
    /// Variables summed into each worker's WorkloadCount.
    pub workloads: Vec<Vec<usize>>,
}

/// Builds the assignment model for a plan.
pub fn compile(plan: &ShiftPlan, daily_cap: usize) -> AssignmentModel {
    let worker_count = plan.workers.len();
    let mut vars = Vec::new();
    let mut coverage = Vec::with_capacity(plan.occurrences.len());
    let mut workloads = vec![Vec::new(); worker_count];
    let mut by_day: BTreeMap<(NaiveDate, usize), Vec<usize>> = BTreeMap::new();

    // =========================================================================
    // Variables: eligible (occurrence, worker) pairs only
    // =========================================================================
    for occurrence in &plan.occurrences {
        let mut row = Vec::new();
        for worker in plan.eligible_workers(occurrence) {
            let var = vars.len();
            vars.push(AssignmentVar {
                occurrence: occurrence.index,
                worker: worker.index,
            });

            // =================================================================
            // HARD: Coverage (exactly one per occurrence)
            // =================================================================
            row.push(var);

            // =================================================================
            // FAIRNESS: WorkloadCount terms
            // =================================================================
            workloads[worker.index].push(var);

            // =================================================================
            // HARD: Daily cap per (date, worker)
            // =================================================================
            by_day
                .entry((occurrence.date, worker.index))
                .or_default()
                .push(var);
        }
        coverage.push(row);
    }

    let daily_caps = by_day
        .into_iter()
        .map(|((date, worker), vars)| DailyCap {
            date,
            worker,
            vars,
            limit: daily_cap,
        })
        .collect();

    AssignmentModel {
        worker_count,
        vars,
        coverage,
        daily_caps,
        workloads,
    }
}

impl AssignmentModel {
    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    /// Coverage rows plus daily caps plus the two fairness bounds per worker.
    pub fn constraint_count(&self) -> usize {
        self.coverage.len() + self.daily_caps.len() + 2 * self.worker_count
    }

    /// Occurrences whose coverage row has no candidate variables.
    pub fn uncoverable(&self) -> impl Iterator<Item = usize> + '_ {
        self.coverage
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_empty())
            .map(|(occurrence, _)| occurrence)
    }

    /// The variable pairing `occurrence` with `worker`, if it exists.
    pub fn var_for(&self, occurrence: usize, worker: usize) -> Option<usize> {
        self.coverage
            .get(occurrence)?
            .iter()
            .copied()
            .find(|&v| self.vars[v].worker == worker)
    }

    /// Builds the solution selected by a set of true variables.
    ///
    /// Returns `None` unless every coverage row has exactly one true variable.
    pub fn decode(&self, values: &[bool]) -> Option<Solution> {
        self.coverage
            .iter()
            .map(|row| {
                let mut chosen = row.iter().filter(|&&v| values[v]);
                match (chosen.next(), chosen.next()) {
                    (Some(&v), None) => Some(self.vars[v].worker),
                    _ => None,
                }
            })
            .collect::<Option<Vec<_>>>()
            .map(Solution::new)
    }

    /// Checks every hard constraint against a solution.
    pub fn is_feasible(&self, solution: &Solution) -> bool {
        let assignments = solution.assignments();
        if assignments.len() != self.coverage.len() {
            return false;
        }
        let vars: Option<Vec<usize>> = assignments
            .iter()
            .enumerate()
            .map(|(occurrence, &worker)| self.var_for(occurrence, worker))
            .collect();
        let Some(vars) = vars else {
            return false;
        };

        let mut values = vec![false; self.vars.len()];
        for v in vars {
            values[v] = true;
        }
        self.daily_caps
            .iter()
            .all(|cap| cap.vars.iter().filter(|&&v| values[v]).count() <= cap.limit)
    }
}
