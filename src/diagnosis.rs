//! Infeasibility diagnosis.
//!
//! Works from the plan alone: recounts the eligible workers of every
//! occurrence and reports those with none. When there are none to report and
//! the solver proved infeasibility, the cause lies in the daily cap or
//! fairness interplay, which is not analysed further.

use chrono::NaiveDate;

use crate::domain::ShiftPlan;
use crate::solver::SolverStatus;

/// Shown when some occurrence has no eligible worker.
pub const SHORTAGE_NOTE: &str =
    "Some tasks have no staff available and skilled for the work on their date.";

/// Shown when every occurrence has at least one eligible worker.
pub const ALL_CLEAR_NOTE: &str = "Every task has at least one available and skilled worker. \
     If no schedule exists, interacting constraints (daily cap, fairness) block it.";

/// Shown for an all-clear plan the solver gave up on without a verdict.
pub const UNDECIDED_NOTE: &str = "Every task has at least one available and skilled worker. \
     The solver stopped before finding a schedule or proving there is none.";

/// An occurrence nobody can cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnassignableOccurrence {
    pub task: String,
    pub date: NaiveDate,
    pub work_item: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    /// In task-then-date order.
    pub unassignable: Vec<UnassignableOccurrence>,
}

impl Diagnosis {
    /// No eligibility gaps were found.
    pub fn is_all_clear(&self) -> bool {
        self.unassignable.is_empty()
    }

    /// Note for a plan looked at without solving.
    pub fn note(&self) -> &'static str {
        if self.is_all_clear() {
            ALL_CLEAR_NOTE
        } else {
            SHORTAGE_NOTE
        }
    }

    /// Note for a plan the solver returned `status` on.
    pub fn note_for(&self, status: SolverStatus) -> &'static str {
        match status {
            SolverStatus::Unknown if self.is_all_clear() => UNDECIDED_NOTE,
            _ => self.note(),
        }
    }
}

/// Reports every occurrence with zero eligible workers.
pub fn diagnose(plan: &ShiftPlan) -> Diagnosis {
    let unassignable = plan
        .occurrences
        .iter()
        .filter(|occurrence| plan.eligible_workers(occurrence).next().is_none())
        .map(|occurrence| UnassignableOccurrence {
            task: plan.task_of(occurrence).name.clone(),
            date: occurrence.date,
            work_item: occurrence.work_item.clone(),
        })
        .collect();

    Diagnosis { unassignable }
}
