//! Result materializer: task-centric and worker-centric views of a solution.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::domain::{ShiftPlan, Solution};
use crate::solver::SolverStatus;

/// A column of the task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskColumn {
    /// Original task header.
    pub task: String,
    /// Display header, `sample<YYYY/MM/DD>`; the original header for a
    /// task without occurrences.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTableRow {
    pub date: NaiveDate,
    /// `<work-item>+<worker>` per column, `None` where nothing is required.
    pub cells: Vec<Option<String>>,
}

/// The task calendar with each required cell replaced by its assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTable {
    pub columns: Vec<TaskColumn>,
    pub rows: Vec<TaskTableRow>,
}

impl TaskTable {
    /// The cell for a task on a date.
    pub fn cell(&self, task: &str, date: NaiveDate) -> Option<&str> {
        let col = self.columns.iter().position(|c| c.task == task)?;
        let row = self.rows.iter().find(|r| r.date == date)?;
        row.cells[col].as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct WorkerShift {
    pub date: NaiveDate,
    /// `sample<YYYY/MM/DD>_<work-item>`.
    pub shift_id: String,
}

/// One worker's assignments in date order. Empty means "no schedule".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSchedule {
    pub worker: String,
    pub shifts: Vec<WorkerShift>,
}

impl WorkerSchedule {
    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }
}

/// Both views plus the workload figures of the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleReport {
    pub status: SolverStatus,
    pub task_table: TaskTable,
    pub worker_schedules: Vec<WorkerSchedule>,
    /// WorkloadCount per worker, in worker order.
    pub workloads: Vec<usize>,
    pub spread: usize,
}

/// Materializes a solution against the plan it was solved for.
pub fn materialize(plan: &ShiftPlan, solution: &Solution, status: SolverStatus) -> ScheduleReport {
    let mut columns: Vec<TaskColumn> = plan
        .columns
        .iter()
        .map(|name| TaskColumn {
            task: name.clone(),
            label: name.clone(),
        })
        .collect();
    for task in &plan.tasks {
        columns[task.column].label = task.label();
    }

    let row_of: HashMap<NaiveDate, usize> = plan
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| (*date, i))
        .collect();
    let mut rows: Vec<TaskTableRow> = plan
        .dates
        .iter()
        .map(|date| TaskTableRow {
            date: *date,
            cells: vec![None; columns.len()],
        })
        .collect();

    let mut shifts: Vec<Vec<WorkerShift>> = vec![Vec::new(); plan.workers.len()];

    for occurrence in &plan.occurrences {
        let task = plan.task_of(occurrence);
        let worker = &plan.workers[solution.worker_for(occurrence.index)];

        if let Some(&row) = row_of.get(&occurrence.date) {
            let cell = format!("{}+{}", occurrence.work_item, worker.name);
            rows[row].cells[task.column] = Some(cell);
        }
        shifts[worker.index].push(WorkerShift {
            date: occurrence.date,
            shift_id: task.shift_id(&occurrence.work_item),
        });
    }

    let worker_schedules = plan
        .workers
        .iter()
        .zip(shifts)
        .map(|(worker, mut shifts)| {
            shifts.sort();
            WorkerSchedule {
                worker: worker.name.clone(),
                shifts,
            }
        })
        .collect();

    let workloads = solution.workloads(plan.workers.len());
    let spread = solution.spread(plan.workers.len());

    ScheduleReport {
        status,
        task_table: TaskTable { columns, rows },
        worker_schedules,
        workloads,
        spread,
    }
}

/// Row label for display, e.g. `2025-08-07 (Thu)`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d (%a)").to_string()
}
