//! Domain model for the shift scheduling problem.

use chrono::NaiveDate;
use std::collections::HashSet;

/// A worker who can be assigned to occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    /// Index of this worker in `ShiftPlan.workers`.
    pub index: usize,
    pub name: String,
    /// Dates the worker can work. Any other date is unavailable.
    pub available_dates: HashSet<NaiveDate>,
    /// Work-item labels the worker is capable of. Any other label is not.
    pub skills: HashSet<String>,
}

impl Worker {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            available_dates: HashSet::new(),
            skills: HashSet::new(),
        }
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for skill in skills {
            self.skills.insert(skill.into());
        }
        self
    }

    pub fn with_available_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.available_dates.extend(dates);
        self
    }

    pub fn is_available(&self, date: NaiveDate) -> bool {
        self.available_dates.contains(&date)
    }

    pub fn is_skilled(&self, work_item: &str) -> bool {
        self.skills.contains(work_item)
    }

    /// Available on the occurrence's date and skilled in its work item.
    pub fn is_eligible(&self, occurrence: &Occurrence) -> bool {
        self.is_available(occurrence.date) && self.is_skilled(&occurrence.work_item)
    }
}

/// One (task, date, work-item) unit that needs exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Index of this occurrence in `ShiftPlan.occurrences`.
    pub index: usize,
    /// Index into `ShiftPlan.tasks`.
    pub task_idx: usize,
    pub date: NaiveDate,
    pub work_item: String,
}

/// A task column of the task calendar with at least one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub index: usize,
    pub name: String,
    /// Position of the task's column in `ShiftPlan.columns`.
    pub column: usize,
    /// Earliest occurrence date; the base of the display labels.
    pub start_date: NaiveDate,
    /// Indices into `ShiftPlan.occurrences`, in date order.
    pub occurrences: Vec<usize>,
}

impl Task {
    /// Column label shown in the task table, `sample<YYYY/MM/DD>`.
    pub fn label(&self) -> String {
        format!("sample{}", self.start_date.format("%Y/%m/%d"))
    }

    /// Stable shift identifier, `sample<YYYY/MM/DD>_<work-item>`.
    pub fn shift_id(&self, work_item: &str) -> String {
        format!("{}_{}", self.label(), work_item)
    }
}

/// The typed input model: tasks, their occurrences and the workers.
///
/// Built once by [`crate::input::build_plan`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftPlan {
    /// Rows of the task calendar, in sheet order.
    pub dates: Vec<NaiveDate>,
    /// Task column headers, in sheet order, including dropped tasks.
    pub columns: Vec<String>,
    pub tasks: Vec<Task>,
    pub workers: Vec<Worker>,
    /// All occurrences in task-then-date order.
    pub occurrences: Vec<Occurrence>,
}

impl ShiftPlan {
    /// Creates a plan without tasks. Worker indices are renumbered by position.
    pub fn new(dates: Vec<NaiveDate>, workers: Vec<Worker>) -> Self {
        let workers = workers
            .into_iter()
            .enumerate()
            .map(|(index, worker)| Worker { index, ..worker })
            .collect();
        Self {
            dates,
            columns: Vec::new(),
            tasks: Vec::new(),
            workers,
            occurrences: Vec::new(),
        }
    }

    /// Appends a task column with its (date, work-item) cells.
    ///
    /// The column is always recorded; the task itself is dropped when it has
    /// no cells, in which case `None` is returned.
    pub fn add_task(
        &mut self,
        name: impl Into<String>,
        mut items: Vec<(NaiveDate, String)>,
    ) -> Option<usize> {
        let name = name.into();
        let column = self.columns.len();
        self.columns.push(name.clone());

        items.sort_by_key(|(date, _)| *date);
        let start_date = items.first()?.0;

        let task_idx = self.tasks.len();
        let mut occurrences = Vec::with_capacity(items.len());
        for (date, work_item) in items {
            let index = self.occurrences.len();
            self.occurrences.push(Occurrence {
                index,
                task_idx,
                date,
                work_item,
            });
            occurrences.push(index);
        }

        self.tasks.push(Task {
            index: task_idx,
            name,
            column,
            start_date,
            occurrences,
        });
        Some(task_idx)
    }

    pub fn task_of(&self, occurrence: &Occurrence) -> &Task {
        &self.tasks[occurrence.task_idx]
    }

    /// Workers eligible for an occurrence, in worker order.
    pub fn eligible_workers<'a>(
        &'a self,
        occurrence: &'a Occurrence,
    ) -> impl Iterator<Item = &'a Worker> + 'a {
        self.workers.iter().filter(move |w| w.is_eligible(occurrence))
    }

    pub fn worker_by_name(&self, name: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.name == name)
    }
}

/// A complete assignment: one worker per occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Worker index for each occurrence, indexed like `ShiftPlan.occurrences`.
    assignments: Vec<usize>,
}

impl Solution {
    pub fn new(assignments: Vec<usize>) -> Self {
        Self { assignments }
    }

    pub fn worker_for(&self, occurrence_idx: usize) -> usize {
        self.assignments[occurrence_idx]
    }

    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// WorkloadCount per worker.
    pub fn workloads(&self, worker_count: usize) -> Vec<usize> {
        let mut counts = vec![0; worker_count];
        for &worker_idx in &self.assignments {
            counts[worker_idx] += 1;
        }
        counts
    }

    /// Fairness spread: busiest minus least busy worker.
    pub fn spread(&self, worker_count: usize) -> usize {
        spread_of(&self.workloads(worker_count))
    }
}

/// max − min of a workload vector, 0 when empty.
pub fn spread_of(workloads: &[usize]) -> usize {
    match (workloads.iter().max(), workloads.iter().min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}
