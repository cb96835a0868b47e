//! Shift Scheduling
//!
//! Assigns one worker to every (task, date, work-item) occurrence of an event
//! calendar, so that each worker is available and skilled for what they get,
//! nobody exceeds the daily cap, and workloads are as even as possible.
//!
//! # Pipeline
//!
//! - [`input`]: raw calendar tables to a typed [`ShiftPlan`](domain::ShiftPlan)
//! - [`constraints`]: the plan compiled to an [`AssignmentModel`](constraints::AssignmentModel)
//! - [`solver`]: construction heuristic, then an exact MILP under a time limit
//! - [`schedule`]: task-centric and worker-centric views of a solution
//! - [`diagnosis`]: occurrences nobody can cover, when no solution exists
//!
//! # Constraints
//!
//! - **Coverage** (hard): exactly one worker per occurrence
//! - **Eligibility** (hard): worker available on the date and skilled in the work item
//! - **Daily cap** (hard): at most `daily_cap` occurrences per worker per date
//! - **Fairness** (objective): minimise max − min workload

pub mod api;
pub mod config;
#[cfg(feature = "console")]
pub mod console;
pub mod constraints;
pub mod demo_data;
pub mod diagnosis;
pub mod domain;
pub mod dto;
pub mod error;
pub mod input;
pub mod schedule;
pub mod solver;
