//! End-to-end scenarios through the public pipeline.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use shift_scheduling::config::SchedulerConfig;
use shift_scheduling::constraints::compile;
use shift_scheduling::demo_data::{self, DemoData};
use shift_scheduling::diagnosis::{diagnose, ALL_CLEAR_NOTE, UNDECIDED_NOTE};
use shift_scheduling::domain::{spread_of, ShiftPlan, Solution};
use shift_scheduling::input::{build_plan, RawTable, Workbook};
use shift_scheduling::solver::{run_pipeline, solve, ExactGate, PipelineOutcome, SolverStatus};

const CAP: usize = 5;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, day).unwrap()
}

fn config() -> SchedulerConfig {
    SchedulerConfig::default().with_time_limit(Some(Duration::from_secs(20)))
}

/// Checks coverage, eligibility and the daily cap.
fn assert_valid(plan: &ShiftPlan, solution: &Solution, cap: usize) {
    assert_eq!(solution.assignments().len(), plan.occurrences.len());

    let mut per_day: HashMap<(NaiveDate, usize), usize> = HashMap::new();
    for occurrence in &plan.occurrences {
        let worker = &plan.workers[solution.worker_for(occurrence.index)];
        assert!(
            worker.is_eligible(occurrence),
            "{} is not eligible for {} on {}",
            worker.name,
            occurrence.work_item,
            occurrence.date
        );
        *per_day.entry((occurrence.date, worker.index)).or_default() += 1;
    }
    assert!(per_day.values().all(|&n| n <= cap));
}

/// Smallest spread over every valid assignment, by enumeration.
fn brute_force_spread(plan: &ShiftPlan, cap: usize) -> Option<usize> {
    let workers = plan.workers.len();
    let occurrences = plan.occurrences.len();
    let mut best: Option<usize> = None;
    let mut assignment = vec![0usize; occurrences];

    loop {
        let eligible = plan
            .occurrences
            .iter()
            .all(|o| plan.workers[assignment[o.index]].is_eligible(o));
        if eligible {
            let mut per_day: HashMap<(NaiveDate, usize), usize> = HashMap::new();
            for o in &plan.occurrences {
                *per_day.entry((o.date, assignment[o.index])).or_default() += 1;
            }
            if per_day.values().all(|&n| n <= cap) {
                let mut loads = vec![0usize; workers];
                for &w in &assignment {
                    loads[w] += 1;
                }
                let spread = spread_of(&loads);
                best = Some(best.map_or(spread, |b| b.min(spread)));
            }
        }

        // Next assignment in odometer order.
        let mut pos = 0;
        loop {
            if pos == occurrences {
                return best;
            }
            assignment[pos] += 1;
            if assignment[pos] < workers {
                break;
            }
            assignment[pos] = 0;
            pos += 1;
        }
    }
}

fn open_calendar(dates: &[&str], workers: &[&str]) -> RawTable {
    let mut table = RawTable::new(std::iter::once("date").chain(workers.iter().copied()));
    for d in dates {
        table = table.with_row(std::iter::once(*d).chain(workers.iter().map(|_| "")));
    }
    table
}

#[test]
fn test_scenario_a_two_occurrences_spread_zero() {
    let workbook = Workbook {
        task_schedule: RawTable::new(["date", "Fair"])
            .with_row(["2025-08-07", "Setup"])
            .with_row(["2025-08-08", "Setup"]),
        personal_schedule: open_calendar(&["2025-08-07", "2025-08-08"], &["Amy", "Ben"]),
        staff: RawTable::new(["name", "Setup"])
            .with_row(["Amy", ""])
            .with_row(["Ben", ""]),
    };

    let outcome = run_pipeline(&workbook, &config(), &ExactGate::default()).unwrap();
    let PipelineOutcome::Scheduled(report) = outcome else {
        panic!("expected a schedule");
    };
    assert_eq!(report.status, SolverStatus::Optimal);
    assert_eq!(report.workloads, vec![1, 1]);
    assert_eq!(report.spread, 0);
    assert!(report.task_table.cell("Fair", date(7)).is_some());
    assert!(report.task_table.cell("Fair", date(8)).is_some());
}

#[test]
fn test_scenario_b_no_eligible_worker() {
    let workbook = Workbook {
        task_schedule: RawTable::new(["date", "Fair"]).with_row(["2025-08-07", "Setup"]),
        personal_schedule: RawTable::new(["date", "Amy", "Ben"]).with_row(["2025-08-07", "x", ""]),
        staff: RawTable::new(["name", "Setup"])
            .with_row(["Amy", ""])
            .with_row(["Ben", "x"]),
    };

    let outcome = run_pipeline(&workbook, &config(), &ExactGate::default()).unwrap();
    let PipelineOutcome::Diagnosed { status, diagnosis } = outcome else {
        panic!("expected a diagnosis");
    };
    assert_eq!(status, SolverStatus::Infeasible);
    assert_eq!(diagnosis.unassignable.len(), 1);
    let gap = &diagnosis.unassignable[0];
    assert_eq!(
        (gap.task.as_str(), gap.date, gap.work_item.as_str()),
        ("Fair", date(7), "Setup")
    );
}

#[test]
fn test_scenario_c_daily_cap_is_the_cause() {
    let tasks = ["A", "B", "C", "D", "E", "F"];
    let workbook = Workbook {
        task_schedule: RawTable::new(std::iter::once("date").chain(tasks))
            .with_row(std::iter::once("2025-08-07").chain(tasks.map(|_| "Setup"))),
        personal_schedule: open_calendar(&["2025-08-07"], &["Amy"]),
        staff: RawTable::new(["name", "Setup"]).with_row(["Amy", ""]),
    };

    let config = config().with_daily_cap(CAP);
    let outcome = run_pipeline(&workbook, &config, &ExactGate::default()).unwrap();
    let PipelineOutcome::Diagnosed { status, diagnosis } = outcome else {
        panic!("expected a diagnosis");
    };
    assert_eq!(status, SolverStatus::Infeasible);
    assert!(diagnosis.is_all_clear());
    assert_eq!(diagnosis.note(), ALL_CLEAR_NOTE);
}

#[test]
fn test_scenario_d_worker_missing_from_staff() {
    let workbook = Workbook {
        task_schedule: RawTable::new(["date", "Fair"]).with_row(["2025-08-07", "Setup"]),
        personal_schedule: open_calendar(&["2025-08-07"], &["Amy", "Cat"]),
        staff: RawTable::new(["name", "Setup"]).with_row(["Amy", ""]),
    };

    let plan = build_plan(&workbook, 'x').unwrap();
    let cat = plan.worker_by_name("Cat").unwrap();
    assert!(!cat.is_skilled("Setup"));

    let outcome = run_pipeline(&workbook, &config(), &ExactGate::default()).unwrap();
    let PipelineOutcome::Scheduled(report) = outcome else {
        panic!("expected a schedule");
    };
    assert_eq!(report.task_table.cell("Fair", date(7)), Some("Setup+Amy"));
    assert!(report.worker_schedules[1].is_empty());
}

fn fairness_workbook() -> Workbook {
    Workbook {
        task_schedule: RawTable::new(["date", "Fair", "Market", "Tour"])
            .with_row(["2025-08-07", "Setup", "Setup", ""])
            .with_row(["2025-08-08", "Guide", "Setup", ""])
            .with_row(["2025-08-09", "Cleanup", "", "Guide"]),
        personal_schedule: RawTable::new(["date", "Amy", "Ben", "Cat"])
            .with_row(["2025-08-07", "", "", "x"])
            .with_row(["2025-08-08", "", "", ""])
            .with_row(["2025-08-09", "", "x", ""]),
        staff: RawTable::new(["name", "Setup", "Guide", "Cleanup"])
            .with_row(["Amy", "", "", ""])
            .with_row(["Ben", "", "x", "x"])
            .with_row(["Cat", "x", "", ""]),
    }
}

#[test]
fn test_optimal_spread_matches_brute_force() {
    let plan = build_plan(&fairness_workbook(), 'x').unwrap();

    for cap in [1, 2, CAP] {
        let model = compile(&plan, cap);
        let result = solve(&model, Some(Duration::from_secs(20)), &ExactGate::default());
        let expected = brute_force_spread(&plan, cap);

        match expected {
            Some(best) => {
                assert_eq!(result.status, SolverStatus::Optimal, "cap {}", cap);
                let solution = result.solution.unwrap();
                assert_valid(&plan, &solution, cap);
                assert_eq!(solution.spread(plan.workers.len()), best, "cap {}", cap);
            }
            None => assert_eq!(result.status, SolverStatus::Infeasible, "cap {}", cap),
        }
    }
}

#[test]
fn test_diagnoser_completeness() {
    let mut workbook = fairness_workbook();
    // Nobody can clean up on the 9th.
    workbook.staff = RawTable::new(["name", "Setup", "Guide", "Cleanup"])
        .with_row(["Amy", "", "", "x"])
        .with_row(["Ben", "", "x", "x"])
        .with_row(["Cat", "x", "", "x"]);

    let plan = build_plan(&workbook, 'x').unwrap();
    let diagnosis = diagnose(&plan);

    for occurrence in &plan.occurrences {
        let has_eligible = plan.eligible_workers(occurrence).next().is_some();
        let reported = diagnosis.unassignable.iter().any(|u| {
            u.task == plan.task_of(occurrence).name
                && u.date == occurrence.date
                && u.work_item == occurrence.work_item
        });
        assert_eq!(!has_eligible, reported, "{:?}", occurrence);
    }
    assert_eq!(diagnosis.unassignable.len(), 1);
}

#[test]
fn test_pipeline_is_idempotent() {
    let workbook = fairness_workbook();
    let first = run_pipeline(&workbook, &config(), &ExactGate::default()).unwrap();
    let second = run_pipeline(&workbook, &config(), &ExactGate::default()).unwrap();

    let (PipelineOutcome::Scheduled(a), PipelineOutcome::Scheduled(b)) = (&first, &second) else {
        panic!("expected schedules");
    };
    let mut loads_a = a.workloads.clone();
    let mut loads_b = b.workloads.clone();
    loads_a.sort_unstable();
    loads_b.sort_unstable();
    assert_eq!(loads_a, loads_b);
    assert_eq!(a.status, b.status);
}

#[test]
fn test_demo_workbook_schedules_validly() {
    let workbook = demo_data::generate(DemoData::Small);
    let plan = build_plan(&workbook, 'x').unwrap();
    let model = compile(&plan, CAP);
    let result = solve(&model, Some(Duration::from_secs(10)), &ExactGate::default());

    match result.solution {
        Some(solution) => {
            assert!(result.status.has_solution());
            assert_valid(&plan, &solution, CAP);
        }
        None => assert!(!result.status.has_solution()),
    }
}

/// Amy is the only guide but takes the first Setup, so with a cap of one the
/// greedy pass strands the Guide. Ben on the Setup is a valid schedule.
fn greedy_dead_end_workbook() -> Workbook {
    Workbook {
        task_schedule: RawTable::new(["date", "Fair", "Market"])
            .with_row(["2025-08-07", "Setup", "Guide"]),
        personal_schedule: open_calendar(&["2025-08-07"], &["Amy", "Ben"]),
        staff: RawTable::new(["name", "Setup", "Guide"])
            .with_row(["Amy", "", ""])
            .with_row(["Ben", "", "x"]),
    }
}

#[test]
fn test_busy_solver_without_construction_is_unknown() {
    let workbook = greedy_dead_end_workbook();
    let config = config().with_daily_cap(1);
    let gate = ExactGate::new(1);

    let held = gate.try_acquire().unwrap();
    let outcome = run_pipeline(&workbook, &config, &gate).unwrap();
    let PipelineOutcome::Diagnosed { status, diagnosis } = outcome else {
        panic!("expected a diagnosis");
    };
    assert_eq!(status, SolverStatus::Unknown);
    assert!(diagnosis.is_all_clear());
    assert_eq!(diagnosis.note_for(status), UNDECIDED_NOTE);

    drop(held);
    let outcome = run_pipeline(&workbook, &config, &gate).unwrap();
    let PipelineOutcome::Scheduled(report) = outcome else {
        panic!("expected a schedule");
    };
    assert_eq!(report.status, SolverStatus::Optimal);
    assert_eq!(report.task_table.cell("Fair", date(7)), Some("Setup+Ben"));
    assert_eq!(report.task_table.cell("Market", date(7)), Some("Guide+Amy"));
}

#[test]
fn test_zero_budget_returns_construction_as_feasible() {
    // Greedy gives Amy both the first Setup and the Guide; Cat stays idle.
    let workbook = Workbook {
        task_schedule: RawTable::new(["date", "Fair", "Market", "Tour"])
            .with_row(["2025-08-07", "Setup", "Guide", "Setup"]),
        personal_schedule: open_calendar(&["2025-08-07"], &["Amy", "Ben", "Cat"]),
        staff: RawTable::new(["name", "Setup", "Guide"])
            .with_row(["Amy", "", ""])
            .with_row(["Ben", "", "x"])
            .with_row(["Cat", "", "x"]),
    };
    let plan = build_plan(&workbook, 'x').unwrap();
    let model = compile(&plan, CAP);

    let result = solve(&model, Some(Duration::ZERO), &ExactGate::default());
    assert_eq!(result.status, SolverStatus::Feasible);
    let solution = result.solution.unwrap();
    assert!(model.is_feasible(&solution));
    assert_valid(&plan, &solution, CAP);
    assert_eq!(solution.spread(plan.workers.len()), 2);

    let result = solve(&model, Some(Duration::from_secs(20)), &ExactGate::default());
    assert_eq!(result.status, SolverStatus::Optimal);
    assert_eq!(result.solution.unwrap().spread(plan.workers.len()), 0);
}
