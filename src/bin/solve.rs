//! Solves one JSON workbook and prints the result.
//!
//! Run with: cargo run --bin solve -- path/to/workbook.json

use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use shift_scheduling::config::SchedulerConfig;
use shift_scheduling::dto::WorkbookDto;
use shift_scheduling::schedule::display_date;
use shift_scheduling::solver::{self, ExactGate, PipelineOutcome};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("shift_scheduling=info".parse()?),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: solve <workbook.json>")?;
    let dto: WorkbookDto = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let config = SchedulerConfig::from_env()?;

    let gate = ExactGate::new(config.max_exact_solves);
    let outcome = solver::run_pipeline(&dto.to_domain(), &config, &gate)?;

    match outcome {
        PipelineOutcome::Scheduled(report) => {
            println!("Status: {}  Spread: {}", report.status.as_str(), report.spread);
            println!();

            let table = &report.task_table;
            let labels: Vec<&str> = table.columns.iter().map(|c| c.label.as_str()).collect();
            println!("{:<18}{}", "", labels.join(" | "));
            for row in &table.rows {
                let cells: Vec<&str> =
                    row.cells.iter().map(|c| c.as_deref().unwrap_or("")).collect();
                println!("{:<18}{}", display_date(row.date), cells.join(" | "));
            }
            println!();

            for (schedule, workload) in report.worker_schedules.iter().zip(&report.workloads) {
                println!("{} ({})", schedule.worker, workload);
                if schedule.is_empty() {
                    println!("  no schedule");
                }
                for shift in &schedule.shifts {
                    println!("  {}  {}", display_date(shift.date), shift.shift_id);
                }
            }
        }
        PipelineOutcome::Diagnosed { status, diagnosis } => {
            println!("Status: {}", status.as_str());
            println!("{}", diagnosis.note_for(status));
            for gap in &diagnosis.unassignable {
                println!("  {}  {}  {}", gap.task, display_date(gap.date), gap.work_item);
            }
        }
    }
    Ok(())
}
