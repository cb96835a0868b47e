//! Benchmark for model compilation and solving.
//!
//! Run with: cargo run --release --bin bench

use shift_scheduling::config::SchedulerConfig;
use shift_scheduling::{constraints, demo_data, input, solver};
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = SchedulerConfig::default();
    let workbook = demo_data::generate(demo_data::DemoData::Large);

    let build_start = Instant::now();
    let plan = input::build_plan(&workbook, config.marker())?;
    let build_time = build_start.elapsed();

    println!("Benchmark: Compile + Solve");
    println!("  Tasks: {}", plan.tasks.len());
    println!("  Occurrences: {}", plan.occurrences.len());
    println!("  Workers: {}", plan.workers.len());
    println!("  Build: {:.2?}", build_time);
    println!();

    let compile_start = Instant::now();
    let model = constraints::compile(&plan, config.daily_cap);
    let compile_time = compile_start.elapsed();
    println!("Model:");
    println!("  Variables: {}", model.var_count());
    println!("  Constraints: {}", model.constraint_count());
    println!("  Compile: {:.2?}", compile_time);
    println!();

    let gate = solver::ExactGate::new(config.max_exact_solves);
    let result = solver::solve(&model, config.time_limit(), &gate);

    println!("Results:");
    println!("  Status: {}", result.status.as_str());
    println!("  Time: {:.2?}", result.duration);
    if let Some(solution) = &result.solution {
        assert!(model.is_feasible(solution), "Solution violates the model!");
        println!("  Spread: {} (verified)", solution.spread(model.worker_count));
    }
    Ok(())
}
