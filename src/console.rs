//! Colorful console output for solver runs.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::time::{Duration, Instant};

/// Banner for server startup.
pub fn print_banner() {
    let banner = r#"
  ____  _     _  __ _
 / ___|| |__ (_)/ _| |_ ___
 \___ \| '_ \| | |_| __/ __|
  ___) | | | | |  _| |_\__ \
 |____/|_| |_|_|_|  \__|___/
"#;
    println!("{}", banner.cyan().bold());
    println!(
        "  {} {}\n",
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black(),
        "Shift Scheduling".bright_cyan()
    );
}

/// Prints the problem scale after compilation.
pub fn print_model(occurrences: usize, workers: usize, variables: usize, constraints: usize) {
    println!(
        "{} {} {} occurrences ({}), workers ({}), variables ({}), constraints ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Solver]".bright_cyan(),
        occurrences.to_formatted_string(&Locale::en).bright_yellow(),
        workers.to_formatted_string(&Locale::en).bright_yellow(),
        variables.to_formatted_string(&Locale::en).bright_yellow(),
        constraints.to_formatted_string(&Locale::en).bright_yellow()
    );
}

/// Prints a phase start message.
pub fn print_phase_start(phase_name: &str, phase_index: usize) {
    println!(
        "{} {} {} {} phase ({}) started",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", phase_name).bright_cyan(),
        phase_name.white().bold(),
        phase_index.to_string().yellow()
    );
}

/// Prints a phase end message.
pub fn print_phase_end(phase_name: &str, phase_index: usize, duration: Duration, result: &str) {
    println!(
        "{} {} {} {} phase ({}) ended: time spent ({}), result ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        format!("[{}]", phase_name).bright_cyan(),
        phase_name.white().bold(),
        phase_index.to_string().yellow(),
        format_duration(duration).yellow(),
        result.white()
    );
}

/// Prints the solver summary box.
pub fn print_solving_ended(total_duration: Duration, status: &str, spread: Option<usize>) {
    println!(
        "{} {} {} Solving ended: time spent ({}), status ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Solver]".bright_cyan(),
        format_duration(total_duration).yellow(),
        status.white().bold()
    );

    // 60 chars wide, 56 char content area
    println!();
    println!("{}", "╔══════════════════════════════════════════════════════════╗".bright_cyan());

    let status_text = match spread {
        Some(_) => format!("✓ {} SCHEDULE FOUND", status),
        None => format!("✗ {} (see diagnosis)", status),
    };
    let status_colored = if spread.is_some() {
        status_text.bright_green().bold().to_string()
    } else {
        status_text.bright_red().bold().to_string()
    };
    let status_padding = 56usize.saturating_sub(status_text.chars().count());
    let left_pad = status_padding / 2;
    let right_pad = status_padding - left_pad;
    println!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    );

    println!("{}", "╠══════════════════════════════════════════════════════════╣".bright_cyan());

    let spread_str = spread.map_or_else(|| "-".to_string(), |s| s.to_string());
    println!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Workload Spread:",
        spread_str,
        "║".bright_cyan()
    );

    let time_str = format!("{:.2}s", total_duration.as_secs_f64());
    println!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Solving Time:",
        time_str,
        "║".bright_cyan()
    );

    println!("{}", "╚══════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

/// Formats a duration nicely.
fn format_duration(d: Duration) -> String {
    let total_ms = d.as_millis();
    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        let mins = total_ms / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Returns a timestamp string.
fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| format!("{}.{:03}", d.as_secs(), d.subsec_millis()))
        .unwrap_or_else(|_| "0.000".to_string())
}

/// A timer for a solver phase.
pub struct PhaseTimer {
    start: Instant,
    phase_name: String,
    phase_index: usize,
}

impl PhaseTimer {
    pub fn start(phase_name: impl Into<String>, phase_index: usize) -> Self {
        let name = phase_name.into();
        print_phase_start(&name, phase_index);
        Self {
            start: Instant::now(),
            phase_name: name,
            phase_index,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self, result: &str) {
        print_phase_end(&self.phase_name, self.phase_index, self.elapsed(), result);
    }
}
