//! Demo workbook generators for Shift Scheduling.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::input::{RawTable, Workbook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn parameters(&self) -> DemoDataParameters {
        match self {
            DemoData::Small => DemoDataParameters {
                tasks: vec!["Summer Fair", "Farmers Market", "Book Swap"],
                days_in_schedule: 14,
                worker_count: 8,
                run_length_distribution: vec![(3, 1.0), (5, 2.0), (7, 1.0)],
                unavailable_count_distribution: vec![(1, 3.0), (2, 2.0), (4, 1.0)],
                incapable_count_distribution: vec![(0, 3.0), (1, 2.0)],
            },
            DemoData::Large => DemoDataParameters {
                tasks: vec![
                    "Summer Fair",
                    "Farmers Market",
                    "Book Swap",
                    "Harbour Tour",
                    "Night Concert",
                    "Craft Workshop",
                    "Food Festival",
                ],
                days_in_schedule: 28,
                worker_count: 30,
                run_length_distribution: vec![(5, 1.0), (10, 2.0), (14, 1.0)],
                unavailable_count_distribution: vec![(2, 3.0), (5, 2.0), (8, 1.0)],
                incapable_count_distribution: vec![(0, 2.0), (1, 2.0), (2, 1.0)],
            },
        }
    }
}

struct DemoDataParameters {
    tasks: Vec<&'static str>,
    days_in_schedule: i64,
    worker_count: usize,
    /// Consecutive days a task runs for.
    run_length_distribution: Vec<(usize, f64)>,
    unavailable_count_distribution: Vec<(usize, f64)>,
    incapable_count_distribution: Vec<(usize, f64)>,
}

/// Work items a task day may require.
const WORK_ITEMS: &[&str] = &["Setup", "Reception", "Guide", "Cleanup"];

/// Cell value marking a day off or a missing skill.
const MARKER: &str = "x";

/// List of available demo data sets.
pub fn list_demo_data() -> Vec<&'static str> {
    vec!["SMALL", "LARGE"]
}

/// Generates a demo workbook for the given size.
pub fn generate(demo: DemoData) -> Workbook {
    let params = demo.parameters();
    let mut rng = StdRng::seed_from_u64(0);

    let start_date = find_next_monday(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap());
    let dates: Vec<NaiveDate> = (0..params.days_in_schedule)
        .map(|day| start_date + Duration::days(day))
        .collect();

    // Task calendar: each task runs on a window of days, one work item per day
    let mut task_schedule = RawTable::new(
        std::iter::once("date").chain(params.tasks.iter().copied()),
    );
    let mut task_cells: Vec<Vec<Option<String>>> =
        vec![vec![None; params.tasks.len()]; dates.len()];
    for col in 0..params.tasks.len() {
        let run_length = pick_count(&mut rng, &params.run_length_distribution).min(dates.len());
        let first_day = rng.gen_range(0..=dates.len() - run_length);
        for cells in task_cells.iter_mut().skip(first_day).take(run_length) {
            cells[col] = WORK_ITEMS.choose(&mut rng).map(|w| w.to_string());
        }
    }
    for (date, cells) in dates.iter().zip(task_cells) {
        let mut row = vec![Some(date_cell(*date))];
        row.extend(cells);
        task_schedule.rows.push(row);
    }

    // Worker names (FIRST × LAST)
    let name_permutations = generate_name_permutations(&mut rng);
    let names: Vec<String> = (0..params.worker_count)
        .map(|i| name_permutations[i % name_permutations.len()].clone())
        .collect();

    // Availability calendar
    let mut off_days: Vec<Vec<bool>> = vec![vec![false; names.len()]; dates.len()];
    for worker in 0..names.len() {
        let count = pick_count(&mut rng, &params.unavailable_count_distribution).min(dates.len());
        for day in rand::seq::index::sample(&mut rng, dates.len(), count).into_vec() {
            off_days[day][worker] = true;
        }
    }
    let mut personal_schedule =
        RawTable::new(std::iter::once("date").chain(names.iter().map(String::as_str)));
    for (date, off) in dates.iter().zip(off_days) {
        let mut row = vec![Some(date_cell(*date))];
        row.extend(off.into_iter().map(marker_cell));
        personal_schedule.rows.push(row);
    }

    // Skill matrix; everybody keeps at least one work item
    let mut staff = RawTable::new(std::iter::once("name").chain(WORK_ITEMS.iter().copied()));
    for name in &names {
        let count = pick_count(&mut rng, &params.incapable_count_distribution)
            .min(WORK_ITEMS.len() - 1);
        let incapable = rand::seq::index::sample(&mut rng, WORK_ITEMS.len(), count).into_vec();
        let mut row = vec![Some(name.clone())];
        row.extend((0..WORK_ITEMS.len()).map(|i| marker_cell(incapable.contains(&i))));
        staff.rows.push(row);
    }

    Workbook {
        task_schedule,
        personal_schedule,
        staff,
    }
}

fn date_cell(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

fn marker_cell(marked: bool) -> Option<String> {
    marked.then(|| MARKER.to_string())
}

fn find_next_monday(date: NaiveDate) -> NaiveDate {
    let days_until_monday = match date.weekday() {
        Weekday::Mon => 0,
        Weekday::Tue => 6,
        Weekday::Wed => 5,
        Weekday::Thu => 4,
        Weekday::Fri => 3,
        Weekday::Sat => 2,
        Weekday::Sun => 1,
    };
    date + Duration::days(days_until_monday)
}

/// Pick a count based on weighted distribution.
fn pick_count(rng: &mut StdRng, distribution: &[(usize, f64)]) -> usize {
    let total_weight: f64 = distribution.iter().map(|(_, w)| w).sum();
    let mut choice = rng.gen::<f64>() * total_weight;

    for (count, weight) in distribution {
        if choice < *weight {
            return *count;
        }
        choice -= weight;
    }
    distribution.last().map(|(c, _)| *c).unwrap_or(1)
}

const FIRST_NAMES: &[&str] = &[
    "Amy", "Beth", "Carl", "Dan", "Elsa", "Flo", "Gus", "Hugo", "Ivy", "Jay",
];
const LAST_NAMES: &[&str] = &[
    "Cole", "Fox", "Green", "Jones", "King", "Li", "Poe", "Rye", "Smith", "Watt",
];

fn generate_name_permutations(rng: &mut StdRng) -> Vec<String> {
    let mut names = Vec::with_capacity(FIRST_NAMES.len() * LAST_NAMES.len());
    for first in FIRST_NAMES {
        for last in LAST_NAMES {
            names.push(format!("{} {}", first, last));
        }
    }
    names.shuffle(rng);
    names
}
