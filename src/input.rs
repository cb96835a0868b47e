//! Input model builder: raw calendar tables to a typed [`ShiftPlan`].
//!
//! Three tables come in from the file-ingestion side:
//!
//! - `task_schedule`: rows keyed by date, one column per task, a cell holds
//!   the work-item label required that day (empty = nothing required).
//! - `personal_schedule`: rows keyed by date, one column per worker, a cell
//!   holding the reserved marker means unavailable.
//! - `staff`: one row per worker (name first), one column per work-item
//!   label, a cell holding the reserved marker means incapable.
//!
//! Cells are interpreted here exactly once. Downstream code only sees the
//! typed predicates on [`Worker`].

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::domain::{ShiftPlan, Worker};
use crate::error::DataFormatError;

pub const TASK_SCHEDULE: &str = "task_schedule";
pub const PERSONAL_SCHEDULE: &str = "personal_schedule";
pub const STAFF: &str = "staff";

/// A sheet as handed over by the ingestion side.
///
/// `columns[0]` is the key column (dates or worker names); its header is
/// ignored. Every row must have exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row; empty strings become empty cells.
    pub fn with_row<'a>(mut self, cells: impl IntoIterator<Item = &'a str>) -> Self {
        self.rows.push(
            cells
                .into_iter()
                .map(|c| (!c.is_empty()).then(|| c.to_string()))
                .collect(),
        );
        self
    }
}

/// The three tables of one uploaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workbook {
    pub task_schedule: RawTable,
    pub personal_schedule: RawTable,
    pub staff: RawTable,
}

/// An availability or skill cell after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Blank or any value other than the marker.
    Open,
    /// The reserved marker.
    Blocked,
}

impl Mark {
    pub fn parse(cell: Option<&str>, marker: char) -> Self {
        let Some(text) = cell.map(str::trim) else {
            return Mark::Open;
        };
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.to_lowercase().eq(marker.to_lowercase()) => Mark::Blocked,
            _ => Mark::Open,
        }
    }

    pub fn is_open(self) -> bool {
        self == Mark::Open
    }
}

/// Builds the typed plan, failing on the first malformed table.
pub fn build_plan(workbook: &Workbook, marker: char) -> Result<ShiftPlan, DataFormatError> {
    let tasks = KeyedTable::read(TASK_SCHEDULE, &workbook.task_schedule)?;
    let personal = KeyedTable::read(PERSONAL_SCHEDULE, &workbook.personal_schedule)?;
    let staff = KeyedTable::read(STAFF, &workbook.staff)?;

    let task_dates = tasks.dates()?;
    let personal_dates = personal.dates()?;

    let mut skills_by_name: HashMap<&str, HashSet<String>> = HashMap::new();
    for (name, cells) in staff.keys.iter().zip(&staff.body) {
        let skills = staff
            .headers
            .iter()
            .zip(cells.iter())
            .filter(|(_, cell)| Mark::parse(cell.as_deref(), marker).is_open())
            .map(|(label, _)| label.to_string())
            .collect();
        if skills_by_name.insert(*name, skills).is_some() {
            return Err(DataFormatError::DuplicateRow {
                table: STAFF,
                key: name.to_string(),
            });
        }
    }

    let mut workers = Vec::with_capacity(personal.headers.len());
    for (col, name) in personal.headers.iter().enumerate() {
        let available = personal_dates
            .iter()
            .zip(&personal.body)
            .filter(|(_, cells)| Mark::parse(cells[col].as_deref(), marker).is_open())
            .map(|(date, _)| *date);

        let mut worker = Worker::new(col, *name).with_available_dates(available);
        match skills_by_name.remove(name) {
            Some(skills) => worker.skills = skills,
            None => warn!(worker = %name, "Worker has no staff row, treated as incapable"),
        }
        workers.push(worker);
    }
    for name in skills_by_name.keys() {
        debug!(worker = %name, "Staff row without availability column ignored");
    }

    let known_dates: HashSet<NaiveDate> = personal_dates.iter().copied().collect();
    for date in task_dates.iter().filter(|d| !known_dates.contains(d)) {
        warn!(%date, "Date missing from personal schedule, everyone unavailable");
    }

    let mut plan = ShiftPlan::new(task_dates.clone(), workers);
    for (col, name) in tasks.headers.iter().enumerate() {
        let items: Vec<(NaiveDate, String)> = task_dates
            .iter()
            .zip(&tasks.body)
            .filter_map(|(date, cells)| cell_text(&cells[col]).map(|w| (*date, w.to_string())))
            .collect();
        if plan.add_task(*name, items).is_none() {
            debug!(task = %name, "Task has no occurrences, dropped");
        }
    }

    debug!(
        tasks = plan.tasks.len(),
        occurrences = plan.occurrences.len(),
        workers = plan.workers.len(),
        "Built shift plan"
    );
    Ok(plan)
}

/// Parses a date cell.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYY.MM.DD`, `YYYYMMDD`, the same
/// with a time part (dropped), RFC 3339 timestamps and Excel serial day
/// numbers.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];

    let value = value.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
    {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }
    excel_serial_date(value)
}

/// Excel serial day number (1900 date system, 1 = 1900-01-01).
///
/// Excel counts a 1900-02-29 that never existed as serial 60. That serial is
/// rejected, and serials after it are shifted back by one day.
fn excel_serial_date(value: &str) -> Option<NaiveDate> {
    const MAX_SERIAL: f64 = 2_958_465.0; // 9999-12-31
    const LEAP_BUG: u64 = 60;

    let serial: f64 = value.parse().ok()?;
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let day = serial.floor() as u64;
    let epoch = match day.cmp(&LEAP_BUG) {
        Ordering::Less => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        Ordering::Equal => return None,
        Ordering::Greater => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    epoch.checked_add_days(Days::new(day))
}

fn cell_text(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// A validated table: unique non-empty headers, rectangular rows, unique keys.
struct KeyedTable<'a> {
    name: &'static str,
    headers: Vec<&'a str>,
    keys: Vec<&'a str>,
    body: Vec<&'a [Option<String>]>,
}

impl<'a> KeyedTable<'a> {
    fn read(name: &'static str, table: &'a RawTable) -> Result<Self, DataFormatError> {
        if table.columns.is_empty() {
            return Err(DataFormatError::MissingKeyColumn { table: name });
        }

        let mut seen = HashSet::new();
        let mut headers = Vec::with_capacity(table.columns.len() - 1);
        for (column, header) in table.columns.iter().enumerate().skip(1) {
            let header = header.trim();
            if header.is_empty() {
                return Err(DataFormatError::EmptyHeader { table: name, column });
            }
            if !seen.insert(header) {
                return Err(DataFormatError::DuplicateColumn {
                    table: name,
                    name: header.to_string(),
                });
            }
            headers.push(header);
        }

        let mut keys = Vec::with_capacity(table.rows.len());
        let mut body = Vec::with_capacity(table.rows.len());
        for (i, cells) in table.rows.iter().enumerate() {
            let row = i + 1;
            if cells.len() != table.columns.len() {
                return Err(DataFormatError::RaggedRow {
                    table: name,
                    row,
                    expected: table.columns.len(),
                    found: cells.len(),
                });
            }
            let key = cell_text(&cells[0]).ok_or(DataFormatError::EmptyKey { table: name, row })?;
            keys.push(key);
            body.push(&cells[1..]);
        }

        Ok(Self {
            name,
            headers,
            keys,
            body,
        })
    }

    /// Parses the key column as dates, rejecting duplicates.
    fn dates(&self) -> Result<Vec<NaiveDate>, DataFormatError> {
        let mut seen = HashSet::new();
        let mut dates = Vec::with_capacity(self.keys.len());
        for (i, key) in self.keys.iter().enumerate() {
            let date = parse_date(key).ok_or_else(|| DataFormatError::MalformedDate {
                table: self.name,
                row: i + 1,
                value: key.to_string(),
            })?;
            if !seen.insert(date) {
                return Err(DataFormatError::DuplicateRow {
                    table: self.name,
                    key: key.to_string(),
                });
            }
            dates.push(date);
        }
        Ok(dates)
    }
}
