//! Error types for shift scheduling.
//!
//! Only malformed input and bad configuration are errors. An infeasible or
//! undecided solve is a regular outcome, see [`crate::solver::SolverStatus`].

use thiserror::Error;

/// Input tables that cannot be turned into a [`ShiftPlan`](crate::domain::ShiftPlan).
///
/// Every variant names the table it was raised for (`task_schedule`,
/// `personal_schedule` or `staff`). The first problem aborts the whole build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataFormatError {
    /// The table has no key column (dates or worker names).
    #[error("{table}: table has no key column")]
    MissingKeyColumn { table: &'static str },

    /// A non-key column header is blank.
    #[error("{table}: column {column} has an empty header")]
    EmptyHeader { table: &'static str, column: usize },

    /// The same header appears twice (task, worker or skill collision).
    #[error("{table}: duplicate column '{name}'")]
    DuplicateColumn { table: &'static str, name: String },

    /// The same date or worker appears on two rows.
    #[error("{table}: duplicate row '{key}'")]
    DuplicateRow { table: &'static str, key: String },

    /// A row has a different number of cells than the header.
    #[error("{table}: row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        table: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A date cell could not be parsed.
    #[error("{table}: row {row} has malformed date '{value}'")]
    MalformedDate {
        table: &'static str,
        row: usize,
        value: String,
    },

    /// A key cell (date or worker name) is empty.
    #[error("{table}: row {row} has an empty key cell")]
    EmptyKey { table: &'static str, row: usize },
}

/// Configuration that could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
