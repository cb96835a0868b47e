//! DTOs for REST API requests/responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::diagnosis::{Diagnosis, UnassignableOccurrence};
use crate::input::{RawTable, Workbook};
use crate::schedule::{self, ScheduleReport};
use crate::solver::{PipelineOutcome, SolverStatus};

// ============================================================================
// Workbook input
// ============================================================================

/// A spreadsheet cell as it arrives over JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellDto {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl CellDto {
    /// Cell text; `None` for null and blank strings.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellDto::Text(s) if s.trim().is_empty() => None,
            CellDto::Text(s) => Some(s.clone()),
            CellDto::Number(n) => Some(n.to_string()),
            CellDto::Bool(b) => Some(b.to_string()),
            CellDto::Null => None,
        }
    }
}

impl From<Option<&str>> for CellDto {
    fn from(cell: Option<&str>) -> Self {
        match cell {
            Some(text) => CellDto::Text(text.to_string()),
            None => CellDto::Null,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDto {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<CellDto>>,
}

impl From<&TableDto> for RawTable {
    fn from(dto: &TableDto) -> Self {
        RawTable {
            columns: dto.columns.clone(),
            rows: dto
                .rows
                .iter()
                .map(|row| row.iter().map(CellDto::to_text).collect())
                .collect(),
        }
    }
}

impl From<&RawTable> for TableDto {
    fn from(table: &RawTable) -> Self {
        TableDto {
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .map(|row| row.iter().map(|c| CellDto::from(c.as_deref())).collect())
                .collect(),
        }
    }
}

/// The three uploaded sheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookDto {
    pub task_schedule: TableDto,
    pub personal_schedule: TableDto,
    pub staff: TableDto,
}

impl WorkbookDto {
    pub fn to_domain(&self) -> Workbook {
        Workbook {
            task_schedule: RawTable::from(&self.task_schedule),
            personal_schedule: RawTable::from(&self.personal_schedule),
            staff: RawTable::from(&self.staff),
        }
    }
}

impl From<&Workbook> for WorkbookDto {
    fn from(workbook: &Workbook) -> Self {
        WorkbookDto {
            task_schedule: TableDto::from(&workbook.task_schedule),
            personal_schedule: TableDto::from(&workbook.personal_schedule),
            staff: TableDto::from(&workbook.staff),
        }
    }
}

// ============================================================================
// Schedule output
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskColumnDto {
    pub task: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRowDto {
    pub date: NaiveDate,
    pub date_label: String,
    pub cells: Vec<Option<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTableDto {
    pub columns: Vec<TaskColumnDto>,
    pub rows: Vec<TaskRowDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDto {
    pub date: NaiveDate,
    pub date_label: String,
    pub shift_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerScheduleDto {
    pub worker: String,
    pub workload: usize,
    pub shifts: Vec<ShiftDto>,
}

/// Both schedule views of a solved run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDto {
    pub solver_status: SolverStatus,
    pub spread: usize,
    pub task_table: TaskTableDto,
    pub worker_schedules: Vec<WorkerScheduleDto>,
}

impl From<&ScheduleReport> for ScheduleDto {
    fn from(report: &ScheduleReport) -> Self {
        let task_table = TaskTableDto {
            columns: report
                .task_table
                .columns
                .iter()
                .map(|c| TaskColumnDto {
                    task: c.task.clone(),
                    label: c.label.clone(),
                })
                .collect(),
            rows: report
                .task_table
                .rows
                .iter()
                .map(|r| TaskRowDto {
                    date: r.date,
                    date_label: schedule::display_date(r.date),
                    cells: r.cells.clone(),
                })
                .collect(),
        };

        let worker_schedules = report
            .worker_schedules
            .iter()
            .zip(&report.workloads)
            .map(|(ws, &workload)| WorkerScheduleDto {
                worker: ws.worker.clone(),
                workload,
                shifts: ws
                    .shifts
                    .iter()
                    .map(|s| ShiftDto {
                        date: s.date,
                        date_label: schedule::display_date(s.date),
                        shift_id: s.shift_id.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            solver_status: report.status,
            spread: report.spread,
            task_table,
            worker_schedules,
        }
    }
}

// ============================================================================
// Diagnosis output
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnassignableDto {
    pub task: String,
    pub date: NaiveDate,
    pub date_label: String,
    pub work_item: String,
}

impl From<&UnassignableOccurrence> for UnassignableDto {
    fn from(u: &UnassignableOccurrence) -> Self {
        Self {
            task: u.task.clone(),
            date: u.date,
            date_label: schedule::display_date(u.date),
            work_item: u.work_item.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisDto {
    pub all_clear: bool,
    pub note: &'static str,
    pub unassignable: Vec<UnassignableDto>,
}

impl From<&Diagnosis> for DiagnosisDto {
    fn from(d: &Diagnosis) -> Self {
        Self {
            all_clear: d.is_all_clear(),
            note: d.note(),
            unassignable: d.unassignable.iter().map(UnassignableDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosedDto {
    pub solver_status: SolverStatus,
    pub diagnosis: DiagnosisDto,
}

/// Response of `POST /schedules`, tagged by `outcome`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeDto {
    Scheduled(ScheduleDto),
    Diagnosed(DiagnosedDto),
}

impl From<&PipelineOutcome> for OutcomeDto {
    fn from(outcome: &PipelineOutcome) -> Self {
        match outcome {
            PipelineOutcome::Scheduled(report) => OutcomeDto::Scheduled(report.into()),
            PipelineOutcome::Diagnosed { status, diagnosis } => {
                let mut dto = DiagnosisDto::from(diagnosis);
                dto.note = diagnosis.note_for(*status);
                OutcomeDto::Diagnosed(DiagnosedDto {
                    solver_status: *status,
                    diagnosis: dto,
                })
            }
        }
    }
}

// ============================================================================
// Health, info, errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub solver_engine: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
