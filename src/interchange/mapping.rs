//! Project ⇄ CSV row mapping

use crate::core::dates::{format_datetime, parse_datetime};
use crate::core::error::{FieldValidationError, RowError};
use crate::entities::{NewProject, Project, ProjectStatus};
use crate::interchange::codec::{CsvRow, write_record};
use chrono::{DateTime, Utc};
use validator::Validate;

pub const TITLE: &str = "Title";
pub const DESCRIPTION: &str = "Description";
pub const STATUS: &str = "Status";
pub const START_DATE: &str = "Start Date";
pub const END_DATE: &str = "End Date";
pub const CREATED_BY: &str = "Created By";
pub const CREATED_AT: &str = "Created At";
pub const UPDATED_AT: &str = "Updated At";

/// Export column order
pub const EXPORT_HEADERS: [&str; 8] = [
    TITLE,
    DESCRIPTION,
    STATUS,
    START_DATE,
    END_DATE,
    CREATED_BY,
    CREATED_AT,
    UPDATED_AT,
];

/// Render projects as a complete CSV document, header included
pub fn projects_to_csv(projects: &[Project]) -> String {
    let mut out = String::new();
    write_record(&mut out, &EXPORT_HEADERS);
    for project in projects {
        write_record(&mut out, &project_to_row(project));
    }
    out
}

pub fn project_to_row(project: &Project) -> [String; 8] {
    [
        project.title.clone(),
        project.description.clone(),
        project.status.label().to_string(),
        format_datetime(&project.start_date),
        project.end_date.as_ref().map(format_datetime).unwrap_or_default(),
        project.owner_id.to_string(),
        format_datetime(&project.created_at),
        format_datetime(&project.updated_at),
    ]
}

/// Turn one data row into a project candidate.
///
/// `Created By`, `Created At` and `Updated At` are ignored: the importing
/// caller owns the new records and the timestamps are fresh. An empty
/// status defaults to Not Started, an empty start date to `now`, an empty
/// end date to none.
pub fn row_to_candidate(
    row_number: usize,
    row: &CsvRow<'_>,
    now: DateTime<Utc>,
) -> Result<NewProject, RowError> {
    let mut errors = Vec::new();

    let status = match row.get(STATUS) {
        "" => ProjectStatus::default(),
        raw => raw.parse().unwrap_or_else(|e: String| {
            errors.push(FieldValidationError::new(STATUS, e));
            ProjectStatus::default()
        }),
    };

    let start_date = match row.get(START_DATE) {
        "" => now,
        raw => parse_datetime(raw).unwrap_or_else(|| {
            errors.push(FieldValidationError::new(
                START_DATE,
                format!("invalid date '{}'", raw),
            ));
            now
        }),
    };

    let end_date = match row.get(END_DATE) {
        "" => None,
        raw => {
            let parsed = parse_datetime(raw);
            if parsed.is_none() {
                errors.push(FieldValidationError::new(
                    END_DATE,
                    format!("invalid date '{}'", raw),
                ));
            }
            parsed
        }
    };

    let candidate = NewProject {
        title: row.get(TITLE).to_string(),
        description: row.get(DESCRIPTION).to_string(),
        status,
        start_date,
        end_date,
    };

    if errors.is_empty()
        && let Err(validation) = candidate.validate()
    {
        errors.extend(label_errors(validation));
    }

    if errors.is_empty() {
        Ok(candidate)
    } else {
        Err(RowError {
            row: row_number,
            errors,
        })
    }
}

/// Report validator failures under the CSV column labels
fn label_errors(errors: validator::ValidationErrors) -> Vec<FieldValidationError> {
    let mut labelled: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let label = match field.as_ref() {
                "title" => TITLE,
                "description" => DESCRIPTION,
                _ => END_DATE,
            };
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldValidationError::new(label, message)
            })
        })
        .collect();
    labelled.sort_by(|a, b| a.field.cmp(&b.field));
    labelled
}
