//! Project records and their request shapes

use crate::core::dates::parse_datetime;
use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::{Entity, Patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Project progress. Any value may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::NotStarted,
        ProjectStatus::InProgress,
        ProjectStatus::Completed,
    ];

    /// The label used in JSON and CSV
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProjectStatus {
    type Err = String;

    /// Matches labels case-insensitively, ignoring surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown status '{}'", wanted))
    }
}

/// A project owned by one caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Project {
    fn resource_name() -> &'static str {
        "projects"
    }

    fn resource_name_singular() -> &'static str {
        "project"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Validated input for a new project, from JSON or a CSV row
#[derive(Debug, Clone, PartialEq, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct NewProject {
    #[validate(length(min = 1, message = "Please add a project title"))]
    pub title: String,
    #[validate(length(min = 1, message = "Please add a project description"))]
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

fn validate_date_range(project: &NewProject) -> Result<(), validator::ValidationError> {
    check_date_range(&project.start_date, project.end_date.as_ref())
}

fn check_date_range(
    start: &DateTime<Utc>,
    end: Option<&DateTime<Utc>>,
) -> Result<(), validator::ValidationError> {
    match end {
        Some(end) if end < start => Err(validator::ValidationError::new("date_range")
            .with_message("End date must not be before start date".into())),
        _ => Ok(()),
    }
}

impl NewProject {
    /// Build the stored record, stamping the owner and timestamps
    pub fn into_project(self, owner_id: Uuid, now: DateTime<Utc>) -> Project {
        Project {
            id: Uuid::new_v4(),
            title: self.title,
            description: self.description,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Body of `POST /api/projects`
///
/// Unknown fields (including `owner_id`) are ignored; ownership always comes
/// from the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(required(message = "Please add a project title"))]
    pub title: Option<String>,
    #[validate(required(message = "Please add a project description"))]
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    #[serde(alias = "startDate")]
    #[validate(required(message = "Please add a start date"))]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

impl TryFrom<CreateProjectRequest> for NewProject {
    type Error = ValidationError;

    fn try_from(req: CreateProjectRequest) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let start_date = match req.start_date.as_deref().map(parse_datetime) {
            Some(Some(date)) => Some(date),
            Some(None) => {
                errors.push(FieldValidationError::new("start_date", "Invalid date"));
                None
            }
            None => {
                errors.push(FieldValidationError::new(
                    "start_date",
                    "Please add a start date",
                ));
                None
            }
        };

        let end_date = match req.end_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let parsed = parse_datetime(raw);
                if parsed.is_none() {
                    errors.push(FieldValidationError::new("end_date", "Invalid date"));
                }
                parsed
            }
        };

        match (req.title, req.description, start_date) {
            (Some(title), Some(description), Some(start_date)) if errors.is_empty() => {
                Ok(NewProject {
                    title: title.trim().to_string(),
                    description: description.trim().to_string(),
                    status: req.status.unwrap_or_default(),
                    start_date,
                    end_date,
                })
            }
            (title, description, _) => {
                if title.is_none() {
                    errors.push(FieldValidationError::new(
                        "title",
                        "Please add a project title",
                    ));
                }
                if description.is_none() {
                    errors.push(FieldValidationError::new(
                        "description",
                        "Please add a project description",
                    ));
                }
                Err(ValidationError::FieldErrors(errors))
            }
        }
    }
}

/// Body of `PUT /api/projects/{id}`
///
/// Omitted fields are left unchanged. `end_date: null` clears the end date;
/// `null` for any other field is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status: Patch<ProjectStatus>,
    #[serde(default, alias = "startDate")]
    pub start_date: Patch<String>,
    #[serde(default, alias = "endDate")]
    pub end_date: Patch<String>,
}

impl ProjectPatch {
    /// Apply onto a fetched record. Nothing is modified when an error is returned.
    pub fn apply(self, project: &mut Project) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        let mut next = project.clone();

        match self.title {
            Patch::Missing => {}
            Patch::Value(title) if !title.trim().is_empty() => next.title = title.trim().to_string(),
            _ => errors.push(FieldValidationError::new(
                "title",
                "Please add a project title",
            )),
        }

        match self.description {
            Patch::Missing => {}
            Patch::Value(description) if !description.trim().is_empty() => {
                next.description = description.trim().to_string()
            }
            _ => errors.push(FieldValidationError::new(
                "description",
                "Please add a project description",
            )),
        }

        match self.status {
            Patch::Missing => {}
            Patch::Value(status) => next.status = status,
            Patch::Null => errors.push(FieldValidationError::new(
                "status",
                "Status cannot be null",
            )),
        }

        match self.start_date {
            Patch::Missing => {}
            Patch::Value(raw) => match parse_datetime(&raw) {
                Some(date) => next.start_date = date,
                None => errors.push(FieldValidationError::new("start_date", "Invalid date")),
            },
            Patch::Null => errors.push(FieldValidationError::new(
                "start_date",
                "Please add a start date",
            )),
        }

        let end_date = match self.end_date {
            Patch::Value(raw) if raw.trim().is_empty() => Patch::Null,
            other => other,
        };
        match end_date.try_map(|raw| parse_datetime(&raw).ok_or(())) {
            Ok(end_date) => end_date.apply_to_option(&mut next.end_date),
            Err(()) => errors.push(FieldValidationError::new("end_date", "Invalid date")),
        }

        if errors.is_empty()
            && let Err(e) = check_date_range(&next.start_date, next.end_date.as_ref())
        {
            let message = e.message.map(|m| m.to_string()).unwrap_or_default();
            errors.push(FieldValidationError::new("end_date", message));
        }

        if !errors.is_empty() {
            return Err(ValidationError::FieldErrors(errors));
        }

        *project = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Project {
        NewProject {
            title: "Roof".to_string(),
            description: "Replace tiles".to_string(),
            status: ProjectStatus::NotStarted,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: None,
        }
        .into_project(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_status_labels_round_trip_through_json() {
        for status in ProjectStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
            let back: ProjectStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_status_from_str_is_lenient_on_case() {
        assert_eq!(
            "in progress".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
        assert_eq!(
            " Completed ".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::Completed
        );
        assert!("Done".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_create_request_defaults_status() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Roof",
            "description": "Replace tiles",
            "start_date": "2024-01-01"
        }))
        .unwrap();
        let new = NewProject::try_from(req).unwrap();
        assert_eq!(new.status, ProjectStatus::NotStarted);
        assert!(new.end_date.is_none());
    }

    #[test]
    fn test_create_request_ignores_owner_field() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Roof",
            "description": "Replace tiles",
            "start_date": "2024-01-01",
            "owner_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(NewProject::try_from(req).is_ok());
    }

    #[test]
    fn test_create_request_reports_missing_fields() {
        let err = NewProject::try_from(CreateProjectRequest::default()).unwrap_err();
        let ValidationError::FieldErrors(fields) = err else {
            panic!("expected field errors");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert!(names.contains(&"title"));
        assert!(names.contains(&"description"));
        assert!(names.contains(&"start_date"));
    }

    #[test]
    fn test_new_project_rejects_inverted_dates() {
        let new = NewProject {
            title: "t".to_string(),
            description: "d".to_string(),
            status: ProjectStatus::NotStarted,
            start_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            end_date: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn test_patch_only_touches_present_fields() {
        let mut project = sample();
        let before = project.clone();
        let patch: ProjectPatch =
            serde_json::from_value(serde_json::json!({ "status": "Completed" })).unwrap();

        patch.apply(&mut project).unwrap();

        assert_eq!(project.status, ProjectStatus::Completed);
        assert_eq!(project.title, before.title);
        assert_eq!(project.description, before.description);
        assert_eq!(project.start_date, before.start_date);
        assert_eq!(project.end_date, before.end_date);
    }

    #[test]
    fn test_patch_null_end_date_clears_it() {
        let mut project = sample();
        project.end_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let patch: ProjectPatch =
            serde_json::from_value(serde_json::json!({ "end_date": null })).unwrap();

        patch.apply(&mut project).unwrap();
        assert!(project.end_date.is_none());
    }

    #[test]
    fn test_patch_empty_title_is_rejected_not_ignored() {
        let mut project = sample();
        let before = project.clone();
        let patch: ProjectPatch = serde_json::from_value(serde_json::json!({
            "title": "",
            "status": "In Progress"
        }))
        .unwrap();

        assert!(patch.apply(&mut project).is_err());
        assert_eq!(project, before);
    }

    #[test]
    fn test_patch_rejects_end_before_start() {
        let mut project = sample();
        let patch: ProjectPatch =
            serde_json::from_value(serde_json::json!({ "end_date": "2023-12-31" })).unwrap();
        assert!(patch.apply(&mut project).is_err());
    }

    #[test]
    fn test_camel_case_dates_are_accepted() {
        let req: CreateProjectRequest = serde_json::from_value(serde_json::json!({
            "title": "Roof",
            "description": "Replace tiles",
            "startDate": "2024-01-01",
            "endDate": "2024-02-01"
        }))
        .unwrap();
        let new = NewProject::try_from(req).unwrap();
        assert_eq!(new.start_date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            new.end_date,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap())
        );

        let mut project = sample();
        let patch: ProjectPatch = serde_json::from_value(serde_json::json!({
            "startDate": "2030-01-01",
            "endDate": "2031-01-01"
        }))
        .unwrap();
        patch.apply(&mut project).unwrap();
        assert_eq!(project.start_date, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            project.end_date,
            Some(Utc.with_ymd_and_hms(2031, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_patch_invalid_end_date_leaves_record() {
        let mut project = sample();
        let before = project.clone();
        let patch: ProjectPatch =
            serde_json::from_value(serde_json::json!({ "end_date": "soon" })).unwrap();

        let err = patch.apply(&mut project).unwrap_err();
        let ValidationError::FieldErrors(fields) = err else {
            panic!("expected field errors");
        };
        assert_eq!(fields[0].field, "end_date");
        assert_eq!(project, before);
    }
}
