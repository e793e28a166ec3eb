//! HTTP handlers for projects and their CSV interchange

use crate::core::LedgerResult;
use crate::core::error::{LedgerError, UploadError};
use crate::entities::{CreateProjectRequest, NewProject, Project, ProjectPatch};
use crate::interchange::{ImportSummary, TransientFile};
use crate::server::extractors::{Caller, JsonBody, RecordId, ValidatedJson};
use crate::server::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};

const ACCEPTED_UPLOAD_TYPES: [&str; 2] = ["text/csv", "application/vnd.ms-excel"];

pub async fn create_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    ValidatedJson(body): ValidatedJson<CreateProjectRequest>,
) -> LedgerResult<(StatusCode, Json<Project>)> {
    let new = NewProject::try_from(body)?;
    let project = state.projects.create(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> LedgerResult<Json<Vec<Project>>> {
    Ok(Json(state.projects.list(&caller).await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
) -> LedgerResult<Json<Project>> {
    Ok(Json(state.projects.get(&caller, id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<ProjectPatch>,
) -> LedgerResult<Json<Project>> {
    Ok(Json(state.projects.update(&caller, id, patch).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Caller(caller): Caller,
    RecordId(id): RecordId,
) -> LedgerResult<Json<Value>> {
    state.projects.delete(&caller, id).await?;
    Ok(Json(json!({ "message": "Project removed", "id": id })))
}

pub async fn export_projects(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> LedgerResult<Response> {
    let export = state.interchange.export(&caller).await?;
    let disposition = format!("attachment; filename=\"{}\"", export.file_name());
    let stream = export.into_stream().await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, Body::from_stream(stream)).into_response())
}

pub async fn import_projects(
    State(state): State<AppState>,
    Caller(caller): Caller,
    multipart: Result<Multipart, MultipartRejection>,
) -> LedgerResult<Json<ImportSummary>> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!(error = %e, "import request is not multipart");
        UploadError::MissingFile
    })?;

    let upload = stage_csv_upload(&state, &mut multipart).await?;
    let summary = state.interchange.import(&caller, upload).await?;
    Ok(Json(summary))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> LedgerError {
    UploadError::Multipart {
        message: e.body_text(),
    }
    .into()
}

/// Find the `file` part, check it is CSV, and write it to a transient file
async fn stage_csv_upload(
    state: &AppState,
    multipart: &mut Multipart,
) -> LedgerResult<TransientFile> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        check_csv_part(&field)?;
        let contents = read_limited(field, state.max_upload_bytes).await?;
        return state.interchange.stage_upload(&contents).await;
    }

    Err(UploadError::MissingFile.into())
}

fn check_csv_part(field: &Field<'_>) -> LedgerResult<()> {
    let content_type = field
        .content_type()
        .map(|ct| ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase());

    let accepted = match content_type.as_deref() {
        Some(ct) => ACCEPTED_UPLOAD_TYPES.contains(&ct),
        None => field
            .file_name()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".csv")),
    };

    if accepted {
        Ok(())
    } else {
        Err(UploadError::UnsupportedType {
            content_type: content_type.unwrap_or_else(|| "unknown".to_string()),
        }
        .into())
    }
}

async fn read_limited(mut field: Field<'_>, limit: usize) -> LedgerResult<Vec<u8>> {
    let mut contents = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if contents.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge { limit }.into());
        }
        contents.extend_from_slice(&chunk);
    }
    Ok(contents)
}
