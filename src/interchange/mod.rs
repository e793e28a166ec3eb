//! CSV bulk interchange for projects
//!
//! Export renders every project of the caller to a transient file which is
//! then streamed out. Import reads a staged upload, validates every row and
//! inserts all candidates in one batch. Transient files are released on
//! every exit path (see [`TransientFile`]).

pub mod codec;
pub mod mapping;
pub mod transient;

pub use codec::{CsvError, CsvTable};
pub use transient::TransientFile;

use crate::core::error::{LedgerError, UploadError};
use crate::core::{CallerIdentity, LedgerResult, ScopedRepository, Store};
use crate::entities::Project;
use chrono::Utc;
use futures::Stream;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Download name of the export attachment
pub const EXPORT_FILE_NAME: &str = "projects_export.csv";

/// A rendered export waiting to be streamed
#[derive(Debug)]
pub struct CsvExport {
    file: TransientFile,
    pub rows: usize,
}

impl CsvExport {
    pub fn file_name(&self) -> &'static str {
        EXPORT_FILE_NAME
    }

    /// Stream the file; it is deleted when the stream finishes or is dropped
    pub async fn into_stream(
        self,
    ) -> LedgerResult<impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static> {
        self.file.into_chunks().await.map_err(|e| {
            tracing::error!(error = %e, "failed to open export file");
            LedgerError::from(e)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub message: String,
    pub count: usize,
}

#[derive(Clone)]
pub struct CsvInterchange {
    projects: Arc<dyn Store<Project>>,
    transient_dir: PathBuf,
}

impl CsvInterchange {
    pub fn new(projects: Arc<dyn Store<Project>>, transient_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects,
            transient_dir: transient_dir.into(),
        }
    }

    fn repository(&self, caller: &CallerIdentity) -> ScopedRepository<Project> {
        ScopedRepository::new(self.projects.clone(), caller)
    }

    /// Render all of the caller's projects to a transient CSV file
    pub async fn export(&self, caller: &CallerIdentity) -> LedgerResult<CsvExport> {
        let projects = self.repository(caller).list().await?;
        let csv = mapping::projects_to_csv(&projects);

        let file = TransientFile::write_new(
            &self.transient_dir,
            "projects-export-",
            ".csv",
            csv.as_bytes(),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, dir = %self.transient_dir.display(), "failed to write export file");
            LedgerError::from(e)
        })?;

        tracing::info!(caller = %caller.id(), rows = projects.len(), "projects exported");
        Ok(CsvExport {
            file,
            rows: projects.len(),
        })
    }

    /// Persist uploaded bytes to a transient file ahead of import
    pub async fn stage_upload(&self, contents: &[u8]) -> LedgerResult<TransientFile> {
        TransientFile::write_new(&self.transient_dir, "projects-upload-", ".csv", contents)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, dir = %self.transient_dir.display(), "failed to stage upload");
                LedgerError::from(e)
            })
    }

    /// Import a staged upload. The upload is deleted before this returns,
    /// whatever the outcome.
    pub async fn import(
        &self,
        caller: &CallerIdentity,
        upload: TransientFile,
    ) -> LedgerResult<ImportSummary> {
        let result = self.import_file(caller, &upload).await;
        drop(upload);

        if let Err(e) = &result {
            tracing::warn!(caller = %caller.id(), error = %e, "project import failed");
        }
        result
    }

    async fn import_file(
        &self,
        caller: &CallerIdentity,
        upload: &TransientFile,
    ) -> LedgerResult<ImportSummary> {
        let data = upload.read_all().await?;
        let table = CsvTable::parse(&data).map_err(|e| UploadError::Malformed {
            message: e.to_string(),
        })?;

        let now = Utc::now();
        let mut candidates = Vec::with_capacity(table.len());
        let mut invalid = Vec::new();
        for (i, row) in table.rows().enumerate() {
            match mapping::row_to_candidate(i + 1, &row, now) {
                Ok(candidate) => candidates.push(candidate.into_project(caller.id(), now)),
                Err(row_error) => invalid.push(row_error),
            }
        }

        if !invalid.is_empty() {
            return Err(UploadError::InvalidRows(invalid).into());
        }

        let count = self
            .repository(caller)
            .create_many(candidates)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "batch insert failed");
                UploadError::InsertFailed {
                    message: "batch insert failed".to_string(),
                }
            })?;

        tracing::info!(caller = %caller.id(), count, "projects imported");
        Ok(ImportSummary {
            message: "Projects imported successfully".to_string(),
            count,
        })
    }
}
