//! Request-scoped files on disk
//!
//! A [`TransientFile`] deletes its file when dropped, so every exit path of
//! an export or import (success, error, early return, client disconnect)
//! releases it.

use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug)]
pub struct TransientFile {
    path: Option<TempPath>,
}

impl TransientFile {
    /// Create an empty file in `dir` with a unique name
    pub fn create(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), "transient file created");

        Ok(Self { path: Some(path) })
    }

    /// Create a file in `dir` holding `contents`
    pub async fn write_new(
        dir: &Path,
        prefix: &str,
        suffix: &str,
        contents: &[u8],
    ) -> io::Result<Self> {
        let transient = Self::create(dir, prefix, suffix)?;
        let mut file = tokio::fs::File::create(transient.path()).await?;
        file.write_all(contents).await?;
        file.flush().await?;
        Ok(transient)
    }

    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.path().to_path_buf()
    }

    pub async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }

    /// Stream the contents in fixed-size chunks.
    ///
    /// The file is deleted once the stream ends or is dropped.
    pub async fn into_chunks(
        self,
    ) -> io::Result<impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static> {
        let file = tokio::fs::File::open(self.path()).await?;

        Ok(futures::stream::try_unfold(
            (file, self),
            |(mut file, guard)| async move {
                let mut buf = vec![0u8; CHUNK_SIZE];
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    drop(file);
                    drop(guard);
                    return Ok(None);
                }
                buf.truncate(n);
                Ok::<_, io::Error>(Some((buf, (file, guard))))
            },
        ))
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let shown = path.display().to_string();
            match path.close() {
                Ok(()) => tracing::debug!(path = %shown, "transient file removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::error!(path = %shown, error = %e, "failed to remove transient file")
                }
            }
        }
    }
}
