//! Delivery of a generated document.
//!
//! Either the artifact is fetched and written to a directory, or only
//! its address is handed back for the caller to open. No integrity
//! check is performed on the fetched bytes.

use std::path::{Path, PathBuf};

use crate::error::WorkflowError;
use crate::service::JobService;

/// File name used when the server-provided name has no usable component.
const FALLBACK_FILENAME: &str = "result.hwp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSink {
    /// Fetch the bytes and write `dir/<filename>`.
    SaveToDir(PathBuf),
    /// Do not fetch; return the download address.
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Saved { path: PathBuf, bytes: usize },
    Link { url: String },
}

/// Deliver `filename` through `sink`.
pub async fn deliver(
    service: &dyn JobService,
    filename: &str,
    sink: &ArtifactSink,
) -> Result<Delivered, WorkflowError> {
    let download_error = |reason: String| WorkflowError::Download {
        filename: filename.to_string(),
        reason,
    };

    match sink {
        ArtifactSink::Link => {
            let url = service
                .artifact_url(filename)
                .map_err(|e| download_error(e.to_string()))?;
            tracing::info!(filename, url = %url, "Result available for download");
            Ok(Delivered::Link { url })
        }
        ArtifactSink::SaveToDir(dir) => {
            let bytes = service
                .fetch_artifact(filename)
                .await
                .map_err(|e| download_error(e.to_string()))?;

            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| download_error(format!("{}: {e}", dir.display())))?;

            let path = dir.join(local_file_name(filename));
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|e| download_error(format!("{}: {e}", path.display())))?;

            tracing::info!(path = %path.display(), bytes = bytes.len(), "Result saved");
            Ok(Delivered::Saved {
                path,
                bytes: bytes.len(),
            })
        }
    }
}

/// Keep only the last path component of a server-provided name so it
/// cannot escape the target directory.
pub fn local_file_name(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "..")
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}
