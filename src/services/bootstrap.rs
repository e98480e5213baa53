use reqwest::Client as HttpClient;
use std::path::{Path, PathBuf};

use crate::{
    config::Config,
    error::DataLoadError,
    similarity::{CatalogFile, SimilarityMatrix},
};

/// Which data artifact a download should contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataFile {
    Catalog,
    Matrix,
}

impl DataFile {
    /// Checks that downloaded bytes deserialize as this artifact
    fn validate(self, bytes: &[u8]) -> Result<(), String> {
        match self {
            DataFile::Catalog => serde_json::from_slice::<CatalogFile>(bytes)
                .map_err(|e| e.to_string())?
                .into_catalog()
                .map(|_| ()),
            DataFile::Matrix => serde_json::from_slice::<SimilarityMatrix>(bytes)
                .map_err(|e| e.to_string())?
                .check_square()
                .map_err(|e| e.to_string()),
        }
    }
}

/// Downloads any data file that is missing locally
///
/// Files that already exist are left untouched. A missing file without a
/// configured file ID is skipped here and reported later by the loader.
pub async fn ensure_data_files(config: &Config) -> Result<(), DataLoadError> {
    let http_client = HttpClient::builder()
        .timeout(config.download_timeout())
        .build()
        .map_err(|e| DataLoadError::Download {
            path: config.catalog_path.clone(),
            reason: format!("failed to build HTTP client: {}", e),
        })?;

    let files = [
        (
            DataFile::Catalog,
            &config.catalog_path,
            config.movies_file_id.as_deref(),
        ),
        (
            DataFile::Matrix,
            &config.similarity_path,
            config.similarity_file_id.as_deref(),
        ),
    ];

    for (kind, path, file_id) in files {
        if path.exists() {
            tracing::debug!(path = %path.display(), "Data file present");
            continue;
        }

        match file_id {
            Some(file_id) => {
                download(&http_client, &config.blob_base_url, file_id, kind, path).await?;
            }
            None => {
                tracing::warn!(
                    path = %path.display(),
                    "Data file missing and no file ID configured"
                );
            }
        }
    }

    Ok(())
}

/// Fetches one blob by file ID and moves it into place at `path`
///
/// The body must deserialize as `kind` before anything is written, and it is
/// staged in a sibling file so `path` never holds a partial download.
async fn download(
    http_client: &HttpClient,
    blob_base_url: &str,
    file_id: &str,
    kind: DataFile,
    path: &Path,
) -> Result<(), DataLoadError> {
    let download_error = |reason: String| DataLoadError::Download {
        path: path.to_path_buf(),
        reason,
    };

    tracing::info!(
        file_id = %file_id,
        path = %path.display(),
        "Downloading data file"
    );

    let response = http_client
        .get(blob_base_url)
        .query(&[("export", "download"), ("id", file_id)])
        .send()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_error(format!(
            "remote returned status {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_error(e.to_string()))?;

    kind.validate(&bytes)
        .map_err(|reason| download_error(format!("invalid {:?} data: {}", kind, reason)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| download_error(e.to_string()))?;
    }

    let staging = staging_path(path);
    let written = match tokio::fs::write(&staging, &bytes).await {
        Ok(()) => tokio::fs::rename(&staging, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(download_error(e.to_string()));
    }

    tracing::info!(
        path = %path.display(),
        bytes = bytes.len(),
        "Data file downloaded"
    );

    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".download");
    path.with_file_name(name)
}
