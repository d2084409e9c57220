use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::{AvatarError, Result};

/// Asset reader trait.
/// Reads raw bytes from local files or network resources asynchronously.
pub trait AssetReader: Send + Sync {
    /// Reads `uri`, resolved relative to the reader's root.
    fn read_bytes(&self, uri: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Local file reader.
pub struct FileAssetReader {
    root_path: PathBuf,
}

impl FileAssetReader {
    /// `path` may be a directory or a file; a file's parent becomes the root.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let root_path = if path.is_file() {
            path.parent().unwrap_or(Path::new(".")).to_path_buf()
        } else {
            path.to_path_buf()
        };
        Self { root_path }
    }

    #[inline]
    #[must_use]
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

impl AssetReader for FileAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let path = self.root_path.join(uri);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(AvatarError::AssetNotFound(path.display().to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// HTTP reader.
///
/// Requests run through `ehttp`'s blocking client on tokio's blocking pool,
/// so the async side never parks a runtime worker on network I/O.
pub struct HttpAssetReader {
    root_url: url::Url,
}

impl HttpAssetReader {
    pub fn new(url_str: &str) -> Result<Self> {
        let url = url::Url::parse(url_str)?;
        let root_url = if url.path().ends_with('/') {
            url
        } else {
            // Drop the last path segment: ".../models/avatar.glb" -> ".../models/"
            let mut u = url.clone();
            if let Ok(mut segments) = u.path_segments_mut() {
                segments.pop();
                segments.push("");
            }
            u
        };
        Ok(Self { root_url })
    }

    #[inline]
    #[must_use]
    pub fn root_url(&self) -> &url::Url {
        &self.root_url
    }
}

impl AssetReader for HttpAssetReader {
    async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        let url = self.root_url.join(uri)?;
        let request = ehttp::Request::get(url.as_str());
        let response = tokio::task::spawn_blocking(move || ehttp::fetch_blocking(&request))
            .await?
            .map_err(AvatarError::HttpError)?;

        if !response.ok {
            return Err(AvatarError::HttpResponseError {
                status: response.status,
                url: url.to_string(),
            });
        }
        Ok(response.bytes)
    }
}

/// Reader variants, dispatched statically.
#[derive(Clone)]
pub enum AssetReaderVariant {
    File(Arc<FileAssetReader>),
    Http(Arc<HttpAssetReader>),
}

impl AssetReaderVariant {
    /// Picks a reader for `source`, rooted at the directory containing it.
    pub fn from_source(source: &str) -> Result<Self> {
        if is_http(source) {
            Ok(Self::Http(Arc::new(HttpAssetReader::new(source)?)))
        } else {
            let dir = Path::new(source).parent().unwrap_or(Path::new("."));
            Ok(Self::File(Arc::new(FileAssetReader::new(dir))))
        }
    }

    pub async fn read_bytes(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::File(r) => r.read_bytes(uri).await,
            Self::Http(r) => r.read_bytes(uri).await,
        }
    }

    /// File-name part of `source` (last path segment, query stripped).
    #[must_use]
    pub fn source_filename(source: &str) -> &str {
        if is_http(source) {
            let without_query = source.split(['?', '#']).next().unwrap_or(source);
            without_query.rsplit('/').next().unwrap_or(without_query)
        } else {
            Path::new(source)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(source)
        }
    }
}

#[inline]
fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Fetches `source` in one go: builds a reader rooted beside it and reads it.
/// Returns the reader too, so relative buffer URIs can be resolved later.
pub async fn fetch(source: &str) -> Result<(AssetReaderVariant, Vec<u8>)> {
    let reader = AssetReaderVariant::from_source(source)?;
    let filename = AssetReaderVariant::source_filename(source).to_string();
    let bytes = reader.read_bytes(&filename).await?;
    Ok((reader, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_of_url_and_path() {
        assert_eq!(
            AssetReaderVariant::source_filename("https://localhost/assets/animations/male/idle/a.glb?v=2"),
            "a.glb"
        );
        assert_eq!(AssetReaderVariant::source_filename("/tmp/models/avatar.glb"), "avatar.glb");
    }

    #[test]
    fn http_root_drops_file_segment() {
        let reader = HttpAssetReader::new("https://cdn.example.com/models/avatar.glb").unwrap();
        assert_eq!(reader.root_url().as_str(), "https://cdn.example.com/models/");
        assert_eq!(
            reader.root_url().join("avatar.bin").unwrap().as_str(),
            "https://cdn.example.com/models/avatar.bin"
        );
    }
}
