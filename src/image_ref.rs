//! Resolution of user-supplied image references.
//!
//! Endpoint operations accept an image as either a public URL or a local
//! filesystem path. An [`ImageReference`] classifies the input once at
//! construction, downloads remote images lazily into scratch storage, and
//! owns the downloaded copy until [`cleanup`](ImageReference::cleanup) runs.
//! Local paths belong to the caller and are never touched.

use std::path::{Path, PathBuf};

use reqwest::Client;
use uuid::Uuid;

use crate::error::{Result, StabilityError};

/// Generate a collision-free path in the process scratch directory.
///
/// Names embed a random token, so concurrent calls never contend for the
/// same file and no locking is needed.
pub(crate) fn scratch_path(tag: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{tag}-{}.{extension}", Uuid::new_v4()))
}

/// How the reference source was classified at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// An `http`/`https` URL; bytes are downloaded on first materialization
    Remote,
    /// An existing regular file owned by the caller
    Local,
}

/// A resolvable image input with deterministic cleanup
#[derive(Debug)]
pub struct ImageReference {
    source: String,
    origin: Origin,
    downloaded: Option<PathBuf>,
}

impl ImageReference {
    /// Classify a source string.
    ///
    /// A syntactically valid `http`/`https` URL is Remote; otherwise the
    /// string must name an existing regular file. Anything else fails with
    /// an invalid-request error before any network I/O is attempted.
    pub fn create(source: impl Into<String>) -> Result<Self> {
        let source = source.into();

        let origin = if is_http_url(&source) {
            Origin::Remote
        } else if Path::new(&source).is_file() {
            Origin::Local
        } else {
            return Err(StabilityError::invalid_input(format!(
                "image source is neither an http(s) URL nor an existing file: {source}"
            )));
        };

        Ok(Self {
            source,
            origin,
            downloaded: None,
        })
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Resolve the reference to a readable local path.
    ///
    /// Local sources resolve with zero I/O. Remote sources download on the
    /// first call and reuse the cached copy afterwards; download failures,
    /// including non-2xx statuses, propagate as transport errors.
    pub async fn materialize(&mut self, client: &Client) -> Result<PathBuf> {
        match self.origin {
            Origin::Local => Ok(PathBuf::from(&self.source)),
            Origin::Remote => {
                if let Some(path) = &self.downloaded {
                    return Ok(path.clone());
                }

                let response = client
                    .get(&self.source)
                    .send()
                    .await?
                    .error_for_status()?;
                let bytes = response.bytes().await?;

                let path = scratch_path("image", "png");
                tokio::fs::write(&path, &bytes).await?;
                tracing::debug!(
                    url = %self.source,
                    path = %path.display(),
                    "downloaded remote image to scratch storage"
                );

                self.downloaded = Some(path.clone());
                Ok(path)
            }
        }
    }

    /// Read the materialized bytes into a multipart part.
    pub(crate) async fn to_part(&mut self, client: &Client) -> Result<reqwest::multipart::Part> {
        let path = self.materialize(client).await?;
        let bytes = tokio::fs::read(&path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(reqwest::multipart::Part::bytes(bytes).file_name(filename))
    }

    /// Delete the downloaded scratch file, if any.
    ///
    /// Idempotent; a no-op for Local sources and for Remote references that
    /// never materialized. Resets the cache, so a later `materialize` would
    /// download again.
    pub async fn cleanup(&mut self) {
        if let Some(path) = self.downloaded.take() {
            if let Err(error) = tokio::fs::remove_file(&path).await {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "failed to remove downloaded scratch file"
                );
            }
        }
    }
}

fn is_http_url(source: &str) -> bool {
    match reqwest::Url::parse(source) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_classifies_as_remote() {
        let reference = ImageReference::create("https://example.com/cat.png").unwrap();
        assert_eq!(reference.origin(), Origin::Remote);

        let reference = ImageReference::create("http://example.com/cat.png").unwrap();
        assert_eq!(reference.origin(), Origin::Remote);
    }

    #[test]
    fn test_existing_file_classifies_as_local() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let reference = ImageReference::create(file.path().to_string_lossy()).unwrap();
        assert_eq!(reference.origin(), Origin::Local);
    }

    #[test]
    fn test_other_strings_fail() {
        assert!(matches!(
            ImageReference::create("not-a-url-and-not-a-file"),
            Err(StabilityError::InvalidRequest { .. })
        ));
        // ftp is a URL but not an allowed scheme
        assert!(ImageReference::create("ftp://example.com/cat.png").is_err());
    }

    #[tokio::test]
    async fn test_local_materialize_returns_source_unchanged() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let source = file.path().to_string_lossy().into_owned();

        let mut reference = ImageReference::create(&source).unwrap();
        let client = Client::new();
        let path = reference.materialize(&client).await.unwrap();
        assert_eq!(path, PathBuf::from(&source));
    }

    #[tokio::test]
    async fn test_local_cleanup_never_deletes_source() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut reference = ImageReference::create(file.path().to_string_lossy()).unwrap();

        reference.cleanup().await;
        reference.cleanup().await;
        assert!(file.path().exists());
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        let first = scratch_path("image", "png");
        let second = scratch_path("image", "png");
        assert_ne!(first, second);
    }
}
