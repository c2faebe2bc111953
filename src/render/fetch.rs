//! Fetching markdown sources.
//!
//! Documents are addressed by a path relative to the configured docs
//! location, which is either a base URL or a local directory.

use std::path::{Component, Path, PathBuf};

use reqwest::{StatusCode, Url};

use crate::config::DocsLocation;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("failed to load markdown from {url}: {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to load markdown from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read markdown file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid document location '{location}': {reason}")]
    InvalidLocation { location: String, reason: String },
}

/// Fetches markdown documents from the docs location.
pub enum SourceFetcher {
    /// Documents served over HTTP, relative to a base URL.
    Http { client: reqwest::Client, base: Url },
    /// Documents read from a local directory.
    Local { root: PathBuf },
}

impl SourceFetcher {
    /// Create the fetcher for a configured docs location.
    pub fn from_location(location: &DocsLocation) -> Result<Self, FetchError> {
        match location {
            DocsLocation::Url { url } => Self::http(url),
            DocsLocation::Path { path } => Ok(Self::local(path.clone())),
        }
    }

    /// Create an HTTP fetcher. The base URL is treated as a directory.
    pub fn http(base: &str) -> Result<Self, FetchError> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| FetchError::InvalidLocation {
            location: base.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self::Http {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn local(root: PathBuf) -> Self {
        Self::Local { root }
    }

    /// Fetch a document as UTF-8 text.
    pub async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        match self {
            SourceFetcher::Http { client, base } => {
                let url = resolve_http(base, path)?;

                let response = client.get(url.clone()).send().await.map_err(|source| {
                    FetchError::Network {
                        url: url.to_string(),
                        source,
                    }
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }

                response.text().await.map_err(|source| FetchError::Network {
                    url: url.to_string(),
                    source,
                })
            }
            SourceFetcher::Local { root } => {
                let file = resolve_local(root, path)?;
                tokio::fs::read_to_string(&file)
                    .await
                    .map_err(|source| FetchError::Io { path: file, source })
            }
        }
    }
}

/// Join a document path onto the docs base URL, refusing paths that would
/// leave it (another origin, `//host/...`, or `../`).
fn resolve_http(base: &Url, path: &str) -> Result<Url, FetchError> {
    let url = base.join(path).map_err(|e| FetchError::InvalidLocation {
        location: path.to_string(),
        reason: e.to_string(),
    })?;
    if url.origin() != base.origin() || !url.path().starts_with(base.path()) {
        return Err(FetchError::InvalidLocation {
            location: path.to_string(),
            reason: format!("document URLs must stay under {base}"),
        });
    }
    Ok(url)
}

/// Join a document path onto the docs root, refusing paths that would
/// escape it.
fn resolve_local(root: &Path, path: &str) -> Result<PathBuf, FetchError> {
    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(FetchError::InvalidLocation {
            location: path.to_string(),
            reason: "document paths must stay inside the docs directory".to_string(),
        });
    }
    Ok(root.join(relative))
}
