//! Dataset source acquisition.
//!
//! `http(s)` sources are downloaded into the figure's input directory and
//! reused on later runs; anything else is treated as a local path.
//!
//! Published table URIs end in `/download`. When such a URI stops resolving,
//! the table page itself usually redirects to the table's new home, so the
//! fetcher drops the `/download` segment, follows one redirect by hand and
//! appends `/download` to the new location. Automatic redirects are disabled
//! on the client so those hops can be inspected.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{CONTENT_DISPOSITION, LOCATION};
use reqwest::{redirect, Client, Url};
use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};
use crate::report::{log_info, log_warning, Reporter};

/// Upper bound on table-page redirects followed for one source.
pub const MAX_REDIRECT_HOPS: usize = 5;

const DOWNLOAD_SEGMENT: &str = "download";

static FILENAME_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*[^']*'[^']*'([^;]+)"#).expect("valid regex")
});

static FILENAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)filename\s*=\s*(?:"([^"]*)"|([^;]+))"#).expect("valid regex")
});

/// A resolved remote file: where to download it from and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFile {
    pub uri: Url,
    pub file_name: String,
}

/// Downloads sources into a cache directory.
#[derive(Debug, Clone)]
pub struct SourceFetcher {
    client: Client,
    cache_dir: PathBuf,
}

impl SourceFetcher {
    /// Create a fetcher caching into `cache_dir`
    pub fn new(cache_dir: impl Into<PathBuf>) -> SourceResult<Self> {
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    /// Local path holding the contents of `source`.
    pub async fn fetch(&self, source: &str, reporter: &dyn Reporter) -> SourceResult<PathBuf> {
        if !is_remote(source) {
            let path = PathBuf::from(source);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(SourceError::NotFound(path))
            };
        }

        let uri = Url::parse(source).map_err(|_| SourceError::InvalidUri(source.to_string()))?;
        let file = self.resolve(uri, reporter).await?;
        self.download(&file, reporter).await
    }

    /// Find the current download URI and file name for `uri`.
    pub async fn resolve(&self, mut uri: Url, reporter: &dyn Reporter) -> SourceResult<HttpFile> {
        let origin = uri.to_string();

        for _ in 0..=MAX_REDIRECT_HOPS {
            let response = self.client.head(uri.clone()).send().await?;
            if response.status().is_success() {
                let file_name = response
                    .headers()
                    .get(CONTENT_DISPOSITION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(content_disposition_filename)
                    .unwrap_or_else(|| fallback_file_name(&uri));
                return Ok(HttpFile { uri, file_name });
            }

            log_warning(
                reporter,
                format!(
                    "Response for '{}' failed with '{}', checking dataset for redirect",
                    uri,
                    response.status()
                ),
            );

            let page = table_page(&uri);
            let response = self.client.get(page.clone()).send().await?;
            if !response.status().is_redirection() {
                return Err(SourceError::Status {
                    uri: page.to_string(),
                    status: response.status().to_string(),
                });
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| SourceError::MissingLocation(page.to_string()))?;
            uri = download_uri(&page, location)
                .ok_or_else(|| SourceError::MissingLocation(page.to_string()))?;

            log_info(reporter, format!("Redirected to '{}'", uri));
        }

        Err(SourceError::TooManyRedirects(origin))
    }

    /// Download `file` into the cache unless it is already there.
    pub async fn download(&self, file: &HttpFile, reporter: &dyn Reporter) -> SourceResult<PathBuf> {
        let path = self.cache_dir.join(&file.file_name);

        if tokio::fs::try_exists(&path).await? {
            log_info(reporter, format!("Found '{}'", file.file_name));
            return Ok(path);
        }

        log_info(
            reporter,
            format!("Downloading '{}' from '{}'", file.file_name, file.uri),
        );

        let response = self.client.get(file.uri.clone()).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                uri: file.uri.to_string(),
                status: response.status().to_string(),
            });
        }

        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        tokio::fs::write(&path, &bytes).await?;

        Ok(path)
    }
}

/// Whether `source` is an `http(s)` URI rather than a local path.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim_start().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// File name from a `Content-Disposition` header value.
///
/// `filename*` wins over `filename`. Only the final path component is kept.
pub fn content_disposition_filename(header: &str) -> Option<String> {
    let raw = FILENAME_EXT
        .captures(header)
        .and_then(|c| c.get(1))
        .or_else(|| {
            FILENAME
                .captures(header)
                .and_then(|c| c.get(1).or_else(|| c.get(2)))
        })?
        .as_str()
        .trim();

    let name = Path::new(raw).file_name()?.to_str()?.to_string();
    (!name.is_empty()).then_some(name)
}

/// File name derived from the URI path when no header supplies one.
///
/// `.../table/abc/download` becomes `abc.csv`.
pub fn fallback_file_name(uri: &Url) -> String {
    let segment = uri
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case(DOWNLOAD_SEGMENT))
        .last()
        .unwrap_or("dataset");

    if Path::new(segment).extension().is_some() {
        segment.to_string()
    } else {
        format!("{}.csv", segment)
    }
}

/// `uri` with its last path segment removed and no trailing slash.
pub fn table_page(uri: &Url) -> Url {
    let mut page = uri.clone();
    let path = uri.path().trim_end_matches('/');
    let parent = match path.rfind('/') {
        Some(i) => &path[..i],
        None => "",
    };
    page.set_path(parent.trim_end_matches('/'));
    page.set_query(None);
    page
}

/// Redirect `location` (absolute or relative to `page`) with `/download` appended.
pub fn download_uri(page: &Url, location: &str) -> Option<Url> {
    let mut target = page.join(location.trim()).ok()?;
    let path = format!("{}/{}", target.path().trim_end_matches('/'), DOWNLOAD_SEGMENT);
    target.set_path(&path);
    Some(target)
}
