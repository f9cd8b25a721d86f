use std::sync::OnceLock;

use datavol_core::TarfileMap;
use datavol_core::archive::{DuplicateFilter, is_candidate};
use datavol_core::mount::{MountDirectoryMap, parse_mount_map};
use regex::Regex;
use url::Url;

use crate::http::{HttpError, HttpFetcher, RealFetcher};

/// Result of looking for archives in a web directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TarfileListing {
    /// The directory itself does not exist; there is nothing to check.
    Missing { url: String, status: u16 },
    Found(TarfileMap),
}

/// Which anchors of a directory listing count as data archives.
#[derive(Debug, Clone)]
pub struct ArchiveFilter {
    pub prefix: String,
    pub extension: String,
    pub duplicates: DuplicateFilter,
}

/// Client for the static test-data web directory, parameterized over the
/// fetcher for testability.
pub struct WebDataClient<F: HttpFetcher = RealFetcher> {
    fetcher: F,
}

impl WebDataClient<RealFetcher> {
    pub fn new() -> Self {
        Self {
            fetcher: RealFetcher::new(),
        }
    }
}

impl Default for WebDataClient<RealFetcher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: HttpFetcher> WebDataClient<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    // ── Tarball listing ──

    /// Collect `last-modified` times of the archives listed at `search_url`.
    pub async fn list_tarfiles(
        &self,
        search_url: &str,
        filter: &ArchiveFilter,
    ) -> Result<TarfileListing, WebError> {
        tracing::info!(prefix = %filter.prefix, url = search_url, "looking for archives");

        let page = self
            .fetcher
            .get(search_url)
            .await
            .map_err(|e| WebError::Request {
                url: search_url.to_owned(),
                source: e,
            })?;

        if !page.is_success() {
            tracing::info!(url = search_url, status = page.status, "URL does not exist");
            return Ok(TarfileListing::Missing {
                url: search_url.to_owned(),
                status: page.status,
            });
        }

        let base = parse_url(search_url)?;
        let mut tarfiles = TarfileMap::new();

        for name in extract_link_texts(&page.body) {
            if !is_candidate(&name, &filter.prefix, &filter.extension) {
                continue;
            }
            if filter.duplicates.is_duplicate(&name) {
                tracing::info!(
                    tarfile = %name,
                    "filtering out archive flagged as a duplicate"
                );
                continue;
            }

            let tarfile_url = base.join(&name).map_err(|e| WebError::InvalidUrl {
                url: format!("{search_url}{name}"),
                source: e,
            })?;
            let last_modified = self.last_modified(tarfile_url.as_str()).await?;
            tarfiles.insert(name, last_modified);
        }

        Ok(TarfileListing::Found(tarfiles))
    }

    async fn last_modified(&self, url: &str) -> Result<String, WebError> {
        let response = self
            .fetcher
            .head(url)
            .await
            .map_err(|e| WebError::Request {
                url: url.to_owned(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(WebError::HeadStatus {
                url: url.to_owned(),
                status: response.status,
            });
        }

        response
            .header("last-modified")
            .map(str::to_owned)
            .ok_or_else(|| WebError::MissingLastModified {
                url: url.to_owned(),
            })
    }

    // ── Mount directories ──

    /// Fetch the category → mount directory mapping published next to the
    /// archives. A missing file is an error.
    pub async fn fetch_mount_dirs(
        &self,
        search_url: &str,
        file_name: &str,
    ) -> Result<MountDirectoryMap, WebError> {
        let url = parse_url(search_url)?
            .join(file_name)
            .map_err(|e| WebError::InvalidUrl {
                url: format!("{search_url}{file_name}"),
                source: e,
            })?;
        tracing::info!(url = %url, "looking for mount file");

        let response = self
            .fetcher
            .get(url.as_str())
            .await
            .map_err(|e| WebError::Request {
                url: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            return Err(WebError::MountFileMissing {
                url: url.to_string(),
                status: response.status,
            });
        }

        parse_mount_map(&response.body).map_err(|e| WebError::MountFileParse {
            url: url.to_string(),
            source: e,
        })
    }
}

/// Visible text of every `<a>` element, with nested tags removed and the
/// common entities decoded.
pub fn extract_link_texts(html: &str) -> Vec<String> {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let anchor = ANCHOR.get_or_init(|| {
        Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").expect("anchor pattern is valid")
    });
    let tag = TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

    anchor
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|inner| tag.replace_all(inner.as_str(), ""))
        .map(|text| decode_entities(&text))
        .collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn parse_url(url: &str) -> Result<Url, WebError> {
    Url::parse(url).map_err(|e| WebError::InvalidUrl {
        url: url.to_owned(),
        source: e,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("invalid URL: {url}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("request to {url} failed")]
    Request { url: String, source: HttpError },

    #[error("HEAD {url} returned status {status}")]
    HeadStatus { url: String, status: u16 },

    #[error("no last-modified header in response from {url}")]
    MissingLastModified { url: String },

    #[error("URL does not exist: {url} (status {status})")]
    MountFileMissing { url: String, status: u16 },

    #[error("invalid mount file at {url}")]
    MountFileParse {
        url: String,
        source: datavol_core::Error,
    },
}
