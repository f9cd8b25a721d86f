use datavol_core::{VolumeListing, VolumeMap};
use serde::Deserialize;
use url::Url;

use crate::http::{HttpFetcher, RealFetcher};

/// One page of the registry tag listing.
#[derive(Debug, Deserialize)]
pub struct TagPage {
    #[serde(default)]
    pub results: Vec<TagEntry>,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagEntry {
    pub name: String,
    pub last_updated: Option<String>,
}

/// Registry tag API client, parameterized over the fetcher for testability.
pub struct RegistryClient<F: HttpFetcher = RealFetcher> {
    fetcher: F,
    api_base: String,
    namespace: String,
}

impl RegistryClient<RealFetcher> {
    pub fn new(api_base: &str, namespace: &str) -> Self {
        Self::with_fetcher(RealFetcher::new(), api_base, namespace)
    }
}

impl<F: HttpFetcher> RegistryClient<F> {
    pub fn with_fetcher(fetcher: F, api_base: &str, namespace: &str) -> Self {
        Self {
            fetcher,
            api_base: api_base.trim_end_matches('/').to_owned(),
            namespace: namespace.to_owned(),
        }
    }

    /// `{api}/{namespace}/{repository}/tags?name={version}`
    pub fn tags_url(&self, repository: &str, version: &str) -> Result<Url, RegistryError> {
        let raw = format!("{}/{}/{}/tags", self.api_base, self.namespace, repository);
        let mut url = Url::parse(&raw).map_err(|e| RegistryError::InvalidUrl {
            url: raw.clone(),
            source: e,
        })?;
        url.query_pairs_mut().append_pair("name", version);
        Ok(url)
    }

    /// Collect tags starting with `version` and their `last_updated` times.
    ///
    /// At most `max_pages` pages are read; hitting the limit truncates the
    /// result without error. If the first page cannot be fetched the
    /// listing is [`VolumeListing::Unavailable`].
    pub async fn list_volumes(
        &self,
        version: &str,
        repository: &str,
        max_pages: u32,
    ) -> Result<VolumeListing, RegistryError> {
        let url = self.tags_url(repository, version)?;
        tracing::info!(%url, version, max_pages, "looking for data volume tags");

        let first = match self.fetcher.get(url.as_str()).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!(%url, status = response.status, "could not find registry URL");
                return Ok(VolumeListing::Unavailable);
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "could not reach registry URL");
                return Ok(VolumeListing::Unavailable);
            }
        };

        let mut page: TagPage =
            serde_json::from_str(&first.body).map_err(|e| RegistryError::Decode {
                url: url.to_string(),
                source: e,
            })?;

        let mut volumes = VolumeMap::new();
        let mut pages_read = 0;

        while pages_read < max_pages {
            collect_matching(&mut volumes, page.results, version);
            pages_read += 1;

            let Some(next) = page.next.filter(|n| !n.is_empty()) else {
                break;
            };
            if pages_read == max_pages {
                tracing::debug!(max_pages, "page limit reached, stopping tag search");
                break;
            }

            page = match self.next_page(&next).await {
                Some(page) => page,
                None => break,
            };
        }

        Ok(VolumeListing::Found(volumes))
    }

    /// A follow-up page that fails ends the walk, keeping what was gathered.
    async fn next_page(&self, url: &str) -> Option<TagPage> {
        let response = match self.fetcher.get(url).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!(
                    url,
                    status = response.status,
                    "tag page unavailable, stopping search"
                );
                return None;
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "tag page request failed, stopping search");
                return None;
            }
        };

        match serde_json::from_str(&response.body) {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(url, error = %e, "tag page is not valid JSON, stopping search");
                None
            }
        }
    }
}

fn collect_matching(volumes: &mut VolumeMap, results: Vec<TagEntry>, version: &str) {
    for tag in results {
        if !tag.name.starts_with(version) {
            continue;
        }
        match tag.last_updated {
            Some(last_updated) => {
                volumes.insert(tag.name, last_updated);
            }
            None => tracing::debug!(tag = %tag.name, "tag has no last_updated time, ignoring"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid registry URL: {url}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("unexpected tag listing format from {url}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}
