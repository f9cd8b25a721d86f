use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("request to {url} failed")]
    Request { url: String, source: reqwest::Error },

    #[error("failed to read response body from {url}")]
    Body { url: String, source: reqwest::Error },
}

/// Status, lower-cased headers, and text body of a finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: body.to_owned(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_owned());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Abstraction over HTTP access for testability.
///
/// Production code uses [`RealFetcher`], tests use mockall-generated mocks.
/// Non-2xx responses are returned as values; only transport failures are
/// errors.
#[allow(async_fn_in_trait)]
pub trait HttpFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, HttpError>;

    async fn head(&self, url: &str) -> Result<FetchResponse, HttpError>;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone, Default)]
pub struct RealFetcher {
    client: reqwest::Client,
}

impl RealFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<FetchResponse, HttpError> {
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response.text().await.map_err(|e| HttpError::Body {
            url: url.to_owned(),
            source: e,
        })?;

        tracing::debug!(url, status, bytes = body.len(), "response received");
        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

impl HttpFetcher for RealFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HttpError::Request {
                url: url.to_owned(),
                source: e,
            })?;
        Self::read(url, response).await
    }

    async fn head(&self, url: &str) -> Result<FetchResponse, HttpError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| HttpError::Request {
                url: url.to_owned(),
                source: e,
            })?;
        Self::read(url, response).await
    }
}
