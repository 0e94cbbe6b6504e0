//! HTTP transport to the GitHub REST API.
//!
//! Fetchers only depend on the [`Transport`] seam: a blocking GET of a path relative to
//! the API base url. [`GitHubClient`] implements it on top of octocrab, driving each
//! request to completion on its own current-thread runtime.

use crate::config::Credentials;
use crate::error::{BoxError, ConfigError, FetchError};
use octocrab::Octocrab;
use tokio::runtime::{Builder, Runtime};

/// A response as the fetchers see it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    /// The raw `Link` header, if the server sent one.
    pub link: Option<String>,
}

/// Issues GET requests against a fixed API base url.
pub trait Transport {
    /// Blocks until the response for `path_and_query` (e.g. `/repos/o/r/branches?page=1`)
    /// has been fully received.
    fn get(&self, path_and_query: &str) -> Result<RawResponse, BoxError>;
}

/// Performs a GET and classifies the response status.
///
/// 202 means GitHub is still computing the requested statistics.
pub(crate) fn get_checked(
    transport: &dyn Transport,
    path_and_query: &str,
) -> Result<RawResponse, FetchError> {
    let response = transport
        .get(path_and_query)
        .map_err(|source| FetchError::Transport {
            endpoint: path_and_query.to_string(),
            source,
        })?;

    match response.status {
        202 => Err(FetchError::Pending {
            endpoint: path_and_query.to_string(),
        }),
        200..=299 => Ok(response),
        status => Err(FetchError::Status {
            endpoint: path_and_query.to_string(),
            status,
        }),
    }
}

pub struct GitHubClient {
    octocrab: Octocrab,
    runtime: Runtime,
}

impl GitHubClient {
    pub fn new(base_url: &str, credentials: Option<Credentials>) -> Result<Self, ConfigError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConfigError::HttpClient(e.into()))?;

        let mut builder = Octocrab::builder()
            .base_uri(base_url)
            .map_err(|e| ConfigError::HttpClient(e.into()))?;
        match credentials {
            Some(Credentials::Basic { username, token }) => {
                builder = builder.basic_auth(username, token);
            }
            Some(Credentials::Token(token)) => {
                builder = builder.personal_token(token);
            }
            None => tracing::debug!("No GitHub credentials configured, requests are anonymous"),
        }

        // octocrab's service stack expects to be built inside a runtime context.
        let octocrab = {
            let _guard = runtime.enter();
            builder
                .build()
                .map_err(|e| ConfigError::HttpClient(e.into()))?
        };

        Ok(Self { octocrab, runtime })
    }
}

impl Transport for GitHubClient {
    fn get(&self, path_and_query: &str) -> Result<RawResponse, BoxError> {
        self.runtime.block_on(async {
            let response = self.octocrab._get(path_and_query).await?;
            let status = response.status().as_u16();
            let link = response
                .headers()
                .get("link")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let body = self.octocrab.body_to_string(response).await?;

            Ok::<_, BoxError>(RawResponse { status, body, link })
        })
    }
}
