//! Walks page-numbered GitHub list endpoints to exhaustion.
//!
//! Pages are requested one after another starting at 1. After each page exactly one
//! [`PageOutcome`] is computed, checking in order:
//! 1. an empty page stops the walk without contributing records,
//! 2. a missing `rel="next"` link stops it after keeping the page,
//! 3. for date-bounded walks, a page reaching past the boundary stops it after keeping the page.

use crate::config::RepoId;
use crate::error::FetchError;
use crate::github::{get_checked, Transport};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

pub const PAGE_SIZE: u32 = 100;

/// Formats a timestamp the way the `since` query parameter expects it.
pub fn format_since(since: DateTime<Utc>) -> String {
    since.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub repo: &'a RepoId,
    /// Path below the repository, e.g. "commits".
    pub endpoint: &'a str,
    /// 1-based page index.
    pub page: u32,
    pub since: Option<DateTime<Utc>>,
}

impl PageRequest<'_> {
    pub fn path(&self) -> String {
        let mut path = format!(
            "/repos/{}/{}/{}?",
            self.repo.owner, self.repo.repo, self.endpoint
        );
        if let Some(since) = self.since {
            path.push_str(&format!("since={}&", format_since(since)));
        }
        path.push_str(&format!("page={}&per_page={}", self.page, PAGE_SIZE));
        path
    }
}

/// Stops a walk once records older than `since` have been seen.
///
/// `since` is also sent to the server, which filters on it when the endpoint supports it.
pub struct DateBoundary<T> {
    pub since: DateTime<Utc>,
    pub timestamp: fn(&T) -> DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageOutcome {
    Continue(u32),
    StopEmpty,
    StopNoNextLink,
    StopDateBoundary,
}

/// Whether a `Link` header advertises a next page.
///
/// A response without a `Link` header has no next page.
pub fn has_next_link(link: Option<&str>) -> bool {
    link.is_some_and(|header| {
        header
            .split(',')
            .any(|entry| entry.split(';').skip(1).any(is_next_rel))
    })
}

fn is_next_rel(param: &str) -> bool {
    let Some((key, value)) = param.split_once('=') else {
        return false;
    };
    key.trim().eq_ignore_ascii_case("rel")
        && value
            .trim()
            .trim_matches('"')
            .split_whitespace()
            .any(|rel| rel.eq_ignore_ascii_case("next"))
}

/// Decides what follows the page `page` that produced `records`.
pub fn next_step<T>(
    page: u32,
    records: &[T],
    has_next: bool,
    boundary: Option<&DateBoundary<T>>,
) -> PageOutcome {
    if records.is_empty() {
        return PageOutcome::StopEmpty;
    }
    if !has_next {
        return PageOutcome::StopNoNextLink;
    }
    if let Some(boundary) = boundary {
        let oldest = records.iter().map(boundary.timestamp).min();
        if oldest.is_some_and(|oldest| oldest < boundary.since) {
            return PageOutcome::StopDateBoundary;
        }
    }
    PageOutcome::Continue(page + 1)
}

pub struct Paginator<'a> {
    transport: &'a dyn Transport,
    repo: &'a RepoId,
}

impl<'a> Paginator<'a> {
    pub fn new(transport: &'a dyn Transport, repo: &'a RepoId) -> Self {
        Self { transport, repo }
    }

    /// Fetches every page of `endpoint` and returns the records in request order.
    ///
    /// Each page is decoded as a JSON array of `W` and turned into records with `build`.
    /// Any transport, status or decode failure aborts the whole walk.
    pub fn walk<W, T>(
        &self,
        endpoint: &str,
        boundary: Option<DateBoundary<T>>,
        build: impl Fn(W) -> T,
    ) -> Result<Vec<T>, FetchError>
    where
        W: DeserializeOwned,
    {
        let since = boundary.as_ref().map(|b| b.since);
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            let path = PageRequest {
                repo: self.repo,
                endpoint,
                page,
                since,
            }
            .path();

            let response = get_checked(self.transport, &path)?;
            let items: Vec<W> =
                serde_json::from_str(&response.body).map_err(|source| FetchError::Decode {
                    endpoint: path.clone(),
                    source,
                })?;
            let items: Vec<T> = items.into_iter().map(&build).collect();

            let outcome = next_step(
                page,
                &items,
                has_next_link(response.link.as_deref()),
                boundary.as_ref(),
            );
            tracing::debug!(
                repo = %self.repo,
                endpoint,
                page,
                records = items.len(),
                ?outcome,
                "Fetched page"
            );
            records.extend(items);

            match outcome {
                PageOutcome::Continue(next) => page = next,
                stop => {
                    tracing::info!(
                        repo = %self.repo,
                        endpoint,
                        pages = page,
                        records = records.len(),
                        reason = ?stop,
                        "Finished paginated fetch"
                    );
                    return Ok(records);
                }
            }
        }
    }
}
