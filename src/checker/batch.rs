// src/checker/batch.rs
// =============================================================================
// This module checks every link on one page and builds the report.
//
// How it works:
// 1. Fetch the site page (failure here fails the whole check)
// 2. Extract its links (unparseable content = zero links, not a failure)
// 3. Verify the links concurrently, at most `concurrency` at a time
// 4. Put each result back in the slot of the link it belongs to
// 5. Split the results into working/broken, keeping extraction order
//
// The whole check runs against one deadline. When it passes, links still
// in flight are either reported as Broken(None) (allow_partial) or the
// check fails with BatchTimeout.
//
// Rust concepts:
// - Streams: buffer_unordered runs N futures at once
// - Indexes: results come back in completion order, the index puts them
//   back in extraction order
// =============================================================================

use futures::stream::{self, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};
use url::Url;

use super::error::CheckError;
use super::html::{extract_html_links, Link};
use super::http::{describe_error, redirect_policy, CheckResult, LinkVerifier, Verdict};
use crate::config::CheckerConfig;

/// Counts shown next to the link lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub working: usize,
    pub broken: usize,
}

/// Everything one check found out about one page.
///
/// Unverifiable links are listed in `broken_links` (and counted as broken)
/// but keep their own status so consumers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The page that was checked, as the caller asked for it
    pub site_url: String,
    pub total_links: usize,
    pub working_links: Vec<CheckResult>,
    pub broken_links: Vec<CheckResult>,
    pub summary: Summary,
    /// Set when the page could not be read as markup
    pub parse_error: Option<String>,
}

impl Report {
    // Stable partition: each list keeps the relative order of `results`
    pub fn from_results(
        site_url: String,
        results: Vec<CheckResult>,
        parse_error: Option<String>,
    ) -> Self {
        let total_links = results.len();
        let (working_links, broken_links): (Vec<_>, Vec<_>) =
            results.into_iter().partition(CheckResult::is_ok);

        let summary = Summary {
            total: total_links,
            working: working_links.len(),
            broken: broken_links.len(),
        };

        Self {
            site_url,
            total_links,
            working_links,
            broken_links,
            summary,
            parse_error,
        }
    }
}

// A fetched site page
struct Page {
    // Where we ended up after redirects; relative links resolve against it
    url: Url,
    content_type: Option<String>,
    body: String,
}

/// Fetches a page, then checks all of its links.
///
/// Holds only read-only state, so one instance serves every request.
#[derive(Debug, Clone)]
pub struct BatchChecker {
    client: Client,
    verifier: LinkVerifier,
    config: CheckerConfig,
}

impl BatchChecker {
    pub fn new(config: CheckerConfig) -> Result<Self, CheckError> {
        // We'll reuse these clients for all requests (connection pooling).
        // The site page may redirect anywhere; links stop short of a
        // restricted host so the verifier can report them as unverifiable.
        let builder = || {
            Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.link_timeout)
                .connect_timeout(config.link_timeout)
        };

        let policy = Arc::new(config.domain_policy());
        let client = builder()
            .redirect(redirect_policy(config.max_redirects, None))
            .build()?;
        let link_client = builder()
            .redirect(redirect_policy(config.max_redirects, Some(policy.clone())))
            .build()?;
        let verifier = LinkVerifier::new(link_client, policy, config.link_timeout);

        Ok(Self {
            client,
            verifier,
            config,
        })
    }

    /// Checks every link on `site_url`.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` when `site_url` is not an absolute http(s) URL
    /// - `Fetch` when the page itself cannot be fetched
    /// - `BatchTimeout` when the deadline passes and partial reports are off
    pub async fn check(&self, site_url: &str) -> Result<Report, CheckError> {
        let site = parse_site_url(site_url)?;
        let deadline = Instant::now() + self.config.batch_timeout;

        info!(site = %site, "checking links");

        let page = tokio::time::timeout_at(deadline, self.fetch_page(&site))
            .await
            .map_err(|_| self.batch_timeout(&site))??;

        let (links, parse_error) = match self.extract(&page) {
            Ok(links) => (links, None),
            Err(CheckError::Parse(reason)) => {
                warn!(site = %site, %reason, "page is not markup, no links to check");
                (Vec::new(), Some(reason))
            }
            Err(e) => return Err(e),
        };

        let verdicts = self.verify_all(&links, deadline, &site).await?;

        let results = links
            .into_iter()
            .zip(verdicts)
            .map(|(link, verdict)| CheckResult::new(link, verdict))
            .collect();

        let report = Report::from_results(site.to_string(), results, parse_error);

        info!(
            site = %site,
            total = report.summary.total,
            working = report.summary.working,
            broken = report.summary.broken,
            "link check finished"
        );

        Ok(report)
    }

    // Fetches a web page and returns its content
    async fn fetch_page(&self, site: &Url) -> Result<Page, CheckError> {
        let fetch_error = |reason: String| {
            warn!(site = %site, %reason, "could not fetch site");
            CheckError::Fetch {
                url: site.to_string(),
                reason,
            }
        };

        let response = self
            .client
            .get(site.clone())
            .send()
            .await
            .map_err(|e| fetch_error(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(describe_error(&e)))?;

        Ok(Page {
            url,
            content_type,
            body,
        })
    }

    fn extract(&self, page: &Page) -> Result<Vec<Link>, CheckError> {
        if let Some(content_type) = &page.content_type {
            if !is_markup_content_type(content_type) {
                return Err(CheckError::Parse(format!(
                    "unsupported content type '{}'",
                    content_type
                )));
            }
        }

        extract_html_links(&page.body, &page.url)
    }

    // Runs the verifications with bounded parallelism.
    //
    // `slots[i]` holds the verdict for `links[i]`. Workers finish in any
    // order; the index they carry decides where their verdict goes, so the
    // returned Vec lines up with `links` no matter who finished first.
    async fn verify_all(
        &self,
        links: &[Link],
        deadline: Instant,
        site: &Url,
    ) -> Result<Vec<Verdict>, CheckError> {
        let mut slots: Vec<Option<Verdict>> = vec![None; links.len()];

        // Each future owns its link and a handle to the verifier
        let mut pending = stream::iter(links.iter().cloned().enumerate())
            .map(|(index, link)| {
                let verifier = self.verifier.clone();
                async move { (index, verifier.verify(&link).await) }
            })
            .buffer_unordered(self.config.concurrency);

        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((index, verdict))) => slots[index] = Some(verdict),
                Ok(None) => break,
                Err(_) if self.config.allow_partial => {
                    let unfinished = slots.iter().filter(|s| s.is_none()).count();
                    warn!(site = %site, unfinished, "batch deadline passed, reporting partial results");
                    break;
                }
                Err(_) => return Err(self.batch_timeout(site)),
            }
        }

        // Dropping `pending` here abandons whatever is still in flight
        Ok(slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(Verdict::batch_timed_out))
            .collect())
    }

    fn batch_timeout(&self, site: &Url) -> CheckError {
        warn!(site = %site, timeout = ?self.config.batch_timeout, "batch deadline passed");
        CheckError::BatchTimeout(self.config.batch_timeout)
    }
}

// Parses and validates the URL the caller asked us to check
fn parse_site_url(site_url: &str) -> Result<Url, CheckError> {
    let invalid = |reason: String| CheckError::InvalidUrl {
        url: site_url.to_string(),
        reason,
    };

    let url = Url::parse(site_url.trim()).map_err(|e| invalid(e.to_string()))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        "http" | "https" => Err(invalid("URL has no host".to_string())),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}

// text/html, application/xhtml+xml, application/xml...
fn is_markup_content_type(content_type: &str) -> bool {
    let mime = content_type.to_ascii_lowercase();
    mime.contains("html") || mime.contains("xml")
}
