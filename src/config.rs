// src/config.rs
// =============================================================================
// Settings for the link checker.
//
// Built once at startup from the command line (see cli.rs), validated, and
// then only read. Every request shares the same copy.
// =============================================================================

use anyhow::{bail, Result};
use std::time::Duration;

use crate::checker::{DomainMatch, DomainPolicy};

pub const DEFAULT_USER_AGENT: &str = concat!("link-guardian/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Hosts that are reported as unverifiable instead of being requested
    pub restricted_domains: Vec<String>,
    pub domain_match: DomainMatch,
    /// How many links are checked at the same time
    pub concurrency: usize,
    /// Upper bound for checking one link
    pub link_timeout: Duration,
    /// Upper bound for the whole check, page fetch included
    pub batch_timeout: Duration,
    pub max_redirects: usize,
    /// On batch timeout, report unfinished links as broken instead of failing
    pub allow_partial: bool,
    pub user_agent: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            restricted_domains: DomainPolicy::DEFAULT_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            domain_match: DomainMatch::default(),
            concurrency: 10,
            link_timeout: Duration::from_secs(10),
            batch_timeout: Duration::from_secs(120),
            max_redirects: 5,
            allow_partial: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CheckerConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `concurrency` is not between 1 and 256
    /// - either timeout is zero
    /// - `max_redirects` is above 20
    /// - a restricted domain entry is blank
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 || self.concurrency > 256 {
            bail!(
                "concurrency must be between 1 and 256, got {}",
                self.concurrency
            );
        }

        if self.link_timeout.is_zero() {
            bail!("link timeout must be greater than 0");
        }

        if self.batch_timeout.is_zero() {
            bail!("batch timeout must be greater than 0");
        }

        if self.max_redirects > 20 {
            bail!("max redirects must be at most 20, got {}", self.max_redirects);
        }

        if self.restricted_domains.iter().any(|d| d.trim().is_empty()) {
            bail!("restricted domains must not contain empty entries");
        }

        if self.user_agent.trim().is_empty() {
            bail!("user agent must not be empty");
        }

        Ok(())
    }

    pub fn domain_policy(&self) -> DomainPolicy {
        DomainPolicy::new(&self.restricted_domains, self.domain_match)
    }
}
