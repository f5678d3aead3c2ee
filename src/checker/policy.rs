// src/checker/policy.rs
// =============================================================================
// Restricted domains.
//
// Some sites (LinkedIn, X/Twitter, ...) answer automated clients with 403,
// 999 or similar no matter whether the page exists. Checking them would
// report working links as broken, so links to these hosts are marked
// "unverifiable" instead and never requested.
//
// The policy is built once at startup and then only read, so it can be
// shared between all concurrent checks behind an Arc without locking.
// =============================================================================

use clap::ValueEnum;
use url::Url;

/// How a host is compared against the restricted domain list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DomainMatch {
    /// Host contains the domain anywhere (loose: `x.com` also matches `netflix.com`)
    Contains,
    /// Host is the domain or a subdomain of it
    #[default]
    Suffix,
}

/// The list of hosts that block automated link checks
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    domains: Vec<String>,
    mode: DomainMatch,
}

impl DomainPolicy {
    pub const DEFAULT_DOMAINS: [&'static str; 3] = ["linkedin.com", "x.com", "twitter.com"];

    pub fn new<I, S>(domains: I, mode: DomainMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self { domains, mode }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Returns true when `url` points at a restricted host.
    ///
    /// Never fails: a URL that does not parse (or has no host) is checked
    /// by plain containment against the raw string.
    pub fn is_restricted(&self, url: &str) -> bool {
        let host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_ascii_lowercase));

        match host {
            Some(host) => self.domains.iter().any(|d| self.host_matches(&host, d)),
            None => {
                let raw = url.to_ascii_lowercase();
                self.domains.iter().any(|d| raw.contains(d.as_str()))
            }
        }
    }

    fn host_matches(&self, host: &str, domain: &str) -> bool {
        match self.mode {
            DomainMatch::Contains => host.contains(domain),
            DomainMatch::Suffix => {
                host == domain
                    || host
                        .strip_suffix(domain)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
        }
    }
}

impl Default for DomainPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DOMAINS, DomainMatch::default())
    }
}
