// src/checker/error.rs
// =============================================================================
// Error types for the checker core.
//
// Only failures of the whole batch live here. A single link that cannot be
// reached is NOT an error - it becomes a Broken status on that link.
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// =============================================================================

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    /// The site URL given by the caller is not an absolute http(s) URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The site page itself could not be fetched
    #[error("Could not fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The page content is not a markup document we can pull links out of
    #[error("Could not parse page content: {0}")]
    Parse(String),

    /// The whole batch ran past its deadline
    #[error("Link check did not finish within {} seconds", .0.as_secs())]
    BatchTimeout(Duration),

    /// The HTTP client could not be built (bad TLS backend, bad user agent...)
    #[error("Could not create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
