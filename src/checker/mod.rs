// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - html: Extracts links from HTML pages
// - policy: Decides which hosts are too hostile to check
// - http: Makes HTTP requests to check if one link is alive
// - batch: Fetches a page and checks all of its links
// - error: What can make a whole check fail
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod batch;
mod error;
mod html;
mod http;
mod policy;

// Re-export public items from submodules
// This lets users write `checker::BatchChecker` instead of
// `checker::batch::BatchChecker`
pub use batch::{BatchChecker, Report, Summary};
pub use error::CheckError;
pub use html::Link;
pub use http::{CheckResult, LinkStatus, UnverifiableReason};
pub use policy::{DomainMatch, DomainPolicy};
