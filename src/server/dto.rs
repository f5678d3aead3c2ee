// src/server/dto.rs
// =============================================================================
// JSON shapes of the POST /check-links endpoint.
//
// The web form reads these field names directly; keep them stable.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::checker::{CheckResult, LinkStatus, Report, Summary};

#[derive(Debug, Deserialize)]
pub struct CheckLinksRequest {
    /// Optional so a missing field gets our own 400 message
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckLinksResponse {
    pub total_links: usize,
    pub summary: Summary,
    pub broken_links: Vec<LinkItem>,
    pub working_links: Vec<LinkItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub url: String,
    pub status: WireStatus,
    pub message: String,
}

/// `status` is a number when we got an HTTP answer, a label otherwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WireStatus {
    Code(u16),
    Label(&'static str),
}

impl From<LinkStatus> for WireStatus {
    fn from(status: LinkStatus) -> Self {
        match status {
            LinkStatus::Working(code) | LinkStatus::Broken(Some(code)) => WireStatus::Code(code),
            LinkStatus::Broken(None) => WireStatus::Label("Unknown"),
            LinkStatus::Unverifiable(_) => WireStatus::Label("Restricted"),
        }
    }
}

impl From<&CheckResult> for LinkItem {
    fn from(result: &CheckResult) -> Self {
        Self {
            url: result.link.url.clone(),
            status: result.status.into(),
            message: result.message.clone(),
        }
    }
}

impl From<&Report> for CheckLinksResponse {
    fn from(report: &Report) -> Self {
        Self {
            total_links: report.total_links,
            summary: report.summary,
            broken_links: report.broken_links.iter().map(LinkItem::from).collect(),
            working_links: report.working_links.iter().map(LinkItem::from).collect(),
            parse_error: report.parse_error.clone(),
        }
    }
}
