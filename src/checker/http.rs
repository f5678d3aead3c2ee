// src/checker/http.rs
// =============================================================================
// This module checks if a single link is alive by making an HTTP request.
//
// Key functionality:
// - Skips restricted domains without touching the network
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server does not support HEAD (405/501)
// - Follows a bounded number of redirects, never into a restricted domain
// - Bounds every check with a timeout
//
// One attempt per link, no retries: a failure here is a result
// (Broken), never an error that stops the batch.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Enums: To represent different link states
// - Arc: To share the read-only domain policy between tasks
// =============================================================================

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::html::Link;
use super::policy::DomainPolicy;

/// Why a link could not be verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnverifiableReason {
    /// The host blocks automated clients, see DomainPolicy
    DomainRestricted,
}

/// Represents the status of a link after checking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Final response was 2xx or 3xx
    Working(u16),
    /// Final response was 4xx/5xx (Some), or no response at all (None)
    Broken(Option<u16>),
    /// Not checked on purpose. Not the same thing as broken!
    Unverifiable(UnverifiableReason),
}

impl LinkStatus {
    pub fn is_working(&self) -> bool {
        matches!(self, LinkStatus::Working(_))
    }
}

/// Status of one link plus a short human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: LinkStatus,
    pub message: String,
}

impl Verdict {
    fn new(status: LinkStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn restricted(message: &str) -> Self {
        Self::new(
            LinkStatus::Unverifiable(UnverifiableReason::DomainRestricted),
            message,
        )
    }

    /// Verdict for a link that was still in flight when the batch deadline hit
    pub fn batch_timed_out() -> Self {
        Self::new(LinkStatus::Broken(None), "Batch timed out before this link was checked")
    }
}

/// The result of checking a single link. Built once, never changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub link: Link,
    pub status: LinkStatus,
    pub message: String,
}

impl CheckResult {
    pub fn new(link: Link, verdict: Verdict) -> Self {
        Self {
            link,
            status: verdict.status,
            message: verdict.message,
        }
    }

    /// Helper method to check if the link is OK
    pub fn is_ok(&self) -> bool {
        self.status.is_working()
    }
}

/// Checks single links. Cheap to share: the client is reference counted
/// internally and the policy sits behind an Arc.
#[derive(Debug, Clone)]
pub struct LinkVerifier {
    client: Client,
    policy: Arc<DomainPolicy>,
    timeout: Duration,
}

impl LinkVerifier {
    // Parameters:
    //   client: reqwest client built with `redirect_policy(.., Some(policy))`
    //   policy: restricted domains, shared with every other verifier
    //   timeout: upper bound for one link, HEAD + GET fallback included
    pub fn new(client: Client, policy: Arc<DomainPolicy>, timeout: Duration) -> Self {
        Self {
            client,
            policy,
            timeout,
        }
    }

    /// Checks a single link.
    ///
    /// Never fails: every outcome, timeouts included, is a Verdict.
    pub async fn verify(&self, link: &Link) -> Verdict {
        if self.policy.is_restricted(&link.url) {
            debug!(url = %link.url, "restricted domain, not requesting");
            return Verdict::restricted("Domain blocks automated checks");
        }

        let verdict = match tokio::time::timeout(self.timeout, self.request(&link.url)).await {
            Ok(Ok(response)) if self.redirects_to_restricted(&response) => {
                debug!(url = %link.url, "redirects to a restricted domain, not following");
                Verdict::restricted("Redirects to a domain that blocks automated checks")
            }
            Ok(Ok(response)) => analyze_status(response.status()),
            Ok(Err(e)) => categorize_error(&e),
            Err(_) => Verdict::new(LinkStatus::Broken(None), "Request timed out"),
        };

        debug!(url = %link.url, status = ?verdict.status, "link checked");
        verdict
    }

    // First, try a HEAD request (faster, no body download).
    // Some servers reject HEAD outright; ask again with GET. The body is
    // never read, dropping the response closes it.
    async fn request(&self, url: &str) -> Result<Response, reqwest::Error> {
        let response = self.client.head(url).send().await?;

        if matches!(
            response.status(),
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
        ) {
            debug!(url, "HEAD not supported, retrying with GET");
            return self.client.get(url).send().await;
        }

        Ok(response)
    }

    // The redirect policy stops in front of a restricted host and hands back
    // the 3xx itself; its Location tells us where it wanted to go.
    fn redirects_to_restricted(&self, response: &Response) -> bool {
        if !response.status().is_redirection() {
            return false;
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|location| response.url().join(location).ok())
            .is_some_and(|target| self.policy.is_restricted(target.as_str()))
    }
}

/// Redirect handling for the shared clients.
///
/// Follows at most `max_redirects` hops, then fails with a redirect error
/// (reported as "Too many redirects"). With `restricted` set, a hop into a
/// restricted host is not followed: the 3xx pointing there is returned.
pub fn redirect_policy(max_redirects: usize, restricted: Option<Arc<DomainPolicy>>) -> Policy {
    Policy::custom(move |attempt| {
        // previous() holds one URL per redirect taken so far, this one included
        if attempt.previous().len() > max_redirects {
            attempt.error("too many redirects")
        } else if restricted
            .as_ref()
            .is_some_and(|policy| policy.is_restricted(attempt.url().as_str()))
        {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

// Maps the final status code (after redirects) to a link status
//
// HTTP status codes:
// - 200-399: Working (a 3xx here means the redirect had nowhere to go)
// - anything else: Broken, including 4xx, 5xx and non-standard codes
//   such as LinkedIn's 999
fn analyze_status(status_code: StatusCode) -> Verdict {
    let code = status_code.as_u16();
    let message = format!("HTTP {}", code);

    if status_code.is_success() || status_code.is_redirection() {
        Verdict::new(LinkStatus::Working(code), message)
    } else {
        Verdict::new(LinkStatus::Broken(Some(code)), message)
    }
}

// Any request error means the link did not answer: Broken with no code
fn categorize_error(error: &reqwest::Error) -> Verdict {
    Verdict::new(LinkStatus::Broken(None), describe_error(error))
}

// Turns a reqwest error into a short message for humans
//
// reqwest errors can happen for many reasons:
// - Network timeout
// - DNS resolution failure
// - SSL certificate issues
// - Too many redirects
pub(crate) fn describe_error(error: &reqwest::Error) -> String {
    // Lowercase once so the keyword checks below are case-insensitive
    let error_string = format!("{:?}", error).to_lowercase();

    let message = if error.is_timeout() {
        "Request timed out"
    } else if error.is_redirect() {
        "Too many redirects"
    } else if error_string.contains("dns") || error_string.contains("failed to lookup") {
        "Could not resolve hostname"
    } else if error_string.contains("certificate") || error_string.contains("ssl") {
        "SSL certificate error"
    } else if error.is_connect() {
        "Connection failed"
    } else {
        "Request failed"
    };

    message.to_string()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::time::timeout AND a client timeout?
//    - The client timeout bounds each request on its own
//    - HEAD + GET fallback is two requests, so the per-link bound has to
//      wrap both of them
//    - timeout() returns Err(Elapsed) when time runs out; the request
//      future is dropped, which cancels it
//
// 2. Why Option<u16> inside Broken?
//    - Some(404) = the server answered with an error
//    - None = nobody answered (DNS, refused connection, timeout)
//
// 3. Why is Unverifiable separate from Broken?
//    - "We didn't look" is different from "we looked and it's gone"
//    - Consumers must be able to show them differently
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::policy::DomainMatch;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier(restricted: &[&str], timeout: Duration) -> LinkVerifier {
        let policy = Arc::new(DomainPolicy::new(
            restricted.iter().copied(),
            DomainMatch::Contains,
        ));
        let client = Client::builder()
            .redirect(redirect_policy(5, Some(policy.clone())))
            .build()
            .unwrap();
        LinkVerifier::new(client, policy, timeout)
    }

    // /hop/0 -> /hop/1 -> ... -> /hop/{hops}, which answers 200
    async fn redirect_chain(server: &MockServer, hops: usize) {
        for i in 0..hops {
            Mock::given(method("HEAD"))
                .and(path(format!("/hop/{i}")))
                .respond_with(
                    ResponseTemplate::new(302)
                        .insert_header("Location", format!("{}/hop/{}", server.uri(), i + 1)),
                )
                .mount(server)
                .await;
        }
        Mock::given(method("HEAD"))
            .and(path(format!("/hop/{hops}")))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
    }

    fn link(url: String) -> Link {
        Link {
            url,
            source_page: "http://localhost/".to_string(),
        }
    }

    #[tokio::test]
    async fn test_ok_and_missing() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));

        let ok = v.verify(&link(format!("{}/ok", server.uri()))).await;
        assert_eq!(ok.status, LinkStatus::Working(200));

        let missing = v.verify(&link(format!("{}/missing", server.uri()))).await;
        assert_eq!(missing.status, LinkStatus::Broken(Some(404)));
        assert_eq!(missing.message, "HTTP 404");
    }

    #[tokio::test]
    async fn test_server_error_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/down", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(Some(503)));
    }

    #[tokio::test]
    async fn test_falls_back_to_get_when_head_not_allowed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(405))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/no-head", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Working(200));
    }

    #[tokio::test]
    async fn test_non_standard_status_is_broken() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(999))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/in/someone", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(Some(999)));
        assert_eq!(verdict.message, "HTTP 999");
    }

    #[tokio::test]
    async fn test_falls_back_to_get_when_head_not_implemented() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(501))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/no-head"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/no-head", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(Some(404)));
    }

    #[tokio::test]
    async fn test_other_head_errors_do_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/forbidden", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(Some(403)));
    }

    #[tokio::test]
    async fn test_redirect_without_location_is_working() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/choices"))
            .respond_with(ResponseTemplate::new(300))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/choices", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Working(300));
    }

    #[tokio::test]
    async fn test_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/old", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Working(200));
    }

    #[tokio::test]
    async fn test_redirect_loop_is_broken_without_code() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/loop"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("{}/loop", server.uri())),
            )
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/loop", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(None));
        assert_eq!(verdict.message, "Too many redirects");
    }

    #[tokio::test]
    async fn test_follows_exactly_the_redirect_limit() {
        let server = MockServer::start().await;
        redirect_chain(&server, 5).await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/hop/0", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Working(200));
    }

    #[tokio::test]
    async fn test_one_redirect_past_the_limit_is_broken() {
        let server = MockServer::start().await;
        redirect_chain(&server, 6).await;

        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/hop/0", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(None));
        assert_eq!(verdict.message, "Too many redirects");
    }

    #[tokio::test]
    async fn test_redirect_into_restricted_domain_is_unverifiable() {
        let server = MockServer::start().await;
        // Same server under another host name; only that name is restricted
        let port = server.address().port();
        Mock::given(method("HEAD"))
            .and(path("/share"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("Location", format!("http://localhost:{port}/in/someone")),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/in/someone"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let v = verifier(&["localhost"], Duration::from_secs(5));
        let verdict = v
            .verify(&link(format!("http://127.0.0.1:{port}/share")))
            .await;
        assert_eq!(
            verdict.status,
            LinkStatus::Unverifiable(UnverifiableReason::DomainRestricted)
        );
        assert_eq!(
            verdict.message,
            "Redirects to a domain that blocks automated checks"
        );
    }

    #[tokio::test]
    async fn test_slow_link_times_out_as_broken() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let v = verifier(&[], Duration::from_millis(200));
        let verdict = v.verify(&link(format!("{}/slow", server.uri()))).await;
        assert_eq!(verdict.status, LinkStatus::Broken(None));
        assert_eq!(verdict.message, "Request timed out");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_broken_without_code() {
        // Nothing listens on port 1
        let v = verifier(&[], Duration::from_secs(5));
        let verdict = v.verify(&link("http://127.0.0.1:1/".to_string())).await;
        assert_eq!(verdict.status, LinkStatus::Broken(None));
    }

    #[tokio::test]
    async fn test_restricted_domain_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let v = verifier(&["127.0.0.1"], Duration::from_secs(5));
        let verdict = v.verify(&link(format!("{}/profile", server.uri()))).await;
        assert_eq!(
            verdict.status,
            LinkStatus::Unverifiable(UnverifiableReason::DomainRestricted)
        );
        // the .expect(0) above is checked when `server` is dropped
    }

    #[test]
    fn test_link_result_is_ok() {
        let make = |status| CheckResult {
            link: link("https://example.com".to_string()),
            status,
            message: String::new(),
        };

        assert!(make(LinkStatus::Working(200)).is_ok());
        assert!(make(LinkStatus::Working(304)).is_ok());
        assert!(!make(LinkStatus::Broken(Some(404))).is_ok());
        assert!(!make(LinkStatus::Broken(None)).is_ok());
        assert!(!make(LinkStatus::Unverifiable(UnverifiableReason::DomainRestricted)).is_ok());
    }
}
