// src/models/context.rs

//! The site identity under test, plus its per-session page memo.

use tokio::sync::OnceCell;

use crate::utils::http::PageFetcher;

/// A site under identification or extraction.
///
/// Carries the base URL, any request headers the caller's session layer
/// wants injected, and optionally a pre-fetched page body. One context is
/// one session: the first predicate or extraction that needs the page body
/// triggers exactly one fetch, and every later use within the session reuses
/// the memoized result. A fetch failure is memoized as "no page" so a whole
/// rule tree degrades to false instead of hammering an unreachable host.
#[derive(Debug)]
pub struct SiteContext {
    base_url: String,
    headers: Vec<(String, String)>,
    prefetched: Option<String>,
    body: OnceCell<Option<String>>,
}

impl SiteContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Vec::new(),
            prefetched: None,
            body: OnceCell::new(),
        }
    }

    /// Add a request header, e.g. an auth token.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a session cookie header.
    pub fn with_cookie(self, value: impl Into<String>) -> Self {
        self.with_header("Cookie", value)
    }

    /// Supply the page body up front; no fetch will happen.
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.prefetched = Some(html.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Same site identity, empty page memo.
    ///
    /// Caller-prefetched HTML is part of the identity and is carried over;
    /// anything fetched over the network is not.
    pub fn fresh_session(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
            prefetched: self.prefetched.clone(),
            body: OnceCell::new(),
        }
    }

    /// The page body for this session, fetching at most once.
    pub(crate) async fn body(&self, fetcher: &dyn PageFetcher) -> Option<&str> {
        self.body
            .get_or_init(|| async {
                if let Some(html) = &self.prefetched {
                    return Some(html.clone());
                }
                match fetcher.fetch(&self.base_url, &self.headers).await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        log::warn!("fetch failed for {}: {}", self.base_url, e);
                        None
                    }
                }
            })
            .await
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_keeps_identity() {
        let ctx = SiteContext::new("https://tracker.example/")
            .with_cookie("session=abc")
            .with_html("<html></html>");
        let fresh = ctx.fresh_session();
        assert_eq!(fresh.base_url(), "https://tracker.example/");
        assert_eq!(fresh.headers(), ctx.headers());
        assert_eq!(fresh.prefetched.as_deref(), Some("<html></html>"));
    }
}
