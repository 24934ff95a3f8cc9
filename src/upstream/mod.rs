//! Upstream client module
//!
//! One outbound GET per proxied request, classified into a closed set of
//! outcomes the response writer maps onto HTTP statuses.

mod client;

pub use client::HttpUpstream;

use async_trait::async_trait;
use hyper::body::Bytes;

/// Characters of an upstream error body echoed back as `detail`
pub const DETAIL_CHARS: usize = 200;

/// Result of one upstream call, consumed once by the response writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// 2xx response, body passed through untouched
    Success(Bytes),
    /// Upstream answered with a non-2xx status
    UpstreamHttpError { status: u16, detail: String },
    /// No response obtained: DNS, refused connection, TLS, timeout
    UpstreamNetworkError(String),
    /// Anything else that went wrong during the call
    UnclassifiedError(String),
}

/// Performs upstream calls; stubbed in tests
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, url: &str) -> ProxyOutcome;
}

/// First `max_chars` characters of a body, invalid UTF-8 replaced
pub fn snippet(body: &[u8], max_chars: usize) -> String {
    String::from_utf8_lossy(body).chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_counts_chars_not_bytes() {
        let body = "é".repeat(300);
        let s = snippet(body.as_bytes(), DETAIL_CHARS);
        assert_eq!(s.chars().count(), 200);
        assert_eq!(s.len(), 400);
    }

    #[test]
    fn test_snippet_replaces_invalid_utf8() {
        assert_eq!(snippet(&[b'o', 0xff, b'k'], 10), "o\u{fffd}k");
        assert_eq!(snippet(b"short", 200), "short");
    }
}
