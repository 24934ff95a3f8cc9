//! reqwest-backed upstream client

use std::time::Duration;

use async_trait::async_trait;

use super::{snippet, ProxyOutcome, Upstream, DETAIL_CHARS};
use crate::logger;

/// Characters of a successful body echoed to the log
const PREVIEW_CHARS: usize = 150;

/// Calls the upstream API with a fixed User-Agent and a bounded timeout
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, url: &str) -> ProxyOutcome {
        logger::log_proxy_call(url);

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => return classify_error(&e),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => return classify_error(&e),
        };

        if !status.is_success() {
            let detail = snippet(&body, DETAIL_CHARS);
            logger::log_upstream_http_error(status.as_u16(), &detail);
            return ProxyOutcome::UpstreamHttpError {
                status: status.as_u16(),
                detail,
            };
        }

        logger::log_upstream_preview(&snippet(&body, PREVIEW_CHARS));
        ProxyOutcome::Success(body)
    }
}

/// Split transport failures (no response) from everything else
fn classify_error(err: &reqwest::Error) -> ProxyOutcome {
    if err.is_timeout() {
        logger::log_upstream_failure("URL Error", "timed out");
        return ProxyOutcome::UpstreamNetworkError("timed out".to_string());
    }
    if err.is_connect() || err.is_request() {
        let reason = root_cause(err);
        logger::log_upstream_failure("URL Error", &reason);
        return ProxyOutcome::UpstreamNetworkError(reason);
    }
    let message = err.to_string();
    logger::log_upstream_failure("Error", &message);
    ProxyOutcome::UnclassifiedError(message)
}

/// Innermost error message, e.g. "Connection refused (os error 111)"
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
