//! Startup connectivity probe
//!
//! Fetches the live-matches feed once before the listener opens so a bad API
//! key or an unreachable upstream shows up in the console immediately.
//! The result is only logged; the gateway starts either way.

use serde::Deserialize;
use thiserror::Error;

use crate::logger;
use crate::routing::{QueryParams, RouteTable};
use crate::upstream::{ProxyOutcome, Upstream};

/// Route whose upstream URL is probed
const PROBE_ROUTE: &str = "/api/live";

/// Matches listed in the probe report
const LISTED_MATCHES: usize = 5;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("route {0} is not registered")]
    MissingRoute(&'static str),
    #[error("HTTP Error {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("{0}")]
    Network(String),
    #[error("{0}")]
    Unclassified(String),
    #[error("invalid JSON from upstream: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("API rejected the request: {0}")]
    Rejected(String),
}

/// `currentMatches` response, only the parts the probe reads
#[derive(Debug, Deserialize)]
struct MatchList {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    data: Option<Vec<MatchSummary>>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub match_started: bool,
    #[serde(default)]
    pub match_ended: bool,
}

impl MatchSummary {
    pub const fn is_live(&self) -> bool {
        self.match_started && !self.match_ended
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProbeReport {
    pub available: usize,
    /// First few matches, in upstream order
    pub matches: Vec<MatchSummary>,
}

/// Parse a `currentMatches` body into a report
pub fn summarize(body: &[u8]) -> Result<ProbeReport, ProbeError> {
    let list: MatchList = serde_json::from_slice(body)?;
    if list.status.as_deref() == Some("failure") {
        return Err(ProbeError::Rejected(
            list.reason.unwrap_or_else(|| "unknown reason".to_string()),
        ));
    }

    let data = list.data.unwrap_or_default();
    Ok(ProbeReport {
        available: data.len(),
        matches: data.into_iter().take(LISTED_MATCHES).collect(),
    })
}

/// Call the live-matches feed once and summarize it
pub async fn probe(upstream: &dyn Upstream, routes: &RouteTable) -> Result<ProbeReport, ProbeError> {
    let url = routes
        .build_url(PROBE_ROUTE, &QueryParams::default())
        .ok_or(ProbeError::MissingRoute(PROBE_ROUTE))?;

    match upstream.fetch(&url).await {
        ProxyOutcome::Success(body) => summarize(&body),
        ProxyOutcome::UpstreamHttpError { status, detail } => {
            Err(ProbeError::Http { status, detail })
        }
        ProxyOutcome::UpstreamNetworkError(reason) => Err(ProbeError::Network(reason)),
        ProxyOutcome::UnclassifiedError(message) => Err(ProbeError::Unclassified(message)),
    }
}

/// Probe and log the outcome
pub async fn run(upstream: &dyn Upstream, routes: &RouteTable) {
    logger::log_probe_start();
    match probe(upstream, routes).await {
        Ok(report) => {
            logger::log_probe_connected(report.available);
            for m in &report.matches {
                logger::log_probe_match(
                    m.is_live(),
                    m.name.as_deref().unwrap_or("?"),
                    m.id.as_deref().unwrap_or("?"),
                );
            }
        }
        Err(e) => logger::log_probe_failed(&e.to_string()),
    }
}
