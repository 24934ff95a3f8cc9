//! Route table module
//!
//! Maps the fixed set of local API paths to upstream URL builders.
//! Adding a route is a change to `ROUTES`, not to the router.

use super::query::QueryParams;

/// Builds the upstream URL for one request
pub type UrlBuilder = fn(&QueryParams, &Credentials) -> String;

/// Upstream location and the API key injected into every call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    api_key: String,
}

impl Credentials {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// `{base}/{endpoint}?apikey={key}` followed by `extra` (`&k=v...`)
    fn endpoint(&self, endpoint: &str, extra: &str) -> String {
        format!(
            "{}/{endpoint}?apikey={}{extra}",
            self.base_url, self.api_key
        )
    }
}

/// A local path and the rule for building its upstream URL
#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub build: UrlBuilder,
}

/// Every proxied path, in match order
pub const ROUTES: [Route; 5] = [
    Route { path: "/api/live", build: live_matches },
    Route { path: "/api/scores", build: current_scores },
    Route { path: "/api/scorecard", build: scorecard },
    Route { path: "/api/match", build: match_info },
    Route { path: "/api/series", build: series_list },
];

fn live_matches(_: &QueryParams, creds: &Credentials) -> String {
    creds.endpoint("currentMatches", "&offset=0")
}

fn current_scores(_: &QueryParams, creds: &Credentials) -> String {
    creds.endpoint("cricScore", "")
}

fn scorecard(params: &QueryParams, creds: &Credentials) -> String {
    creds.endpoint("match_scorecard", &format!("&id={}", match_id(params)))
}

fn match_info(params: &QueryParams, creds: &Credentials) -> String {
    creds.endpoint("match_info", &format!("&id={}", match_id(params)))
}

fn series_list(_: &QueryParams, creds: &Credentials) -> String {
    creds.endpoint("series", "&offset=0")
}

/// First `id` value, re-encoded for the query string; empty when missing
/// so the upstream gets (and rejects) `id=`
fn match_id(params: &QueryParams) -> String {
    params
        .first("id")
        .map(|id| url::form_urlencoded::byte_serialize(id.as_bytes()).collect())
        .unwrap_or_default()
}

/// Read-only lookup shared by every connection
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: &'static [Route],
    credentials: Credentials,
}

impl RouteTable {
    pub const fn new(credentials: Credentials) -> Self {
        Self {
            routes: &ROUTES,
            credentials,
        }
    }

    /// Route registered for `path`, exact match only
    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.path == path)
    }

    /// Upstream URL for `path`, or `None` if the path is not proxied
    pub fn build_url(&self, path: &str, params: &QueryParams) -> Option<String> {
        self.resolve(path)
            .map(|route| (route.build)(params, &self.credentials))
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.iter().map(|route| route.path)
    }

    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}
