// Application state module
// Read-only state shared by every connection

use std::path::PathBuf;
use std::sync::Arc;

use super::types::Config;
use crate::routing::RouteTable;
use crate::upstream::Upstream;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub upstream: Arc<dyn Upstream>,
    /// Resolved once at startup
    pub dashboard_path: PathBuf,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn Upstream>) -> Self {
        let routes = RouteTable::new(config.credentials());
        let dashboard_path = config.dashboard_path();
        Self {
            config,
            routes,
            upstream,
            dashboard_path,
        }
    }

    /// Whether access lines are written for every request
    pub const fn access_log(&self) -> bool {
        self.config.logging.access_log
    }
}
