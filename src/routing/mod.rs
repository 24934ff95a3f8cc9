//! Routing module
//!
//! Provides the proxied API surface:
//! - Query string parsing into per-request parameters
//! - The fixed route table mapping local paths to upstream URLs

mod query;
mod table;

pub use query::QueryParams;
pub use table::{Credentials, RouteTable};
