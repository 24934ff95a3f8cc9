//! HTTP protocol layer module
//!
//! Response building shared by the router, the static page and the proxy path.

pub mod response;

// Re-export commonly used types
pub use response::{
    error_response, from_outcome, html_response, method_not_allowed, not_found,
    options_response, HttpResponse,
};
