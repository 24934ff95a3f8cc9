//! Request handler module
//!
//! Routes each request to the dashboard page, the upstream proxy, or an error.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
