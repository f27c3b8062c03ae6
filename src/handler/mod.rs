//! Request handler module
//!
//! Responsible for request routing dispatch and the stats endpoint.

pub mod router;
pub mod stats;

// Re-export main entry point
pub use router::handle_request;
