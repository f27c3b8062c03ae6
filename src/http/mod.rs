//! HTTP protocol layer module
//!
//! Query decoding and response building, decoupled from snapshot logic.

pub mod query;
pub mod response;

// Re-export commonly used types
pub use query::QueryParams;
pub use response::{
    build_404_response, build_error_response, build_health_response, build_json_response,
    build_serialized_response,
};
