//! HTTP protocol layer module
//!
//! Response builders shared by every branch of the diagnosis handler:
//! permissive CORS headers, JSON envelopes and the preflight reply.

pub mod response;

// Re-export commonly used types
pub use response::{
    build_405_response, build_error_response, build_health_response, build_preflight_response,
    json_response,
};
