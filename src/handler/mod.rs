//! Request handler module
//!
//! The single diagnosis endpoint: method dispatch, multipart upload
//! extraction and the error boundary that turns faults into JSON.

pub mod error;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
