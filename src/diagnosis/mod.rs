//! Scan diagnosis module
//!
//! Maps the leading bytes of an uploaded scan to a canned diagnosis:
//! - `signature`: hex signature extraction and the fixed lookup table
//! - `result`: the JSON result returned to the caller

pub mod result;
pub mod signature;

pub use result::DiagnosisResult;
pub use signature::extract_signature;

/// Diagnose an uploaded file from its raw bytes.
///
/// Returns the first table entry whose signature prefixes the file's
/// signature, or the fallback result when none does.
pub fn diagnose(content: &[u8]) -> DiagnosisResult {
    let signature = extract_signature(content);
    signature::find_entry(&signature)
        .map_or_else(DiagnosisResult::fallback, DiagnosisResult::from_entry)
}
