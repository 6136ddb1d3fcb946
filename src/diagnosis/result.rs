//! Diagnosis result returned as the response body

use serde::Serialize;

use super::signature::SignatureEntry;

const FALLBACK_DIAGNOSIS: &str = "Scan analysis complete - Within normal limits";
const FALLBACK_CONFIDENCE: &str = "94%";

/// Diagnosis result
///
/// Table matches echo the entry's `hash`; the fallback has none, and the
/// field is then left out of the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    pub diagnosis: String,
    pub confidence: String,
}

impl DiagnosisResult {
    pub fn from_entry(entry: &SignatureEntry) -> Self {
        Self {
            hash: Some(entry.hash.to_string()),
            diagnosis: entry.diagnosis.to_string(),
            confidence: entry.confidence.to_string(),
        }
    }

    /// Result used when no table entry matches
    pub fn fallback() -> Self {
        Self {
            hash: None,
            diagnosis: FALLBACK_DIAGNOSIS.to_string(),
            confidence: FALLBACK_CONFIDENCE.to_string(),
        }
    }
}
