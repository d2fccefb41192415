//! Error Classifier
//!
//! Decides whether an agent's free-text reply is usable or describes a
//! failure that should be explained to the user by the error-display agent.
//!
//! This is a best-effort heuristic over natural language. Agents phrase
//! failures however they like, so both false positives and false negatives
//! are possible; the rules are ordered so that the explicit "ready for
//! analysis" status wins over any error-looking wording elsewhere in the
//! reply.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static STATUS_ERROR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)status:\s*error").expect("status pattern is a valid regex")
});

/// "Error – Needs OCR" style verdicts, written with an en dash, em dash or hyphen
const DASHED_VERDICTS: [&str; 6] = [
    "error – needs ocr",
    "error — needs ocr",
    "error - needs ocr",
    "error – transcript unavailable",
    "error — transcript unavailable",
    "error - transcript unavailable",
];

const FAILURE_MARKERS: [&str; 5] = [
    "transcript unavailable",
    "captions not available",
    "requires ocr",
    "scanned pdf",
    "extraction failed",
];

/// Which rule decided the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Empty,
    ReadyForAnalysis,
    StatusError,
    DashedVerdict,
    ErrorPrefix,
    FailureMarker(&'static str),
    Clean,
}

impl Classification {
    pub fn is_error(&self) -> bool {
        !matches!(self, Classification::ReadyForAnalysis | Classification::Clean)
    }
}

pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Classification::Empty;
    }

    let lower = text.to_lowercase();

    if lower.contains("status:") && lower.contains("ready for analysis") {
        return Classification::ReadyForAnalysis;
    }

    if STATUS_ERROR.is_match(text) {
        return Classification::StatusError;
    }

    if DASHED_VERDICTS.iter().any(|verdict| lower.contains(verdict)) {
        return Classification::DashedVerdict;
    }

    if trimmed.to_uppercase().starts_with("ERROR:") {
        return Classification::ErrorPrefix;
    }

    if let Some(marker) = FAILURE_MARKERS.iter().find(|marker| lower.contains(*marker)) {
        return Classification::FailureMarker(marker);
    }

    Classification::Clean
}

pub fn is_error_response(text: &str) -> bool {
    let verdict = classify(text);
    debug!(verdict = ?verdict, "Classified agent response");
    verdict.is_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_are_errors() {
        assert!(is_error_response(""));
        assert!(is_error_response("   "));
        assert!(is_error_response("\n\t "));
        assert_eq!(classify(""), Classification::Empty);
    }

    #[test]
    fn test_ready_for_analysis_takes_precedence() {
        assert!(!is_error_response("STATUS: Ready for analysis. Error: none"));
        assert!(!is_error_response("STATUS: Ready for analysis\n\nContent follows..."));
        assert!(!is_error_response("status: ready for analysis\nThe transcript unavailable section was skipped"));
        assert_eq!(
            classify("Status: Ready for Analysis"),
            Classification::ReadyForAnalysis
        );
    }

    #[test]
    fn test_status_error() {
        assert!(is_error_response("STATUS: Error\nThe file could not be read"));
        assert!(is_error_response("status:error"));
        assert_eq!(classify("Status:   ERROR"), Classification::StatusError);
    }

    #[test]
    fn test_dashed_verdicts() {
        assert_eq!(classify("Result: Error – Needs OCR"), Classification::DashedVerdict);
        assert_eq!(classify("Result: Error — Needs OCR"), Classification::DashedVerdict);
        assert_eq!(classify("Error - Transcript unavailable"), Classification::DashedVerdict);
        assert!(is_error_response("Error - Transcript unavailable"));
    }

    #[test]
    fn test_error_prefix_any_case() {
        assert!(is_error_response("ERROR: could not extract text"));
        assert!(is_error_response("error: could not extract text"));
        assert!(is_error_response("   Error: leading whitespace"));
        assert_eq!(classify("error: x"), Classification::ErrorPrefix);
    }

    #[test]
    fn test_failure_markers() {
        assert!(is_error_response("This document requires OCR processing"));
        assert_eq!(
            classify("This document requires OCR processing"),
            Classification::FailureMarker("requires ocr")
        );
        assert!(is_error_response("Captions not available for this video"));
        assert!(is_error_response("Looks like a scanned PDF"));
        assert!(is_error_response("Extraction failed halfway"));
    }

    #[test]
    fn test_clean_content() {
        assert!(!is_error_response("Photosynthesis converts light energy into chemical energy."));
        assert!(!is_error_response("The errors in this essay are discussed in section 2."));
        assert_eq!(classify("Mitochondria"), Classification::Clean);
    }
}
