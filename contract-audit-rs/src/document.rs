//! Document text extraction
//!
//! PDF parsing is stubbed: any non-empty PDF upload yields the bundled sample
//! SAFE agreement. Plain-text uploads are decoded as UTF-8.

use tracing::{debug, warn};

/// Extracted text shorter than this probably did not parse correctly
const SUSPICIOUSLY_SHORT_CHARS: usize = 50;

/// Sample agreement returned for every PDF upload
pub const SAMPLE_SAFE_AGREEMENT: &str = r#"SAFE AGREEMENT
(Simple Agreement for Future Equity)

THIS CERTIFIES THAT in exchange for the payment by InnoVest Capital ("Investor") of $100,000 (the "Purchase Amount") on or about May 15, 2023, TechFuture Inc., a Delaware corporation (the "Company"), issues to the Investor the right to certain shares of the Company's Capital Stock, subject to the terms described below.

1. VALUATION CAP AND DISCOUNT.
   a. Valuation Cap: $8,000,000
   b. Discount Rate: 20%

2. LIQUIDITY EVENT.
   If there is a Liquidity Event before this SAFE expires or terminates, the Investor will, at its option, either (i) receive a cash payment equal to the Purchase Amount or (ii) automatically receive from the Company the number of shares of Capital Stock equal to the Purchase Amount divided by the Liquidity Price.

3. DISSOLUTION EVENT.
   If there is a Dissolution Event before this SAFE expires or terminates, the Investor will automatically receive from the Company a cash payment equal to the Purchase Amount.

4. TERMINATION.
   This SAFE will expire and terminate upon either: (i) the issuance of shares to the Investor pursuant to Section 2; or (ii) the payment, or setting aside for payment, of amounts due to the Investor pursuant to Section 3.

5. GOVERNING LAW.
   This SAFE shall be governed by the laws of the State of Delaware.

Dated: May 15, 2023

COMPANY:
TECHFUTURE INC.

By: _____________________
    Jane Smith, CEO

INVESTOR:
INNOVEST CAPITAL

By: _____________________
    John Doe, Managing Partner"#;

/// Extraction errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),
}

/// Turns an uploaded document into plain text
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8], content_type: Option<&str>) -> Result<String, DocumentError>;
}

/// PDF stand-in that always yields [`SAMPLE_SAFE_AGREEMENT`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StubPdfExtractor;

impl StubPdfExtractor {
    fn decode_plain_text(bytes: &[u8]) -> Result<String, DocumentError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| DocumentError::Parse(format!("text upload is not valid UTF-8: {}", e)))?;

        if text.trim().is_empty() {
            return Err(DocumentError::Parse("text upload contains no text".to_string()));
        }
        Ok(text.to_string())
    }
}

impl TextExtractor for StubPdfExtractor {
    fn extract_text(&self, bytes: &[u8], content_type: Option<&str>) -> Result<String, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Parse("uploaded file is empty".to_string()));
        }

        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase())
            .unwrap_or_default();

        let text = match mime.as_str() {
            "text/plain" => Self::decode_plain_text(bytes)?,
            "" | "application/pdf" | "application/octet-stream" => {
                debug!("Using sample contract text for {} byte upload", bytes.len());
                SAMPLE_SAFE_AGREEMENT.to_string()
            }
            other => return Err(DocumentError::UnsupportedType(other.to_string())),
        };

        if text.chars().count() < SUSPICIOUSLY_SHORT_CHARS {
            warn!("Extracted text is very short, the document may not have been parsed correctly");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_yields_sample() {
        let text = StubPdfExtractor
            .extract_text(b"%PDF-1.7 ...", Some("application/pdf"))
            .unwrap();

        assert_eq!(text, SAMPLE_SAFE_AGREEMENT);
        assert!(text.contains("Valuation Cap: $8,000,000"));
    }

    #[test]
    fn test_missing_content_type_is_treated_as_pdf() {
        assert_eq!(StubPdfExtractor.extract_text(b"bytes", None).unwrap(), SAMPLE_SAFE_AGREEMENT);
    }

    #[test]
    fn test_plain_text_is_decoded() {
        let text = StubPdfExtractor
            .extract_text("Clause 1. Governing law: Delaware.".as_bytes(), Some("text/plain; charset=utf-8"))
            .unwrap();

        assert_eq!(text, "Clause 1. Governing law: Delaware.");
    }

    #[test]
    fn test_empty_upload_fails() {
        let err = StubPdfExtractor.extract_text(b"", Some("application/pdf")).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));

        let err = StubPdfExtractor.extract_text(b"  \n", Some("text/plain")).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = StubPdfExtractor.extract_text(&[0xff, 0xfe, 0xfd], Some("text/plain")).unwrap_err();
        assert!(matches!(err, DocumentError::Parse(_)));
    }

    #[test]
    fn test_unsupported_type() {
        let err = StubPdfExtractor.extract_text(b"\x89PNG", Some("image/png")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedType(ref t) if t == "image/png"));
    }
}
