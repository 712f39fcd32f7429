//! Resume upload ingestion: `data:<mime>;base64,<payload>` parsing and the MIME gate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const SUPPORTED_MIME_TYPES: &[&str] = &[MIME_PDF, MIME_TEXT];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataUriError {
    #[error("Expected a data URI of the form 'data:<mimetype>;base64,<encoded_data>'")]
    Malformed,

    #[error("Unsupported file type: {0}. Please upload a PDF or TXT file.")]
    UnsupportedMime(String),

    #[error("The uploaded file is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("The uploaded file is empty")]
    Empty,
}

/// A decoded upload. `payload` is still base64; `bytes` is the decoded content.
#[derive(Debug, Clone)]
pub struct DataUri {
    pub mime: String,
    pub payload: String,
    pub bytes: Vec<u8>,
}

impl DataUri {
    /// Parses and gates an upload. Unsupported MIME types are rejected before anything is decoded.
    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let rest = uri.trim().strip_prefix("data:").ok_or(DataUriError::Malformed)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUriError::Malformed)?;

        let mut parts = meta.split(';');
        let mime = parts.next().unwrap_or("").trim().to_ascii_lowercase();
        let is_base64 = parts.any(|p| p.trim().eq_ignore_ascii_case("base64"));
        if mime.is_empty() || !is_base64 {
            return Err(DataUriError::Malformed);
        }

        if !SUPPORTED_MIME_TYPES.contains(&mime.as_str()) {
            return Err(DataUriError::UnsupportedMime(mime));
        }

        let payload = payload.trim().to_string();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| DataUriError::InvalidBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(DataUriError::Empty);
        }

        Ok(DataUri {
            mime,
            payload,
            bytes,
        })
    }

    /// Builds a data URI from raw bytes, as the browser's FileReader would.
    pub fn encode(mime: &str, bytes: &[u8]) -> String {
        format!("data:{mime};base64,{}", STANDARD.encode(bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.mime == MIME_PDF
    }

    /// The content as UTF-8 text (lossy), for plain-text uploads.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}
