//! CV artifact validation for CV-based interview sessions.
//!
//! A session accepts at most one CV artifact, constrained to PDF/JPEG/PNG
//! under 10 MiB. The declared content type is cross-checked against the file
//! signature so a mislabelled upload is rejected before the session enters
//! questioning.

use serde::{Deserialize, Serialize};

pub const MAX_CV_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvContentType {
    Pdf,
    Jpeg,
    Png,
}

impl CvContentType {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "application/pdf" => Some(CvContentType::Pdf),
            "image/jpeg" | "image/jpg" => Some(CvContentType::Jpeg),
            "image/png" => Some(CvContentType::Png),
            _ => None,
        }
    }

    fn matches_signature(&self, bytes: &[u8]) -> bool {
        match self {
            CvContentType::Pdf => bytes.starts_with(PDF_MAGIC),
            CvContentType::Jpeg => bytes.starts_with(JPEG_MAGIC),
            CvContentType::Png => bytes.starts_with(PNG_MAGIC),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CvValidationError {
    #[error("unsupported file type '{0}': please upload a PDF or image file (JPG, PNG)")]
    UnsupportedType(String),
    #[error("file is {0} bytes; the limit is 10 MB")]
    TooLarge(usize),
    #[error("uploaded file is empty")]
    Empty,
    #[error("file contents do not match the declared type")]
    SignatureMismatch,
    #[error("a CV has already been uploaded for this session")]
    AlreadyUploaded,
}

/// A raw CV upload as received from the client, prior to validation.
#[derive(Debug, Clone)]
pub struct CvUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The validated CV artifact attached to a session.
///
/// Text extraction is delegated to the question bank side; the profile keeps
/// only what the controller needs to route CV-based retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvProfile {
    pub filename: String,
    pub content_type: CvContentType,
    pub size_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Validates an upload and turns it into a session-attached profile.
pub fn validate(upload: &CvUpload) -> Result<CvProfile, CvValidationError> {
    let content_type = CvContentType::from_mime(&upload.content_type)
        .ok_or_else(|| CvValidationError::UnsupportedType(upload.content_type.clone()))?;
    if upload.bytes.is_empty() {
        return Err(CvValidationError::Empty);
    }
    if upload.bytes.len() > MAX_CV_BYTES {
        return Err(CvValidationError::TooLarge(upload.bytes.len()));
    }
    if !content_type.matches_signature(&upload.bytes) {
        return Err(CvValidationError::SignatureMismatch);
    }
    Ok(CvProfile {
        filename: upload.filename.clone(),
        content_type,
        size_bytes: upload.bytes.len(),
        summary: None,
    })
}
