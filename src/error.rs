//! Error types for PDF steganography operations

use std::io;
use thiserror::Error;

/// Main error type for PDF steganography operations
#[derive(Error, Debug)]
pub enum PDFStegoError {
    /// A required structural landmark (xref table, startxref, object) is absent.
    /// This usually means the input was not normalized to a flat xref form.
    #[error("Structural landmark not found: {0}")]
    StructureNotFound(String),

    /// Payload decoding failed (bad padding, truncated ciphertext, non-text bytes)
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Malformed base64 payload value
    #[error("Base64 error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    /// Malformed hex payload value
    #[error("Hex error: {0}")]
    HexError(#[from] hex::FromHexError),

    /// Decoded payload is not valid UTF-8 where text was expected
    #[error("UTF-8 encoding error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Numeric field could not be parsed
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    /// Cross reference table error
    #[error("Cross reference table error: {0}")]
    XRefError(String),

    /// External normalization command failed
    #[error("Normalization failed: {0}")]
    ConversionFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for PDF steganography operations
pub type PDFStegoResult<T> = Result<T, PDFStegoError>;

impl PDFStegoError {
    /// Create a new structural-landmark error
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::StructureNotFound(msg.into())
    }

    /// Create a new decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }

    /// Create a new xref table error
    pub fn xref(msg: impl Into<String>) -> Self {
        Self::XRefError(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::ConversionFailed(msg.into())
    }

    /// Check if error is related to PDF structure
    pub fn is_structure_error(&self) -> bool {
        matches!(
            self,
            Self::StructureNotFound(_) | Self::XRefError(_) | Self::ParseIntError(_)
        )
    }

    /// Check if error came from payload decoding.
    /// During multi-orphan extraction these abort only the current object.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::DecodeError(_) | Self::Base64Error(_) | Self::HexError(_) | Self::Utf8Error(_)
        )
    }

    /// Check if error is an IO failure
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError(_))
    }
}
