//! PDF steganography through unindexed (orphan) objects.
//!
//! A payload — a UTF-8 message or a raw file — is inserted into a PDF as an
//! object that exists in the file body but is deliberately excluded from the
//! cross-reference table, making it invisible to conformant readers that only
//! traverse indexed objects while remaining recoverable by direct byte-level
//! inspection. The companion extractor enumerates the objects physically
//! present, diffs them against the indexed set and decodes whatever payload
//! the orphans carry.
//!
//! Both directions require the input in a normalized form: a single
//! uncompressed xref table, no object streams. [`QPDFConverter`] wraps the
//! external `qpdf` tool that produces it; structural operations fail fast
//! with a typed error when the precondition does not hold.
//!
//! Payloads are carried as base64 dictionary values, optionally encrypted
//! with AES-256-CBC under a SHA-256 passphrase-derived key.

use std::path::Path;

use log::warn;

pub mod codec;
mod convert;
mod error;
pub mod pdf;
mod stego;

pub use convert::QPDFConverter;
pub use error::{PDFStegoError, PDFStegoResult};
pub use stego::{
    HiddenObjectExtractor, HiddenObjectInjector, InjectionOutcome, OrphanSurvey, RecoveredFile,
};

/// Main injection/extraction interface
#[derive(Debug, Default)]
pub struct PDFStego {
    injector: HiddenObjectInjector,
    extractor: HiddenObjectExtractor,
}

impl PDFStego {
    /// Create a new PDFStego instance
    pub fn new() -> Self {
        Self {
            injector: HiddenObjectInjector::new(),
            extractor: HiddenObjectExtractor::new(),
        }
    }

    /// Hide a text message in normalized PDF content, optionally encrypted
    /// with `passphrase`
    pub fn inject_text(
        &self,
        pdf_data: &[u8],
        message: &str,
        passphrase: Option<&str>,
    ) -> PDFStegoResult<InjectionOutcome> {
        self.injector.inject_text(pdf_data, message, passphrase)
    }

    /// Hide a file payload in normalized PDF content under its filename
    pub fn inject_file(
        &self,
        pdf_data: &[u8],
        payload: &[u8],
        file_name: &str,
        passphrase: Option<&str>,
    ) -> PDFStegoResult<InjectionOutcome> {
        self.injector
            .inject_file(pdf_data, payload, file_name, passphrase)
    }

    /// Recover hidden text messages, ascending by object number
    pub fn extract_text(
        &self,
        pdf_data: &[u8],
        passphrase: Option<&str>,
    ) -> PDFStegoResult<Vec<(u32, String)>> {
        self.extractor.extract_text(pdf_data, passphrase)
    }

    /// Recover hidden file payloads, ascending by object number
    pub fn extract_files(
        &self,
        pdf_data: &[u8],
        passphrase: Option<&str>,
    ) -> PDFStegoResult<Vec<RecoveredFile>> {
        self.extractor.extract_files(pdf_data, passphrase)
    }

    /// Recover hidden file payloads and write each one into `output_dir`
    /// under its recovered name. The directory must already exist. Only the
    /// final path component of a recovered name is used, so a crafted key
    /// cannot escape the directory.
    pub fn extract_files_to(
        &self,
        pdf_data: &[u8],
        passphrase: Option<&str>,
        output_dir: &Path,
    ) -> PDFStegoResult<Vec<RecoveredFile>> {
        let recovered = self.extract_files(pdf_data, passphrase)?;
        for file in &recovered {
            match Path::new(&file.name).file_name() {
                Some(name) => std::fs::write(output_dir.join(name), &file.bytes)?,
                None => warn!(
                    "object {}: recovered name {:?} has no file component, not written",
                    file.object_number, file.name
                ),
            }
        }
        Ok(recovered)
    }
}
