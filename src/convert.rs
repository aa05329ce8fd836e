//! Normalization adapter around the external `qpdf` tool.
//!
//! Structural editing requires the input in a flat, text-editable form: one
//! uncompressed xref table, no object streams, streams left uncompressed.
//! qpdf's QDF mode produces exactly that; this module only builds and runs
//! the command and surfaces failures as typed errors. Installing qpdf is the
//! operator's responsibility.

use std::path::Path;
use std::process::Command;

use log::{debug, trace, warn};

use crate::error::{PDFStegoError, PDFStegoResult};

/// Invokes `qpdf` to normalize a PDF for structural editing
#[derive(Debug, Clone)]
pub struct QPDFConverter {
    executable: String,
}

impl Default for QPDFConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl QPDFConverter {
    /// Use `qpdf` from the search path
    pub fn new() -> Self {
        Self {
            executable: "qpdf".to_string(),
        }
    }

    /// Use a specific qpdf binary
    pub fn with_executable(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check whether the qpdf binary can be executed
    pub fn is_available(&self) -> bool {
        self.version().is_ok()
    }

    /// Report the installed qpdf version string
    pub fn version(&self) -> PDFStegoResult<String> {
        let output = Command::new(&self.executable).arg("--version").output()?;
        if !output.status.success() {
            return Err(PDFStegoError::conversion(format!(
                "{} --version exited with {}",
                self.executable, output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Convert `input` into the normalized form at `output`
    pub fn normalize(&self, input: &Path, output: &Path) -> PDFStegoResult<()> {
        debug!("normalizing {} -> {}", input.display(), output.display());

        let mut command = Command::new(&self.executable);
        command.arg("--qdf");
        command.arg("--object-streams=disable");
        command.arg("--compress-streams=n");
        command.arg("--normalize-content=y");
        if cfg!(windows) {
            command.arg("--preserve-unreferenced");
        } else {
            command.arg("--preserve-unreferenced=n");
        }
        command.arg("--deterministic-id");
        command.arg(input);
        command.arg(output);

        trace!("running {:?}", command);
        let result = command.output()?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            warn!("qpdf failed: {}", stderr.trim());
            return Err(PDFStegoError::conversion(format!(
                "qpdf exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        if !output.exists() {
            return Err(PDFStegoError::conversion(format!(
                "qpdf reported success but {} was not created",
                output.display()
            )));
        }

        debug!("normalization completed: {}", output.display());
        Ok(())
    }
}
