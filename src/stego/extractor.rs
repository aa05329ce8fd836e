//! Hidden-object extraction.
//!
//! The inverse structural analysis: enumerate every object physically present,
//! diff against the set indexed by the xref table, and decode whatever payload
//! the orphans carry. A decode failure abandons only the current orphan; the
//! scan continues with the next one.

use std::collections::BTreeSet;
use std::ops::Range;

use lazy_static::lazy_static;
use log::{debug, trace, warn};
use regex::bytes::Regex;

use super::MARKER_NAME;
use crate::codec;
use crate::error::{PDFStegoError, PDFStegoResult};
use crate::pdf::{scanner, XRefTable};

lazy_static! {
    /// The text-payload marker value, parenthesized or a bare token
    static ref RE_MARKER: Regex = Regex::new(&format!(
        r"(?-u)/{}\s+(?:\((.*?)\)|(\S+))",
        MARKER_NAME
    ))
    .unwrap();
    /// File-payload candidate shapes, tried in order; the first match wins
    static ref FILE_SHAPES: [(Regex, ValueEncoding); 4] = [
        (
            Regex::new(r"(?-u)/(\S+)\s+([A-Za-z0-9+/=]+)").unwrap(),
            ValueEncoding::Base64,
        ),
        (
            Regex::new(r"(?-u)/(\S+)\s+([0-9a-fA-F]+)").unwrap(),
            ValueEncoding::Hex,
        ),
        (
            Regex::new(r"(?-u)/(\S+)\s+\(([A-Za-z0-9+/=\s]+)\)").unwrap(),
            ValueEncoding::Base64,
        ),
        (
            Regex::new(r"(?-u)/(\S+)\s+\(([0-9a-fA-F\s]+)\)").unwrap(),
            ValueEncoding::Hex,
        ),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueEncoding {
    Base64,
    Hex,
}

/// Orphan analysis of one document: everything physically present versus
/// everything the xref table describes. Recomputed fresh on every run.
#[derive(Debug)]
pub struct OrphanSurvey {
    /// Every object number declared anywhere in the file body
    pub all_objects: BTreeSet<u32>,
    /// The numeric range the xref header indexes (free entries included)
    pub indexed: Range<u32>,
    /// Objects present but unindexed, ascending
    pub orphans: Vec<u32>,
}

impl OrphanSurvey {
    /// Scan a document. Fails with a structural error when the xref table is
    /// absent.
    pub fn scan(content: &[u8]) -> PDFStegoResult<Self> {
        let table = XRefTable::locate(content)?;
        let all_objects = scanner::all_object_numbers(content);
        let indexed = table.indexed_objects();
        let orphans: Vec<u32> = all_objects
            .iter()
            .copied()
            .filter(|n| !indexed.contains(n))
            .collect();

        debug!(
            "survey: {} objects in file, {} indexed, {} orphans",
            all_objects.len(),
            indexed.len(),
            orphans.len()
        );
        Ok(Self {
            all_objects,
            indexed,
            orphans,
        })
    }
}

/// A file payload recovered from an orphan object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredFile {
    /// Number of the orphan that carried the payload
    pub object_number: u32,
    /// Filename, taken from the dictionary key
    pub name: String,
    /// The decoded payload
    pub bytes: Vec<u8>,
}

/// Recovers payloads from orphan objects in normalized PDF content
#[derive(Debug, Default)]
pub struct HiddenObjectExtractor;

impl HiddenObjectExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self
    }

    /// Recover every text payload hidden under the marker key, ascending by
    /// object number. Orphans without the marker are skipped silently; a
    /// decode failure skips only that orphan.
    pub fn extract_text(
        &self,
        pdf_data: &[u8],
        passphrase: Option<&str>,
    ) -> PDFStegoResult<Vec<(u32, String)>> {
        let survey = OrphanSurvey::scan(pdf_data)?;
        let mut messages = Vec::new();

        for &number in &survey.orphans {
            trace!("analyzing orphan object {}", number);
            let Some(body) = orphan_body(pdf_data, number) else {
                continue;
            };
            let Some(value) = marker_value(body) else {
                trace!("orphan {} carries no {} marker", number, MARKER_NAME);
                continue;
            };
            match decode_text_value(value, passphrase) {
                Ok(message) => messages.push((number, message)),
                Err(err) if err.is_decode_error() => {
                    warn!("orphan {}: payload did not decode: {}", number, err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(messages)
    }

    /// Recover every file payload, matching the candidate value shapes in
    /// order. Orphans matching no shape are skipped silently.
    pub fn extract_files(
        &self,
        pdf_data: &[u8],
        passphrase: Option<&str>,
    ) -> PDFStegoResult<Vec<RecoveredFile>> {
        let survey = OrphanSurvey::scan(pdf_data)?;
        let mut files = Vec::new();

        for &number in &survey.orphans {
            trace!("analyzing orphan object {}", number);
            let Some(body) = orphan_body(pdf_data, number) else {
                continue;
            };
            let Some((name, value, encoding)) = file_value(body) else {
                trace!("orphan {} matches no file payload shape", number);
                continue;
            };
            match decode_file_value(&value, encoding, passphrase) {
                Ok(bytes) => {
                    debug!("orphan {}: recovered {} ({} bytes)", number, name, bytes.len());
                    files.push(RecoveredFile {
                        object_number: number,
                        name,
                        bytes,
                    });
                }
                Err(err) if err.is_decode_error() => {
                    warn!("orphan {}: payload did not decode: {}", number, err);
                }
                Err(err) => return Err(err),
            }
        }

        Ok(files)
    }
}

/// Dictionary body of an orphan, leading and trailing whitespace trimmed
fn orphan_body(content: &[u8], number: u32) -> Option<&[u8]> {
    let span = scanner::find_object_body(content, number)?;
    Some(content[span].trim_ascii())
}

/// The marker value as text: parenthesized string or bare token
fn marker_value(body: &[u8]) -> Option<&[u8]> {
    let caps = RE_MARKER.captures(body)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_bytes())
}

/// First matching file-payload shape: `(filename, value, encoding)`,
/// embedded whitespace stripped from the value
fn file_value(body: &[u8]) -> Option<(String, Vec<u8>, ValueEncoding)> {
    for (pattern, encoding) in FILE_SHAPES.iter() {
        if let Some(caps) = pattern.captures(body) {
            let name = String::from_utf8_lossy(caps.get(1)?.as_bytes()).into_owned();
            let value: Vec<u8> = caps
                .get(2)?
                .as_bytes()
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            return Some((name, value, *encoding));
        }
    }
    None
}

fn decode_text_value(value: &[u8], passphrase: Option<&str>) -> PDFStegoResult<String> {
    let value = std::str::from_utf8(value)
        .map_err(|_| PDFStegoError::decode("marker value is not ASCII text"))?;
    codec::decode_text(value, passphrase)
}

fn decode_file_value(
    value: &[u8],
    encoding: ValueEncoding,
    passphrase: Option<&str>,
) -> PDFStegoResult<Vec<u8>> {
    match encoding {
        ValueEncoding::Base64 => codec::decode_bytes(value, passphrase),
        ValueEncoding::Hex => {
            let raw = hex::decode(value)?;
            match passphrase {
                Some(key) => codec::AESCipher::new(key).decrypt(&raw),
                None => Ok(raw),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::HiddenObjectInjector;
    use pretty_assertions::assert_eq;
    use test_log::test;

    /// Normalized two-object document with an accurate xref table
    fn base_pdf() -> Vec<u8> {
        let mut out = String::from("%PDF-1.4\n");
        let o1 = out.len();
        out.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");
        let o2 = out.len();
        out.push_str("2 0 obj\n<< /Type /Pages /Count 0 >>\nendobj\n");
        let xref_at = out.len();
        out.push_str("xref\n0 3\n0000000000 65535 f \n");
        out.push_str(&format!("{:010} 00000 n \n{:010} 00000 n \n", o1, o2));
        out.push_str(&format!(
            "trailer\n<< /Size 3 /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            xref_at
        ));
        out.into_bytes()
    }

    #[test]
    fn test_survey_with_no_orphans() {
        let survey = OrphanSurvey::scan(&base_pdf()).unwrap();
        assert_eq!(survey.orphans, Vec::<u32>::new());
        assert_eq!(survey.indexed, 0..3);
        assert_eq!(survey.all_objects.len(), 2);
    }

    #[test]
    fn test_no_orphans_yields_empty_results() {
        let extractor = HiddenObjectExtractor::new();
        assert_eq!(extractor.extract_text(&base_pdf(), None).unwrap(), vec![]);
        assert_eq!(extractor.extract_files(&base_pdf(), None).unwrap(), vec![]);
    }

    #[test]
    fn test_missing_xref_is_structural_error() {
        let err = HiddenObjectExtractor::new()
            .extract_text(b"%PDF-1.4\n1 0 obj\n<< >>\nendobj\n", None)
            .unwrap_err();
        assert!(matches!(err, PDFStegoError::StructureNotFound(_)));
    }

    #[test]
    fn test_roundtrip_text_extraction() {
        let injected = HiddenObjectInjector::new()
            .inject_text(&base_pdf(), "hello-world", None)
            .unwrap();
        let messages = HiddenObjectExtractor::new()
            .extract_text(&injected.pdf, None)
            .unwrap();
        assert_eq!(messages, vec![(3, "hello-world".to_string())]);
    }

    #[test]
    fn test_roundtrip_encrypted_text_extraction() {
        let injected = HiddenObjectInjector::new()
            .inject_text(&base_pdf(), "hello-world", Some("secret"))
            .unwrap();
        let extractor = HiddenObjectExtractor::new();

        let messages = extractor.extract_text(&injected.pdf, Some("secret")).unwrap();
        assert_eq!(messages, vec![(3, "hello-world".to_string())]);

        // wrong key: the orphan is skipped (or decodes to garbage), never the
        // original message
        let wrong = extractor.extract_text(&injected.pdf, Some("wrong")).unwrap();
        assert!(wrong.iter().all(|(_, m)| m != "hello-world"));
    }

    #[test]
    fn test_orphan_without_marker_is_skipped() {
        let mut pdf = base_pdf();
        let addition = b"9 0 obj << /Unrelated (noise) >> endobj\n".to_vec();
        let at = scanner::xref_block(&pdf).unwrap().0.start;
        pdf.splice(at..at, addition);

        let survey = OrphanSurvey::scan(&pdf).unwrap();
        assert_eq!(survey.orphans, vec![9]);
        let messages = HiddenObjectExtractor::new().extract_text(&pdf, None).unwrap();
        assert_eq!(messages, vec![]);
    }

    #[test]
    fn test_undecodable_orphan_does_not_abort_scan() {
        let injected = HiddenObjectInjector::new()
            .inject_text(&base_pdf(), "recoverable", None)
            .unwrap();
        // add a second orphan whose marker value is not valid base64
        let mut pdf = injected.pdf;
        let addition = b"9 0 obj << /Asd !!!notbase64!!! >> endobj\n".to_vec();
        let at = scanner::xref_block(&pdf).unwrap().0.start;
        pdf.splice(at..at, addition);

        let messages = HiddenObjectExtractor::new().extract_text(&pdf, None).unwrap();
        assert_eq!(messages, vec![(3, "recoverable".to_string())]);
    }

    #[test]
    fn test_marker_value_in_parentheses() {
        let body = b"/Asd (aGVsbG8td29ybGQ=)";
        let value = marker_value(body).unwrap();
        assert_eq!(decode_text_value(value, None).unwrap(), "hello-world");
    }

    #[test]
    fn test_file_shape_priority_base64_first() {
        // hex-looking content is also valid base64 charset, so the base64
        // shape wins by order
        let (name, value, encoding) = file_value(b"/a.bin deadbeef").unwrap();
        assert_eq!(name, "a.bin");
        assert_eq!(value, b"deadbeef");
        assert_eq!(encoding, ValueEncoding::Base64);
    }

    #[test]
    fn test_file_shape_parenthesized_strips_whitespace() {
        let body = b"/a.bin (AQ ID\n)";
        // the bare-token shape cannot match a parenthesized value, so the
        // parenthesized base64 shape applies
        let (name, value, _) = file_value(body).unwrap();
        assert_eq!(name, "a.bin");
        assert_eq!(value, b"AQID");
    }

    #[test]
    fn test_roundtrip_file_extraction() {
        let payload = vec![0x01u8, 0x02, 0x03];
        let injected = HiddenObjectInjector::new()
            .inject_file(&base_pdf(), &payload, "a.bin", None)
            .unwrap();
        let files = HiddenObjectExtractor::new()
            .extract_files(&injected.pdf, None)
            .unwrap();
        assert_eq!(
            files,
            vec![RecoveredFile {
                object_number: 3,
                name: "a.bin".to_string(),
                bytes: payload,
            }]
        );
    }

    #[test]
    fn test_roundtrip_encrypted_file_extraction() {
        let payload: Vec<u8> = (0..=255).collect();
        let injected = HiddenObjectInjector::new()
            .inject_file(&base_pdf(), &payload, "blob.dat", Some("chiave"))
            .unwrap();
        let files = HiddenObjectExtractor::new()
            .extract_files(&injected.pdf, Some("chiave"))
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "blob.dat");
        assert_eq!(files[0].bytes, payload);
    }

    #[test]
    fn test_hex_shape_decodes_via_hex() {
        let raw = decode_file_value(b"deadbeef", ValueEncoding::Hex, None).unwrap();
        assert_eq!(raw, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }
}
