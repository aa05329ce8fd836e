//! Hidden-object injection.
//!
//! The pipeline mirrors the structural edit it performs: analyze the object
//! census, synthesize the orphan object, splice it into the byte stream, then
//! patch the xref entries and the startxref pointer so every object that was
//! *not* meant to be hidden keeps a consistent index. Each step produces an
//! explicit artifact value; any failure aborts the whole operation with no
//! partial output.

use log::{debug, trace};

use super::MARKER_NAME;
use crate::codec;
use crate::error::{PDFStegoError, PDFStegoResult};
use crate::pdf::{parse_entry_line, scanner};

/// Result of a successful injection
#[derive(Debug)]
pub struct InjectionOutcome {
    /// The modified document, byte-identical to the input except for the
    /// inserted object and the patched offset records
    pub pdf: Vec<u8>,
    /// Number assigned to the hidden object (`max + 1`)
    pub object_number: u32,
    /// Byte length of the inserted text including its surrounding newlines —
    /// the exact delta applied to every shifted offset
    pub object_length: usize,
}

/// Injects payloads as orphan objects into normalized PDF content
#[derive(Debug, Default)]
pub struct HiddenObjectInjector;

impl HiddenObjectInjector {
    /// Create a new injector
    pub fn new() -> Self {
        Self
    }

    /// Hide a text message under the fixed marker key, optionally encrypted
    /// with `passphrase`
    pub fn inject_text(
        &self,
        pdf_data: &[u8],
        message: &str,
        passphrase: Option<&str>,
    ) -> PDFStegoResult<InjectionOutcome> {
        let encoded = codec::encode_text(message, passphrase);
        inject(pdf_data, MARKER_NAME, &encoded)
    }

    /// Hide a raw file payload under its filename as the dictionary key
    pub fn inject_file(
        &self,
        pdf_data: &[u8],
        payload: &[u8],
        file_name: &str,
        passphrase: Option<&str>,
    ) -> PDFStegoResult<InjectionOutcome> {
        let encoded = codec::encode_bytes(payload, passphrase);
        inject(pdf_data, file_name, &encoded)
    }
}

/// Census of the physical object declarations
#[derive(Debug)]
struct ObjectCensus {
    /// Declarations in document order, duplicates included
    declarations: Vec<(u32, usize)>,
    /// Highest declared object number
    max_number: u32,
    /// Midpoint of the declaration count (floor division). An arbitrary but
    /// fixed heuristic for the insertion point, not a semantically meaningful
    /// document position.
    half: usize,
}

impl ObjectCensus {
    fn take(content: &[u8]) -> PDFStegoResult<Self> {
        let declarations = scanner::object_declarations(content);
        if declarations.is_empty() {
            return Err(PDFStegoError::structural("no object declarations found"));
        }

        let max_number = declarations.iter().map(|&(n, _)| n).max().unwrap_or(0);
        let half = declarations.len() / 2;
        debug!(
            "census: {} declarations, max object {}, half {}",
            declarations.len(),
            max_number,
            half
        );

        Ok(Self {
            declarations,
            max_number,
            half,
        })
    }
}

/// The serialized orphan object
struct HiddenObject {
    number: u32,
    text: Vec<u8>,
    /// `text` plus the two surrounding newline bytes
    byte_length: usize,
}

fn inject(pdf_data: &[u8], name: &str, encoded: &str) -> PDFStegoResult<InjectionOutcome> {
    let mut content = pdf_data.to_vec();

    let census = ObjectCensus::take(&content)?;
    let hidden = build_hidden_object(&census, name, encoded);
    let insert_at = insertion_offset(&content, &census);

    insert_object(&mut content, &hidden, insert_at);
    patch_xref(&mut content, insert_at, hidden.byte_length as u64)?;
    patch_startxref(&mut content, hidden.byte_length as u64)?;

    debug!(
        "hidden object {} inserted at offset {}, {} bytes",
        hidden.number, insert_at, hidden.byte_length
    );
    Ok(InjectionOutcome {
        pdf: content,
        object_number: hidden.number,
        object_length: hidden.byte_length,
    })
}

fn build_hidden_object(census: &ObjectCensus, name: &str, encoded: &str) -> HiddenObject {
    let number = census.max_number + 1;
    let text = format!("{} 0 obj << /{} {} >> endobj", number, name, encoded).into_bytes();
    let byte_length = text.len() + 2;
    trace!("hidden object {} serialized, {} bytes with newlines", number, byte_length);
    HiddenObject {
        number,
        text,
        byte_length,
    }
}

/// Insertion point: just past the `endobj` of the object ranked `half`
/// (1-based, sorted by object number), falling back to the byte midpoint of
/// the buffer when the rank is unusable.
fn insertion_offset(content: &[u8], census: &ObjectCensus) -> usize {
    let mut ranked = census.declarations.clone();
    ranked.sort();

    if census.half > 0 && census.half <= ranked.len() {
        let (target, _) = ranked[census.half - 1];
        if let Some(end) = scanner::object_end(content, target) {
            trace!("inserting after object {} at offset {}", target, end);
            return end;
        }
    }

    trace!("falling back to buffer midpoint insertion");
    content.len() / 2
}

fn insert_object(content: &mut Vec<u8>, hidden: &HiddenObject, insert_at: usize) {
    let mut framed = Vec::with_capacity(hidden.byte_length);
    framed.push(b'\n');
    framed.extend_from_slice(&hidden.text);
    framed.push(b'\n');
    content.splice(insert_at..insert_at, framed);
}

/// Add `delta` to every in-use entry whose recorded offset lies at or past the
/// insertion point. Comparing recorded offsets keeps the patch consistent with
/// the insertion step even when the entry count and the declaration census
/// disagree. Entry lines that do not parse pass through untouched.
fn patch_xref(content: &mut Vec<u8>, insert_at: usize, delta: u64) -> PDFStegoResult<()> {
    let (whole, inner) = scanner::xref_block(content)
        .ok_or_else(|| PDFStegoError::structural("xref table not found"))?;

    let body = String::from_utf8(content[inner].to_vec())
        .map_err(|_| PDFStegoError::xref("xref entries are not ASCII text"))?;
    let mut lines = body.trim().lines();
    let header = lines
        .next()
        .ok_or_else(|| PDFStegoError::xref("empty xref block"))?;

    let mut updated = vec![header.trim().to_string()];
    for line in lines {
        let line = line.trim();
        match parse_entry_line(line) {
            Some(mut entry) if entry.in_use && entry.offset >= insert_at as u64 => {
                entry.offset += delta;
                updated.push(entry.render());
            }
            _ => updated.push(line.to_string()),
        }
    }

    let block = format!("xref\n{}\ntrailer", updated.join("\n"));
    content.splice(whole, block.into_bytes());
    trace!("xref table patched, delta {}", delta);
    Ok(())
}

/// The table itself always sits after the inserted object, so the startxref
/// pointer shifts by the same delta.
fn patch_startxref(content: &mut Vec<u8>, delta: u64) -> PDFStegoResult<()> {
    let (span, old) = scanner::startxref(content)
        .ok_or_else(|| PDFStegoError::structural("startxref not found"))?;
    let new = old + delta;
    content.splice(span, new.to_string().into_bytes());
    trace!("startxref patched: {} -> {}", old, new);
    Ok(())
}
