//! Byte-level landmark scanner for normalized PDF content.
//!
//! The scanner treats the document as line-oriented bytes rather than a typed
//! object graph. This is valid only because the normalization step has already
//! disabled object streams and cross-reference streams and forced a single
//! flat, human-readable xref table; it is a deliberate simplification
//! boundary, not a general PDF parser. All patterns run with Unicode mode
//! disabled so they are byte-exact across binary stream content.

use std::collections::BTreeSet;
use std::ops::Range;

use lazy_static::lazy_static;
use log::warn;
use regex::bytes::Regex;

lazy_static! {
    /// Object declaration: `<number> 0 obj`. Generation numbers are assumed 0.
    static ref RE_OBJ_DECL: Regex = Regex::new(r"(?-u)(\d+)\s+0\s+obj").unwrap();
    /// The xref block, from the `xref` keyword up to the trailer keyword.
    static ref RE_XREF_BLOCK: Regex = Regex::new(r"(?s-u)xref\s*\n(.*?)\ntrailer").unwrap();
    /// The startxref pointer near the end of the file.
    static ref RE_STARTXREF: Regex = Regex::new(r"(?-u)startxref\s*\n(\d+)").unwrap();
}

/// All `"<N> 0 obj"` declarations in document order, duplicates preserved.
/// Returns `(object_number, byte_offset_of_declaration)` pairs.
pub fn object_declarations(content: &[u8]) -> Vec<(u32, usize)> {
    let mut declarations = Vec::new();
    for caps in RE_OBJ_DECL.captures_iter(content) {
        let m = caps.get(1).expect("declaration capture");
        match parse_number(m.as_bytes()) {
            Some(number) => declarations.push((number, caps.get(0).expect("match").start())),
            None => warn!("skipping unparseable object number at offset {}", m.start()),
        }
    }
    declarations
}

/// The set of object numbers physically declared anywhere in the buffer,
/// regardless of whether the objects are well-formed or indexed.
pub fn all_object_numbers(content: &[u8]) -> BTreeSet<u32> {
    object_declarations(content)
        .into_iter()
        .map(|(number, _)| number)
        .collect()
}

/// Byte span of the dictionary body of `"<number> 0 obj << ... >> endobj"`,
/// everything between the outermost `<<` and `>>` (non-greedy, first match).
pub fn find_object_body(content: &[u8], number: u32) -> Option<Range<usize>> {
    let pattern = format!(
        r"(?s-u)(?:^|[^\d]){}\s+0\s+obj\s*<<(.*?)>>\s*endobj",
        number
    );
    let re = Regex::new(&pattern).expect("object body pattern");
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.range())
}

/// Byte offset immediately past the `endobj` of the first declaration of
/// `number`.
pub fn object_end(content: &[u8], number: u32) -> Option<usize> {
    let pattern = format!(r"(?s-u)(?:^|[^\d]){}\s+0\s+obj.*?endobj", number);
    let re = Regex::new(&pattern).expect("object end pattern");
    re.find(content).map(|m| m.end())
}

/// Locate the xref block. Returns the span of the whole
/// `xref ... trailer` match and the span of the content between the two
/// keywords.
pub fn xref_block(content: &[u8]) -> Option<(Range<usize>, Range<usize>)> {
    RE_XREF_BLOCK.captures(content).map(|caps| {
        let whole = caps.get(0).expect("match").range();
        let inner = caps.get(1).expect("xref content capture").range();
        (whole, inner)
    })
}

/// Locate the startxref pointer. Returns the span of its digits and the
/// recorded byte offset of the xref table.
pub fn startxref(content: &[u8]) -> Option<(Range<usize>, u64)> {
    let caps = RE_STARTXREF.captures(content)?;
    let digits = caps.get(1).expect("startxref capture");
    match std::str::from_utf8(digits.as_bytes()).ok()?.parse::<u64>() {
        Ok(value) => Some((digits.range(), value)),
        Err(_) => {
            warn!("startxref value does not fit in 64 bits");
            None
        }
    }
}

fn parse_number(digits: &[u8]) -> Option<u32> {
    std::str::from_utf8(digits).ok()?.parse::<u32>().ok()
}
