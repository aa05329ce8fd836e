//! Cross-reference table model for the single flat table of a normalized PDF

use std::ops::Range;

use lazy_static::lazy_static;
use log::warn;
use regex::bytes::Regex as BytesRegex;
use regex::Regex;

use crate::error::{PDFStegoError, PDFStegoResult};

lazy_static! {
    /// The xref block with its subsection header captured separately:
    /// `xref`, `<first> <count>`, then the entry lines, up to `trailer`.
    static ref RE_XREF_TABLE: BytesRegex =
        BytesRegex::new(r"(?s-u)xref\s*\n(\d+)\s+(\d+)\s*\n(.*?)\ntrailer").unwrap();
    /// A fixed-width entry line: 10-digit offset, 5-digit generation, flag.
    static ref RE_ENTRY: Regex = Regex::new(r"^(\d{10})\s+(\d{5})\s+([fn])").unwrap();
}

/// One cross-reference entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XRefEntry {
    /// Byte offset of the object (meaningful for in-use entries)
    pub offset: u64,
    /// Generation number
    pub generation: u16,
    /// `n` entries are in use, `f` entries are free
    pub in_use: bool,
}

impl XRefEntry {
    /// Render the entry in the fixed `%010d %05d %c` layout
    pub fn render(&self) -> String {
        format!(
            "{:010} {:05} {}",
            self.offset,
            self.generation,
            if self.in_use { 'n' } else { 'f' }
        )
    }
}

/// The single cross-reference table of a normalized PDF.
///
/// Entry `i` describes object `first_object + i`. The indexed set is derived
/// from the header range alone, so free entries still count as indexed.
#[derive(Debug, Clone)]
pub struct XRefTable {
    /// First object number of the subsection header
    pub first_object: u32,
    /// Declared entry count of the subsection header
    pub count: u32,
    /// Parsed entry lines
    pub entries: Vec<XRefEntry>,
}

impl XRefTable {
    /// Locate and parse the table inside a full document buffer.
    /// Fails with a structural error when no `xref ... trailer` block with a
    /// subsection header exists — the hard precondition of both the injector
    /// and the extractor.
    pub fn locate(content: &[u8]) -> PDFStegoResult<Self> {
        let caps = RE_XREF_TABLE
            .captures(content)
            .ok_or_else(|| PDFStegoError::structural("xref table not found"))?;

        let first_object = ascii_field(&caps, 1)?.parse::<u32>()?;
        let count = ascii_field(&caps, 2)?.parse::<u32>()?;

        let body = caps.get(3).map(|m| m.as_bytes()).unwrap_or_default();
        let body = String::from_utf8(body.to_vec())
            .map_err(|_| PDFStegoError::xref("xref entries are not ASCII text"))?;

        let entries: Vec<XRefEntry> = body
            .lines()
            .filter_map(|line| parse_entry_line(line.trim()))
            .collect();

        if entries.len() as u32 != count {
            warn!(
                "xref header declares {} entries but {} parsed",
                count,
                entries.len()
            );
        }

        Ok(Self {
            first_object,
            count,
            entries,
        })
    }

    /// Object numbers described by the subsection header range
    pub fn indexed_objects(&self) -> Range<u32> {
        self.first_object..self.first_object + self.count
    }

    /// Highest object number covered by the table, if any
    pub fn max_indexed(&self) -> Option<u32> {
        (self.count > 0).then(|| self.first_object + self.count - 1)
    }
}

/// Parse one fixed-width entry line; `None` for header or malformed lines
pub fn parse_entry_line(line: &str) -> Option<XRefEntry> {
    let caps = RE_ENTRY.captures(line)?;
    Some(XRefEntry {
        offset: caps.get(1)?.as_str().parse().ok()?,
        generation: caps.get(2)?.as_str().parse().ok()?,
        in_use: caps.get(3)?.as_str() == "n",
    })
}

fn ascii_field<'a>(caps: &'a regex::bytes::Captures<'a>, index: usize) -> PDFStegoResult<&'a str> {
    let m = caps
        .get(index)
        .ok_or_else(|| PDFStegoError::xref("missing xref header field"))?;
    std::str::from_utf8(m.as_bytes()).map_err(|_| PDFStegoError::xref("non-ASCII xref header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[u8] = b"1 0 obj\n<< >>\nendobj\n\
        xref\n0 3\n\
        0000000000 65535 f \n\
        0000000012 00000 n \n\
        0000000234 00000 n \n\
        trailer\n<< /Size 3 >>\nstartxref\n21\n%%EOF\n";

    #[test]
    fn test_locate_and_parse() {
        let table = XRefTable::locate(DOC).unwrap();
        assert_eq!(table.first_object, 0);
        assert_eq!(table.count, 3);
        assert_eq!(table.entries.len(), 3);
        assert_eq!(
            table.entries[0],
            XRefEntry {
                offset: 0,
                generation: 65535,
                in_use: false
            }
        );
        assert_eq!(table.entries[1].offset, 12);
        assert_eq!(table.entries[2].offset, 234);
        assert!(table.entries[2].in_use);
    }

    #[test]
    fn test_indexed_objects_range() {
        let table = XRefTable::locate(DOC).unwrap();
        assert_eq!(table.indexed_objects(), 0..3);
        assert_eq!(table.max_indexed(), Some(2));
    }

    #[test]
    fn test_missing_table_is_structural_error() {
        let err = XRefTable::locate(b"%PDF-1.4\nno xref here").unwrap_err();
        assert!(matches!(err, PDFStegoError::StructureNotFound(_)));
    }

    #[test]
    fn test_malformed_entry_lines_are_skipped() {
        let doc = b"xref\n0 2\nnot an entry\n0000000234 00000 n \ntrailer\n";
        let table = XRefTable::locate(doc).unwrap();
        assert_eq!(table.count, 2);
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].offset, 234);
    }

    #[test]
    fn test_entry_render_roundtrip() {
        let entry = XRefEntry {
            offset: 70201,
            generation: 0,
            in_use: true,
        };
        assert_eq!(entry.render(), "0000070201 00000 n");
        assert_eq!(parse_entry_line(&entry.render()), Some(entry));
    }

    #[test]
    fn test_empty_table() {
        let doc = b"xref\n0 0\n\ntrailer\n";
        let table = XRefTable::locate(doc).unwrap();
        assert_eq!(table.count, 0);
        assert_eq!(table.max_indexed(), None);
        assert_eq!(table.indexed_objects().count(), 0);
    }
}
