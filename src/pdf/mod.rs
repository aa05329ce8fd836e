//! Structural layer: landmark scanning and the cross-reference table

pub mod scanner;
mod xref;

pub use xref::{parse_entry_line, XRefEntry, XRefTable};
