//! Payload codec shared by the injector and the extractor.
//!
//! Payloads are carried inside a PDF dictionary as a base64 token, so every
//! encoded value is ASCII-safe. With a passphrase the inner layer is
//! AES-256-CBC with PKCS7 padding under a SHA-256-derived key; without one the
//! base64 wraps the raw payload bytes directly.

mod aes;

pub use aes::{AESCipher, BLOCK_SIZE};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::PDFStegoResult;

/// Encode a text payload to an ASCII-safe dictionary value
pub fn encode_text(plain: &str, key: Option<&str>) -> String {
    encode_bytes(plain.as_bytes(), key)
}

/// Decode a text payload. Fails on malformed base64, bad padding or non-UTF-8
/// plaintext.
pub fn decode_text(encoded: &str, key: Option<&str>) -> PDFStegoResult<String> {
    let raw = decode_bytes(encoded.as_bytes(), key)?;
    Ok(String::from_utf8(raw)?)
}

/// Encode a raw byte payload to an ASCII-safe dictionary value
pub fn encode_bytes(raw: &[u8], key: Option<&str>) -> String {
    match key {
        Some(passphrase) => BASE64.encode(AESCipher::new(passphrase).encrypt(raw)),
        None => BASE64.encode(raw),
    }
}

/// Decode a raw byte payload from its base64 dictionary value
pub fn decode_bytes(encoded: &[u8], key: Option<&str>) -> PDFStegoResult<Vec<u8>> {
    let decoded = BASE64.decode(encoded)?;
    match key {
        Some(passphrase) => AESCipher::new(passphrase).decrypt(&decoded),
        None => Ok(decoded),
    }
}
