//! AES-256-CBC cipher with a passphrase-derived key

use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use generic_array::GenericArray;
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{PDFStegoError, PDFStegoResult};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-256-CBC cipher keyed by `SHA256(passphrase)`.
///
/// The wire layout is `IV || ciphertext`: a fresh random IV is generated per
/// encryption and carried as the first block. Plaintext is PKCS7-padded to the
/// block size before encryption.
pub struct AESCipher {
    key: Zeroizing<[u8; 32]>,
}

impl AESCipher {
    /// Derive a 256-bit key from a passphrase of any length
    pub fn new(passphrase: &str) -> Self {
        let digest = Sha256::digest(passphrase.as_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Encrypt a raw buffer, returning `IV || ciphertext`
    pub fn encrypt(&self, raw: &[u8]) -> Vec<u8> {
        let padded = pad(raw);
        let mut iv = [0u8; BLOCK_SIZE];
        thread_rng().fill_bytes(&mut iv);

        let cipher = Aes256::new(GenericArray::from_slice(&self.key[..]));
        let mut output = Vec::with_capacity(BLOCK_SIZE + padded.len());
        output.extend_from_slice(&iv);

        let mut prev = iv;
        for chunk in padded.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            for (i, (&c, &p)) in chunk.iter().zip(prev.iter()).enumerate() {
                block[i] = c ^ p;
            }
            cipher.encrypt_block(GenericArray::from_mut_slice(&mut block));
            prev = block;
            output.extend_from_slice(&block);
        }

        output
    }

    /// Decrypt an `IV || ciphertext` buffer and strip PKCS7 padding
    pub fn decrypt(&self, data: &[u8]) -> PDFStegoResult<Vec<u8>> {
        if data.len() < 2 * BLOCK_SIZE || (data.len() - BLOCK_SIZE) % BLOCK_SIZE != 0 {
            return Err(PDFStegoError::decode(format!(
                "ciphertext length {} is not IV plus whole blocks",
                data.len()
            )));
        }

        let (iv, ciphertext) = data.split_at(BLOCK_SIZE);
        let cipher = Aes256::new(GenericArray::from_slice(&self.key[..]));

        let mut plaintext = Vec::with_capacity(ciphertext.len());
        let mut prev = [0u8; BLOCK_SIZE];
        prev.copy_from_slice(iv);

        for chunk in ciphertext.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            cipher.decrypt_block(GenericArray::from_mut_slice(&mut block));
            for (b, p) in block.iter_mut().zip(prev.iter()) {
                *b ^= p;
            }
            plaintext.extend_from_slice(&block);
            prev.copy_from_slice(chunk);
        }

        unpad(&mut plaintext)?;
        Ok(plaintext)
    }
}

/// PKCS7 padding: pad value equals pad length, full extra block when aligned
fn pad(data: &[u8]) -> Vec<u8> {
    let pad_len = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut padded = Vec::with_capacity(data.len() + pad_len);
    padded.extend_from_slice(data);
    padded.extend(std::iter::repeat(pad_len as u8).take(pad_len));
    padded
}

/// Strip PKCS7 padding in place
fn unpad(data: &mut Vec<u8>) -> PDFStegoResult<()> {
    let pad_len = *data
        .last()
        .ok_or_else(|| PDFStegoError::decode("empty plaintext, no padding byte"))?
        as usize;

    if pad_len == 0 || pad_len > data.len() {
        return Err(PDFStegoError::decode(format!(
            "invalid PKCS7 pad length {} for {} bytes",
            pad_len,
            data.len()
        )));
    }
    if data[data.len() - pad_len..].iter().any(|&b| b as usize != pad_len) {
        return Err(PDFStegoError::decode("inconsistent PKCS7 padding bytes"));
    }

    data.truncate(data.len() - pad_len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_pkcs7_pad_partial_block() {
        let padded = pad(b"hello");
        assert_eq!(padded.len(), BLOCK_SIZE);
        assert_eq!(&padded[..5], b"hello");
        assert!(padded[5..].iter().all(|&b| b == 11));
    }

    #[test]
    fn test_pkcs7_pad_aligned_adds_full_block() {
        let padded = pad(&[7u8; BLOCK_SIZE]);
        assert_eq!(padded.len(), 2 * BLOCK_SIZE);
        assert!(padded[BLOCK_SIZE..].iter().all(|&b| b as usize == BLOCK_SIZE));
    }

    #[test]
    fn test_pkcs7_unpad_roundtrip() {
        let mut padded = pad(b"some payload bytes");
        unpad(&mut padded).unwrap();
        assert_eq!(padded, b"some payload bytes");
    }

    #[test]
    fn test_pkcs7_unpad_rejects_oversized_length() {
        let mut data = vec![1u8, 2, 200];
        assert!(matches!(
            unpad(&mut data),
            Err(PDFStegoError::DecodeError(_))
        ));
    }

    #[test]
    fn test_pkcs7_unpad_rejects_zero_length() {
        let mut data = vec![1u8, 2, 0];
        assert!(matches!(
            unpad(&mut data),
            Err(PDFStegoError::DecodeError(_))
        ));
    }

    #[rstest]
    #[case(b"".to_vec())]
    #[case(b"x".to_vec())]
    #[case(b"exactly sixteen!".to_vec())]
    #[case(vec![0u8; 1000])]
    fn test_encrypt_decrypt_roundtrip(#[case] payload: Vec<u8>) {
        let cipher = AESCipher::new("passphrase");
        let encrypted = cipher.encrypt(&payload);
        assert_ne!(&encrypted[BLOCK_SIZE..], payload.as_slice());
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), payload);
    }

    #[test]
    fn test_fresh_iv_per_encryption() {
        let cipher = AESCipher::new("passphrase");
        let a = cipher.encrypt(b"same message");
        let b = cipher.encrypt(b"same message");
        assert_ne!(a[..BLOCK_SIZE], b[..BLOCK_SIZE]);
    }

    #[test]
    fn test_key_derivation_is_deterministic() {
        let a = AESCipher::new("secret");
        let b = AESCipher::new("secret");
        let encrypted = a.encrypt(b"message");
        assert_eq!(b.decrypt(&encrypted).unwrap(), b"message");
    }

    #[test]
    fn test_decrypt_rejects_short_input() {
        let cipher = AESCipher::new("secret");
        assert!(matches!(
            cipher.decrypt(&[0u8; BLOCK_SIZE]),
            Err(PDFStegoError::DecodeError(_))
        ));
    }

    #[test]
    fn test_decrypt_rejects_ragged_input() {
        let cipher = AESCipher::new("secret");
        assert!(matches!(
            cipher.decrypt(&[0u8; BLOCK_SIZE * 2 + 3]),
            Err(PDFStegoError::DecodeError(_))
        ));
    }
}
