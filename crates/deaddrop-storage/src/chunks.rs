//! Streaming chunk framing for dead-drop ciphertexts
//!
//! An encrypted drop is an ordered sequence of independently sealed
//! windows with no global header:
//!
//! ```text
//! u32_le(len) || nonce(12) || ciphertext || tag(16)
//! ```
//!
//! `len` counts the ciphertext and tag but not the nonce or the length
//! prefix itself. Windows are fixed at 4 MiB; only the final window may
//! be shorter, and a zero-length input produces a zero-chunk file.
//! A single window buffer is reused across the whole stream so memory
//! stays constant regardless of input size.

use std::io::{ErrorKind, Read, Write};

use deaddrop_crypto::{CryptoError, SessionKey, NONCE_SIZE, TAG_SIZE};

use crate::error::StorageResult;

/// Plaintext window size (4 MiB)
pub const CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Encrypt a stream into chunk frames
///
/// Returns the total number of bytes written.
pub fn encrypt_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    key: &SessionKey,
) -> StorageResult<u64> {
    let mut window = vec![0u8; CHUNK_SIZE];
    let mut written = 0u64;

    loop {
        let filled = read_window(reader, &mut window)?;
        if filled == 0 {
            break;
        }

        let sealed = key.seal_chunk(&window[..filled])?;
        let ct_len = (sealed.len() - NONCE_SIZE) as u32;

        writer.write_all(&ct_len.to_le_bytes())?;
        writer.write_all(&sealed)?;
        written += 4 + sealed.len() as u64;
    }

    writer.flush()?;
    Ok(written)
}

/// Decrypt a stream of chunk frames
///
/// Returns the total number of plaintext bytes recovered. Any altered
/// byte, including a corrupted length prefix, surfaces as
/// [`CryptoError::AuthFailure`].
pub fn decrypt_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    key: &SessionKey,
) -> StorageResult<u64> {
    let mut len_buf = [0u8; 4];
    let mut recovered = 0u64;

    loop {
        match reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let ct_len = u32::from_le_bytes(len_buf) as usize;
        if ct_len < TAG_SIZE || ct_len > CHUNK_SIZE + TAG_SIZE {
            return Err(CryptoError::AuthFailure.into());
        }

        let mut sealed = vec![0u8; NONCE_SIZE + ct_len];
        reader
            .read_exact(&mut sealed)
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => CryptoError::AuthFailure.into(),
                _ => crate::error::StorageError::Io(e),
            })?;

        let plaintext = key.open_chunk(&sealed)?;
        writer.write_all(&plaintext)?;
        recovered += plaintext.len() as u64;
    }

    writer.flush()?;
    Ok(recovered)
}

/// Fill the window from the reader, stopping only at EOF
///
/// `Read::read` may return short counts; a window is complete only
/// when it is full or the stream ends.
fn read_window<R: Read>(reader: &mut R, window: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < window.len() {
        match reader.read(&mut window[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use std::io::Cursor;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(data), &mut sealed, &key).unwrap();

        let mut recovered = Vec::new();
        decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap();
        recovered
    }

    /// Number of frames in an encrypted stream
    fn count_chunks(mut sealed: &[u8]) -> usize {
        let mut chunks = 0;
        while !sealed.is_empty() {
            let ct_len = u32::from_le_bytes(sealed[..4].try_into().unwrap()) as usize;
            sealed = &sealed[4 + NONCE_SIZE + ct_len..];
            chunks += 1;
        }
        chunks
    }

    #[test]
    fn test_empty_input_produces_zero_chunks() {
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        let written = encrypt_stream(&mut Cursor::new(b""), &mut sealed, &key).unwrap();

        assert_eq!(written, 0);
        assert!(sealed.is_empty());

        let mut recovered = Vec::new();
        let n = decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap();
        assert_eq!(n, 0);
        assert!(recovered.is_empty());
    }

    #[test]
    fn test_short_input_single_chunk() {
        let data = b"hello, world!";
        assert_eq!(roundtrip(data), data);

        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(data), &mut sealed, &key).unwrap();
        assert_eq!(count_chunks(&sealed), 1);
        assert_eq!(sealed.len(), 4 + NONCE_SIZE + data.len() + TAG_SIZE);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_chunk() {
        let data = vec![0x5Au8; 2 * CHUNK_SIZE];
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(&data), &mut sealed, &key).unwrap();

        assert_eq!(count_chunks(&sealed), 2);

        let mut recovered = Vec::new();
        decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn test_one_past_boundary_gets_short_tail() {
        let data = vec![0xA5u8; CHUNK_SIZE + 1];
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(&data), &mut sealed, &key).unwrap();

        assert_eq!(count_chunks(&sealed), 2);

        let mut recovered = Vec::new();
        decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap();
        assert_eq!(recovered, data);
    }

    #[test]
    fn test_tampered_chunk_fails_without_output() {
        let data = vec![0x11u8; 1024];
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(&data), &mut sealed, &key).unwrap();

        // Flip a ciphertext byte inside the first (only) frame
        sealed[4 + NONCE_SIZE + 10] ^= 0xFF;

        let mut recovered = Vec::new();
        let err = decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap_err();
        assert!(matches!(err, StorageError::Crypto(CryptoError::AuthFailure)));
        assert!(recovered.is_empty());
    }

    #[test]
    fn test_truncated_stream_fails() {
        let data = vec![0x22u8; 1024];
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(&data), &mut sealed, &key).unwrap();

        sealed.truncate(sealed.len() - 7);

        let mut recovered = Vec::new();
        let err = decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap_err();
        assert!(matches!(err, StorageError::Crypto(CryptoError::AuthFailure)));
    }

    #[test]
    fn test_corrupt_length_prefix_fails() {
        let data = vec![0x33u8; 64];
        let key = SessionKey::generate();
        let mut sealed = Vec::new();
        encrypt_stream(&mut Cursor::new(&data), &mut sealed, &key).unwrap();

        // An absurd length is treated as tampering, not an allocation request
        sealed[3] = 0xFF;

        let mut recovered = Vec::new();
        let err = decrypt_stream(&mut Cursor::new(&sealed), &mut recovered, &key).unwrap_err();
        assert!(matches!(err, StorageError::Crypto(CryptoError::AuthFailure)));
    }
}
