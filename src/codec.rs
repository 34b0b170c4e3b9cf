//! Chunking a plaintext stream into independently authenticated frames,
//! and the inverse operation.
//!
//! A message on the wire is `SessionHeader ‖ Frame₀ ‖ Frame₁ ‖ …`. All
//! frames except the last are exactly `MAX_CHUNK + MAC_LEN` ciphertext
//! bytes; the stream is self-delimiting via frame size, not a length
//! prefix. This module owns the blocking read/write loop; it has no
//! suspension points of its own (§5).

use std::io::{Read, Write};

use zeroize::Zeroize;

use crate::adapters::MAC_BYTES;
use crate::envelope;
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::secure::Scratch;

/// Maximum plaintext bytes carried by one frame: 1 MiB.
pub const MAX_CHUNK: usize = 0x100000;

/// Ciphertext length of a non-final frame: `MAX_CHUNK + MAC_LEN`.
fn ciphertext_frame_len(max_length: usize) -> usize {
    max_length + MAC_BYTES
}

/// Encrypts `input` to `output` under `pk`, using `max_length` as the
/// upper bound on per-frame plaintext size. Emits the session header
/// followed by one frame per `max_length`-sized (or shorter, for the
/// last) chunk read from `input`.
pub fn encrypt_stream<R: Read, W: Write>(
    pk: &PublicKey,
    mut input: R,
    mut output: W,
    max_length: usize,
) -> Result<()> {
    let (session, n0, header) = envelope::build(pk)?;
    output.write_all(&header)?;

    let mut buf = Scratch::zeroed(max_length);
    let mut index: u64 = 0;
    let mut sealed_any = false;
    loop {
        let n = read_fill(&mut input, &mut buf)?;
        if n == 0 && sealed_any {
            break;
        }
        sealed_any = true;

        let nonce = envelope::frame_nonce(&n0, index);
        let ciphertext = crate::adapters::secret_box_seal(session.key(), &nonce, &buf[..n]);
        output.write_all(&ciphertext)?;

        if n < max_length {
            // Short read: confirm EOF before stopping, per §4.4 step 4.
            let mut probe = [0u8; 1];
            if input.read(&mut probe)? != 0 {
                return Err(Error::Deserialize);
            }
            break;
        }
        index += 1;
    }
    Ok(())
}

/// Decrypts `input` to `output` using `sk`, reading `max_length +
/// MAC_BYTES` bytes per frame. `max_length` must be ≥ the value the
/// sender used, or frames will misparse; for robustness callers should
/// pass the maximum.
pub fn decrypt_stream<R: Read, W: Write>(
    sk: &PrivateKey,
    mut input: R,
    mut output: W,
    max_length: usize,
) -> Result<()> {
    let header_len = envelope::encoded_session_size(sk.profile());
    let mut header = vec![0u8; header_len];
    let got = read_fill(&mut input, &mut header)?;
    if got < header_len {
        return Err(Error::Deserialize);
    }

    let (session, n0, leftover) = envelope::parse(sk, &header)?;
    debug_assert!(leftover.is_empty());

    let frame_len = ciphertext_frame_len(max_length);
    let mut buf = Scratch::zeroed(frame_len);
    let mut index: u64 = 0;
    let mut frame_seen = false;
    loop {
        let n = read_fill(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        if n < MAC_BYTES {
            return Err(Error::Deserialize);
        }
        frame_seen = true;

        let nonce = envelope::frame_nonce(&n0, index);
        let mut plaintext = crate::adapters::secret_box_open(session.key(), &nonce, &buf[..n])?;
        output.write_all(&plaintext)?;
        plaintext.zeroize();

        if n < frame_len {
            let mut probe = [0u8; 1];
            if input.read(&mut probe)? != 0 {
                return Err(Error::Deserialize);
            }
            break;
        }
        index += 1;
    }
    if !frame_seen {
        // A valid message always has at least one frame, even for empty
        // plaintext; a header with nothing after it is truncated, not empty.
        return Err(Error::Deserialize);
    }
    Ok(())
}

/// Reads into `buf` until it is full or the input is exhausted, returning
/// the number of bytes actually read. This is what lets a single `Read`
/// impl that returns short reads (pipes, sockets) still fill a frame.
fn read_fill<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = input.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{self, PrivateKey, PublicKey};
    use crate::profile::Profile;

    fn temp_prefix(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("mcleece-codec-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("test").to_string_lossy().into_owned()
    }

    fn fresh_keypair(name: &str) -> (PublicKey, PrivateKey) {
        let prefix = temp_prefix(name);
        keys::generate_keypair(&prefix, "a password", Profile::Simple).unwrap();
        let pk = PublicKey::load(keys::public_key_path(&prefix)).unwrap();
        let sk = PrivateKey::load(keys::private_key_path(&prefix), "a password").unwrap();
        (pk, sk)
    }

    fn roundtrip(plaintext: &[u8]) -> Vec<u8> {
        let (pk, sk) = fresh_keypair("roundtrip");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, plaintext, &mut ciphertext, MAX_CHUNK).unwrap();

        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, MAX_CHUNK).unwrap();
        out
    }

    #[test]
    fn s1_short_message_roundtrips() {
        let plaintext = b"hello world";
        let (pk, sk) = fresh_keypair("s1");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &plaintext[..], &mut ciphertext, MAX_CHUNK).unwrap();

        let header_len = envelope::encoded_session_size(Profile::Simple);
        assert_eq!(ciphertext.len(), header_len + plaintext.len() + MAC_BYTES);

        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, MAX_CHUNK).unwrap();
        assert_eq!(out, plaintext);
    }

    #[test]
    fn s6_empty_message_roundtrips_as_single_empty_frame() {
        let (pk, sk) = fresh_keypair("s6");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &b""[..], &mut ciphertext, MAX_CHUNK).unwrap();

        let header_len = envelope::encoded_session_size(Profile::Simple);
        assert_eq!(ciphertext.len(), header_len + MAC_BYTES);

        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, MAX_CHUNK).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn s2_exact_chunk_boundary_is_one_frame() {
        // Use a small chunk size so the test doesn't allocate a full MiB.
        let small_chunk = 4096;
        let plaintext = vec![0x42u8; small_chunk];
        let (pk, sk) = fresh_keypair("s2");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &plaintext[..], &mut ciphertext, small_chunk).unwrap();

        let header_len = envelope::encoded_session_size(Profile::Simple);
        assert_eq!(ciphertext.len(), header_len + small_chunk + MAC_BYTES);

        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, small_chunk).unwrap();
        assert_eq!(out, plaintext);
    }

    #[test]
    fn s3_chunk_plus_one_byte_is_two_frames() {
        let small_chunk = 4096;
        let plaintext = vec![0x24u8; small_chunk + 1];
        let (pk, sk) = fresh_keypair("s3");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &plaintext[..], &mut ciphertext, small_chunk).unwrap();

        let header_len = envelope::encoded_session_size(Profile::Simple);
        let expected = header_len + (small_chunk + MAC_BYTES) + (1 + MAC_BYTES);
        assert_eq!(ciphertext.len(), expected);

        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, small_chunk).unwrap();
        assert_eq!(out, plaintext);
    }

    #[test]
    fn s4_tamper_is_detected_and_nothing_partial_leaks() {
        let (pk, sk) = fresh_keypair("s4");
        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &b"hello world"[..], &mut ciphertext, MAX_CHUNK).unwrap();

        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xff;

        let mut out = Vec::new();
        let result = decrypt_stream(&sk, &ciphertext[..], &mut out, MAX_CHUNK);
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn two_encryptions_of_same_plaintext_differ() {
        let (pk, _sk) = fresh_keypair("nonreuse");
        let mut a = Vec::new();
        let mut b = Vec::new();
        encrypt_stream(&pk, &b"hello world"[..], &mut a, MAX_CHUNK).unwrap();
        encrypt_stream(&pk, &b"hello world"[..], &mut b, MAX_CHUNK).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn concatenating_two_messages_fails_at_second_message() {
        // Use a chunk size that exactly matches the first message's
        // length, so its frame is full-size rather than a short read;
        // the decoder then expects another frame to follow rather than
        // EOF, and finds the second message's header instead.
        let small_chunk = b"first message".len();
        let (pk, sk) = fresh_keypair("concat");
        let mut first = Vec::new();
        encrypt_stream(&pk, &b"first message"[..], &mut first, small_chunk).unwrap();

        let (pk2, _sk2) = fresh_keypair("concat2");
        let mut second = Vec::new();
        encrypt_stream(&pk2, &b"second message"[..], &mut second, small_chunk).unwrap();

        let mut concatenated = first.clone();
        concatenated.extend_from_slice(&second);

        // Decrypting under the first key successfully authenticates the
        // first message's one full-size frame, then fails to
        // authenticate the second message's header/frame bytes as a
        // continuation of the first message.
        let mut out = Vec::new();
        let result = decrypt_stream(&sk, &concatenated[..], &mut out, small_chunk);
        assert!(result.is_err());
        assert_eq!(out, b"first message");
    }

    #[test]
    fn reordering_full_size_frames_is_detected() {
        let small_chunk = 16;
        let plaintext = vec![0xabu8; small_chunk * 2];
        let (pk, sk) = fresh_keypair("reorder");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &plaintext[..], &mut ciphertext, small_chunk).unwrap();

        let header_len = envelope::encoded_session_size(Profile::Simple);
        let frame_len = small_chunk + MAC_BYTES;
        let (header, frames) = ciphertext.split_at(header_len);
        let (frame0, frame1) = frames.split_at(frame_len);

        let mut swapped = Vec::with_capacity(ciphertext.len());
        swapped.extend_from_slice(header);
        swapped.extend_from_slice(frame1);
        swapped.extend_from_slice(frame0);

        let mut out = Vec::new();
        let result = decrypt_stream(&sk, &swapped[..], &mut out, small_chunk);
        assert!(result.is_err());
    }

    #[test]
    fn large_roundtrip_spans_multiple_frames() {
        let small_chunk = 1024;
        let plaintext = vec![0x11u8; small_chunk * 3 + 17];
        let (pk, sk) = fresh_keypair("large");

        let mut ciphertext = Vec::new();
        encrypt_stream(&pk, &plaintext[..], &mut ciphertext, small_chunk).unwrap();
        let mut out = Vec::new();
        decrypt_stream(&sk, &ciphertext[..], &mut out, small_chunk).unwrap();
        assert_eq!(out, plaintext);
    }

    #[test]
    fn roundtrip_helper_covers_basic_case() {
        assert_eq!(roundtrip(b"via helper"), b"via helper");
    }
}
