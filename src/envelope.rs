//! Building and parsing the per-message session header.
//!
//! The wire encoding is the flat concatenation `encap ‖ nonce`, with no
//! length prefix and no checksum — integrity is the frames' job, not the
//! envelope's. This mirrors `mcleece::encode_session` /
//! `mcleece::decode_session` in the upstream C++ source exactly.

use zeroize::Zeroize;

use crate::adapters::{self, NONCE_BYTES, SESSION_KEY_BYTES};
use crate::error::{Error, Result};
use crate::keys::{PrivateKey, PublicKey};
use crate::profile::Profile;

/// The ephemeral 32-byte symmetric key for one message, plus its KEM
/// encapsulation. `k` must never be written to disk or reused across
/// messages, and is zeroized when this value is dropped.
pub struct SessionKey {
    k: [u8; SESSION_KEY_BYTES],
    /// The opaque KEM ciphertext a receiver decapsulates to recover `k`.
    pub encap: Vec<u8>,
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

impl SessionKey {
    /// The raw 32-byte symmetric key. Only [`crate::codec`] should read
    /// this directly.
    pub(crate) fn key(&self) -> &[u8; SESSION_KEY_BYTES] {
        &self.k
    }
}

/// A 24-byte value, uniformly random per message, that seeds the per-frame
/// nonce counter (see [`crate::codec`]).
#[derive(Clone, Copy)]
pub struct Nonce(pub [u8; NONCE_BYTES]);

impl Nonce {
    fn random<R: rand_core::RngCore + rand_core::CryptoRng>(rng: &mut R) -> Self {
        Nonce(adapters::random_bytes::<_, NONCE_BYTES>(rng))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_BYTES] {
        &self.0
    }
}

/// Byte size of `encap ‖ nonce` for a given profile. A profile-fixed
/// constant; CBOX's value is larger once its ephemeral ECDH point is
/// folded in (not yet bit-defined, see `SPEC_FULL.md` §11).
pub fn encoded_session_size(profile: Profile) -> usize {
    match profile {
        Profile::Simple => adapters::KEM_CIPHERTEXT_BYTES + NONCE_BYTES,
        Profile::Cbox => adapters::KEM_CIPHERTEXT_BYTES + NONCE_BYTES,
    }
}

/// Builds a fresh session header for `pk`: encapsulates a new session key
/// and draws a fresh nonce. Returns the `(SessionKey, Nonce)` pair and
/// their wire encoding.
pub fn build(pk: &PublicKey) -> Result<(SessionKey, Nonce, Vec<u8>)> {
    pk.profile().require(Profile::Simple)?;

    let mut rng = rand::rngs::OsRng;
    let (k, encap) = adapters::kem_encap(pk.raw_bytes(), &mut rng)?;
    let nonce = Nonce::random(&mut rng);

    let mut wire = Vec::with_capacity(encap.len() + NONCE_BYTES);
    wire.extend_from_slice(&encap);
    wire.extend_from_slice(&nonce.0);

    Ok((SessionKey { k, encap }, nonce, wire))
}

/// Parses a session header from the front of `data`, decapsulating the
/// session key with `sk`. Does not over-read: only the first
/// `encoded_session_size()` bytes of `data` are consumed, and the
/// remaining slice (the start of frame 0) is returned alongside.
pub fn parse<'a>(sk: &PrivateKey, data: &'a [u8]) -> Result<(SessionKey, Nonce, &'a [u8])> {
    sk.profile().require(Profile::Simple)?;

    let header_len = encoded_session_size(Profile::Simple);
    if data.len() < header_len {
        return Err(Error::Deserialize);
    }

    let encap_len = adapters::KEM_CIPHERTEXT_BYTES;
    let (encap, rest) = data.split_at(encap_len);
    let (nonce_bytes, rest) = rest.split_at(NONCE_BYTES);

    let k = adapters::kem_decap(sk.raw_bytes(), encap)?;
    let mut nonce = [0u8; NONCE_BYTES];
    nonce.copy_from_slice(nonce_bytes);

    Ok((
        SessionKey {
            k,
            encap: encap.to_vec(),
        },
        Nonce(nonce),
        rest,
    ))
}

/// Derives the nonce for frame `i` from the envelope nonce `n0`, treating
/// `n0` as a little-endian 192-bit counter base and adding `i` with carry
/// propagation. Guarantees nonce uniqueness across a message's frames
/// without transmitting a nonce per frame.
pub fn frame_nonce(n0: &Nonce, i: u64) -> [u8; NONCE_BYTES] {
    let mut out = n0.0;
    let mut carry = i as u128;
    for byte in out.iter_mut() {
        if carry == 0 {
            break;
        }
        let sum = *byte as u128 + (carry & 0xff);
        *byte = sum as u8;
        carry = (carry >> 8) + (sum >> 8);
    }
    out
}
