//! Thin oracles over the cryptographic primitives this crate composes: a
//! Classic McEliece KEM, an authenticated secret-box, a memory-hard
//! password KDF, and a CSPRNG.
//!
//! Nothing in this module understands key files, envelopes, or frames —
//! that's [`crate::keys`], [`crate::envelope`] and [`crate::codec`]. This
//! module only binds named contracts to concrete crates, so swapping a
//! primitive later touches one file.

use classic_mceliece_rust::{
    decapsulate_boxed, encapsulate_boxed, keypair_boxed, Ciphertext as KemCiphertext,
    PublicKey as KemPublicKey, SecretKey as KemSecretKey, CRYPTO_BYTES, CRYPTO_CIPHERTEXTBYTES,
    CRYPTO_PUBLICKEYBYTES, CRYPTO_SECRETKEYBYTES,
};
use crypto_secretbox::aead::{Aead, KeyInit};
use crypto_secretbox::{Key as BoxKey, Nonce as BoxNonce, XSalsa20Poly1305};
use rand_core::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// Byte size of a Classic McEliece (mceliece460896f) public key.
pub const KEM_PUBLIC_KEY_BYTES: usize = CRYPTO_PUBLICKEYBYTES;
/// Byte size of a Classic McEliece private key.
pub const KEM_SECRET_KEY_BYTES: usize = CRYPTO_SECRETKEYBYTES;
/// Byte size of a KEM encapsulation (the wire ciphertext carrying the
/// session key).
pub const KEM_CIPHERTEXT_BYTES: usize = CRYPTO_CIPHERTEXTBYTES;
/// Byte size of the shared/session key the KEM produces. Fixed at 32 by
/// §3 regardless of the KEM variant in use.
pub const SESSION_KEY_BYTES: usize = CRYPTO_BYTES;
/// Byte size of a secret-box nonce.
pub const NONCE_BYTES: usize = 24;
/// Byte size of a secret-box authentication tag.
pub const MAC_BYTES: usize = 16;
/// Byte size of the password KDF salt.
pub const SALT_BYTES: usize = 16;

/// Generates a fresh KEM keypair using `rng`. `|pk|` and `|sk|` are fixed
/// by the build's Classic McEliece parameter set.
pub fn kem_keygen<R: RngCore + CryptoRng>(rng: &mut R) -> (Vec<u8>, Vec<u8>) {
    let (pk, sk) = keypair_boxed(rng);
    (pk.as_array().to_vec(), sk.as_array().to_vec())
}

/// Encapsulates a fresh session key under `pk` using `rng`. Fails if `pk`
/// is not the expected length for this build's KEM variant.
pub fn kem_encap<R: RngCore + CryptoRng>(
    pk_bytes: &[u8],
    rng: &mut R,
) -> Result<([u8; SESSION_KEY_BYTES], Vec<u8>)> {
    if pk_bytes.len() != KEM_PUBLIC_KEY_BYTES {
        return Err(Error::Deserialize);
    }
    let pk = KemPublicKey::from(pk_bytes);
    let (shared_secret, ct) = encapsulate_boxed(&pk, rng);

    let mut key = [0u8; SESSION_KEY_BYTES];
    key.copy_from_slice(shared_secret.as_array());
    Ok((key, ct.as_array().to_vec()))
}

/// Recovers the session key from an encapsulation `c` using `sk`.
/// Decapsulation failure is treated uniformly regardless of why the
/// ciphertext was rejected, per §4.1's constant-time requirement.
pub fn kem_decap(sk_bytes: &[u8], ct_bytes: &[u8]) -> Result<[u8; SESSION_KEY_BYTES]> {
    if sk_bytes.len() != KEM_SECRET_KEY_BYTES {
        return Err(Error::Deserialize);
    }
    if ct_bytes.len() != KEM_CIPHERTEXT_BYTES {
        return Err(Error::KemFailure);
    }
    let sk = KemSecretKey::from(sk_bytes);
    let ct = KemCiphertext::from(ct_bytes);
    let shared_secret = decapsulate_boxed(&ct, &sk);

    let mut key = [0u8; SESSION_KEY_BYTES];
    key.copy_from_slice(shared_secret.as_array());
    Ok(key)
}

/// Seals `plaintext` under `key`/`nonce`. `|ciphertext| = |plaintext| +
/// MAC_BYTES`. Infallible for correctly-sized keys and nonces, mirroring
/// the upstream `Cipher::seal` contract this module's split descends from.
pub fn secret_box_seal(key: &[u8; 32], nonce: &[u8; NONCE_BYTES], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XSalsa20Poly1305::new(BoxKey::from_slice(key));
    cipher
        .encrypt(BoxNonce::from_slice(nonce), plaintext)
        .expect("secret box seal with fixed-size key/nonce cannot fail")
}

/// Opens `ciphertext` under `key`/`nonce`. Any authentication failure —
/// tampering, wrong key, wrong nonce — is reported as the single
/// [`Error::FrameAuthFailure`] variant.
pub fn secret_box_open(
    key: &[u8; 32],
    nonce: &[u8; NONCE_BYTES],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XSalsa20Poly1305::new(BoxKey::from_slice(key));
    cipher
        .decrypt(BoxNonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::FrameAuthFailure)
}

/// Derives a 32-byte key from `password` and `salt` using a memory-hard
/// password hash (Argon2id, RFC 9106 defaults).
pub fn kdf(password: &[u8], salt: &[u8; SALT_BYTES]) -> Result<[u8; 32]> {
    use argon2::Argon2;

    let mut out = [0u8; 32];
    Argon2::default()
        .hash_password_into(password, salt, &mut out)
        .map_err(|e| Error::Kdf(e.to_string()))?;
    Ok(out)
}

/// Fills a fixed-size buffer with output from `rng`.
pub fn random_bytes<R: RngCore + CryptoRng, const N: usize>(rng: &mut R) -> [u8; N] {
    let mut buf = [0u8; N];
    rng.fill_bytes(&mut buf);
    buf
}
