//! End-to-end orchestration: generate a keypair to disk, encrypt a stream,
//! decrypt a stream. This is the boundary the CLI calls through; everything
//! below here returns [`crate::error::Error`], and only this module's
//! callers (the binary) translate that into the sysexits-style integers
//! from §6.

use std::io::{Read, Write};

use crate::codec;
use crate::error::Result;
use crate::keys::{self, PrivateKey, PublicKey};
use crate::profile::Profile;

/// Generates a keypair for `profile` and writes it to `{path_prefix}.pk` /
/// `{path_prefix}.sk`, the latter encrypted under `password`.
pub fn keypair_to_file(path_prefix: &str, password: impl AsRef<[u8]>, profile: Profile) -> Result<()> {
    keys::generate_keypair(path_prefix, password, profile)
}

/// Loads the public key at `{path_prefix}.pk` and encrypts `input` to
/// `output` under it. `max_length` bounds per-frame plaintext size; the
/// default is [`codec::MAX_CHUNK`].
pub fn encrypt<R: Read, W: Write>(
    path_prefix: &str,
    input: R,
    output: W,
    profile: Profile,
    max_length: usize,
) -> Result<()> {
    let pk = PublicKey::load(keys::public_key_path(path_prefix))?;
    pk.profile().require(profile)?;
    codec::encrypt_stream(&pk, input, output, max_length)
}

/// Loads and unlocks the private key at `{path_prefix}.sk` with `password`,
/// and decrypts `input` to `output`. `max_length` must be ≥ the value the
/// sender used; callers unsure of the sender's choice should pass
/// [`codec::MAX_CHUNK`].
pub fn decrypt<R: Read, W: Write>(
    path_prefix: &str,
    password: impl AsRef<[u8]>,
    input: R,
    output: W,
    profile: Profile,
    max_length: usize,
) -> Result<()> {
    let sk = PrivateKey::load(keys::private_key_path(path_prefix), password)?;
    sk.profile().require(profile)?;
    codec::decrypt_stream(&sk, input, output, max_length)
}
