//! Keypair generation and the public/private key file formats.
//!
//! Public key file: `PROFILE_TAG(1) ‖ RAW_PUBLIC_BYTES`. No padding, no
//! checksum — a corrupted public key simply fails at KEM-encapsulate time.
//!
//! Private key file: `PROFILE_TAG(1) ‖ SALT(16) ‖ KDF_NONCE(24) ‖
//! SEALED_SK`, where `SEALED_SK = secret_box_seal(kdf(password, salt),
//! kdf_nonce, raw_sk)`. Opening it recomputes the derived key and opens the
//! box; a wrong password and a tampered file are indistinguishable, both
//! surfacing as [`Error::KeyUnlockFailure`].

use std::fs;
use std::io::Write;
use std::path::Path;

use zeroize::Zeroize;

use crate::adapters::{self, SALT_BYTES};
use crate::error::{Error, Result};
use crate::profile::Profile;

/// A loaded or freshly generated public key.
pub struct PublicKey {
    profile: Profile,
    raw: Vec<u8>,
}

impl PublicKey {
    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub(crate) fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Reads and parses a public key file written by [`generate_keypair`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let (&tag, raw) = bytes.split_first().ok_or(Error::Deserialize)?;
        let profile = Profile::from_tag(tag)?;
        Ok(PublicKey {
            profile,
            raw: raw.to_vec(),
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.raw.len());
        out.push(self.profile.tag());
        out.extend_from_slice(&self.raw);
        out
    }
}

/// A loaded private key. Held only transiently; the raw key material is
/// zeroized when this value is dropped.
pub struct PrivateKey {
    profile: Profile,
    raw: Vec<u8>,
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.raw.zeroize();
    }
}

impl PrivateKey {
    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub(crate) fn raw_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Reads a private key file and unlocks it with `password`. Returns
    /// [`Error::KeyUnlockFailure`] for both a wrong password and a
    /// tampered file; callers must not try to distinguish the two.
    pub fn load(path: impl AsRef<Path>, password: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let (&tag, rest) = bytes.split_first().ok_or(Error::Deserialize)?;
        let profile = Profile::from_tag(tag)?;

        if rest.len() < SALT_BYTES + adapters::NONCE_BYTES {
            return Err(Error::Deserialize);
        }
        let (salt_bytes, rest) = rest.split_at(SALT_BYTES);
        let (kdf_nonce_bytes, sealed_sk) = rest.split_at(adapters::NONCE_BYTES);

        let mut salt = [0u8; SALT_BYTES];
        salt.copy_from_slice(salt_bytes);
        let mut kdf_nonce = [0u8; adapters::NONCE_BYTES];
        kdf_nonce.copy_from_slice(kdf_nonce_bytes);

        let mut derived = adapters::kdf(password.as_ref(), &salt)?;
        let raw = adapters::secret_box_open(&derived, &kdf_nonce, sealed_sk)
            .map_err(|_| Error::KeyUnlockFailure);
        derived.zeroize();
        let raw = raw?;

        Ok(PrivateKey { profile, raw })
    }
}

/// Generates a fresh KEM keypair for `profile` and writes it to
/// `{path_prefix}.pk` (public, plaintext) and `{path_prefix}.sk` (private,
/// password-encrypted).
pub fn generate_keypair(path_prefix: &str, password: impl AsRef<[u8]>, profile: Profile) -> Result<()> {
    let mut rng = rand::rngs::OsRng;
    let (pk_raw, mut sk_raw) = adapters::kem_keygen(&mut rng);

    let pk = PublicKey {
        profile,
        raw: pk_raw,
    };

    let salt = adapters::random_bytes::<_, SALT_BYTES>(&mut rng);
    let kdf_nonce = adapters::random_bytes::<_, { adapters::NONCE_BYTES }>(&mut rng);
    let mut derived = adapters::kdf(password.as_ref(), &salt)?;
    let sealed_sk = adapters::secret_box_seal(&derived, &kdf_nonce, &sk_raw);
    derived.zeroize();
    sk_raw.zeroize();

    let mut sk_bytes = Vec::with_capacity(1 + SALT_BYTES + adapters::NONCE_BYTES + sealed_sk.len());
    sk_bytes.push(profile.tag());
    sk_bytes.extend_from_slice(&salt);
    sk_bytes.extend_from_slice(&kdf_nonce);
    sk_bytes.extend_from_slice(&sealed_sk);

    write_new_file(&public_key_path(path_prefix), &pk.to_bytes())?;
    write_new_file(&private_key_path(path_prefix), &sk_bytes)?;
    Ok(())
}

/// `{prefix}.pk`, matching the upstream C++ `actions::keypair_to_file`
/// path convention.
pub fn public_key_path(path_prefix: &str) -> String {
    format!("{path_prefix}.pk")
}

/// `{prefix}.sk`.
pub fn private_key_path(path_prefix: &str) -> String {
    format!("{path_prefix}.sk")
}

fn write_new_file(path: &str, contents: &[u8]) -> Result<()> {
    let mut file = fs::File::create(path).map_err(Error::WriteFailure)?;
    file.write_all(contents).map_err(Error::WriteFailure)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn temp_prefix(name: &str) -> String {
        let dir = std::env::temp_dir().join(format!("mcleece-test-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("test").to_string_lossy().into_owned()
    }

    #[test]
    fn keypair_roundtrip_with_correct_password() {
        let prefix = temp_prefix("roundtrip");
        generate_keypair(&prefix, "correct horse", Profile::Simple).unwrap();

        let pk = PublicKey::load(public_key_path(&prefix)).unwrap();
        assert_eq!(pk.profile(), Profile::Simple);

        let sk = PrivateKey::load(private_key_path(&prefix), "correct horse").unwrap();
        assert_eq!(sk.profile(), Profile::Simple);
    }

    #[test]
    fn wrong_password_yields_key_unlock_failure() {
        let prefix = temp_prefix("wrongpw");
        generate_keypair(&prefix, "correct horse", Profile::Simple).unwrap();

        let result = PrivateKey::load(private_key_path(&prefix), "incorrect horse");
        assert_matches!(result, Err(Error::KeyUnlockFailure));
    }

    #[test]
    fn tampered_private_key_yields_key_unlock_failure() {
        let prefix = temp_prefix("tampered");
        generate_keypair(&prefix, "correct horse", Profile::Simple).unwrap();

        let sk_path = private_key_path(&prefix);
        let mut bytes = fs::read(&sk_path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&sk_path, bytes).unwrap();

        let result = PrivateKey::load(&sk_path, "correct horse");
        assert_matches!(result, Err(Error::KeyUnlockFailure));
    }

    #[test]
    fn loading_missing_file_is_not_found() {
        let result = PublicKey::load("/nonexistent/path/for/mcleece/tests.pk");
        assert_matches!(result, Err(Error::Io(_)));
    }

    #[test]
    fn generating_into_missing_directory_is_write_failure() {
        let prefix = "/nonexistent/directory/for/mcleece/tests/prefix";
        let result = generate_keypair(prefix, "correct horse", Profile::Simple);
        assert_matches!(result, Err(Error::WriteFailure(_)));
        assert_eq!(result.unwrap_err().exit_code(), 73);
    }
}
