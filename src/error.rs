//! The closed error-kind enumeration and its mapping onto sysexits-style
//! process exit codes.
//!
//! Every fallible operation in this crate returns one of these variants.
//! Callers outside the CLI should match on the variant directly rather than
//! inspecting `exit_code()`, which exists purely for the binary front-end.

use failure::Fail;

/// Errors produced while generating, loading, building or parsing the
/// cryptographic material this crate manages.
#[derive(Debug, Fail)]
pub enum Error {
    /// The profile tag recorded in a key file (or implied by a caller's
    /// chosen profile) does not match the profile in use.
    #[fail(display = "key file profile does not match the requested profile")]
    BadProfile,

    /// A read against a key file or stream failed.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[fail(cause)] std::io::Error),

    /// Creating or writing a key file failed. Kept distinct from [`Error::Io`]
    /// because a missing parent directory or other write-side failure always
    /// maps to CANTCREAT (§4.2), regardless of the underlying `ErrorKind` —
    /// an `ErrorKind::NotFound` here means "couldn't create the file", not
    /// "couldn't find an existing one".
    #[fail(display = "failed to write key file: {}", _0)]
    WriteFailure(#[fail(cause)] std::io::Error),

    /// A key file or session header was too short, truncated, or otherwise
    /// not shaped like valid output of this crate.
    #[fail(display = "malformed input")]
    Deserialize,

    /// The key-encapsulation mechanism rejected its input during
    /// encapsulation or decapsulation.
    #[fail(display = "key encapsulation failure")]
    KemFailure,

    /// A frame's authentication tag did not verify. Fatal to the entire
    /// message; the codec never retries.
    #[fail(display = "frame authentication failure")]
    FrameAuthFailure,

    /// The private-key box failed to open under the supplied password.
    /// Returned for both a wrong password and a tampered file; callers
    /// must not try to distinguish the two.
    #[fail(display = "incorrect password or corrupted key file")]
    KeyUnlockFailure,

    /// The password KDF itself failed (e.g. invalid parameters).
    #[fail(display = "key derivation failure: {}", _0)]
    Kdf(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl Error {
    /// Maps this error onto the sysexits-inspired integer codes the CLI
    /// exits with. Only the CLI front-end should call this; library
    /// consumers should match on the `Error` variant instead.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::BadProfile => 65,        // DATAERR
            Error::Io(e) => io_exit_code(e),
            Error::WriteFailure(_) => 73,   // CANTCREAT
            Error::Deserialize => 65,       // DATAERR
            Error::KemFailure => 65,        // DATAERR
            Error::FrameAuthFailure => 65,  // DATAERR
            Error::KeyUnlockFailure => 77,  // NOPERM
            Error::Kdf(_) => 65,            // DATAERR
        }
    }
}

fn io_exit_code(e: &std::io::Error) -> i32 {
    use std::io::ErrorKind;
    match e.kind() {
        ErrorKind::NotFound | ErrorKind::UnexpectedEof => 66, // NOINPUT
        ErrorKind::PermissionDenied => 73,                    // CANTCREAT
        _ => 74,
    }
}

pub type Result<T> = std::result::Result<T, Error>;
