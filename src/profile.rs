//! Operational profile selection.
//!
//! The upstream C++ implementation this crate's design is distilled from
//! selects `SIMPLE` vs `CBOX` via a compile-time template parameter. We
//! re-architect that as a runtime tagged variant: `Profile` carries the tag
//! that is persisted in key files and session headers, and
//! [`Profile::require`] is the single checkpoint [`keys`](crate::keys),
//! [`envelope`](crate::envelope) and [`actions`](crate::actions) all call
//! through rather than re-implementing the comparison at each site.

use crate::error::{Error, Result};

/// Which envelope/authentication scheme a key or message uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// One-shot KEM-per-message, sender-anonymous. The mandatory baseline.
    Simple,
    /// Curve25519-style crypto box layered on top of the KEM for sender
    /// authentication. Not yet bit-defined upstream; see
    /// [`crate::actions`] for the current behavior.
    Cbox,
}

impl Profile {
    /// The single byte persisted as the leading tag of public/private key
    /// files and implied by the envelope in use.
    pub fn tag(self) -> u8 {
        match self {
            Profile::Simple => 0,
            Profile::Cbox => 1,
        }
    }

    /// Recovers a `Profile` from a persisted tag byte.
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Profile::Simple),
            1 => Ok(Profile::Cbox),
            _ => Err(Error::BadProfile),
        }
    }

    /// Fails unless `self` matches `expected`. Used at every key-load and
    /// envelope-parse boundary so a profile mismatch is always caught in
    /// the same place rather than re-implemented per call site.
    pub fn require(self, expected: Profile) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(Error::BadProfile)
        }
    }
}
