// Copyright 2024 The mcleece Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! File- and stream-level encryption built on a hybrid construction: a
//! post-quantum key-encapsulation mechanism (Classic McEliece) protects a
//! short-lived symmetric session key, which in turn authenticates and
//! encrypts arbitrary-length payloads via an authenticated secret-box
//! (XSalsa20-Poly1305).
//!
//! # Overview
//!
//! Five pieces, leaves first:
//!
//! - [`adapters`] — thin oracles over the KEM, the secret-box, the password
//!   KDF, and the CSPRNG.
//! - [`keys`] — keypair generation, and the public/password-encrypted
//!   private key file formats.
//! - [`envelope`] — building and parsing the per-message session header
//!   (`encap ‖ nonce`).
//! - [`codec`] — the streaming chunked encrypt/decrypt loop, one
//!   independently authenticated frame per chunk.
//! - [`actions`] — the three end-to-end operations a caller actually
//!   wants: `keypair_to_file`, `encrypt`, `decrypt`.
//!
//! Two operational profiles exist: [`profile::Profile::Simple`] (one-shot
//! KEM-per-message, sender-anonymous; the mandatory baseline) and
//! [`profile::Profile::Cbox`] (a Curve25519-style crypto-box profile
//! planned for sender authentication, not yet bit-defined — see
//! `SPEC_FULL.md`).
//!
//! # Example
//!
//! ```no_run
//! use mcleece::{actions, profile::Profile};
//!
//! actions::keypair_to_file("/tmp/alice", "correct horse", Profile::Simple)?;
//!
//! let mut ciphertext = Vec::new();
//! actions::encrypt(
//!     "/tmp/alice",
//!     "hello world".as_bytes(),
//!     &mut ciphertext,
//!     Profile::Simple,
//!     mcleece::codec::MAX_CHUNK,
//! )?;
//!
//! let mut plaintext = Vec::new();
//! actions::decrypt(
//!     "/tmp/alice",
//!     "correct horse",
//!     &ciphertext[..],
//!     &mut plaintext,
//!     Profile::Simple,
//!     mcleece::codec::MAX_CHUNK,
//! )?;
//! assert_eq!(plaintext, b"hello world");
//! # Ok::<(), mcleece::error::Error>(())
//! ```

pub mod actions;
pub mod adapters;
pub mod codec;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod profile;
mod secure;

pub use error::Error;
pub use profile::Profile;
