//! Ad hoc zeroizing scratch buffers, in the style of the upstream `pwbox`
//! crate's `SensitiveData`: a [`SmallVec`] that keeps small buffers on the
//! stack, cleared via [`clear_on_drop`] when it goes out of scope.
//!
//! Named domain secrets ([`crate::keys::PrivateKey`],
//! [`crate::envelope::SessionKey`]) derive `zeroize::Zeroize` directly
//! instead; this type is for the transient read buffers
//! [`crate::codec`] reuses across frames, which don't warrant their own
//! struct but still hold plaintext that must not outlive the call.

use std::ops::{Deref, DerefMut};

use clear_on_drop::ClearOnDrop;
use smallvec::SmallVec;

/// Expected upper bound on buffers that benefit from staying off the heap.
/// Frame buffers are typically far larger than this and simply spill to
/// the heap, same as `SmallVec` does for any oversized push.
const INLINE_CAPACITY: usize = 256;

/// A growable byte buffer that is overwritten with zeros before its
/// backing memory is released.
pub struct Scratch(SmallVec<[u8; INLINE_CAPACITY]>);

impl Scratch {
    /// A zero-filled buffer of exactly `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Scratch(smallvec::smallvec![0; len])
    }
}

impl Deref for Scratch {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl DerefMut for Scratch {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let handle = ClearOnDrop::new(&mut self.0);
        drop(handle); // zeroed here
    }
}
