//! The logical-to-physical kernel index table.
//!
//! `kernel_idx[block * cout + oc]` names the physical kernel id used at
//! channel-block `block` for output channel `oc`. Row-major with
//! `cout` innermost. Immutable for the lifetime of a `convolve` call.

use crate::error::ContractError;

/// A borrowed, read-only view over a logical-to-physical kernel index table.
#[derive(Clone, Copy)]
pub struct KernelIndexTable<'a> {
    data: &'a [u8],
    blocks: usize,
    cout: usize,
}

impl<'a> KernelIndexTable<'a> {
    /// Wrap a flat `[blocks * cout]` byte array as an index table view.
    pub fn new(data: &'a [u8], blocks: usize, cout: usize) -> Result<Self, ContractError> {
        let expected = blocks * cout;
        if data.len() != expected {
            return Err(ContractError::LengthMismatch {
                field: "kernel_idx",
                expected,
                got: data.len(),
            });
        }
        Ok(KernelIndexTable { data, blocks, cout })
    }

    /// Number of 8-wide channel blocks this table covers.
    #[inline]
    pub const fn blocks(&self) -> usize {
        self.blocks
    }

    /// Number of output channels this table covers.
    #[inline]
    pub const fn cout(&self) -> usize {
        self.cout
    }

    /// Fetch the physical kernel id for `(block, oc)`, bounds-checked.
    #[inline]
    pub fn try_get(&self, block: usize, oc: usize) -> Option<u8> {
        if oc >= self.cout {
            return None;
        }
        self.data.get(block * self.cout + oc).copied()
    }

    /// Fetch the physical kernel id for `(block, oc)`.
    ///
    /// Bounds-checked via `debug_assert!` only; the offline packer is the
    /// trusted source for well-formed entries.
    #[inline]
    pub fn get(&self, block: usize, oc: usize) -> u8 {
        debug_assert!(oc < self.cout);
        let idx = block * self.cout + oc;
        debug_assert!(idx < self.data.len());
        // SAFETY: bounds guaranteed by construction for valid (block, oc);
        // debug_assert above catches misuse in test builds.
        unsafe { *self.data.get_unchecked(idx) }
    }

    /// Validate that every entry names a physical kernel id below `l`.
    ///
    /// Used by the CLI's `validate` command and by tests, instead of
    /// relying on release-mode undefined behavior.
    pub fn validate_against_pool_size(&self, l: usize) -> Result<(), ContractError> {
        for (position, &entry) in self.data.iter().enumerate() {
            if entry as usize >= l {
                return Err(ContractError::IndexOutOfRange { entry, position, l });
            }
        }
        Ok(())
    }
}
