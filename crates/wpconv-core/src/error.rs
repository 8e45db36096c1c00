//! Contract errors for the weight-pool data model.

/// Errors raised when the shapes or contents passed into the core violate
/// one of the invariants of the data model.
///
/// All variants are detected at call entry and are fatal: no partial
/// output is ever written once one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// `Cin % FW_GRAN != 0` — channels do not divide evenly into blocks.
    #[error("input channel count {cin} is not a multiple of the block width {granularity}")]
    ChannelsNotBlockAligned {
        /// The offending channel count.
        cin: usize,
        /// The configured block width (normally 8).
        granularity: usize,
    },
    /// `L > 2^8` — physical kernel ids would not fit in a byte.
    #[error("pool size {l} exceeds 256 physical kernels")]
    PoolTooLarge {
        /// The offending pool size.
        l: usize,
    },
    /// A `kernel_idx` entry names a physical kernel id that is out of range.
    #[error("kernel_idx entry {entry} at position {position} is out of range for pool size {l}")]
    IndexOutOfRange {
        /// The offending physical kernel id.
        entry: u8,
        /// Flat position of the offending entry in `kernel_idx`.
        position: usize,
        /// The pool size the entry must be below.
        l: usize,
    },
    /// `P > 8` — bit-serial precision does not fit in a byte-wide mask.
    #[error("bit-serial precision {p} exceeds the supported maximum of 8")]
    PrecisionOutOfRange {
        /// The offending precision.
        p: usize,
    },
    /// A caller-provided scratch buffer is smaller than required.
    #[error("scratch buffer '{field}' needs {needed} elements, got {got}")]
    ScratchTooSmall {
        /// Which scratch buffer was undersized.
        field: &'static str,
        /// The required length.
        needed: usize,
        /// The provided length.
        got: usize,
    },
    /// The flat pool or kernel-index byte array is not the expected length.
    #[error("'{field}' expected {expected} bytes, got {got}")]
    LengthMismatch {
        /// Which table failed the length check.
        field: &'static str,
        /// The expected flat length.
        expected: usize,
        /// The actual length.
        got: usize,
    },
}
