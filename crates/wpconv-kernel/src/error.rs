//! Errors raised by the `convolve` entry point.

use wpconv_core::ContractError;

/// Errors from one `convolve` call.
///
/// All variants are detected at call entry and are fatal: no partial
/// output is written once one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConvolveError {
    /// A data-model contract violation (wrong shapes, oversized pool, ...).
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// The output tensor's channel count does not match the kernel index
    /// table's `cout`.
    #[error("output tensor has {tensor_cout} channels, kernel_idx covers {table_cout}")]
    OutputChannelMismatch {
        /// Channel count of the output tensor descriptor.
        tensor_cout: usize,
        /// `cout` the kernel index table was built for.
        table_cout: usize,
    },
    /// The number of valid channel blocks implied by the filter and input
    /// dimensions does not match the kernel index table's `blocks`.
    #[error("filter/input dims imply {computed} blocks, kernel_idx covers {table_blocks}")]
    BlockCountMismatch {
        /// Blocks implied by filter window * channel depth.
        computed: usize,
        /// `blocks` the kernel index table was built for.
        table_blocks: usize,
    },
    /// Input and output batch counts disagree.
    #[error("input batch count {input_n} does not match output batch count {output_n}")]
    BatchMismatch {
        /// Input tensor's `n`.
        input_n: usize,
        /// Output tensor's `n`.
        output_n: usize,
    },
    /// The output tensor's spatial dims don't match the standard
    /// convolution output-size formula for this input/filter/params.
    #[error("output tensor is {got_h}x{got_w}, padding/stride/filter imply {expected_h}x{expected_w}")]
    SpatialDimsMismatch {
        /// Output height implied by input/filter/params.
        expected_h: usize,
        /// Output width implied by input/filter/params.
        expected_w: usize,
        /// Output tensor's actual height.
        got_h: usize,
        /// Output tensor's actual width.
        got_w: usize,
    },
}
