//! Line-protocol errors for the `wpconv-cli` command loop.

use wpconv_core::ContractError;
use wpconv_kernel::ConvolveError;

/// Errors that can occur while parsing or executing one CLI command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// `load` is missing one of its five required arguments.
    #[error("malformed load command: expected 'load <pool-file> <index-file> <l> <blocks> <cout>'")]
    MalformedLoad,

    /// `run` is missing one of its required positional arguments.
    #[error("malformed run command: expected 'run <input-file> <n> <h> <w> <cin> <kernel_y> <kernel_x> <pad_y> <pad_x> <stride_y> <stride_x> <p> <z_in> <z_out> <act_min> <act_max> <mult-file> <shift-file> [bias-file]'")]
    MalformedRun,

    /// A numeric argument could not be parsed.
    #[error("invalid value for {field}: {value}")]
    InvalidNumber {
        /// The argument's name.
        field: &'static str,
        /// The offending token.
        value: String,
    },

    /// A command that needs a loaded pool/index table was run before `load`.
    #[error("no pool/kernel_idx loaded — run 'load' first")]
    NothingLoaded,

    /// A binary file's length didn't match what its declared shape requires.
    #[error("'{file}' is {got} bytes, expected {expected}")]
    FileLengthMismatch {
        /// The file that failed the length check.
        file: String,
        /// The length its declared shape requires.
        expected: usize,
        /// Its actual length on disk.
        got: usize,
    },

    /// A data-model contract violation surfaced while executing `run`.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A `convolve` call failed.
    #[error(transparent)]
    Convolve(#[from] ConvolveError),

    /// Reading a file named in a command failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
