//! A line-protocol CLI for exercising the weight-pool convolution kernel:
//! `load` a pool and kernel-index table, `run` one `convolve` call,
//! `validate` the table, `describe` the loaded shapes, or `quit`.

pub mod command;
pub mod engine;
pub mod error;

pub use command::Command;
pub use engine::CliEngine;
pub use error::CliError;
