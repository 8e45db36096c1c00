//! Line-protocol command parsing for `wpconv-cli`.

use wpconv_core::{ConvParams, FilterDims, TensorDesc};

use crate::error::CliError;

/// A parsed CLI command.
#[derive(Debug)]
pub enum Command {
    /// `load <pool-file> <index-file> <l> <blocks> <cout>` — load a pool
    /// and kernel-index table from raw binary files.
    Load {
        /// Path to the `256 * l`-byte pool file.
        pool_file: String,
        /// Path to the `blocks * cout`-byte kernel-index file.
        index_file: String,
        /// Physical-kernel pool size.
        l: usize,
        /// Channel blocks per filter.
        blocks: usize,
        /// Output channel count the loaded index table covers.
        cout: usize,
    },
    /// `run <input-file> ...` — execute one `convolve` call against the
    /// currently loaded pool/index table.
    Run(Box<RunArgs>),
    /// `validate` — check every loaded `kernel_idx` entry is `< l`.
    Validate,
    /// `describe` — print loaded pool/index dimensions and which
    /// accumulator path would run.
    Describe,
    /// `quit` — exit the command loop.
    Quit,
    /// Unrecognized command (reported, not silently dropped — unlike the
    /// UCI protocol this line format has no guaranteed-ignorable commands).
    Unknown(String),
}

/// Positional arguments to `run`, parsed out of a `RunArgs` struct to keep
/// [`Command::Run`] from ballooning the enum's size.
#[derive(Debug)]
pub struct RunArgs {
    /// Path to the raw input tensor file.
    pub input_file: String,
    /// Input tensor shape.
    pub input_desc: TensorDesc,
    /// Filter spatial dimensions.
    pub filter_dims: FilterDims,
    /// Padding and stride.
    pub params: ConvParams,
    /// Bit-serial precision `P`.
    pub precision: usize,
    /// Input zero point.
    pub z_in: i32,
    /// Output zero point.
    pub z_out: i32,
    /// Output activation clamp lower bound.
    pub act_min: i8,
    /// Output activation clamp upper bound.
    pub act_max: i8,
    /// Path to the `cout`-length little-endian `i32` multiplier file.
    pub mult_file: String,
    /// Path to the `cout`-length little-endian `i32` shift file.
    pub shift_file: String,
    /// Optional path to the `cout`-length little-endian `i32` bias file.
    pub bias_file: Option<String>,
}

/// Parse a single line of CLI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, CliError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "load" => parse_load(&tokens[1..]),
        "run" => parse_run(&tokens[1..]),
        "validate" => Ok(Command::Validate),
        "describe" => Ok(Command::Describe),
        "quit" => Ok(Command::Quit),
        other => Ok(Command::Unknown(other.to_string())),
    }
}

fn parse_usize(field: &'static str, token: &str) -> Result<usize, CliError> {
    token.parse().map_err(|_| CliError::InvalidNumber { field, value: token.to_string() })
}

fn parse_i32(field: &'static str, token: &str) -> Result<i32, CliError> {
    token.parse().map_err(|_| CliError::InvalidNumber { field, value: token.to_string() })
}

fn parse_i8(field: &'static str, token: &str) -> Result<i8, CliError> {
    token.parse().map_err(|_| CliError::InvalidNumber { field, value: token.to_string() })
}

fn parse_load(tokens: &[&str]) -> Result<Command, CliError> {
    let [pool_file, index_file, l, blocks, cout] = tokens else {
        return Err(CliError::MalformedLoad);
    };
    Ok(Command::Load {
        pool_file: pool_file.to_string(),
        index_file: index_file.to_string(),
        l: parse_usize("l", l)?,
        blocks: parse_usize("blocks", blocks)?,
        cout: parse_usize("cout", cout)?,
    })
}

#[allow(clippy::too_many_lines)]
fn parse_run(tokens: &[&str]) -> Result<Command, CliError> {
    let (fixed, rest) = match tokens.len() {
        18 => (tokens, None),
        19 => (&tokens[..18], Some(tokens[18])),
        _ => return Err(CliError::MalformedRun),
    };

    let [input_file, n, h, w, cin, kernel_y, kernel_x, pad_y, pad_x, stride_y, stride_x, p, z_in, z_out, act_min, act_max, mult_file, shift_file] =
        fixed
    else {
        return Err(CliError::MalformedRun);
    };

    Ok(Command::Run(Box::new(RunArgs {
        input_file: input_file.to_string(),
        input_desc: TensorDesc {
            n: parse_usize("n", n)?,
            h: parse_usize("h", h)?,
            w: parse_usize("w", w)?,
            c: parse_usize("cin", cin)?,
        },
        filter_dims: FilterDims {
            kernel_y: parse_usize("kernel_y", kernel_y)?,
            kernel_x: parse_usize("kernel_x", kernel_x)?,
        },
        params: ConvParams {
            pad_x: parse_usize("pad_x", pad_x)?,
            pad_y: parse_usize("pad_y", pad_y)?,
            stride_x: parse_usize("stride_x", stride_x)?,
            stride_y: parse_usize("stride_y", stride_y)?,
        },
        precision: parse_usize("p", p)?,
        z_in: parse_i32("z_in", z_in)?,
        z_out: parse_i32("z_out", z_out)?,
        act_min: parse_i8("act_min", act_min)?,
        act_max: parse_i8("act_max", act_max)?,
        mult_file: mult_file.to_string(),
        shift_file: shift_file.to_string(),
        bias_file: rest.map(str::to_string),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit() {
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
    }

    #[test]
    fn parse_validate_and_describe() {
        assert!(matches!(parse_command("validate").unwrap(), Command::Validate));
        assert!(matches!(parse_command("describe").unwrap(), Command::Describe));
    }

    #[test]
    fn parse_unknown_command() {
        match parse_command("frobnicate").unwrap() {
            Command::Unknown(name) => assert_eq!(name, "frobnicate"),
            _ => panic!("expected Unknown"),
        }
    }

    #[test]
    fn parse_empty_line() {
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }

    #[test]
    fn parse_load_well_formed() {
        let cmd = parse_command("load pool.bin idx.bin 32 9 4").unwrap();
        match cmd {
            Command::Load { l, blocks, cout, .. } => {
                assert_eq!(l, 32);
                assert_eq!(blocks, 9);
                assert_eq!(cout, 4);
            }
            _ => panic!("expected Load"),
        }
    }

    #[test]
    fn parse_load_missing_args_errors() {
        assert!(matches!(parse_command("load pool.bin idx.bin 32"), Err(CliError::MalformedLoad)));
    }

    #[test]
    fn parse_load_non_numeric_errors() {
        let result = parse_command("load pool.bin idx.bin thirty-two 9 4");
        assert!(matches!(result, Err(CliError::InvalidNumber { field: "l", .. })));
    }

    #[test]
    fn parse_run_without_bias() {
        let cmd = parse_command(
            "run in.bin 1 3 3 8 3 3 1 1 1 1 5 0 0 -128 127 mult.bin shift.bin",
        )
        .unwrap();
        match cmd {
            Command::Run(args) => {
                assert_eq!(args.input_desc, TensorDesc { n: 1, h: 3, w: 3, c: 8 });
                assert_eq!(args.filter_dims, FilterDims { kernel_y: 3, kernel_x: 3 });
                assert!(args.bias_file.is_none());
            }
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn parse_run_with_bias() {
        let cmd = parse_command(
            "run in.bin 1 3 3 8 3 3 1 1 1 1 5 0 0 -128 127 mult.bin shift.bin bias.bin",
        )
        .unwrap();
        match cmd {
            Command::Run(args) => assert_eq!(args.bias_file.as_deref(), Some("bias.bin")),
            _ => panic!("expected Run"),
        }
    }

    #[test]
    fn parse_run_wrong_arity_errors() {
        assert!(matches!(parse_command("run in.bin 1 3 3 8"), Err(CliError::MalformedRun)));
    }
}
