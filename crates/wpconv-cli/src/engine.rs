//! The `wpconv-cli` command loop.
//!
//! A single-threaded line protocol over stdin/stdout: `load` a pool and
//! kernel-index table, `run` one `convolve` call against them, `validate`
//! the loaded index table, `describe` the loaded shapes, or `quit`. Unlike
//! the teacher's UCI engine this has no search to interrupt and no
//! background thread — every command runs to completion before the next
//! line is read.

use std::io::BufRead;

use wpconv_core::{
    ChannelMask, KernelIndexTable, Pool, QuantParams, Scratch, ScratchLayout, TensorDesc,
    TensorView, TensorViewMut, DEFAULT_PRECISION,
};

use crate::command::{parse_command, Command, RunArgs};
use crate::error::CliError;

/// The pool and kernel-index table loaded by `load`, held until the next
/// `load` replaces them or the process exits.
struct LoadedTables {
    pool_data: Vec<i8>,
    l: usize,
    kernel_idx_data: Vec<u8>,
    blocks: usize,
    cout: usize,
}

/// Runs the `wpconv-cli` command loop over a given input stream.
pub struct CliEngine {
    loaded: Option<LoadedTables>,
}

impl CliEngine {
    /// Construct an engine with nothing loaded.
    pub fn new() -> Self {
        CliEngine { loaded: None }
    }

    /// Read commands from `input` until `quit` or end of stream, printing
    /// one line of output (or an error) per command to stdout.
    pub fn run<R: BufRead>(&mut self, input: R) {
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    tracing::error!(%err, "wpconv-cli: failed to read a line");
                    break;
                }
            };

            match parse_command(&line) {
                Ok(Command::Quit) => {
                    println!("bye");
                    break;
                }
                Ok(command) => {
                    if let Err(err) = self.dispatch(command) {
                        println!("error: {err}");
                    }
                }
                Err(err) => println!("error: {err}"),
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Load { pool_file, index_file, l, blocks, cout } => {
                self.handle_load(&pool_file, &index_file, l, blocks, cout)
            }
            Command::Run(args) => self.handle_run(&args),
            Command::Validate => self.handle_validate(),
            Command::Describe => self.handle_describe(),
            Command::Quit => unreachable!("quit is handled in run() before dispatch"),
            Command::Unknown(name) => {
                println!("unknown command: {name}");
                Ok(())
            }
        }
    }

    fn handle_load(
        &mut self,
        pool_file: &str,
        index_file: &str,
        l: usize,
        blocks: usize,
        cout: usize,
    ) -> Result<(), CliError> {
        let pool_bytes = std::fs::read(pool_file)?;
        let expected_pool_len = wpconv_core::MASK_ROWS * l;
        if pool_bytes.len() != expected_pool_len {
            return Err(CliError::FileLengthMismatch {
                file: pool_file.to_string(),
                expected: expected_pool_len,
                got: pool_bytes.len(),
            });
        }
        let pool_data: Vec<i8> = pool_bytes.into_iter().map(|b| b as i8).collect();

        let kernel_idx_data = std::fs::read(index_file)?;
        let expected_idx_len = blocks * cout;
        if kernel_idx_data.len() != expected_idx_len {
            return Err(CliError::FileLengthMismatch {
                file: index_file.to_string(),
                expected: expected_idx_len,
                got: kernel_idx_data.len(),
            });
        }

        // Validate shapes up front so a malformed `load` never replaces a
        // good set of loaded tables with a broken one.
        Pool::new(&pool_data, l)?;
        KernelIndexTable::new(&kernel_idx_data, blocks, cout)?;

        self.loaded = Some(LoadedTables { pool_data, l, kernel_idx_data, blocks, cout });
        println!("loaded pool(l={l}) and kernel_idx(blocks={blocks}, cout={cout})");
        Ok(())
    }

    fn handle_validate(&self) -> Result<(), CliError> {
        let loaded = self.loaded.as_ref().ok_or(CliError::NothingLoaded)?;
        let table = KernelIndexTable::new(&loaded.kernel_idx_data, loaded.blocks, loaded.cout)?;
        table.validate_against_pool_size(loaded.l)?;
        println!("ok: every kernel_idx entry is within range for l={}", loaded.l);
        Ok(())
    }

    fn handle_describe(&self) -> Result<(), CliError> {
        let loaded = self.loaded.as_ref().ok_or(CliError::NothingLoaded)?;
        let path = if loaded.cout >= loaded.l { "memoized" } else { "direct" };
        println!(
            "l={} blocks={} cout={} accumulator_path={}",
            loaded.l, loaded.blocks, loaded.cout, path
        );
        Ok(())
    }

    fn handle_run(&self, args: &RunArgs) -> Result<(), CliError> {
        let loaded = self.loaded.as_ref().ok_or(CliError::NothingLoaded)?;

        let input_bytes = std::fs::read(&args.input_file)?;
        let expected_input_len = args.input_desc.len();
        if input_bytes.len() != expected_input_len {
            return Err(CliError::FileLengthMismatch {
                file: args.input_file.clone(),
                expected: expected_input_len,
                got: input_bytes.len(),
            });
        }
        let input_data: Vec<i8> = input_bytes.into_iter().map(|b| b as i8).collect();
        let input = TensorView::new(args.input_desc, &input_data).ok_or(
            CliError::FileLengthMismatch {
                file: args.input_file.clone(),
                expected: expected_input_len,
                got: input_data.len(),
            },
        )?;

        let cout = loaded.cout;
        let mult = read_i32_file(&args.mult_file, cout)?;
        let shift = read_i32_file(&args.shift_file, cout)?;
        let bias = args.bias_file.as_deref().map(|path| read_i32_file(path, cout)).transpose()?;

        let quant = QuantParams {
            mult: &mult,
            shift: &shift,
            bias: bias.as_deref(),
            z_in: args.z_in,
            z_out: args.z_out,
            act_min: args.act_min,
            act_max: args.act_max,
        };

        let pool = Pool::new(&loaded.pool_data, loaded.l)?;
        let kernel_idx = KernelIndexTable::new(&loaded.kernel_idx_data, loaded.blocks, cout)?;

        let (hout, wout) = wpconv_kernel::driver::output_dims(
            args.input_desc,
            args.filter_dims,
            &args.params,
        );
        let out_desc = TensorDesc { n: args.input_desc.n, h: hout, w: wout, c: cout };
        let mut output_data = vec![0i8; out_desc.len()];
        let output = TensorViewMut::new(out_desc, &mut output_data).ok_or(
            CliError::FileLengthMismatch { file: "<output>".to_string(), expected: out_desc.len(), got: 0 },
        )?;

        let precision = if args.precision == 0 { DEFAULT_PRECISION } else { args.precision };
        let layout = ScratchLayout::sizes(precision, loaded.l, cout);
        let mut acc = vec![0i16; layout.acc_len];
        let mut idx = vec![ChannelMask::EMPTY; layout.idx_len];
        let mut stage = vec![0i8; layout.stage_len];
        let mut phys_result = vec![0i32; layout.phys_result_len];
        let mut scratch =
            Scratch::from_buffers(layout, &mut acc, &mut idx, &mut stage, &mut phys_result)?;

        wpconv_kernel::convolve(
            &args.params,
            &quant,
            input,
            args.filter_dims,
            kernel_idx,
            pool,
            output,
            &mut scratch,
        )?;

        print_tensor(&output_data, out_desc);
        Ok(())
    }
}

impl Default for CliEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn read_i32_file(path: &str, expected_len: usize) -> Result<Vec<i32>, CliError> {
    let bytes = std::fs::read(path)?;
    let expected_bytes = expected_len * 4;
    if bytes.len() != expected_bytes {
        return Err(CliError::FileLengthMismatch {
            file: path.to_string(),
            expected: expected_bytes,
            got: bytes.len(),
        });
    }
    Ok(bytes.chunks_exact(4).map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect())
}

fn print_tensor(data: &[i8], desc: TensorDesc) {
    for batch in 0..desc.n {
        for y in 0..desc.h {
            let row_start = desc.offset(batch, y, 0, 0);
            let row_end = row_start + desc.w * desc.c;
            let row: Vec<String> = data[row_start..row_end].iter().map(i8::to_string).collect();
            println!("{}", row.join(" "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_before_load_errors() {
        let engine = CliEngine::new();
        assert!(matches!(engine.handle_describe(), Err(CliError::NothingLoaded)));
    }

    #[test]
    fn validate_before_load_errors() {
        let engine = CliEngine::new();
        assert!(matches!(engine.handle_validate(), Err(CliError::NothingLoaded)));
    }

    #[test]
    fn describe_reports_accumulator_path() {
        let mut engine = CliEngine::new();
        engine.loaded = Some(LoadedTables {
            pool_data: vec![0i8; wpconv_core::MASK_ROWS * 2],
            l: 2,
            kernel_idx_data: vec![0u8; 4],
            blocks: 1,
            cout: 4,
        });
        assert!(engine.handle_describe().is_ok());
    }
}
