//! The `Convolve` operator: index builder, LUT stager, accumulator, and
//! spatial driver wired into a single entry point.
//!
//! No data-model types live here — see `wpconv-core` for `Pool`,
//! `KernelIndexTable`, `TensorView`, `QuantParams`, and `Scratch`.

pub mod accumulator;
pub mod driver;
pub mod error;
pub mod index_builder;
pub mod lut_stager;

use wpconv_core::{
    ContractError, ConvParams, FilterDims, KernelIndexTable, Pool, QuantParams, Scratch,
    TensorView, TensorViewMut, FW_GRAN,
};

pub use error::ConvolveError;

/// Run one weight-pool quantized convolution.
///
/// Validates every contract named in spec §7 at entry — channel/block
/// alignment, table shapes, scratch sizing — before touching `output`.
/// `Hout == 0 || Wout == 0` is a no-op (property 4): the output buffer is
/// never written. No partial output is ever produced once an `Err` is
/// returned.
pub fn convolve(
    params: &ConvParams,
    quant: &QuantParams<'_>,
    input: TensorView<'_>,
    filter_dims: FilterDims,
    kernel_idx: KernelIndexTable<'_>,
    pool: Pool<'_>,
    mut output: TensorViewMut<'_>,
    scratch: &mut Scratch<'_>,
) -> Result<(), ConvolveError> {
    let in_desc = input.desc();
    let out_desc = output.desc();

    if in_desc.c % FW_GRAN != 0 {
        let err = ContractError::ChannelsNotBlockAligned {
            cin: in_desc.c,
            granularity: FW_GRAN,
        };
        tracing::error!(error = %err, "convolve: contract violation");
        return Err(err.into());
    }

    if out_desc.c != kernel_idx.cout() {
        let err = ConvolveError::OutputChannelMismatch {
            tensor_cout: out_desc.c,
            table_cout: kernel_idx.cout(),
        };
        tracing::error!(error = %err, "convolve: output channel mismatch");
        return Err(err);
    }

    if out_desc.n != in_desc.n {
        let err = ConvolveError::BatchMismatch {
            input_n: in_desc.n,
            output_n: out_desc.n,
        };
        tracing::error!(error = %err, "convolve: batch mismatch");
        return Err(err);
    }

    let blocks_per_position = (in_desc.c / FW_GRAN) * filter_dims.kernel_y * filter_dims.kernel_x;
    if blocks_per_position != kernel_idx.blocks() {
        let err = ConvolveError::BlockCountMismatch {
            computed: blocks_per_position,
            table_blocks: kernel_idx.blocks(),
        };
        tracing::error!(error = %err, "convolve: block count mismatch");
        return Err(err);
    }

    let (hout, wout) = driver::output_dims(in_desc, filter_dims, params);
    if hout != out_desc.h || wout != out_desc.w {
        let err = ConvolveError::SpatialDimsMismatch {
            expected_h: hout,
            expected_w: wout,
            got_h: out_desc.h,
            got_w: out_desc.w,
        };
        tracing::error!(error = %err, "convolve: spatial dims mismatch");
        return Err(err);
    }

    // Idempotence of empty invocation (spec §8 property 4): bail out
    // before validating or touching scratch — there is nothing to compute.
    if hout == 0 || wout == 0 {
        return Ok(());
    }

    let p = scratch.idx.len();
    if p == 0 || p > 8 {
        let err = ContractError::PrecisionOutOfRange { p };
        tracing::error!(error = %err, "convolve: contract violation");
        return Err(err.into());
    }
    let l = pool.l();
    if scratch.stage.len() != p * l {
        let err = ContractError::ScratchTooSmall {
            field: "stage",
            needed: p * l,
            got: scratch.stage.len(),
        };
        tracing::error!(error = %err, "convolve: contract violation");
        return Err(err.into());
    }
    if scratch.acc.len() != out_desc.c {
        let err = ContractError::ScratchTooSmall {
            field: "acc",
            needed: out_desc.c,
            got: scratch.acc.len(),
        };
        tracing::error!(error = %err, "convolve: contract violation");
        return Err(err.into());
    }
    if scratch.phys_result.len() != l {
        let err = ContractError::ScratchTooSmall {
            field: "phys_result",
            needed: l,
            got: scratch.phys_result.len(),
        };
        tracing::error!(error = %err, "convolve: contract violation");
        return Err(err.into());
    }

    let cout = out_desc.c;
    let mut out_row = vec![0i8; cout];

    for batch in 0..in_desc.n {
        for oy in 0..out_desc.h {
            for ox in 0..out_desc.w {
                scratch.acc.fill(0);

                let clip = driver::clip_window(in_desc, filter_dims, params, oy, ox);
                let mut block_id = 0usize;

                for ky in clip.ky_start..clip.ky_end {
                    let in_row = (clip.base_y + ky as isize) as usize;
                    for kx in clip.kx_start..clip.kx_end {
                        let in_col = (clip.base_x + kx as isize) as usize;

                        let mut g = 0;
                        while g < in_desc.c {
                            index_builder::build_index(
                                &input, batch, in_row, in_col, g, quant.z_in, p, scratch.idx,
                            );
                            lut_stager::stage_lut(&pool, scratch.idx, scratch.stage);
                            accumulator::accumulate_block(
                                &pool,
                                &kernel_idx,
                                block_id,
                                scratch.idx,
                                scratch.stage,
                                scratch.acc,
                                scratch.phys_result,
                            );
                            block_id += 1;
                            g += FW_GRAN;
                        }
                    }
                }

                tracing::debug!(batch, oy, ox, block_id, "convolve: position accumulated");

                accumulator::finalize(scratch.acc, quant, &mut out_row);
                for (oc, &value) in out_row.iter().enumerate() {
                    output.set(batch, oy, ox, oc, value);
                }
            }
        }
    }

    Ok(())
}
