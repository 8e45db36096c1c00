//! Bit-serial accumulator — turns one staged LUT block plus a logical
//! kernel row into a per-output-channel partial sum, and finalizes the
//! accumulated value into a requantized, clamped output activation.

use wpconv_core::{requantize, ChannelMask, KernelIndexTable, Pool, QuantParams};

/// Accumulate one block's contribution into `acc[0..cout)`.
///
/// Picks the direct or memoized path at runtime by comparing `cout`
/// against the pool size `l`: once `cout >= l`, some output channel is
/// guaranteed to share a physical kernel id with another, so folding the
/// staged LUT down to one value per physical kernel before the
/// output-channel loop pays for itself; below that, direct per-channel
/// lookups are cheaper. `phys_result` is caller-owned scratch (length `l`)
/// the memoized path overwrites rather than allocating.
pub fn accumulate_block(
    pool: &Pool<'_>,
    kernel_idx: &KernelIndexTable<'_>,
    block: usize,
    idx: &[ChannelMask],
    stage: &[i8],
    acc: &mut [i16],
    phys_result: &mut [i32],
) {
    let cout = kernel_idx.cout();
    let l = pool.l();
    debug_assert_eq!(acc.len(), cout);
    debug_assert_eq!(stage.len(), idx.len() * l);
    debug_assert_eq!(phys_result.len(), l);

    if cout >= l {
        accumulate_memoized(pool, kernel_idx, block, idx, stage, acc, phys_result);
    } else {
        accumulate_direct(pool, kernel_idx, block, idx, acc);
    }
}

/// Direct path: look up `pool.get(idx[b], phys)` once per output channel
/// per bit layer.
fn accumulate_direct(
    pool: &Pool<'_>,
    kernel_idx: &KernelIndexTable<'_>,
    block: usize,
    idx: &[ChannelMask],
    acc: &mut [i16],
) {
    let cout = kernel_idx.cout();
    for oc in 0..cout {
        let phys = kernel_idx.get(block, oc) as usize;
        let mut sum: i32 = 0;
        for (b, &mask) in idx.iter().enumerate() {
            let contribution = i32::from(pool.get(mask, phys));
            sum += contribution << b;
        }
        // Accumulator overflow is a calibration failure upstream, not a
        // condition this layer detects — it wraps like the reference int16.
        acc[oc] = acc[oc].wrapping_add(sum as i16);
    }
}

/// Memoized path: precompute, once per block, the bit-serial dot product
/// for every physical kernel into caller-owned `phys_result` (`phys_result[p]`),
/// then fan it out across output channels with one addition and one index
/// lookup each.
fn accumulate_memoized(
    pool: &Pool<'_>,
    kernel_idx: &KernelIndexTable<'_>,
    block: usize,
    idx: &[ChannelMask],
    stage: &[i8],
    acc: &mut [i16],
    phys_result: &mut [i32],
) {
    let cout = kernel_idx.cout();
    let l = pool.l();
    for (phys, slot) in phys_result.iter_mut().enumerate() {
        let mut sum: i32 = 0;
        for b in 0..idx.len() {
            let contribution = i32::from(stage[b * l + phys]);
            sum += contribution << b;
        }
        *slot = sum;
    }
    for oc in 0..cout {
        let phys = kernel_idx.get(block, oc) as usize;
        // Accumulator overflow is a calibration failure upstream, not a
        // condition this layer detects, so it wraps like the reference int16.
        acc[oc] = acc[oc].wrapping_add(phys_result[phys] as i16);
    }
}

/// Finalize one output spatial position: add bias, requantize, add the
/// output zero point, and clamp into `[act_min, act_max]`.
pub fn finalize(acc: &[i16], quant: &QuantParams<'_>, out: &mut [i8]) {
    let cout = quant.cout();
    debug_assert_eq!(acc.len(), cout);
    debug_assert_eq!(out.len(), cout);
    for oc in 0..cout {
        let mut sum = i32::from(acc[oc]);
        if let Some(bias) = quant.bias {
            sum += bias[oc];
        }
        let requantized = requantize(sum, quant.mult[oc], quant.shift[oc]);
        let with_zero_point = requantized + quant.z_out;
        let clamped = with_zero_point.clamp(i32::from(quant.act_min), i32::from(quant.act_max));
        out[oc] = clamped as i8;
    }
}
