//! Spatial driver — walks output positions, clips the kernel window
//! against the padded input, and enumerates valid channel blocks densely.

use wpconv_core::{ConvParams, FilterDims, TensorDesc};

/// The clipped kernel-window bounds for one output position, in filter
/// coordinates, plus the input-row/column each bound maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowClip {
    /// First valid `ky` (inclusive).
    pub ky_start: usize,
    /// One past the last valid `ky`.
    pub ky_end: usize,
    /// First valid `kx` (inclusive).
    pub kx_start: usize,
    /// One past the last valid `kx`.
    pub kx_end: usize,
    /// Top-left input row this output position's window would start at
    /// absent clipping.
    pub base_y: isize,
    /// Top-left input column this output position's window would start
    /// at absent clipping.
    pub base_x: isize,
}

/// Compute the clipped kernel window for output position `(oy, ox)`.
///
/// `ky` ranges over `max(0, -base_y) .. min(kernel_y, H - base_y)`, and
/// analogously for `kx`; positions outside the valid input rectangle are
/// skipped entirely rather than treated as zero-padded.
pub fn clip_window(
    input: TensorDesc,
    filter: FilterDims,
    params: &ConvParams,
    oy: usize,
    ox: usize,
) -> WindowClip {
    let base_y = (params.stride_y * oy) as isize - params.pad_y as isize;
    let base_x = (params.stride_x * ox) as isize - params.pad_x as isize;

    let ky_start = (-base_y).max(0) as usize;
    let ky_end = ((input.h as isize - base_y).clamp(0, filter.kernel_y as isize)) as usize;
    let kx_start = (-base_x).max(0) as usize;
    let kx_end = ((input.w as isize - base_x).clamp(0, filter.kernel_x as isize)) as usize;

    WindowClip {
        ky_start,
        ky_end: ky_end.max(ky_start),
        kx_start,
        kx_end: kx_end.max(kx_start),
        base_y,
        base_x,
    }
}

/// Output spatial dimensions for `input`/`filter`/`params`, following the
/// standard convolution output-size formula; the caller computes these
/// once and passes the output tensor descriptor in independently.
pub fn output_dims(input: TensorDesc, filter: FilterDims, params: &ConvParams) -> (usize, usize) {
    let h_padded = input.h + 2 * params.pad_y;
    let w_padded = input.w + 2 * params.pad_x;
    let hout = if h_padded >= filter.kernel_y {
        (h_padded - filter.kernel_y) / params.stride_y + 1
    } else {
        0
    };
    let wout = if w_padded >= filter.kernel_x {
        (w_padded - filter.kernel_x) / params.stride_x + 1
    } else {
        0
    };
    (hout, wout)
}
