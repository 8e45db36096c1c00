//! Caller-provided scratch buffers.
//!
//! The reference implementation allocates its per-call scratch with
//! `malloc` on every invocation — a defect for embedded use. Here the
//! caller owns the buffers; this module only validates their sizes and
//! hands back typed views.

use crate::channel_mask::ChannelMask;
use crate::error::ContractError;

/// The four scratch buffer lengths one `convolve` call needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchLayout {
    /// Length of the per-output-channel accumulator (`cout`).
    pub acc_len: usize,
    /// Length of the bit-serial index array (`p`).
    pub idx_len: usize,
    /// Length of the LUT staging buffer (`p * l`).
    pub stage_len: usize,
    /// Length of the memoized-path's per-physical-kernel result buffer (`l`).
    pub phys_result_len: usize,
}

impl ScratchLayout {
    /// Compute the required buffer lengths for precision `p`, pool size
    /// `l`, and `cout` output channels.
    pub const fn sizes(p: usize, l: usize, cout: usize) -> ScratchLayout {
        ScratchLayout {
            acc_len: cout,
            idx_len: p,
            stage_len: p * l,
            phys_result_len: l,
        }
    }
}

/// Caller-owned scratch region for one `convolve` call.
pub struct Scratch<'a> {
    /// Per-output-channel accumulator, reset to zero at the start of every
    /// spatial output position.
    pub acc: &'a mut [i16],
    /// Bit-serial channel masks, reset to zero at the start of every
    /// 8-channel block.
    pub idx: &'a mut [ChannelMask],
    /// LUT staging buffer, `p * l` bytes, refreshed once per block.
    pub stage: &'a mut [i8],
    /// Memoized-path per-physical-kernel result buffer, `l` elements,
    /// overwritten once per block when the memoized accumulator path runs.
    pub phys_result: &'a mut [i32],
}

impl<'a> Scratch<'a> {
    /// Validate `acc`/`idx`/`stage`/`phys_result` against `layout` and wrap
    /// them.
    pub fn from_buffers(
        layout: ScratchLayout,
        acc: &'a mut [i16],
        idx: &'a mut [ChannelMask],
        stage: &'a mut [i8],
        phys_result: &'a mut [i32],
    ) -> Result<Self, ContractError> {
        if acc.len() != layout.acc_len {
            return Err(ContractError::ScratchTooSmall {
                field: "acc",
                needed: layout.acc_len,
                got: acc.len(),
            });
        }
        if idx.len() != layout.idx_len {
            return Err(ContractError::ScratchTooSmall {
                field: "idx",
                needed: layout.idx_len,
                got: idx.len(),
            });
        }
        if stage.len() != layout.stage_len {
            return Err(ContractError::ScratchTooSmall {
                field: "stage",
                needed: layout.stage_len,
                got: stage.len(),
            });
        }
        if phys_result.len() != layout.phys_result_len {
            return Err(ContractError::ScratchTooSmall {
                field: "phys_result",
                needed: layout.phys_result_len,
                got: phys_result.len(),
            });
        }
        Ok(Scratch { acc, idx, stage, phys_result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_spec_formula() {
        let layout = ScratchLayout::sizes(5, 32, 16);
        assert_eq!(layout.acc_len, 16);
        assert_eq!(layout.idx_len, 5);
        assert_eq!(layout.stage_len, 5 * 32);
        assert_eq!(layout.phys_result_len, 32);
    }

    #[test]
    fn from_buffers_rejects_undersized_stage() {
        let layout = ScratchLayout::sizes(5, 32, 16);
        let mut acc = vec![0i16; 16];
        let mut idx = vec![ChannelMask::EMPTY; 5];
        let mut stage = vec![0i8; 10];
        let mut phys_result = vec![0i32; layout.phys_result_len];
        let result = Scratch::from_buffers(layout, &mut acc, &mut idx, &mut stage, &mut phys_result);
        assert!(matches!(
            result,
            Err(ContractError::ScratchTooSmall { field: "stage", .. })
        ));
    }

    #[test]
    fn from_buffers_rejects_undersized_phys_result() {
        let layout = ScratchLayout::sizes(5, 32, 16);
        let mut acc = vec![0i16; layout.acc_len];
        let mut idx = vec![ChannelMask::EMPTY; layout.idx_len];
        let mut stage = vec![0i8; layout.stage_len];
        let mut phys_result = vec![0i32; 4];
        let result = Scratch::from_buffers(layout, &mut acc, &mut idx, &mut stage, &mut phys_result);
        assert!(matches!(
            result,
            Err(ContractError::ScratchTooSmall { field: "phys_result", .. })
        ));
    }

    #[test]
    fn from_buffers_accepts_exact_sizes() {
        let layout = ScratchLayout::sizes(5, 32, 16);
        let mut acc = vec![0i16; layout.acc_len];
        let mut idx = vec![ChannelMask::EMPTY; layout.idx_len];
        let mut stage = vec![0i8; layout.stage_len];
        let mut phys_result = vec![0i32; layout.phys_result_len];
        assert!(Scratch::from_buffers(layout, &mut acc, &mut idx, &mut stage, &mut phys_result).is_ok());
    }
}
