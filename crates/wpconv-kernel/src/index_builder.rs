//! Index Builder — turns one 8-channel activation block into `P` bit-serial
//! channel masks.

use wpconv_core::{ChannelMask, TensorView};

/// Build `idx[0..p)` from the 8-channel block at `(batch, y, x, g)`.
///
/// `idx` is zeroed before any bits are set, resolving the reference
/// implementation's failure to do so between blocks — stale bits from a
/// previous block must never survive.
///
/// Bit `b` of channel lane `j`'s mask is set when bit `b` of `(activation +
/// z_in)`, treated as an unsigned magnitude, is `1`. Bit 0 is the
/// least-significant bit.
pub fn build_index(
    input: &TensorView<'_>,
    batch: usize,
    y: usize,
    x: usize,
    g: usize,
    z_in: i32,
    p: usize,
    idx: &mut [ChannelMask],
) {
    debug_assert_eq!(idx.len(), p);
    for mask in idx.iter_mut() {
        *mask = ChannelMask::EMPTY;
    }

    let block = input.channel_block(batch, y, x, g);
    for (j, &raw) in block.iter().enumerate() {
        let magnitude = (i32::from(raw) + z_in) as u32;
        for (b, mask) in idx.iter_mut().enumerate().take(p) {
            if (magnitude >> b) & 1 == 1 {
                mask.set(j as u8);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpconv_core::TensorDesc;

    #[test]
    fn zeroes_idx_before_building() {
        let desc = TensorDesc { n: 1, h: 1, w: 1, c: 8 };
        let data = vec![0i8; 8];
        let view = TensorView::new(desc, &data).unwrap();
        let mut idx = vec![ChannelMask::from_raw(0xFF); 5];
        build_index(&view, 0, 0, 0, 0, 0, 5, &mut idx);
        for mask in &idx {
            assert!(mask.is_empty());
        }
    }

    #[test]
    fn single_channel_sets_matching_bits() {
        // channel 0 has value 5 = 0b101 -> bits 0 and 2 set for lane 0.
        let desc = TensorDesc { n: 1, h: 1, w: 1, c: 8 };
        let mut data = vec![0i8; 8];
        data[0] = 5;
        let view = TensorView::new(desc, &data).unwrap();
        let mut idx = vec![ChannelMask::EMPTY; 5];
        build_index(&view, 0, 0, 0, 0, 0, 5, &mut idx);
        assert!(idx[0].contains(0));
        assert!(!idx[1].contains(0));
        assert!(idx[2].contains(0));
    }

    #[test]
    fn zero_point_shifts_before_bit_extraction() {
        // raw -3 with z_in=3 becomes 0 -> no bits set for this lane.
        let desc = TensorDesc { n: 1, h: 1, w: 1, c: 8 };
        let mut data = vec![0i8; 8];
        data[2] = -3;
        let view = TensorView::new(desc, &data).unwrap();
        let mut idx = vec![ChannelMask::EMPTY; 5];
        build_index(&view, 0, 0, 0, 0, 3, 5, &mut idx);
        for mask in &idx {
            assert!(!mask.contains(2));
        }
    }

    #[test]
    fn eight_lanes_map_to_eight_distinct_bit_positions() {
        let desc = TensorDesc { n: 1, h: 1, w: 1, c: 8 };
        let data: Vec<i8> = vec![1, 2, 4, 8, 16, 32, 64, 127];
        let view = TensorView::new(desc, &data).unwrap();
        let mut idx = vec![ChannelMask::EMPTY; 5];
        build_index(&view, 0, 0, 0, 0, 0, 5, &mut idx);
        // lane 0 (value 1) only has bit 0 set.
        assert!(idx[0].contains(0));
        assert_eq!((0..5).filter(|&b| idx[b].contains(0)).count(), 1);
        // lane 4 (value 16 = bit 4) is out of range for p=5 (bits 0..5) -> bit 4 set.
        assert!(idx[4].contains(4));
    }
}
