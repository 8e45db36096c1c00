//! LUT Stager — copies the pool rows addressed by one block's channel
//! masks into fast scratch.

use wpconv_core::{ChannelMask, Pool};

/// Stage `pool`'s rows for `idx` into `stage`, `l` bytes per bit layer.
///
/// `stage` must be `idx.len() * pool.l()` bytes; `idx[b]` is bounded by
/// construction (an 8-bit mask addresses one of the pool's 256 rows), so
/// staging itself has no error path.
pub fn stage_lut(pool: &Pool<'_>, idx: &[ChannelMask], stage: &mut [i8]) {
    let l = pool.l();
    debug_assert_eq!(stage.len(), idx.len() * l);
    for (b, &mask) in idx.iter().enumerate() {
        pool.copy_row(mask, &mut stage[b * l..(b + 1) * l]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wpconv_core::MASK_ROWS;

    fn pool_with(l: usize, fill: impl Fn(usize, usize) -> i8) -> Vec<i8> {
        let mut v = vec![0i8; MASK_ROWS * l];
        for mask in 0..MASK_ROWS {
            for phys in 0..l {
                v[mask * l + phys] = fill(mask, phys);
            }
        }
        v
    }

    #[test]
    fn stages_one_row_per_bit() {
        let l = 4;
        let data = pool_with(l, |mask, phys| (mask + phys) as i8);
        let pool = Pool::new(&data, l).unwrap();
        let idx = [ChannelMask::from_raw(1), ChannelMask::from_raw(2), ChannelMask::from_raw(3)];
        let mut stage = vec![0i8; idx.len() * l];
        stage_lut(&pool, &idx, &mut stage);

        for (b, &mask) in idx.iter().enumerate() {
            for phys in 0..l {
                assert_eq!(stage[b * l + phys], pool.get(mask, phys));
            }
        }
    }
}
