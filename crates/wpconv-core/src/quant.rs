//! Per-channel quantization parameters and the requantize primitive.

/// Per-output-channel quantization parameters, plus the scalar zero points
/// and activation clamp shared by every channel.
pub struct QuantParams<'a> {
    /// Per-channel fixed-point multiplier (Q31 convention, see [`requantize`]).
    pub mult: &'a [i32],
    /// Per-channel shift, consumed as `31 - shift` total right-shift.
    pub shift: &'a [i32],
    /// Optional per-channel bias, added before requantization.
    pub bias: Option<&'a [i32]>,
    /// Input zero-point, added to every activation before bit decomposition.
    pub z_in: i32,
    /// Output zero-point, added after requantization.
    pub z_out: i32,
    /// Lower bound of the output activation clamp.
    pub act_min: i8,
    /// Upper bound of the output activation clamp.
    pub act_max: i8,
}

impl<'a> QuantParams<'a> {
    /// Number of output channels these parameters cover.
    #[inline]
    pub fn cout(&self) -> usize {
        self.mult.len()
    }
}

/// Fixed-point multiply-and-round-to-nearest, followed by an arithmetic
/// (sign-preserving) right shift.
///
/// This mirrors CMSIS-NN's single-rounding `arm_nn_requantize`: `val` is
/// multiplied by `multiplier` in a 64-bit intermediate, rounded to the
/// nearest representable Q31 value, then shifted right by `31 - shift`.
///
/// A signed value's right shift is implementation-defined for negative
/// operands in C; here the shift is explicitly arithmetic (sign-preserving),
/// never logical.
#[inline]
pub fn requantize(val: i32, multiplier: i32, shift: i32) -> i32 {
    let total_shift = 31i64 - shift as i64;
    let product = i64::from(val) * i64::from(multiplier);
    let result = arithmetic_shift_right_i64(product, total_shift - 1);
    let rounded = arithmetic_shift_right_i64(result + 1, 1);
    rounded as i32
}

/// Arithmetic (sign-preserving) right shift on `i64`, clamping negative or
/// out-of-range shift amounts to a left shift / saturation respectively so
/// the primitive stays total over the `shift` values callers pass in.
#[inline]
fn arithmetic_shift_right_i64(val: i64, shift: i64) -> i64 {
    if shift <= 0 {
        val << (-shift).min(63)
    } else if shift >= 64 {
        val >> 63
    } else {
        val >> shift
    }
}
