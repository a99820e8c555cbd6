use num_traits::int::PrimInt;
use num_traits::{FromPrimitive, Unsigned};

/// Clocking width shared by the parallel cipher paths.
///
/// The clock engine advances `BITS` rounds at a time; implementations exist
/// for `u8` (byte path, used for DER headers, tail bytes and the padding
/// bit) and `u32` (word path, used for initialization and message bodies).
/// Bit `k` of any tap slice or feedback value is the value the corresponding
/// single-bit quantity takes at round `k` within the window, so a width-`N`
/// advance is bit-identical to `N` single-bit clocks.
pub trait ClockWidth: PrimInt + Unsigned + FromPrimitive {
    /// Number of cipher rounds covered by one advance at this width.
    const BITS: usize;

    /// Separate even- and odd-indexed bits of `self`, each compacted into
    /// the low half of the result. Classic mask-and-shift gather; no
    /// platform intrinsics, so it behaves the same on every target.
    fn deinterleave(self) -> (Self, Self);
}

impl ClockWidth for u8 {
    const BITS: usize = 8;

    fn deinterleave(self) -> (Self, Self) {
        let v0 = u16::from(self);
        let v1 = ((v0 & 0x00aa) << 7) | (v0 & 0x0055);
        let v2 = ((v1 >> 1) | v1) & 0x3333;
        let v3 = ((v2 >> 2) | v2) & 0x0f0f;

        ((v3 & 0xff) as u8, (v3 >> 8) as u8)
    }
}

impl ClockWidth for u32 {
    const BITS: usize = 32;

    fn deinterleave(self) -> (Self, Self) {
        let v0 = u64::from(self);
        let v1 = ((v0 & 0x0000_0000_aaaa_aaaa) << 31) | (v0 & 0x0000_0000_5555_5555);
        let v2 = ((v1 >> 1) | v1) & 0x3333_3333_3333_3333;
        let v3 = ((v2 >> 2) | v2) & 0x0f0f_0f0f_0f0f_0f0f;
        let v4 = ((v3 >> 4) | v3) & 0x00ff_00ff_00ff_00ff;
        let v5 = ((v4 >> 8) | v4) & 0x0000_ffff_0000_ffff;

        ((v5 & 0xffff_ffff) as u32, (v5 >> 32) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Bit-by-bit gather, the obvious (slow) definition.
    fn naive_deinterleave(v: u32, bits: usize) -> (u32, u32) {
        let mut even = 0u32;
        let mut odd = 0u32;
        for j in 0..bits / 2 {
            even |= ((v >> (2 * j)) & 1) << j;
            odd |= ((v >> (2 * j + 1)) & 1) << j;
        }
        (even, odd)
    }

    #[test]
    fn deinterleave_u8_exhaustive() {
        for v in 0..=255u8 {
            let (even, odd) = v.deinterleave();
            let (e, o) = naive_deinterleave(u32::from(v), 8);
            assert_eq!(u32::from(even), e);
            assert_eq!(u32::from(odd), o);
        }
    }

    proptest! {
        #[test]
        fn deinterleave_u32_matches_naive(v in any::<u32>()) {
            let (even, odd) = v.deinterleave();
            let (e, o) = naive_deinterleave(v, 32);
            prop_assert_eq!(even, e);
            prop_assert_eq!(odd, o);
        }
    }
}
