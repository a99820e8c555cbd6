use alloc::vec::Vec;
use num::traits::{FromPrimitive, Unsigned};

use crate::traits::ClockWidth;

/// Extract the `8 * size_of::<W>()` consecutive bits of a 128-bit register
/// image starting at `index`, so that bit `k` of the result equals bit
/// `index + k` of `value`. Windows spanning byte boundaries need no special
/// casing in this representation.
pub fn bits_at<W: Unsigned + FromPrimitive>(value: u128, index: usize) -> W {
    let width = core::mem::size_of::<W>() * 8;
    debug_assert!(index + width <= 128);

    let mask = if width == 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };

    W::from_u128((value >> index) & mask).expect("slice fits the requested width")
}

/// Split two back-to-back width-`W` pre-output values into the encryption
/// and authentication key streams.
///
/// `first` and `second` together hold `2 * W::BITS` interleaved bits, in
/// clock order; the even-indexed ones encrypt, the odd-indexed ones drive
/// the authenticator. Returns `(even, odd)`.
pub fn split_streams<W: ClockWidth>(first: W, second: W) -> (W, W) {
    let half = W::BITS / 2;

    let (first_even, first_odd) = first.deinterleave();
    let (second_even, second_odd) = second.deinterleave();

    (
        (second_even << half) | first_even,
        (second_odd << half) | first_odd,
    )
}

/// DER-encode an associated data length: short form (one byte) below 128,
/// otherwise `0x80 | n` followed by the `n` big-endian length bytes.
pub fn len_encode(length: u64) -> Vec<u8> {
    if length < 128 {
        vec![length as u8]
    } else {
        let bytes = length.to_be_bytes();
        let skip = bytes.iter().take_while(|&&b| b == 0).count();

        let mut encoded = vec![0x80 | (8 - skip) as u8];
        encoded.extend_from_slice(&bytes[skip..]);
        encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Define a macro to generate proptest-based checks of `bits_at` against
    // per-bit extraction, one per supported slice width.
    macro_rules! test_bits_at_for {
        ($name:tt, $type:ty) => {
            proptest! {
                #[test]
                fn $name(value in any::<u128>(), index in 0..(128 - core::mem::size_of::<$type>() * 8)) {
                    let slice: $type = bits_at(value, index);
                    for k in 0..(core::mem::size_of::<$type>() * 8) {
                        let expected = ((value >> (index + k)) & 1) as $type;
                        prop_assert_eq!((slice >> k) & 1, expected);
                    }
                }
            }
        };
    }

    test_bits_at_for!(test_bits_at_u8, u8);
    test_bits_at_for!(test_bits_at_u32, u32);

    /// Reference splitter working on the concatenated raw stream.
    fn naive_split_u8(first: u8, second: u8) -> (u8, u8) {
        let raw = (u16::from(second) << 8) | u16::from(first);
        let mut even = 0u8;
        let mut odd = 0u8;
        for j in 0..8 {
            even |= (((raw >> (2 * j)) & 1) as u8) << j;
            odd |= (((raw >> (2 * j + 1)) & 1) as u8) << j;
        }
        (even, odd)
    }

    #[test]
    fn split_streams_u8_exhaustive() {
        for first in 0..=255u8 {
            for second in 0..=255u8 {
                assert_eq!(split_streams(first, second), naive_split_u8(first, second));
            }
        }
    }

    proptest! {
        #[test]
        fn split_streams_u32_matches_naive(first in any::<u32>(), second in any::<u32>()) {
            let raw = (u64::from(second) << 32) | u64::from(first);
            let mut even = 0u32;
            let mut odd = 0u32;
            for j in 0..32 {
                even |= (((raw >> (2 * j)) & 1) as u32) << j;
                odd |= (((raw >> (2 * j + 1)) & 1) as u32) << j;
            }
            prop_assert_eq!(split_streams(first, second), (even, odd));
        }
    }

    #[test]
    fn len_encode_short_form() {
        assert_eq!(len_encode(0), [0x00]);
        assert_eq!(len_encode(1), [0x01]);
        assert_eq!(len_encode(127), [0x7f]);
    }

    #[test]
    fn len_encode_long_form() {
        assert_eq!(len_encode(128), [0x81, 0x80]);
        assert_eq!(len_encode(200), [0x81, 0xc8]);
        assert_eq!(len_encode(255), [0x81, 0xff]);
        assert_eq!(len_encode(256), [0x82, 0x01, 0x00]);
        assert_eq!(len_encode(65535), [0x82, 0xff, 0xff]);
        assert_eq!(len_encode(1 << 24), [0x84, 0x01, 0x00, 0x00, 0x00]);
        assert_eq!(
            len_encode(u64::MAX),
            [0x88, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }
}
