use std::ops::RangeInclusive;

/// Contains some helper methods to manipulate bits,
/// the index (`bit_idx`) is supposed to be from lsb to msb (right to left)
pub trait Bits: Copy {
    fn get_bit(&self, bit_idx: u8) -> bool;

    fn set_bit(&mut self, bit_idx: u8, value: bool);

    fn set_bit_on(&mut self, bit_idx: u8) {
        self.set_bit(bit_idx, true);
    }

    fn set_bit_off(&mut self, bit_idx: u8) {
        self.set_bit(bit_idx, false);
    }

    /// Returns the bits in `bits_range` shifted down to position 0.
    fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self;

    fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self);

    /// Returns the nth byte, 0 being the least significant one.
    fn get_byte(&self, byte_nth: u8) -> u8;

    /// Treats bit `width - 1` as the sign bit and extends it to the whole value.
    fn sign_extended(&self, width: u8) -> Self;
}

macro_rules! impl_bits {
    ($($unsigned:ty => $signed:ty),*) => {$(
        impl Bits for $unsigned {
            fn get_bit(&self, bit_idx: u8) -> bool {
                debug_assert!(u32::from(bit_idx) < <$unsigned>::BITS);
                (*self >> bit_idx) & 1 == 1
            }

            fn set_bit(&mut self, bit_idx: u8, value: bool) {
                debug_assert!(u32::from(bit_idx) < <$unsigned>::BITS);
                let mask: $unsigned = 1 << bit_idx;
                if value {
                    *self |= mask;
                } else {
                    *self &= !mask;
                }
            }

            fn get_bits(&self, bits_range: RangeInclusive<u8>) -> Self {
                let (start, end) = (*bits_range.start(), *bits_range.end());
                debug_assert!(start <= end);
                (*self >> start) & Self::low_mask(u32::from(end - start) + 1)
            }

            fn set_bits(&mut self, bits_range: RangeInclusive<u8>, value: Self) {
                let (start, end) = (*bits_range.start(), *bits_range.end());
                debug_assert!(start <= end);
                let mask = Self::low_mask(u32::from(end - start) + 1) << start;
                *self = (*self & !mask) | ((value << start) & mask);
            }

            fn get_byte(&self, byte_nth: u8) -> u8 {
                debug_assert!(u32::from(byte_nth) * 8 < <$unsigned>::BITS);
                (*self >> (byte_nth * 8)) as u8
            }

            fn sign_extended(&self, width: u8) -> Self {
                debug_assert!(width > 0 && u32::from(width) <= <$unsigned>::BITS);
                let unused = <$unsigned>::BITS - u32::from(width);
                (((*self << unused) as $signed) >> unused) as $unsigned
            }
        }

        impl LowMask for $unsigned {
            fn low_mask(len: u32) -> Self {
                if len >= <$unsigned>::BITS {
                    <$unsigned>::MAX
                } else {
                    (1 << len) - 1
                }
            }
        }
    )*};
}

trait LowMask {
    fn low_mask(len: u32) -> Self;
}

impl_bits!(u16 => i16, u32 => i32);

/// Rotations on 32-bit words, amounts are taken modulo 32.
pub trait Rotate {
    #[must_use]
    fn rotate_right_by(self, amount: u32) -> Self;

    #[must_use]
    fn rotate_left_by(self, amount: u32) -> Self;
}

impl Rotate for u32 {
    fn rotate_right_by(self, amount: u32) -> Self {
        self.rotate_right(amount % Self::BITS)
    }

    fn rotate_left_by(self, amount: u32) -> Self {
        self.rotate_left(amount % Self::BITS)
    }
}
