//! Bit-field helpers for register decoding.

use num_traits::{AsPrimitive, PrimInt};

pub fn extract_bit<T>(bits: T, bit: T) -> T
where
    T: PrimInt + AsPrimitive<u32> + Copy,
    u32: AsPrimitive<T>,
{
    extract_bits(bits, bit..=bit)
}

pub fn extract_bits<T>(bits: T, range: std::ops::RangeInclusive<T>) -> T
where
    T: PrimInt + AsPrimitive<u32> + Copy,
    u32: AsPrimitive<T>,
{
    let lsb: u32 = range.start().as_();
    let msb: u32 = range.end().as_();
    let bits: u32 = bits.as_();

    let mask = 1u32.checked_shl(msb + 1).map(|v| v - 1).unwrap_or(u32::MAX);
    let result = (bits & mask) >> lsb;

    result.as_()
}
