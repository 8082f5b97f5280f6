//! Fixed-width 256-bit word model shared by registers and data memory.
//!
//! A [`Word`] is stored as eight little-endian 32-bit limbs, so limb `0` holds
//! bits `0..32` and limb `7` holds bits `224..256`. Widths are fixed at the
//! architectural constants below; every setter takes an already-bounded
//! integer type, and the only fallible constructors are the byte/hex parsers
//! that can encounter wider inputs.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{BoundsTarget, SimError};

/// Register and data-memory word width in bits.
pub const XLEN: u32 = 256;
/// Number of 32-bit limbs per word.
pub const LIMBS: usize = 8;
/// Width of a single limb in bits.
pub const LIMB_WIDTH: u32 = u32::BITS;
/// Number of 16-bit half-limbs per word.
pub const HALF_LIMBS: usize = LIMBS * 2;
/// Width of a single half-limb in bits.
pub const HALF_LIMB_WIDTH: u32 = LIMB_WIDTH / 2;
/// Number of bytes in the big-endian byte form of a word.
pub const WORD_BYTES: usize = LIMBS * 4;

const _: () = assert!(XLEN as usize % (LIMBS * 2) == 0, "XLEN must be divisible by LIMBS*2");
const _: () = assert!(XLEN == LIMB_WIDTH * LIMBS as u32);

const HALF_LIMB_MASK: u32 = 0xFFFF;

/// A 256-bit unsigned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word([u32; LIMBS]);

impl Word {
    /// The value `0`.
    pub const ZERO: Self = Self([0; LIMBS]);
    /// The value `1`.
    pub const ONE: Self = Self([1, 0, 0, 0, 0, 0, 0, 0]);
    /// The value `2^256 - 1`.
    pub const MAX: Self = Self([u32::MAX; LIMBS]);

    /// Builds a word from little-endian limbs (`limbs[0]` is least significant).
    #[must_use]
    pub const fn from_limbs(limbs: [u32; LIMBS]) -> Self {
        Self(limbs)
    }

    /// Returns the little-endian limbs of this word.
    #[must_use]
    pub const fn limbs(self) -> [u32; LIMBS] {
        self.0
    }

    /// Extracts the limb at `index` (bits `index*32 .. index*32+32`).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `index >= LIMBS`.
    pub fn limb(self, index: usize) -> Result<u32, SimError> {
        check_limb_index(index)?;
        Ok(self.0[index])
    }

    /// Returns a copy of this word with the limb at `index` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `index >= LIMBS`.
    pub fn with_limb(mut self, index: usize, value: u32) -> Result<Self, SimError> {
        check_limb_index(index)?;
        self.0[index] = value;
        Ok(self)
    }

    /// Extracts the 16-bit half-limb in `slot` (bits `slot*16 .. slot*16+16`).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `slot >= HALF_LIMBS`.
    pub fn half_limb(self, slot: usize) -> Result<u16, SimError> {
        check_half_limb_slot(slot)?;
        let shift = half_limb_shift(slot);
        let value = (self.0[slot / 2] >> shift) & HALF_LIMB_MASK;
        u16::try_from(value).map_err(|_| SimError::Range {
            width: HALF_LIMB_WIDTH,
        })
    }

    /// Returns a copy of this word with the half-limb in `slot` replaced.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] when `slot >= HALF_LIMBS`.
    pub fn with_half_limb(mut self, slot: usize, value: u16) -> Result<Self, SimError> {
        check_half_limb_slot(slot)?;
        let shift = half_limb_shift(slot);
        let limb = &mut self.0[slot / 2];
        *limb = (*limb & !(HALF_LIMB_MASK << shift)) | (u32::from(value) << shift);
        Ok(self)
    }

    /// Tests bit `pos`; positions at or beyond [`XLEN`] read as clear.
    #[must_use]
    pub const fn bit(self, pos: u32) -> bool {
        if pos >= XLEN {
            return false;
        }
        (self.0[(pos / LIMB_WIDTH) as usize] >> (pos % LIMB_WIDTH)) & 1 == 1
    }

    /// Returns `true` when every bit is clear.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0.iter().all(|limb| *limb == 0)
    }

    /// Adds `rhs`, returning the low 256 bits and the carry out of bit 255.
    #[must_use]
    pub fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let mut out = [0_u32; LIMBS];
        let mut carry = false;
        for (slot, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            let (partial, c1) = a.overflowing_add(*b);
            let (sum, c2) = partial.overflowing_add(u32::from(carry));
            *slot = sum;
            carry = c1 || c2;
        }
        (Self(out), carry)
    }

    /// Subtracts `rhs`, returning the low 256 bits and the borrow out of bit 255.
    #[must_use]
    pub fn overflowing_sub(self, rhs: Self) -> (Self, bool) {
        let mut out = [0_u32; LIMBS];
        let mut borrow = false;
        for (slot, (a, b)) in out.iter_mut().zip(self.0.iter().zip(rhs.0.iter())) {
            let (partial, b1) = a.overflowing_sub(*b);
            let (diff, b2) = partial.overflowing_sub(u32::from(borrow));
            *slot = diff;
            borrow = b1 || b2;
        }
        (Self(out), borrow)
    }

    /// Returns the 32-byte big-endian encoding.
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; WORD_BYTES] {
        let mut out = [0_u8; WORD_BYTES];
        for (chunk, limb) in out.chunks_exact_mut(4).zip(self.0.iter().rev()) {
            chunk.copy_from_slice(&limb.to_be_bytes());
        }
        out
    }

    /// Decodes a big-endian byte string of any length.
    ///
    /// Leading zero bytes are ignored, so inputs longer than 32 bytes are
    /// accepted as long as the value itself fits in [`XLEN`] bits.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Range`] when the value needs more than 256 bits.
    pub fn from_be_slice(bytes: &[u8]) -> Result<Self, SimError> {
        let first_significant = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let significant = &bytes[first_significant..];
        if significant.len() > WORD_BYTES {
            return Err(SimError::Range { width: XLEN });
        }

        let mut padded = [0_u8; WORD_BYTES];
        padded[WORD_BYTES - significant.len()..].copy_from_slice(significant);

        let mut limbs = [0_u32; LIMBS];
        for (limb, chunk) in limbs.iter_mut().rev().zip(padded.chunks_exact(4)) {
            *limb = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self(limbs))
    }
}

const fn half_limb_shift(slot: usize) -> u32 {
    if slot % 2 == 1 {
        HALF_LIMB_WIDTH
    } else {
        0
    }
}

fn check_limb_index(index: usize) -> Result<(), SimError> {
    if index < LIMBS {
        Ok(())
    } else {
        Err(SimError::Bounds {
            target: BoundsTarget::Limb,
            index,
        })
    }
}

fn check_half_limb_slot(slot: usize) -> Result<(), SimError> {
    if slot < HALF_LIMBS {
        Ok(())
    } else {
        Err(SimError::Bounds {
            target: BoundsTarget::HalfLimb,
            index: slot,
        })
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Self([value, 0, 0, 0, 0, 0, 0, 0])
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        let bytes = value.to_le_bytes();
        Self([
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            0,
            0,
            0,
            0,
            0,
            0,
        ])
    }
}

impl From<u128> for Word {
    fn from(value: u128) -> Self {
        let mut limbs = [0_u32; LIMBS];
        for (limb, chunk) in limbs.iter_mut().zip(value.to_le_bytes().chunks_exact(4)) {
            *limb = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Self(limbs)
    }
}

/// Formats as eight space-separated 8-digit hex limbs, most significant first.
impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, limb) in self.0.iter().rev().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{limb:08x}")?;
        }
        Ok(())
    }
}

/// Failure while parsing a hex word literal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWordError {
    /// Input had no hex digits.
    #[error("empty word literal")]
    Empty,
    /// Input contained a character that is not a hex digit or separator.
    #[error("invalid hex digit `{0}`")]
    InvalidDigit(char),
    /// Input value needs more than 256 bits.
    #[error("word literal exceeds {XLEN} bits")]
    TooWide,
}

/// Parses hex, with an optional `0x` prefix; spaces and `_` are separators.
///
/// This accepts the [`Display`](fmt::Display) form back.
impl FromStr for Word {
    type Err = ParseWordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let mut nibbles = Vec::with_capacity(body.len());
        for ch in body.chars() {
            if ch == ' ' || ch == '_' {
                continue;
            }
            let digit = ch.to_digit(16).ok_or(ParseWordError::InvalidDigit(ch))?;
            nibbles.push(digit);
        }
        if nibbles.is_empty() {
            return Err(ParseWordError::Empty);
        }

        let first_significant = nibbles.iter().position(|n| *n != 0).unwrap_or(nibbles.len());
        let significant = &nibbles[first_significant..];
        if significant.len() > WORD_BYTES * 2 {
            return Err(ParseWordError::TooWide);
        }

        let mut limbs = [0_u32; LIMBS];
        for (position, nibble) in significant.iter().rev().enumerate() {
            limbs[position / 8] |= nibble << ((position % 8) * 4);
        }
        Ok(Self(limbs))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Word {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Word {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{ParseWordError, Word, HALF_LIMBS, LIMBS, XLEN};
    use crate::{BoundsTarget, SimError};

    #[test]
    fn derived_widths_match_architecture() {
        assert_eq!(XLEN, 256);
        assert_eq!(LIMBS, 8);
        assert_eq!(HALF_LIMBS, 16);
    }

    #[test]
    fn limb_replacement_leaves_other_limbs_untouched() {
        let word = Word::MAX.with_limb(2, 0).expect("limb 2 exists");
        for index in 0..LIMBS {
            let expected = if index == 2 { 0 } else { u32::MAX };
            assert_eq!(word.limb(index), Ok(expected));
        }
    }

    #[test]
    fn half_limb_slots_map_to_lower_and_upper_limb_halves() {
        let word = Word::ZERO
            .with_half_limb(6, 0xBEEF)
            .and_then(|w| w.with_half_limb(7, 0xDEAD))
            .expect("slots 6 and 7 exist");
        assert_eq!(word.limb(3), Ok(0xDEAD_BEEF));
        assert_eq!(word.half_limb(7), Ok(0xDEAD));
        assert_eq!(word.half_limb(6), Ok(0xBEEF));
    }

    #[test]
    fn out_of_range_indices_are_bounds_errors() {
        assert_eq!(
            Word::ZERO.limb(8),
            Err(SimError::Bounds {
                target: BoundsTarget::Limb,
                index: 8
            })
        );
        assert_eq!(
            Word::ZERO.with_half_limb(16, 1),
            Err(SimError::Bounds {
                target: BoundsTarget::HalfLimb,
                index: 16
            })
        );
    }

    #[test]
    fn add_reports_carry_out_of_the_top_bit() {
        assert_eq!(Word::MAX.overflowing_add(Word::ONE), (Word::ZERO, true));
        assert_eq!(
            Word::from(u32::MAX).overflowing_add(Word::ONE),
            (Word::from(1_u64 << 32), false)
        );
    }

    #[test]
    fn sub_reports_borrow() {
        assert_eq!(Word::ZERO.overflowing_sub(Word::ONE), (Word::MAX, true));
        assert_eq!(
            Word::from(1_u64 << 32).overflowing_sub(Word::ONE),
            (Word::from(u32::MAX), false)
        );
    }

    #[test]
    fn bit_255_is_the_top_limb_msb() {
        let top = Word::ZERO.with_limb(7, 0x8000_0000).expect("limb 7 exists");
        assert!(top.bit(255));
        assert!(!top.bit(254));
        assert!(!top.bit(256));
    }

    #[test]
    fn byte_decoding_rejects_values_wider_than_xlen() {
        let mut two_pow_256 = vec![0_u8; 33];
        two_pow_256[0] = 1;
        assert_eq!(
            Word::from_be_slice(&two_pow_256),
            Err(SimError::Range { width: XLEN })
        );

        let mut padded_max = vec![0_u8; 40];
        padded_max[8..].fill(0xFF);
        assert_eq!(Word::from_be_slice(&padded_max), Ok(Word::MAX));
    }

    #[test]
    fn big_endian_bytes_round_trip_through_limb_order() {
        let word = Word::from(0x0102_0304_0506_0708_u64);
        let bytes = word.to_be_bytes();
        assert_eq!(&bytes[24..], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(Word::from_be_slice(&bytes), Ok(word));
    }

    #[test]
    fn display_groups_limbs_most_significant_first() {
        let word = Word::from(0xDEAD_BEEF_u32)
            .with_limb(7, 0x1234_5678)
            .expect("limb 7 exists");
        assert_eq!(
            word.to_string(),
            "12345678 00000000 00000000 00000000 00000000 00000000 00000000 deadbeef"
        );
    }

    #[test]
    fn hex_parsing_accepts_display_form_and_prefixes() {
        let word = Word::from(0x1_0000_0000_u64);
        assert_eq!(word.to_string().parse::<Word>(), Ok(word));
        assert_eq!("0x1_0000_0000".parse::<Word>(), Ok(word));
        assert_eq!("".parse::<Word>(), Err(ParseWordError::Empty));
        assert_eq!("0xg".parse::<Word>(), Err(ParseWordError::InvalidDigit('g')));

        let too_wide = format!("1{}", "0".repeat(64));
        assert_eq!(too_wide.parse::<Word>(), Err(ParseWordError::TooWide));
    }
}
