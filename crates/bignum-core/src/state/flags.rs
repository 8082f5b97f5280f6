use std::fmt;
use std::str::FromStr;

use crate::word::XLEN;
use crate::{SimError, Word};

/// Condition flag identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Flag {
    /// `C`: carry out of bit 255.
    Carry = 0,
    /// `Z`: low 256 bits are zero.
    Zero = 1,
    /// `M`: bit 255 of the result.
    Msb = 2,
    /// `L`: bit 0 of the result.
    Lsb = 3,
    /// `XC`: extended carry.
    ExtCarry = 4,
    /// `XZ`: extended zero.
    ExtZero = 5,
    /// `XM`: extended most-significant bit.
    ExtMsb = 6,
    /// `XL`: extended least-significant bit.
    ExtLsb = 7,
}

impl Flag {
    /// All flags, standard group first.
    pub const ALL: [Self; 8] = [
        Self::Carry,
        Self::Zero,
        Self::Msb,
        Self::Lsb,
        Self::ExtCarry,
        Self::ExtZero,
        Self::ExtMsb,
        Self::ExtLsb,
    ];

    /// Bit of this flag inside [`Flags::bits`].
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self as u8
    }

    /// Short assembly name (`C`, `Z`, `M`, `L`, `XC`, `XZ`, `XM`, `XL`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Carry => "C",
            Self::Zero => "Z",
            Self::Msb => "M",
            Self::Lsb => "L",
            Self::ExtCarry => "XC",
            Self::ExtZero => "XZ",
            Self::ExtMsb => "XM",
            Self::ExtLsb => "XL",
        }
    }

    /// Flag group this flag belongs to.
    #[must_use]
    pub const fn group(self) -> FlagGroup {
        match self {
            Self::Carry | Self::Zero | Self::Msb | Self::Lsb => FlagGroup::Standard,
            Self::ExtCarry | Self::ExtZero | Self::ExtMsb | Self::ExtLsb => FlagGroup::Extended,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Flag {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.name() == s)
            .ok_or_else(|| SimError::InvalidIdentifier(s.to_string()))
    }
}

/// Standard (single-width) or extended (double-width) flag group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FlagGroup {
    /// `C`, `Z`, `M`, `L`.
    Standard,
    /// `XC`, `XZ`, `XM`, `XL`.
    Extended,
}

impl FlagGroup {
    const fn flags(self) -> [Flag; 4] {
        match self {
            Self::Standard => [Flag::Carry, Flag::Zero, Flag::Msb, Flag::Lsb],
            Self::Extended => [Flag::ExtCarry, Flag::ExtZero, Flag::ExtMsb, Flag::ExtLsb],
        }
    }
}

/// The eight condition flags, packed one bit per flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Flags {
    bits: u8,
}

impl Flags {
    /// Reads a flag.
    #[must_use]
    pub const fn get(self, flag: Flag) -> bool {
        self.bits & flag.mask() != 0
    }

    /// Sets or clears a flag.
    pub const fn set(&mut self, flag: Flag, enabled: bool) {
        if enabled {
            self.bits |= flag.mask();
        } else {
            self.bits &= !flag.mask();
        }
    }

    /// Packed flag bits, bit `n` for the flag with discriminant `n`.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Clears every flag.
    pub const fn clear(&mut self) {
        self.bits = 0;
    }

    /// Derives `Z`, `M`, `L` from a 256-bit result; `C` is left unchanged.
    pub fn set_z_m_l(&mut self, result: Word) {
        self.derive(FlagGroup::Standard, result, None);
    }

    /// Derives `C`, `Z`, `M`, `L` from the 257-bit value `carry:result`.
    ///
    /// `C` is bit 256, so `set_c_z_m_l(Word::ZERO, true)` describes `2^256`.
    pub fn set_c_z_m_l(&mut self, result: Word, carry: bool) {
        self.derive(FlagGroup::Standard, result, Some(carry));
    }

    /// Derives `XZ`, `XM`, `XL` from a 256-bit result; `XC` is left unchanged.
    pub fn set_extended_z_m_l(&mut self, result: Word) {
        self.derive(FlagGroup::Extended, result, None);
    }

    /// Derives `XC`, `XZ`, `XM`, `XL` from the 257-bit value `carry:result`.
    pub fn set_extended_c_z_m_l(&mut self, result: Word, carry: bool) {
        self.derive(FlagGroup::Extended, result, Some(carry));
    }

    fn derive(&mut self, group: FlagGroup, result: Word, carry: Option<bool>) {
        let [c, z, m, l] = group.flags();
        self.set(z, result.is_zero());
        self.set(m, result.bit(XLEN - 1));
        self.set(l, result.bit(0));
        if let Some(carry) = carry {
            self.set(c, carry);
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Flag, FlagGroup, Flags};
    use crate::{SimError, Word};

    fn two_pow_255() -> Word {
        Word::ZERO.with_limb(7, 0x8000_0000).expect("limb 7 exists")
    }

    #[rstest]
    #[case::zero(Word::ZERO, false, [false, true, false, false])]
    #[case::two_pow_256(Word::ZERO, true, [true, true, false, false])]
    #[case::two_pow_255(two_pow_255(), false, [false, false, true, false])]
    #[case::one(Word::ONE, false, [false, false, false, true])]
    #[case::all_ones_with_carry(Word::MAX, true, [true, false, true, true])]
    fn standard_flags_follow_result_bits(
        #[case] result: Word,
        #[case] carry: bool,
        #[case] expected_czml: [bool; 4],
    ) {
        let mut flags = Flags::default();
        flags.set_c_z_m_l(result, carry);
        let actual = [
            flags.get(Flag::Carry),
            flags.get(Flag::Zero),
            flags.get(Flag::Msb),
            flags.get(Flag::Lsb),
        ];
        assert_eq!(actual, expected_czml);
        assert_eq!(flags.bits() & 0xF0, 0, "extended group untouched");
    }

    #[test]
    fn extended_derivation_only_touches_extended_group() {
        let mut flags = Flags::default();
        flags.set_extended_c_z_m_l(Word::ZERO, true);
        assert!(flags.get(Flag::ExtCarry));
        assert!(flags.get(Flag::ExtZero));
        assert!(!flags.get(Flag::ExtMsb));
        assert!(!flags.get(Flag::ExtLsb));
        assert_eq!(flags.bits() & 0x0F, 0);
    }

    #[test]
    fn z_m_l_derivation_preserves_carry() {
        let mut flags = Flags::default();
        flags.set(Flag::Carry, true);
        flags.set_z_m_l(Word::ONE);
        assert!(flags.get(Flag::Carry));
        assert!(flags.get(Flag::Lsb));

        flags.set(Flag::ExtCarry, true);
        flags.set_extended_z_m_l(Word::ZERO);
        assert!(flags.get(Flag::ExtCarry));
        assert!(flags.get(Flag::ExtZero));
    }

    #[test]
    fn flags_can_be_set_and_cleared_individually() {
        let mut flags = Flags::default();
        for flag in Flag::ALL {
            flags.set(flag, true);
            assert!(flags.get(flag));
        }
        assert_eq!(flags.bits(), u8::MAX);
        for flag in Flag::ALL {
            flags.set(flag, false);
        }
        assert_eq!(flags, Flags::default());
    }

    #[test]
    fn names_parse_to_flags_and_groups() {
        for flag in Flag::ALL {
            assert_eq!(flag.name().parse::<Flag>(), Ok(flag));
        }
        assert_eq!("XM".parse::<Flag>().map(Flag::group), Ok(FlagGroup::Extended));
        assert_eq!(
            "N".parse::<Flag>(),
            Err(SimError::InvalidIdentifier("N".into()))
        );
    }
}
