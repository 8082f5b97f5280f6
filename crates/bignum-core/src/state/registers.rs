use std::fmt;
use std::str::FromStr;

use crate::word::{HALF_LIMBS, LIMBS};
use crate::{BoundsTarget, SimError, Word};

/// Number of general-purpose wide registers (`r0..r31`).
pub const GENERAL_REGISTER_COUNT: usize = 32;
/// Number of named special registers.
pub const SPECIAL_REGISTER_COUNT: usize = 5;

/// Named special register outside the general register file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum SpecialRegister {
    /// Modulus register.
    Mod = 0,
    /// Register-file pointer.
    Rfp = 1,
    /// Data-memory pointer.
    Dmp = 2,
    /// Loop counter.
    Lc = 3,
    /// Random-number source.
    Rnd = 4,
}

impl SpecialRegister {
    /// All special registers in listing order.
    pub const ALL: [Self; SPECIAL_REGISTER_COUNT] =
        [Self::Mod, Self::Rfp, Self::Dmp, Self::Lc, Self::Rnd];

    /// Returns the storage index for this register.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the assembly name (`mod`, `rfp`, `dmp`, `lc`, `rnd`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mod => "mod",
            Self::Rfp => "rfp",
            Self::Dmp => "dmp",
            Self::Lc => "lc",
            Self::Rnd => "rnd",
        }
    }
}

impl fmt::Display for SpecialRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpecialRegister {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reg| reg.name() == s)
            .ok_or_else(|| SimError::InvalidIdentifier(s.to_string()))
    }
}

/// Reference to either a general register by index or a special register by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterRef {
    /// General register `r<index>`.
    General(usize),
    /// Named special register.
    Special(SpecialRegister),
}

impl From<SpecialRegister> for RegisterRef {
    fn from(reg: SpecialRegister) -> Self {
        Self::Special(reg)
    }
}

impl fmt::Display for RegisterRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General(index) => write!(f, "r{index}"),
            Self::Special(reg) => write!(f, "{reg}"),
        }
    }
}

/// Parses `r<N>` as a general register and anything else as a special name.
///
/// The index is not range-checked here; accesses through [`RegisterFile`] do that.
impl FromStr for RegisterRef {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(digits) = s.strip_prefix('r') {
            if let Ok(index) = digits.parse::<usize>() {
                return Ok(Self::General(index));
            }
        }
        s.parse().map(Self::Special)
    }
}

/// How much of a general register a write defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WriteHint {
    /// The whole register; all sixteen half-limbs become valid.
    #[default]
    Whole,
    /// One 32-bit limb; both of its half-limbs become valid.
    Limb(usize),
    /// One 16-bit half-limb slot.
    HalfLimb(usize),
}

/// Per-register bitmap of half-limbs that have been explicitly written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ValidHalfLimbs(u16);

impl ValidHalfLimbs {
    /// No half-limb written.
    pub const NONE: Self = Self(0);
    /// Every half-limb written.
    pub const ALL: Self = Self(u16::MAX);

    /// Returns `true` when `slot` has been written. Slots past 15 read as `false`.
    #[must_use]
    pub const fn is_valid(self, slot: usize) -> bool {
        slot < HALF_LIMBS && (self.0 >> slot) & 1 == 1
    }

    /// Raw bitmap, bit `n` for half-limb slot `n`.
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Expands the bitmap to one flag per slot.
    #[must_use]
    pub fn to_array(self) -> [bool; HALF_LIMBS] {
        let mut out = [false; HALF_LIMBS];
        for (slot, valid) in out.iter_mut().enumerate() {
            *valid = self.is_valid(slot);
        }
        out
    }

    const fn mark(&mut self, slot: usize) {
        self.0 |= 1 << slot;
    }
}

/// Wide register file: 32 general registers with write tracking plus the
/// special registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    gpr: [Word; GENERAL_REGISTER_COUNT],
    valid: [ValidHalfLimbs; GENERAL_REGISTER_COUNT],
    special: [Word; SPECIAL_REGISTER_COUNT],
}

impl Default for RegisterFile {
    fn default() -> Self {
        let mut special = [Word::ZERO; SPECIAL_REGISTER_COUNT];
        special[SpecialRegister::Rnd.index()] = Word::ONE;
        Self {
            gpr: [Word::ZERO; GENERAL_REGISTER_COUNT],
            valid: [ValidHalfLimbs::NONE; GENERAL_REGISTER_COUNT],
            special,
        }
    }
}

impl RegisterFile {
    /// Reads a register.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for a general index past `r31`.
    pub fn get(&self, reg: RegisterRef) -> Result<Word, SimError> {
        match reg {
            RegisterRef::General(index) => Ok(self.gpr[check_index(index)?]),
            RegisterRef::Special(special) => Ok(self.special[special.index()]),
        }
    }

    /// Writes a register, recording which half-limbs the write defines.
    ///
    /// The hint is ignored for special registers, which carry no validity
    /// tracking.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for a general index past `r31` or a hint
    /// naming a limb/half-limb outside the word. Nothing is written on error.
    pub fn set(&mut self, reg: RegisterRef, value: Word, hint: WriteHint) -> Result<(), SimError> {
        match reg {
            RegisterRef::General(index) => {
                let index = check_index(index)?;
                let valid = &mut self.valid[index];
                match hint {
                    WriteHint::Whole => *valid = ValidHalfLimbs::ALL,
                    WriteHint::Limb(limb) => {
                        if limb >= LIMBS {
                            return Err(SimError::bounds(BoundsTarget::Limb, limb));
                        }
                        valid.mark(limb * 2);
                        valid.mark(limb * 2 + 1);
                    }
                    WriteHint::HalfLimb(slot) => {
                        if slot >= HALF_LIMBS {
                            return Err(SimError::bounds(BoundsTarget::HalfLimb, slot));
                        }
                        valid.mark(slot);
                    }
                }
                self.gpr[index] = value;
            }
            RegisterRef::Special(special) => self.special[special.index()] = value,
        }
        Ok(())
    }

    /// Reads one 32-bit limb of a register.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for a bad register or limb index.
    pub fn limb(&self, reg: RegisterRef, limb: usize) -> Result<u32, SimError> {
        self.get(reg)?.limb(limb)
    }

    /// Replaces one 32-bit limb of a register and marks that limb valid.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for a bad register or limb index.
    pub fn set_limb(&mut self, reg: RegisterRef, limb: usize, value: u32) -> Result<(), SimError> {
        let updated = self.get(reg)?.with_limb(limb, value)?;
        self.set(reg, updated, WriteHint::Limb(limb))
    }

    /// Replaces the lower or upper 16-bit half of limb `limb` and marks that
    /// half-limb slot valid.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for a bad register or limb index.
    pub fn set_half_limb(
        &mut self,
        reg: RegisterRef,
        limb: usize,
        value: u16,
        upper: bool,
    ) -> Result<(), SimError> {
        if limb >= LIMBS {
            return Err(SimError::bounds(BoundsTarget::Limb, limb));
        }
        let slot = limb * 2 + usize::from(upper);
        let updated = self.get(reg)?.with_half_limb(slot, value)?;
        self.set(reg, updated, WriteHint::HalfLimb(slot))
    }

    /// Returns the half-limb validity bitmap of a general register.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Bounds`] for an index past `r31`.
    pub fn valid_half_limbs(&self, index: usize) -> Result<ValidHalfLimbs, SimError> {
        Ok(self.valid[check_index(index)?])
    }

    /// All general registers in index order.
    #[must_use]
    pub const fn general(&self) -> &[Word; GENERAL_REGISTER_COUNT] {
        &self.gpr
    }

    /// Zeroes every register, restores `rnd` to `1`, and forgets all writes.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Forgets all writes while keeping register contents.
    pub fn reset_validity(&mut self) {
        self.valid = [ValidHalfLimbs::NONE; GENERAL_REGISTER_COUNT];
    }
}

fn check_index(index: usize) -> Result<usize, SimError> {
    if index < GENERAL_REGISTER_COUNT {
        Ok(index)
    } else {
        Err(SimError::bounds(BoundsTarget::Register, index))
    }
}
