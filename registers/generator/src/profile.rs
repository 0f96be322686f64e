// Licensed under the Apache-2.0 license

//! Bus-width profiles.
//!
//! A [`Profile`] is the strategy handed to the layout compiler: it supplies
//! the native word size of the register bus, the per-register word size
//! overrides of mixed-width buses, and the rule that rounds a register's
//! logical bit content up to whole native words.
//!
//! ```text
//! bus32: every register is one or more 32-bit words
//! bus16: every register is one or more 16-bit words,
//!        except registers listed in `overrides`
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Native size of one addressable register word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WordSize {
    /// 2-byte word.
    Half,
    /// 4-byte word.
    Word,
}

impl WordSize {
    /// Size in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            WordSize::Half => 2,
            WordSize::Word => 4,
        }
    }

    /// Size in bits.
    pub const fn bits(self) -> u32 {
        self.bytes() * 8
    }

    /// Mask covering one whole word.
    pub const fn mask(self) -> u32 {
        match self {
            WordSize::Half => 0xffff,
            WordSize::Word => 0xffff_ffff,
        }
    }

    /// C type holding one word.
    pub const fn c_type(self) -> &'static str {
        match self {
            WordSize::Half => "uint16_t",
            WordSize::Word => "uint32_t",
        }
    }
}

impl TryFrom<u32> for WordSize {
    type Error = String;

    fn try_from(bytes: u32) -> Result<Self, Self::Error> {
        match bytes {
            2 => Ok(WordSize::Half),
            4 => Ok(WordSize::Word),
            _ => Err(format!("unsupported native word size {bytes}, expected 2 or 4")),
        }
    }
}

impl From<WordSize> for u32 {
    fn from(word: WordSize) -> u32 {
        word.bytes()
    }
}

impl fmt::Display for WordSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Address that multi-word registers must be aligned relative to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentOrigin {
    /// Offsets are checked relative to the start of the owning block.
    Block,
    /// Offsets are checked relative to address 0 of the device.
    #[default]
    Device,
}

/// A register bus width profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    /// Profile name, informational only.
    pub name: String,

    /// Native word size of the bus.
    pub word: WordSize,

    /// Alignment origin for multi-word registers.
    #[serde(default)]
    pub align: AlignmentOrigin,

    /// Per-register word sizes for mixed-width buses, keyed by
    /// `"block.register"`.
    #[serde(default)]
    pub overrides: BTreeMap<String, WordSize>,
}

impl Profile {
    /// Create a profile with a uniform native word and no overrides.
    pub fn new(name: &str, word: WordSize) -> Self {
        Self {
            name: name.to_string(),
            word,
            align: AlignmentOrigin::default(),
            overrides: BTreeMap::new(),
        }
    }

    /// 32-bit register bus.
    pub fn bus32() -> Self {
        Self::new("bus32", WordSize::Word)
    }

    /// Mixed 16/32-bit register bus: 16-bit native words, with the
    /// free-running hardware time counter latched as one 32-bit word.
    pub fn bus16() -> Self {
        Self::new("bus16", WordSize::Half).with_override("hwtime", "cnt", WordSize::Word)
    }

    /// Look up a built-in profile by name.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "bus32" => Some(Self::bus32()),
            "bus16" => Some(Self::bus16()),
            _ => None,
        }
    }

    /// Override the word size of one register.
    pub fn with_override(mut self, block: &str, register: &str, word: WordSize) -> Self {
        self.overrides.insert(format!("{block}.{register}"), word);
        self
    }

    /// Set the alignment origin for multi-word registers.
    pub fn with_alignment(mut self, align: AlignmentOrigin) -> Self {
        self.align = align;
        self
    }

    /// Native word size in bytes.
    pub fn word_bytes(&self) -> u32 {
        self.word.bytes()
    }

    /// Word size used to access the given register.
    pub fn register_word(&self, block: &str, register: &str) -> WordSize {
        self.overrides
            .get(&format!("{block}.{register}"))
            .copied()
            .unwrap_or(self.word)
    }

    /// Number of `word`-sized words needed to hold bits `0..end_bit`.
    ///
    /// Always a power of two and at least one, so a register with no
    /// fields still occupies a word.
    pub fn register_words(word: WordSize, end_bit: u32) -> u32 {
        end_bit.max(1).div_ceil(word.bits()).next_power_of_two()
    }
}
