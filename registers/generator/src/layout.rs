// Licensed under the Apache-2.0 license

//! The fully resolved output of the layout compiler.
//!
//! A [`CompiledLayout`] owns all of its data and keeps only names from the
//! description it was compiled from. Every byte of `[0, size)` is covered by
//! exactly one register or one [`Padding`] unit.
//!
//! ```text
//! CompiledLayout
//! ├── DeviceEntry::Padding           # gaps before and between blocks
//! └── DeviceEntry::Block
//!     ├── BlockEntry::Register
//!     │   └── CompiledField[]
//!     └── BlockEntry::Padding        # fill up to the block stride
//! ```

use crate::profile::{AlignmentOrigin, WordSize};
use serde::Serialize;

/// How a register is backed by native bus words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegisterLayout {
    /// Fits in one native word.
    Simple { word: WordSize },
    /// Backed by `words` consecutive native words, least-significant first.
    Composite { word: WordSize, words: u32 },
}

impl RegisterLayout {
    pub fn new(word: WordSize, words: u32) -> Self {
        if words > 1 {
            RegisterLayout::Composite { word, words }
        } else {
            RegisterLayout::Simple { word }
        }
    }

    /// Word size of each access.
    pub fn word(&self) -> WordSize {
        match *self {
            RegisterLayout::Simple { word } | RegisterLayout::Composite { word, .. } => word,
        }
    }

    /// Number of native words backing the register.
    pub fn words(&self) -> u32 {
        match *self {
            RegisterLayout::Simple { .. } => 1,
            RegisterLayout::Composite { words, .. } => words,
        }
    }

    /// Total bytes spanned.
    pub fn byte_size(&self) -> u32 {
        self.word().bytes() * self.words()
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, RegisterLayout::Composite { .. })
    }
}

/// A placed bit field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledField {
    pub name: String,
    /// Bit offset within the logical register value.
    pub bit_offset: u32,
    pub bit_width: u32,
    /// `value_mask << bit_offset`.
    pub bit_mask: u32,
    /// `(1 << bit_width) - 1`.
    pub value_mask: u32,
    /// Index of the first native word holding the field.
    pub word_index: u32,
    /// Bit offset within that word.
    pub word_bit_offset: u32,
    /// Number of native words the field touches.
    pub words: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl CompiledField {
    pub fn is_multi_word(&self) -> bool {
        self.words > 1
    }
}

/// A placed register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledRegister {
    pub name: String,
    /// Byte offset from the block base.
    pub offset: u32,
    /// Absolute byte offset.
    pub absolute: u32,
    pub layout: RegisterLayout,
    pub fields: Vec<CompiledField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl CompiledRegister {
    /// Bytes of one bus access.
    pub fn word_bytes(&self) -> u32 {
        self.layout.word().bytes()
    }

    /// Total bytes spanned by the register, a power-of-two number of words.
    pub fn byte_width(&self) -> u32 {
        self.layout.byte_size()
    }

    /// First absolute byte past the register.
    pub fn end(&self) -> u32 {
        self.absolute + self.byte_width()
    }

    /// Absolute byte offset of the `index`-th native word.
    pub fn word_offset(&self, index: u32) -> u32 {
        self.absolute + index * self.word_bytes()
    }

    pub fn field(&self, name: &str) -> Option<&CompiledField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An anonymous reserved unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Padding {
    /// Absolute byte offset.
    pub offset: u32,
    pub bytes: u32,
}

impl Padding {
    pub fn end(&self) -> u32 {
        self.offset + self.bytes
    }
}

/// Contents of a block, in address order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockEntry {
    Register(CompiledRegister),
    Padding(Padding),
}

/// A placed block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledBlock {
    pub name: String,
    /// Absolute byte offset.
    pub base: u32,
    pub stride: u32,
    pub entries: Vec<BlockEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl CompiledBlock {
    pub fn registers(&self) -> impl Iterator<Item = &CompiledRegister> {
        self.entries.iter().filter_map(|e| match e {
            BlockEntry::Register(r) => Some(r),
            BlockEntry::Padding(_) => None,
        })
    }

    pub fn padding(&self) -> impl Iterator<Item = &Padding> {
        self.entries.iter().filter_map(|e| match e {
            BlockEntry::Padding(p) => Some(p),
            BlockEntry::Register(_) => None,
        })
    }

    pub fn register(&self, name: &str) -> Option<&CompiledRegister> {
        self.registers().find(|r| r.name == name)
    }

    /// Bytes taken by registers.
    pub fn used_bytes(&self) -> u32 {
        self.registers().map(CompiledRegister::byte_width).sum()
    }

    pub fn end(&self) -> u32 {
        self.base + self.stride
    }
}

/// Top-level contents of the device, in address order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceEntry {
    Block(CompiledBlock),
    Padding(Padding),
}

/// Absolute layout of one device under one profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledLayout {
    pub device: String,
    pub profile: String,
    /// Native word of the profile.
    pub word: WordSize,
    pub align: AlignmentOrigin,
    /// Total bytes spanned, `[0, size)`.
    pub size: u32,
    pub entries: Vec<DeviceEntry>,
}

impl CompiledLayout {
    pub fn blocks(&self) -> impl Iterator<Item = &CompiledBlock> {
        self.entries.iter().filter_map(|e| match e {
            DeviceEntry::Block(b) => Some(b),
            DeviceEntry::Padding(_) => None,
        })
    }

    pub fn block(&self, name: &str) -> Option<&CompiledBlock> {
        self.blocks().find(|b| b.name == name)
    }

    pub fn register(&self, block: &str, register: &str) -> Option<&CompiledRegister> {
        self.block(block)?.register(register)
    }

    pub fn field(&self, block: &str, register: &str, field: &str) -> Option<&CompiledField> {
        self.register(block, register)?.field(field)
    }

    /// Every padding unit, device-level and block-level, in address order.
    pub fn padding(&self) -> Vec<Padding> {
        let mut padding = Vec::new();
        for entry in &self.entries {
            match entry {
                DeviceEntry::Padding(p) => padding.push(*p),
                DeviceEntry::Block(b) => padding.extend(b.padding().copied()),
            }
        }
        padding
    }
}
