// Licensed under the Apache-2.0 license

//! Split/merge of field values over native bus words.
//!
//! A field that does not fit one native word is transferred as a sequence of
//! consecutive words, least-significant word first, at ascending addresses.
//!
//! Multi-word accesses are NOT atomic. If the hardware updates the value
//! between two constituent word reads, [`WordSplit::read`] returns a torn
//! value. Devices that need a consistent snapshot must provide a
//! hardware-side latch or shadow register; this module only exposes the raw
//! word sequence.

use crate::layout::{CompiledField, CompiledRegister};
use crate::profile::WordSize;
use log::trace;
use serde::Serialize;
use thiserror::Error;

/// Word-level transport to a register space.
///
/// Offsets are absolute byte offsets as produced by the layout compiler.
pub trait RegisterBus {
    type Error;

    fn read_word(&mut self, offset: u32, size: WordSize) -> Result<u32, Self::Error>;

    fn write_word(&mut self, offset: u32, size: WordSize, value: u32) -> Result<(), Self::Error>;
}

/// Placement of one field value over native words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WordSplit {
    /// Absolute byte offset of the first word.
    pub offset: u32,
    pub word: WordSize,
    /// Number of consecutive words.
    pub words: u32,
    /// Bit offset of the value within the first word.
    pub shift: u32,
    pub bit_width: u32,
}

impl WordSplit {
    /// Placement of a `bit_width`-bit value starting `shift` bits into the
    /// word at `offset`.
    ///
    /// Returns `None` unless `shift` falls inside the first word and
    /// `bit_width` is in `1..=32`.
    pub fn new(offset: u32, word: WordSize, shift: u32, bit_width: u32) -> Option<Self> {
        if shift >= word.bits() || !(1..=32).contains(&bit_width) {
            return None;
        }
        Some(Self {
            offset,
            word,
            words: (shift + bit_width).div_ceil(word.bits()),
            shift,
            bit_width,
        })
    }

    /// Split for a compiled field of a compiled register.
    pub fn for_field(register: &CompiledRegister, field: &CompiledField) -> Self {
        Self {
            offset: register.word_offset(field.word_index),
            word: register.layout.word(),
            words: field.words,
            shift: field.word_bit_offset,
            bit_width: field.bit_width,
        }
    }

    pub fn is_multi_word(&self) -> bool {
        self.words > 1
    }

    /// Absolute byte offsets of the constituent words, in access order.
    pub fn word_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.words).map(move |i| self.offset + i * self.word.bytes())
    }

    /// `(1 << bit_width) - 1`.
    pub fn value_mask(&self) -> u32 {
        u32::MAX.checked_shr(32 - self.bit_width.min(32)).unwrap_or(0)
    }

    /// Bits of the `index`-th word owned by the field.
    pub fn word_mask(&self, index: u32) -> u32 {
        self.split_bits(u64::from(self.value_mask()), index)
    }

    /// Partition a value into words, least-significant word first.
    ///
    /// Bits above `bit_width` are discarded. Bits of the words not owned by
    /// the field are zero.
    pub fn split(&self, value: u32) -> Vec<u32> {
        let value = u64::from(value & self.value_mask());
        (0..self.words).map(|i| self.split_bits(value, i)).collect()
    }

    /// Reassemble a value from its words, least-significant word first.
    ///
    /// Returns `None` if `words` does not hold exactly [`Self::words`] words.
    pub fn merge(&self, words: &[u32]) -> Option<u32> {
        if words.len() != self.words as usize {
            return None;
        }
        Some(self.merge_words(words))
    }

    fn merge_words(&self, words: &[u32]) -> u32 {
        let bits = self.word.bits();
        let joined = words
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, w)| {
                acc | (u64::from(w & self.word.mask()) << (bits * i as u32))
            });
        ((joined >> self.shift) as u32) & self.value_mask()
    }

    /// Replace the field's bits in `words`, keeping all other bits.
    pub fn insert(&self, words: &mut [u32], value: u32) {
        let value = self.split(value);
        for (i, (word, new)) in words.iter_mut().zip(value).enumerate() {
            let mask = self.word_mask(i as u32);
            *word = (*word & !mask) | new;
        }
    }

    /// Read all constituent words and merge them.
    pub fn read<B: RegisterBus>(&self, bus: &mut B) -> Result<u32, B::Error> {
        let words = self.read_words(bus)?;
        Ok(self.merge_words(&words))
    }

    /// Write a value, read-modify-writing words shared with other fields.
    pub fn write<B: RegisterBus>(&self, bus: &mut B, value: u32) -> Result<(), B::Error> {
        let mut words = if self.covers_whole_words() {
            vec![0; self.words as usize]
        } else {
            self.read_words(bus)?
        };
        self.insert(&mut words, value);
        for (offset, word) in self.word_offsets().zip(words) {
            trace!("write 0x{word:x} @ 0x{offset:x} ({})", self.word);
            bus.write_word(offset, self.word, word)?;
        }
        Ok(())
    }

    fn read_words<B: RegisterBus>(&self, bus: &mut B) -> Result<Vec<u32>, B::Error> {
        self.word_offsets()
            .map(|offset| -> Result<u32, B::Error> {
                let word = bus.read_word(offset, self.word)?;
                trace!("read 0x{word:x} @ 0x{offset:x} ({})", self.word);
                Ok(word)
            })
            .collect()
    }

    fn covers_whole_words(&self) -> bool {
        self.shift == 0 && self.bit_width == self.words * self.word.bits()
    }

    fn split_bits(&self, value: u64, index: u32) -> u32 {
        (((value << self.shift) >> (self.word.bits() * index)) as u32) & self.word.mask()
    }
}

/// Read one field of a compiled register.
pub fn read_field<B: RegisterBus>(
    bus: &mut B,
    register: &CompiledRegister,
    field: &CompiledField,
) -> Result<u32, B::Error> {
    WordSplit::for_field(register, field).read(bus)
}

/// Write one field of a compiled register, keeping the other fields.
pub fn write_field<B: RegisterBus>(
    bus: &mut B,
    register: &CompiledRegister,
    field: &CompiledField,
    value: u32,
) -> Result<(), B::Error> {
    WordSplit::for_field(register, field).write(bus, value)
}

/// Errors of [`MemoryBus`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("access of {size} @ 0x{offset:x} is outside the register space")]
    OutOfRange { offset: u32, size: WordSize },
    #[error("access of {size} @ 0x{offset:x} is not aligned")]
    Misaligned { offset: u32, size: WordSize },
}

/// Little-endian register space backed by memory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryBus {
    bytes: Vec<u8>,
}

impl MemoryBus {
    pub fn new(size: u32) -> Self {
        Self {
            bytes: vec![0; size as usize],
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn range(&self, offset: u32, size: WordSize) -> Result<std::ops::Range<usize>, BusError> {
        if offset % size.bytes() != 0 {
            return Err(BusError::Misaligned { offset, size });
        }
        let start = offset as usize;
        let end = start + size.bytes() as usize;
        if end > self.bytes.len() {
            return Err(BusError::OutOfRange { offset, size });
        }
        Ok(start..end)
    }
}

impl RegisterBus for MemoryBus {
    type Error = BusError;

    fn read_word(&mut self, offset: u32, size: WordSize) -> Result<u32, BusError> {
        let range = self.range(offset, size)?;
        Ok(self.bytes[range]
            .iter()
            .rev()
            .fold(0, |acc, b| (acc << 8) | u32::from(*b)))
    }

    fn write_word(&mut self, offset: u32, size: WordSize, value: u32) -> Result<(), BusError> {
        let range = self.range(offset, size)?;
        for (i, byte) in self.bytes[range].iter_mut().enumerate() {
            *byte = (value >> (8 * i)) as u8;
        }
        Ok(())
    }
}
