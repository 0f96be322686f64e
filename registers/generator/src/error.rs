// Licensed under the Apache-2.0 license

//! Errors raised while compiling a register map.
//!
//! Every variant is a specification error: the compiler never trims or
//! relocates anything on its own, it aborts the device/profile pair and
//! reports the symbolic names and offsets involved.

use thiserror::Error;

/// A register map specification that cannot be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Field geometry does not fit a 32-bit logical value.
    #[error("field {field}: bit offset {bit_offset} + width {bit_width} is outside a 32-bit value")]
    FieldOutOfRange {
        field: String,
        bit_offset: u32,
        bit_width: u32,
    },

    /// Two fields of one register claim the same bits.
    #[error("register {register}: field {first} (bits {first_lsb}..={first_msb}) overlaps {second} (bits {second_lsb}..={second_msb})")]
    FieldOverlap {
        register: String,
        first: String,
        first_lsb: u32,
        first_msb: u32,
        second: String,
        second_lsb: u32,
        second_msb: u32,
    },

    /// The packed registers of a block do not fit its stride.
    #[error("block {block}: registers need 0x{used:x} bytes but the stride is 0x{stride:x} (overflowing at register {register})")]
    StrideOverflow {
        block: String,
        register: String,
        used: u32,
        stride: u32,
    },

    /// Two blocks' address ranges intersect.
    #[error("block {second} at 0x{second_base:x} overlaps block {first} which ends at 0x{first_end:x}")]
    BlockOverlap {
        first: String,
        first_end: u32,
        second: String,
        second_base: u32,
    },

    /// A register does not start on a boundary of its own access word.
    #[error("register {register} at 0x{offset:x} spans {words} words but is not aligned to its {word_bytes}-byte access word")]
    MisalignedMultiWord {
        register: String,
        offset: u32,
        word_bytes: u32,
        words: u32,
    },

    /// A block base that is not a multiple of the native word.
    #[error("block {block}: base 0x{base:x} is not aligned to the {word_bytes}-byte native word")]
    MisalignedBlock {
        block: String,
        base: u32,
        word_bytes: u32,
    },

    /// Two names that would export the same symbol, which would make exported symbols ambiguous.
    #[error("{scope}: duplicate name {name}")]
    DuplicateName { scope: String, name: String },

    /// A block stride that cannot be filled with native-word padding.
    #[error("block {block}: stride 0x{stride:x} must be a non-zero multiple of the {word_bytes}-byte native word ending inside the 32-bit address space")]
    InvalidStride {
        block: String,
        stride: u32,
        word_bytes: u32,
    },
}

/// Result type for register map compilation.
pub type SpecResult<T> = std::result::Result<T, SpecError>;
