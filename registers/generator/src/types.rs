// Licensed under the Apache-2.0 license

//! Bus-width independent device description.
//!
//! This is the input side of the compiler. A description is built once,
//! either in code or deserialized from TOML, and never mutated by the
//! compiler.
//!
//! ```text
//! DeviceSpec
//! └── blocks: Vec<BlockSpec>          # base address + reserved stride
//!     └── registers: Vec<RegisterSpec>
//!         └── fields: Vec<FieldSpec>  # bit offset + bit width
//! ```

use crate::error::{SpecError, SpecResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Widest logical value a single field may hold.
pub const MAX_FIELD_BITS: u32 = 32;

//=============================================================================
// FieldSpec - Bit field within a register
//=============================================================================

/// A named bit field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    /// Bit offset within the owning register.
    #[serde(rename = "offset")]
    pub bit_offset: u32,
    /// Width in bits.
    #[serde(rename = "width")]
    pub bit_width: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl FieldSpec {
    pub fn new(name: &str, bit_offset: u32, bit_width: u32) -> Self {
        Self {
            name: name.to_string(),
            bit_offset,
            bit_width,
            desc: None,
        }
    }

    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = Some(desc.to_string());
        self
    }

    /// Check that the field fits a 32-bit logical value.
    pub fn validate(&self) -> SpecResult<()> {
        if self.bit_width == 0
            || self.bit_width > MAX_FIELD_BITS
            || self.bit_offset >= MAX_FIELD_BITS
            || self.bit_offset + self.bit_width > MAX_FIELD_BITS
        {
            return Err(SpecError::FieldOutOfRange {
                field: self.name.clone(),
                bit_offset: self.bit_offset,
                bit_width: self.bit_width,
            });
        }
        Ok(())
    }

    /// One past the most significant bit.
    pub fn end_bit(&self) -> u32 {
        self.bit_offset.saturating_add(self.bit_width)
    }

    /// Most significant bit.
    pub fn msb(&self) -> u32 {
        self.end_bit().saturating_sub(1)
    }

    /// Mask of the field's own value, `(1 << bit_width) - 1`.
    pub fn value_mask(&self) -> u32 {
        u32::MAX
            .checked_shr(MAX_FIELD_BITS.saturating_sub(self.bit_width))
            .unwrap_or(0)
    }

    /// Value mask shifted into position within the register.
    pub fn bit_mask(&self) -> u32 {
        self.value_mask().checked_shl(self.bit_offset).unwrap_or(0)
    }

    fn overlaps(&self, other: &FieldSpec) -> bool {
        self.bit_offset < other.end_bit() && other.bit_offset < self.end_bit()
    }
}

//=============================================================================
// RegisterSpec - Ordered set of fields
//=============================================================================

/// A register made of non-overlapping fields.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterSpec {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl RegisterSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Append a field.
    pub fn field(mut self, name: &str, bit_offset: u32, bit_width: u32) -> Self {
        self.fields.push(FieldSpec::new(name, bit_offset, bit_width));
        self
    }

    pub fn with_desc(mut self, desc: &str) -> Self {
        self.desc = Some(desc.to_string());
        self
    }

    /// One past the highest bit claimed by any field (0 without fields).
    pub fn end_bit(&self) -> u32 {
        self.fields.iter().map(FieldSpec::end_bit).max().unwrap_or(0)
    }

    /// Validate every field and check that no two fields share a name or a bit.
    pub fn validate(&self) -> SpecResult<()> {
        let mut names = HashSet::new();
        for (i, field) in self.fields.iter().enumerate() {
            field.validate()?;
            if !names.insert(field.name.as_str()) {
                return Err(SpecError::DuplicateName {
                    scope: format!("register {}", self.name),
                    name: field.name.clone(),
                });
            }
            if let Some(prev) = self.fields[..i].iter().find(|f| f.overlaps(field)) {
                return Err(SpecError::FieldOverlap {
                    register: self.name.clone(),
                    first: prev.name.clone(),
                    first_lsb: prev.bit_offset,
                    first_msb: prev.msb(),
                    second: field.name.clone(),
                    second_lsb: field.bit_offset,
                    second_msb: field.msb(),
                });
            }
        }
        Ok(())
    }
}

//=============================================================================
// BlockSpec - Functional unit with a reserved address span
//=============================================================================

/// A functional block: registers packed from the block base, inside a fixed
/// reserved stride.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSpec {
    pub name: String,
    /// Absolute byte offset of the block.
    pub base: u32,
    /// Bytes reserved for the block regardless of its current contents.
    pub stride: u32,
    #[serde(default)]
    pub registers: Vec<RegisterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl BlockSpec {
    pub fn new(name: &str, base: u32, stride: u32) -> Self {
        Self {
            name: name.to_string(),
            base,
            stride,
            ..Default::default()
        }
    }

    /// Append a register.
    pub fn register(mut self, register: RegisterSpec) -> Self {
        self.registers.push(register);
        self
    }

    /// First byte past the reserved stride.
    pub fn end(&self) -> u32 {
        self.base.saturating_add(self.stride)
    }
}

//=============================================================================
// DeviceSpec - Root of the description
//=============================================================================

/// A whole device: ordered blocks with increasing base offsets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceSpec {
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

impl DeviceSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            blocks: Vec::new(),
        }
    }

    /// Append a block.
    pub fn block(mut self, block: BlockSpec) -> Self {
        self.blocks.push(block);
        self
    }

    /// Find a block by name.
    pub fn find_block(&self, name: &str) -> Option<&BlockSpec> {
        self.blocks.iter().find(|b| b.name == name)
    }
}
