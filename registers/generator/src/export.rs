// Licensed under the Apache-2.0 license

//! Accessor metadata exporter.
//!
//! Renders a [`CompiledLayout`] into the two target-agnostic products that
//! back ends consume:
//!
//! ```text
//! CompiledLayout → AccessorMetadata
//!                  ├── AccessorTable   # symbol → offset/width/mask constants
//!                  └── StructShape     # ordered registers + reserved units
//! ```
//!
//! Back ends must not re-derive offsets; everything they need is here.

use crate::codec::WordSplit;
use crate::config::ExportConfig;
use crate::layout::{BlockEntry, CompiledBlock, CompiledLayout, DeviceEntry, Padding};
use serde::Serialize;

//=============================================================================
// Accessor table
//=============================================================================

/// Constants for one block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockAccessor {
    pub symbol: String,
    pub name: String,
    pub byte_offset: u32,
    /// Reserved stride.
    pub byte_size: u32,
    /// Bytes taken by registers.
    pub used_bytes: u32,
}

/// Constants for one register.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterAccessor {
    pub symbol: String,
    pub block: String,
    pub name: String,
    pub byte_offset: u32,
    /// Total bytes spanned by the register.
    pub byte_width: u32,
    /// Bytes per bus access.
    pub word_bytes: u32,
    pub words: u32,
}

/// Constants for one field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldAccessor {
    pub symbol: String,
    pub block: String,
    pub register: String,
    pub name: String,
    /// Absolute byte offset of the first word holding the field.
    pub byte_offset: u32,
    /// Bit offset within that word.
    pub bit_offset: u32,
    pub bit_width: u32,
    /// Field bits within the first word holding it. A field straddling
    /// words keeps its remaining bits in `word_masks`.
    pub bit_mask: u32,
    /// Field bits within each word holding it, in access order.
    pub word_masks: Vec<u32>,
    pub value_mask: u32,
    /// Bytes spanned by the words holding the field.
    pub byte_width: u32,
    pub word_bytes: u32,
    pub words: u32,
    /// Absolute byte offset of the owning register.
    pub register_offset: u32,
    /// Bit offset within the logical register value.
    pub register_bit_offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// One reserved padding unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReservedAccessor {
    pub symbol: String,
    pub byte_offset: u32,
    pub byte_size: u32,
}

/// Flat table of accessor constants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessorTable {
    pub device: String,
    pub profile: String,
    /// Upper-case prefix shared by every symbol.
    pub prefix: String,
    pub word_bytes: u32,
    pub size: u32,
    pub blocks: Vec<BlockAccessor>,
    pub registers: Vec<RegisterAccessor>,
    pub fields: Vec<FieldAccessor>,
    pub reserved: Vec<ReservedAccessor>,
}

impl AccessorTable {
    pub fn field(&self, symbol: &str) -> Option<&FieldAccessor> {
        self.fields.iter().find(|f| f.symbol == symbol)
    }

    pub fn register(&self, symbol: &str) -> Option<&RegisterAccessor> {
        self.registers.iter().find(|r| r.symbol == symbol)
    }

    /// Fields of the register `block.register`, in declaration order.
    pub fn fields_of<'a>(
        &'a self,
        block: &'a str,
        register: &'a str,
    ) -> impl Iterator<Item = &'a FieldAccessor> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.block == block && f.register == register)
    }

    /// Registers of a block, in address order.
    pub fn registers_of<'a>(
        &'a self,
        block: &'a str,
    ) -> impl Iterator<Item = &'a RegisterAccessor> + 'a {
        self.registers.iter().filter(move |r| r.block == block)
    }

    /// Symbol with the shared prefix removed.
    pub fn local_symbol<'a>(&self, symbol: &'a str) -> &'a str {
        symbol
            .strip_prefix(self.prefix.as_str())
            .and_then(|s| s.strip_prefix('_'))
            .unwrap_or(symbol)
    }
}

//=============================================================================
// Struct shape
//=============================================================================

/// One member of a fixed-layout aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    /// A register of `words` native words of `word_bytes` each.
    Register {
        name: String,
        offset: u32,
        word_bytes: u32,
        words: u32,
    },
    /// A nested block aggregate.
    Block(StructShape),
    /// An anonymous reserved unit.
    Reserved { offset: u32, bytes: u32 },
}

impl Member {
    /// Absolute byte offset.
    pub fn offset(&self) -> u32 {
        match self {
            Member::Register { offset, .. } | Member::Reserved { offset, .. } => *offset,
            Member::Block(shape) => shape.offset,
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            Member::Register {
                word_bytes, words, ..
            } => word_bytes * words,
            Member::Block(shape) => shape.size,
            Member::Reserved { bytes, .. } => *bytes,
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, Member::Reserved { .. })
    }
}

impl From<&Padding> for Member {
    fn from(p: &Padding) -> Self {
        Member::Reserved {
            offset: p.offset,
            bytes: p.bytes,
        }
    }
}

/// Ordered, exhaustive layout of an aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StructShape {
    pub name: String,
    /// Absolute byte offset.
    pub offset: u32,
    pub size: u32,
    pub members: Vec<Member>,
}

impl StructShape {
    /// Nested block shapes, in address order.
    pub fn blocks(&self) -> impl Iterator<Item = &StructShape> {
        self.members.iter().filter_map(|m| match m {
            Member::Block(shape) => Some(shape),
            _ => None,
        })
    }

    /// Whether members are contiguous and exactly cover `[offset, offset + size)`.
    pub fn is_exhaustive(&self) -> bool {
        let mut cursor = self.offset;
        for member in &self.members {
            if member.offset() != cursor {
                return false;
            }
            if let Member::Block(shape) = member {
                if !shape.is_exhaustive() {
                    return false;
                }
            }
            cursor += member.size();
        }
        cursor == self.offset + self.size
    }
}

/// Accessor table and struct shape of one compiled layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessorMetadata {
    pub table: AccessorTable,
    pub shape: StructShape,
}

//=============================================================================
// Export
//=============================================================================

/// Render a compiled layout into accessor metadata.
pub fn export(layout: &CompiledLayout, config: &ExportConfig) -> AccessorMetadata {
    AccessorMetadata {
        table: accessor_table(layout, config),
        shape: struct_shape(layout),
    }
}

fn accessor_table(layout: &CompiledLayout, config: &ExportConfig) -> AccessorTable {
    let prefix = config.symbol_prefix(&layout.device);
    let filter = &config.filter;
    let included =
        |offset: u32, name: &str| filter.is_empty() || filter.should_include(offset, name);
    let symbol = |parts: &[&str]| format!("{prefix}_{}", symbol_suffix(parts));

    let mut table = AccessorTable {
        device: layout.device.clone(),
        profile: layout.profile.clone(),
        prefix: prefix.clone(),
        word_bytes: layout.word.bytes(),
        size: layout.size,
        blocks: Vec::new(),
        registers: Vec::new(),
        fields: Vec::new(),
        reserved: Vec::new(),
    };

    for block in layout.blocks() {
        if !included(block.base, &block.name) {
            continue;
        }
        table.blocks.push(BlockAccessor {
            symbol: symbol(&[block.name.as_str()]),
            name: block.name.clone(),
            byte_offset: block.base,
            byte_size: block.stride,
            used_bytes: block.used_bytes(),
        });

        for reg in block.registers() {
            let qualified = format!("{}.{}", block.name, reg.name);
            if !included(reg.absolute, &qualified) {
                continue;
            }
            table.registers.push(RegisterAccessor {
                symbol: symbol(&[block.name.as_str(), reg.name.as_str()]),
                block: block.name.clone(),
                name: reg.name.clone(),
                byte_offset: reg.absolute,
                byte_width: reg.byte_width(),
                word_bytes: reg.word_bytes(),
                words: reg.layout.words(),
            });

            for field in &reg.fields {
                let parts = field_symbol_parts(&block.name, &reg.name, &field.name);
                let split = WordSplit::for_field(reg, field);
                table.fields.push(FieldAccessor {
                    symbol: symbol(&parts),
                    block: block.name.clone(),
                    register: reg.name.clone(),
                    name: field.name.clone(),
                    byte_offset: reg.word_offset(field.word_index),
                    bit_offset: field.word_bit_offset,
                    bit_width: field.bit_width,
                    bit_mask: split.word_mask(0),
                    word_masks: (0..split.words).map(|i| split.word_mask(i)).collect(),
                    value_mask: field.value_mask,
                    byte_width: field.words * reg.word_bytes(),
                    word_bytes: reg.word_bytes(),
                    words: field.words,
                    register_offset: reg.absolute,
                    register_bit_offset: field.bit_offset,
                    desc: field.desc.clone(),
                });
            }
        }
    }

    if config.include_reserved {
        table.reserved = layout
            .padding()
            .iter()
            .map(|p| ReservedAccessor {
                symbol: format!("{prefix}_RESERVED_{:04X}", p.offset),
                byte_offset: p.offset,
                byte_size: p.bytes,
            })
            .collect();
    }

    table
}

/// Symbol of `parts` without the device prefix.
pub(crate) fn symbol_suffix(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| crate::util::upper_snake_case(part))
        .collect::<Vec<_>>()
        .join("_")
}

/// Name parts of a field symbol. A field named like its register does not
/// repeat the name.
pub(crate) fn field_symbol_parts<'a>(
    block: &'a str,
    register: &'a str,
    field: &'a str,
) -> Vec<&'a str> {
    if field == register {
        vec![block, register]
    } else {
        vec![block, register, field]
    }
}

fn struct_shape(layout: &CompiledLayout) -> StructShape {
    let members = layout
        .entries
        .iter()
        .map(|entry| match entry {
            DeviceEntry::Block(block) => Member::Block(block_shape(block)),
            DeviceEntry::Padding(p) => Member::from(p),
        })
        .collect();

    StructShape {
        name: layout.device.clone(),
        offset: 0,
        size: layout.size,
        members,
    }
}

fn block_shape(block: &CompiledBlock) -> StructShape {
    let members = block
        .entries
        .iter()
        .map(|entry| match entry {
            BlockEntry::Register(reg) => Member::Register {
                name: reg.name.clone(),
                offset: reg.absolute,
                word_bytes: reg.word_bytes(),
                words: reg.layout.words(),
            },
            BlockEntry::Padding(p) => Member::from(p),
        })
        .collect();

    StructShape {
        name: block.name.clone(),
        offset: block.base,
        size: block.stride,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::compile;
    use crate::config::FilterConfig;
    use crate::profile::Profile;
    use crate::types::{BlockSpec, DeviceSpec, RegisterSpec};

    fn metadata(config: &ExportConfig) -> AccessorMetadata {
        let device = DeviceSpec::new("lwdo_regs").block(
            BlockSpec::new("pps", 0x8, 0x10)
                .register(RegisterSpec::new("con").field("en", 0, 1))
                .register(RegisterSpec::new("rate_div").field("rate_div", 0, 28)),
        );
        export(&compile(&device, &Profile::bus32()).unwrap(), config)
    }

    #[test]
    fn test_symbols() {
        let table = metadata(&ExportConfig::new()).table;
        let symbols: Vec<_> = table.fields.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["LWDO_REGS_PPS_CON_EN", "LWDO_REGS_PPS_RATE_DIV"]);
        assert_eq!(table.blocks[0].symbol, "LWDO_REGS_PPS");
        assert_eq!(table.local_symbol("LWDO_REGS_PPS_CON_EN"), "PPS_CON_EN");
        assert_eq!(table.local_symbol("OTHER"), "OTHER");
    }

    #[test]
    fn test_reserved_only_on_request() {
        assert!(metadata(&ExportConfig::new()).table.reserved.is_empty());
        let table = metadata(&ExportConfig::new().include_reserved(true)).table;
        let reserved: Vec<_> = table
            .reserved
            .iter()
            .map(|r| (r.symbol.as_str(), r.byte_offset, r.byte_size))
            .collect();
        assert_eq!(
            reserved,
            vec![
                ("LWDO_REGS_RESERVED_0000", 0x0, 4),
                ("LWDO_REGS_RESERVED_0004", 0x4, 4),
                ("LWDO_REGS_RESERVED_0010", 0x10, 4),
                ("LWDO_REGS_RESERVED_0014", 0x14, 4),
            ]
        );
    }

    #[test]
    fn test_filtered_table() {
        let filter = FilterConfig::new().include_offset_range(0xc, 0xf);
        let table = metadata(&ExportConfig::new().with_filter(filter)).table;
        assert_eq!(table.blocks.len(), 0);

        let filter = FilterConfig::new().exclude_name("pps.con");
        let table = metadata(&ExportConfig::new().with_filter(filter)).table;
        assert_eq!(table.blocks.len(), 1);
        let registers: Vec<_> = table.registers_of("pps").map(|r| r.name.as_str()).collect();
        assert_eq!(registers, vec!["rate_div"]);
        assert_eq!(table.fields_of("pps", "con").count(), 0);
    }

    #[test]
    fn test_struct_shape() {
        let shape = metadata(&ExportConfig::new()).shape;
        assert_eq!(shape.size, 0x18);
        assert!(shape.is_exhaustive());
        assert!(shape.members[0].is_reserved());
        let pps = shape.blocks().next().unwrap();
        assert_eq!((pps.offset, pps.size), (0x8, 0x10));
        assert_eq!(pps.members.len(), 4);
        assert_eq!(pps.members[1].offset(), 0xc);

        let mut broken = shape.clone();
        broken.members.remove(1);
        assert!(!broken.is_exhaustive());
    }
}
