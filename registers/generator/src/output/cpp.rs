// Licensed under the Apache-2.0 license

//! C++ back end: one `constexpr` bitfield descriptor per field.
//!
//! ```text
//! struct LWDO_REGS {
//!   template <uint32_t RA, unsigned RW, unsigned BO, unsigned BW>
//!   using BF = lwdo::regs::BitfieldDef<RA, RW, BO, BW>;
//!
//!   // SYS_PLL @ 0x000c
//!   static constexpr BF<0x000c, 4, 4, 7> SYS_PLL_DIVF{};
//! };
//! ```
//!
//! `RA` is the register address, `RW` the bytes spanned by the register,
//! `BO`/`BW` the field's bit offset and width within the register value.

use super::Emitter;
use crate::export::AccessorMetadata;
use anyhow::Result;
use std::fmt::Write;

/// Emits a C++ header of `BitfieldDef` descriptors.
#[derive(Clone, Debug)]
pub struct CppBitfields {
    /// Fully qualified bitfield template the descriptors alias.
    pub bitfield_class: String,
    /// Indent of the struct body, in spaces.
    pub indent: usize,
}

impl Default for CppBitfields {
    fn default() -> Self {
        Self {
            bitfield_class: "lwdo::regs::BitfieldDef".to_string(),
            indent: 2,
        }
    }
}

impl CppBitfields {
    pub fn with_bitfield_class(mut self, class: &str) -> Self {
        self.bitfield_class = class.to_string();
        self
    }
}

impl Emitter for CppBitfields {
    fn emit(&self, metadata: &AccessorMetadata) -> Result<String> {
        let table = &metadata.table;
        let guard = format!("H_{}_HPP__", table.prefix);
        let pad = " ".repeat(self.indent);

        let mut out = String::new();
        writeln!(out, "// WARNING: auto-generated file, do not edit!")?;
        writeln!(out)?;
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out)?;
        writeln!(out, "struct {} {{", table.prefix)?;
        writeln!(
            out,
            "{pad}template <uint32_t RA, unsigned RW, unsigned BO, unsigned BW>"
        )?;
        writeln!(
            out,
            "{pad}using BF = {}<RA, RW, BO, BW>;",
            self.bitfield_class
        )?;
        writeln!(out)?;

        for reg in &table.registers {
            let addr = reg.byte_offset;
            writeln!(
                out,
                "{pad}// {} @ 0x{addr:04x}",
                table.local_symbol(&reg.symbol)
            )?;
            for field in table.fields_of(&reg.block, &reg.name) {
                writeln!(
                    out,
                    "{pad}static constexpr BF<0x{addr:04x}, {}, {}, {}> {}{{}};",
                    reg.byte_width,
                    field.register_bit_offset,
                    field.bit_width,
                    table.local_symbol(&field.symbol)
                )?;
            }
        }

        writeln!(out, "}};")?;
        writeln!(out)?;
        writeln!(out, "#endif  // {guard}")?;
        Ok(out)
    }
}
