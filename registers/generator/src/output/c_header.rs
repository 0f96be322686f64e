// Licensed under the Apache-2.0 license

//! C header back end.
//!
//! For every register the header carries one group of defines per field
//! followed by the register's own defines:
//!
//! ```text
//! #define LWDO_REGS_SYS_PLL_DIVF_BIT_WIDTH 7
//! #define LWDO_REGS_SYS_PLL_DIVF_BIT_MASK 0x7f      // unshifted
//! #define LWDO_REGS_SYS_PLL_DIVF_BIT_OFFSET 4       // within the register
//! #define LWDO_REGS_SYS_PLL_BYTE_WIDTH 4            // bytes per bus access
//! #define LWDO_REGS_SYS_PLL_BYTE_SIZE 4             // bytes spanned
//! #define LWDO_REGS_SYS_PLL_BYTE_OFFSET 0xc
//! ```
//!
//! followed by one `typedef struct` per block holding its registers and a
//! device struct holding the blocks with every reserved unit spelled out as
//! a `__reserved_0x...` member.

use super::{c_storage, Emitter};
use crate::export::{AccessorMetadata, AccessorTable, Member, StructShape};
use crate::util::snake_case;
use anyhow::Result;
use std::fmt::{self, Write};

/// Emits a C header of `#define` constants and `typedef struct` layouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CHeader;

impl Emitter for CHeader {
    fn emit(&self, metadata: &AccessorMetadata) -> Result<String> {
        let mut out = String::new();
        let guard = format!("{}_H", metadata.table.prefix);
        writeln!(out, "#ifndef {guard}")?;
        writeln!(out, "#define {guard}")?;
        writeln!(out, "#include \"stdint.h\"")?;
        write_defines(&mut out, &metadata.table)?;
        write_structs(&mut out, &metadata.table.prefix.to_lowercase(), &metadata.shape)?;
        writeln!(out, "#endif")?;
        Ok(out)
    }
}

fn write_defines(out: &mut impl Write, table: &AccessorTable) -> fmt::Result {
    for reg in &table.registers {
        for field in table.fields_of(&reg.block, &reg.name) {
            let sym = &field.symbol;
            writeln!(out, "#define {sym}_BIT_WIDTH {}", field.bit_width)?;
            writeln!(out, "#define {sym}_BIT_MASK 0x{:x}", field.value_mask)?;
            writeln!(out, "#define {sym}_BIT_OFFSET {}", field.register_bit_offset)?;
        }
        let sym = &reg.symbol;
        writeln!(out, "#define {sym}_BYTE_WIDTH {}", reg.word_bytes)?;
        writeln!(out, "#define {sym}_BYTE_SIZE {}", reg.byte_width)?;
        writeln!(out, "#define {sym}_BYTE_OFFSET 0x{:x}", reg.byte_offset)?;
    }
    Ok(())
}

fn write_structs(out: &mut impl Write, prefix: &str, device: &StructShape) -> fmt::Result {
    for block in device.blocks().filter(|b| has_registers(b)) {
        writeln!(out, "typedef struct {{")?;
        for member in &block.members {
            if let Member::Register {
                name,
                word_bytes,
                words,
                ..
            } = member
            {
                let (ty, _) = c_storage(*word_bytes);
                let name = snake_case(name);
                if *words > 1 {
                    writeln!(out, "  {ty} {name}[{words}];")?;
                } else {
                    writeln!(out, "  {ty} {name};")?;
                }
            }
        }
        writeln!(out, "}} {prefix}_{}_t;", snake_case(&block.name))?;
    }

    // Block padding is hoisted into the device struct.
    writeln!(out, "typedef struct {{")?;
    for member in &device.members {
        match member {
            Member::Block(block) => {
                if has_registers(block) {
                    let name = snake_case(&block.name);
                    writeln!(out, "  {prefix}_{name}_t {name};")?;
                }
                for reserved in block.members.iter().filter(|m| m.is_reserved()) {
                    write_reserved(out, reserved)?;
                }
            }
            _ => write_reserved(out, member)?,
        }
    }
    writeln!(out, "}} {prefix}_t;")
}

fn write_reserved(out: &mut impl Write, member: &Member) -> fmt::Result {
    let offset = member.offset();
    match c_storage(member.size()) {
        (ty, None) => writeln!(out, "  {ty} __reserved_0x{offset:03x};"),
        (ty, Some(n)) => writeln!(out, "  {ty} __reserved_0x{offset:03x}[{n}];"),
    }
}

fn has_registers(block: &StructShape) -> bool {
    block
        .members
        .iter()
        .any(|m| matches!(m, Member::Register { .. }))
}
