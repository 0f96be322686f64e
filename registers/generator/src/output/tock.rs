// Licensed under the Apache-2.0 license

//! tock-registers back end.
//!
//! For a device named "lwdo_regs" the generated code looks like:
//!
//! ```text
//! pub const LWDO_REGS_SYS_OFFSET: u32 = 0;
//! pub const LWDO_REGS_SIZE: usize = 0x400;
//!
//! pub mod bits {
//!     use tock_registers::register_bitfields;
//!     register_bitfields! { u32,
//!         pub SysPll [ ... ],
//!     }
//! }
//!
//! pub mod regs {
//!     use tock_registers::register_structs;
//!     register_structs! {
//!         pub Sys {
//!             (0x0 => pub magic: ReadWrite<u32>),
//!             (0xc => pub pll: ReadWrite<u32, super::bits::SysPll::Register>),
//!             (0x10 => _reserved0),
//!             (0x20 => @END),
//!         },
//!         pub LwdoRegs {
//!             (0x0 => pub sys: Sys),
//!             ...
//!         }
//!     }
//! }
//! ```
//!
//! Composite registers become arrays of native words without a bitfield
//! type; their fields are accessed through [`crate::WordSplit`].

use super::Emitter;
use crate::export::{AccessorMetadata, AccessorTable, Member, RegisterAccessor, StructShape};
use crate::util::{camel_case, hex_const, rust_ident};
use anyhow::Result;
use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Write};

/// Emits tock-registers `register_bitfields!`/`register_structs!` code.
#[derive(Clone, Debug)]
pub struct TockRegisters {
    /// Path from the `regs` module to the `bits` module.
    pub crate_prefix: String,
}

impl Default for TockRegisters {
    fn default() -> Self {
        Self {
            crate_prefix: "super::".to_string(),
        }
    }
}

impl TockRegisters {
    pub fn with_crate_prefix(mut self, prefix: &str) -> Self {
        self.crate_prefix = prefix.to_string();
        self
    }
}

impl Emitter for TockRegisters {
    fn emit(&self, metadata: &AccessorMetadata) -> Result<String> {
        let table = &metadata.table;
        let mut output = String::new();

        for block in &table.blocks {
            writeln!(
                output,
                "pub const {}_OFFSET: u32 = {};",
                block.symbol,
                hex_const(u64::from(block.byte_offset))
            )?;
        }
        writeln!(
            output,
            "pub const {}_SIZE: usize = {};",
            table.prefix,
            hex_const(u64::from(table.size))
        )?;

        let (bitfields, typed) = generate_bitfields(table)?;
        if !bitfields.is_empty() {
            writeln!(output, "pub mod bits {{")?;
            writeln!(
                output,
                "    //! Types that represent individual registers (bitfields)."
            )?;
            writeln!(output, "    use tock_registers::register_bitfields;")?;
            write!(output, "{bitfields}")?;
            writeln!(output, "}}")?;
        }

        writeln!(output, "pub mod regs {{")?;
        writeln!(output, "    //! Types that represent registers.")?;
        writeln!(output, "    use tock_registers::register_structs;")?;
        writeln!(output, "    register_structs! {{")?;
        for block in metadata.shape.blocks() {
            self.generate_register_struct(&mut output, block, &typed)?;
            writeln!(output, ",")?;
        }
        generate_device_struct(&mut output, &metadata.shape)?;
        writeln!(output)?;
        writeln!(output, "    }}")?;
        writeln!(output, "}}")?;

        Ok(output)
    }
}

/// Bitfield type name of a register.
fn type_name(block: &str, register: &str) -> String {
    camel_case(&format!("{block}_{register}"))
}

/// Whether a register gets a bitfield type: a simple register with some
/// field other than one spanning the whole word.
fn has_bitfield(table: &AccessorTable, reg: &RegisterAccessor) -> bool {
    if reg.words != 1 {
        return false;
    }
    let fields: Vec<_> = table.fields_of(&reg.block, &reg.name).collect();
    !fields.is_empty()
        && !(fields.len() == 1
            && fields[0].register_bit_offset == 0
            && fields[0].bit_width == reg.word_bytes * 8)
}

/// Generate `register_bitfields!` invocations, one per register width.
///
/// Returns the code and the set of `(block, register)` that got a type.
fn generate_bitfields(
    table: &AccessorTable,
) -> std::result::Result<(String, HashSet<(String, String)>), fmt::Error> {
    let mut tokens_by_width: BTreeMap<u32, String> = BTreeMap::new();
    let mut typed = HashSet::new();

    // Sort register types alphabetically for deterministic output
    let mut sorted: Vec<_> = table
        .registers
        .iter()
        .filter(|r| has_bitfield(table, r))
        .collect();
    sorted.sort_by_key(|r| type_name(&r.block, &r.name));

    for reg in sorted {
        let name = type_name(&reg.block, &reg.name);
        let mut field_tokens = format!("        pub {name} [\n");
        for field in table.fields_of(&reg.block, &reg.name) {
            if let Some(desc) = &field.desc {
                for line in desc.lines() {
                    writeln!(field_tokens, "            /// {line}")?;
                }
            }
            writeln!(
                field_tokens,
                "            {} OFFSET({}) NUMBITS({}) [],",
                camel_case(&field.name),
                field.register_bit_offset,
                field.bit_width
            )?;
        }
        writeln!(field_tokens, "        ],")?;

        tokens_by_width
            .entry(reg.word_bytes * 8)
            .or_default()
            .push_str(&field_tokens);
        typed.insert((reg.block.clone(), reg.name.clone()));
    }

    let mut output = String::new();
    for (width, tokens) in tokens_by_width {
        writeln!(output, "    register_bitfields! {{")?;
        writeln!(output, "        u{width},")?;
        write!(output, "{tokens}")?;
        writeln!(output, "    }}")?;
    }
    Ok((output, typed))
}

impl TockRegisters {
    /// One block struct. Offsets are relative to the block base and reserved
    /// runs are coalesced into a single `_reservedN` entry.
    fn generate_register_struct(
        &self,
        output: &mut String,
        block: &StructShape,
        typed: &HashSet<(String, String)>,
    ) -> fmt::Result {
        writeln!(output, "        pub {} {{", camel_case(&block.name))?;
        let mut next_offset = 0;
        let mut reserved_count = 0;

        for member in &block.members {
            let Member::Register {
                name,
                offset,
                word_bytes,
                words,
            } = member
            else {
                continue;
            };
            let reg_offset = offset - block.offset;
            if reg_offset > next_offset {
                writeln!(
                    output,
                    "            (0x{next_offset:x} => _reserved{reserved_count}),"
                )?;
                reserved_count += 1;
            }

            let width_type = format!("u{}", word_bytes * 8);
            let type_str = if typed.contains(&(block.name.clone(), name.clone())) {
                format!(
                    "tock_registers::registers::ReadWrite<{width_type}, {}bits::{}::Register>",
                    self.crate_prefix,
                    type_name(&block.name, name)
                )
            } else {
                format!("tock_registers::registers::ReadWrite<{width_type}>")
            };
            let type_str = if *words > 1 {
                format!("[{type_str}; {words}]")
            } else {
                type_str
            };

            writeln!(
                output,
                "            (0x{reg_offset:x} => pub {}: {type_str}),",
                rust_ident(name)
            )?;
            next_offset = reg_offset + word_bytes * words;
        }

        if block.size > next_offset {
            writeln!(
                output,
                "            (0x{next_offset:x} => _reserved{reserved_count}),"
            )?;
        }
        writeln!(output, "            (0x{:x} => @END),", block.size)?;
        write!(output, "        }}")
    }
}

/// The device struct: blocks at their absolute offsets.
fn generate_device_struct(output: &mut String, device: &StructShape) -> fmt::Result {
    writeln!(output, "        pub {} {{", camel_case(&device.name))?;
    let mut next_offset = 0;
    let mut reserved_count = 0;

    for block in device.blocks() {
        if block.offset > next_offset {
            writeln!(
                output,
                "            (0x{next_offset:x} => _reserved{reserved_count}),"
            )?;
            reserved_count += 1;
        }
        writeln!(
            output,
            "            (0x{:x} => pub {}: {}),",
            block.offset,
            rust_ident(&block.name),
            camel_case(&block.name)
        )?;
        next_offset = block.offset + block.size;
    }

    writeln!(output, "            (0x{:x} => @END),", device.size)?;
    write!(output, "        }}")
}
