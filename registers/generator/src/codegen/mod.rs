// Licensed under the Apache-2.0 license

//! Layout compiler.
//!
//! Turns a [`DeviceSpec`] and a [`Profile`] into a [`CompiledLayout`]. The
//! compilation is a pure function of its two inputs: compiling the same
//! description twice yields equal layouts, so regenerating an unchanged map
//! never moves an existing address.
//!
//! The implementation is split across submodules:
//! - `register`: word layout of one register and placement of its fields
//! - `block`: packing registers inside a block and padding to its stride

mod block;
mod register;

use crate::config::ExportConfig;
use crate::error::{SpecError, SpecResult};
use crate::export::{export, field_symbol_parts, symbol_suffix};
use crate::layout::{CompiledLayout, DeviceEntry};
use crate::output::{Emitter, Format};
use crate::parse::load_device;
use crate::profile::Profile;
use crate::types::DeviceSpec;
use anyhow::Context;
use block::{compile_block, padding_units};
use log::info;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Compile a device description for one bus-width profile.
pub fn compile(device: &DeviceSpec, profile: &Profile) -> SpecResult<CompiledLayout> {
    let word_bytes = profile.word_bytes();
    let mut names = HashSet::new();
    let mut entries = Vec::with_capacity(device.blocks.len() * 2);
    let mut cursor: u32 = 0;
    let mut prev: Option<&str> = None;

    for block in &device.blocks {
        if !names.insert(block.name.as_str()) {
            return Err(SpecError::DuplicateName {
                scope: format!("device {}", device.name),
                name: block.name.clone(),
            });
        }
        if block.base.checked_add(block.stride).is_none() {
            return Err(SpecError::InvalidStride {
                block: block.name.clone(),
                stride: block.stride,
                word_bytes,
            });
        }
        if let Some(prev) = prev {
            if block.base < cursor {
                return Err(SpecError::BlockOverlap {
                    first: prev.to_string(),
                    first_end: cursor,
                    second: block.name.clone(),
                    second_base: block.base,
                });
            }
        }

        entries.extend(
            padding_units(cursor, block.base, word_bytes)
                .into_iter()
                .map(DeviceEntry::Padding),
        );
        entries.push(DeviceEntry::Block(compile_block(block, profile)?));

        cursor = block.end();
        prev = Some(block.name.as_str());
    }

    check_symbols(device)?;

    info!(
        "compiled {} for profile {} ({} native word): {} blocks, 0x{:x} bytes",
        device.name,
        profile.name,
        profile.word,
        device.blocks.len(),
        cursor
    );

    Ok(CompiledLayout {
        device: device.name.clone(),
        profile: profile.name.clone(),
        word: profile.word,
        align: profile.align,
        size: cursor,
        entries,
    })
}

/// Reject distinct names that flatten to the same exported symbol, such as
/// `io.clkout.mode` and `io.clkout_mode.clkout_mode`.
///
/// Blocks and registers share one namespace, fields have their own.
fn check_symbols(device: &DeviceSpec) -> SpecResult<()> {
    fn claim(
        symbols: &mut HashMap<String, String>,
        symbol: String,
        qualified: String,
    ) -> SpecResult<()> {
        match symbols.entry(symbol) {
            Entry::Occupied(first) => Err(SpecError::DuplicateName {
                scope: format!("symbol {} of {}", first.key(), first.get()),
                name: qualified,
            }),
            Entry::Vacant(slot) => {
                slot.insert(qualified);
                Ok(())
            }
        }
    }

    let mut registers = HashMap::new();
    let mut fields = HashMap::new();
    for block in &device.blocks {
        claim(&mut registers, symbol_suffix(&[block.name.as_str()]), block.name.clone())?;
        for reg in &block.registers {
            let qualified = format!("{}.{}", block.name, reg.name);
            claim(
                &mut registers,
                symbol_suffix(&[block.name.as_str(), reg.name.as_str()]),
                qualified.clone(),
            )?;
            for field in &reg.fields {
                claim(
                    &mut fields,
                    symbol_suffix(&field_symbol_parts(&block.name, &reg.name, &field.name)),
                    format!("{qualified}.{}", field.name),
                )?;
            }
        }
    }
    Ok(())
}

/// Compile a device description and render it in `format`.
pub fn generate(
    device: &DeviceSpec,
    profile: &Profile,
    format: Format,
    config: &ExportConfig,
) -> anyhow::Result<String> {
    let layout = compile(device, profile)?;
    let metadata = export(&layout, config);
    format.emitter().emit(&metadata)
}

/// Compile a TOML device description file and render it in `format`.
pub fn generate_from_file(
    file: &Path,
    profile: &Profile,
    format: Format,
    config: &ExportConfig,
) -> anyhow::Result<String> {
    let device = load_device(file)?;
    generate(&device, profile, format, config)
        .with_context(|| format!("{} ({})", file.display(), profile.name))
}
