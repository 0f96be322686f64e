// Licensed under the Apache-2.0 license

//! Block model: packs registers from the block base and pads to the stride.

use super::register::compile_register;
use crate::error::{SpecError, SpecResult};
use crate::layout::{BlockEntry, CompiledBlock, CompiledRegister, Padding};
use crate::profile::{AlignmentOrigin, Profile};
use crate::types::BlockSpec;
use log::debug;
use std::collections::HashSet;

/// Lay out one block at its absolute base.
pub(super) fn compile_block(spec: &BlockSpec, profile: &Profile) -> SpecResult<CompiledBlock> {
    let word_bytes = profile.word_bytes();
    if spec.stride == 0 || spec.stride % word_bytes != 0 {
        return Err(SpecError::InvalidStride {
            block: spec.name.clone(),
            stride: spec.stride,
            word_bytes,
        });
    }
    if spec.base % word_bytes != 0 {
        return Err(SpecError::MisalignedBlock {
            block: spec.name.clone(),
            base: spec.base,
            word_bytes,
        });
    }

    let mut names = HashSet::new();
    let mut entries = Vec::with_capacity(spec.registers.len());
    let mut cursor: u32 = 0;

    for reg in &spec.registers {
        if !names.insert(reg.name.as_str()) {
            return Err(SpecError::DuplicateName {
                scope: format!("block {}", spec.name),
                name: reg.name.clone(),
            });
        }

        let word = profile.register_word(&spec.name, &reg.name);
        let (layout, fields) = compile_register(reg, word)?;
        let offset = cursor;
        let absolute = spec.base + offset;

        // Every access must land on a multiple of the register's own word,
        // which an override may make wider than the native word.
        let access_bytes = layout.word().bytes();
        let origin_offset = match profile.align {
            AlignmentOrigin::Block => offset,
            AlignmentOrigin::Device => absolute,
        };
        if origin_offset % access_bytes != 0 {
            return Err(SpecError::MisalignedMultiWord {
                register: format!("{}.{}", spec.name, reg.name),
                offset: origin_offset,
                word_bytes: access_bytes,
                words: layout.words(),
            });
        }

        cursor += layout.byte_size();
        if cursor > spec.stride {
            return Err(SpecError::StrideOverflow {
                block: spec.name.clone(),
                register: reg.name.clone(),
                used: cursor,
                stride: spec.stride,
            });
        }

        entries.push(BlockEntry::Register(CompiledRegister {
            name: reg.name.clone(),
            offset,
            absolute,
            layout,
            fields,
            desc: reg.desc.clone(),
        }));
    }

    let fill = padding_units(spec.base + cursor, spec.end(), word_bytes);
    debug!(
        "block {} @ 0x{:x}: 0x{:x} of 0x{:x} bytes used, {} padding units",
        spec.name,
        spec.base,
        cursor,
        spec.stride,
        fill.len()
    );
    entries.extend(fill.into_iter().map(BlockEntry::Padding));

    Ok(CompiledBlock {
        name: spec.name.clone(),
        base: spec.base,
        stride: spec.stride,
        entries,
        desc: spec.desc.clone(),
    })
}

/// Cover `[start, end)` with padding units of `unit` bytes.
///
/// Units are aligned to absolute multiples of `unit`; a leading or trailing
/// partial unit is emitted when `start` or `end` is not aligned.
pub(super) fn padding_units(start: u32, end: u32, unit: u32) -> Vec<Padding> {
    let mut units = Vec::new();
    let mut offset = start;
    while offset < end {
        let bytes = (unit - offset % unit).min(end - offset);
        units.push(Padding { offset, bytes });
        offset += bytes;
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_units() {
        assert_eq!(padding_units(0x10, 0x10, 4), vec![]);
        assert_eq!(
            padding_units(0x8, 0x10, 4),
            vec![
                Padding {
                    offset: 0x8,
                    bytes: 4
                },
                Padding {
                    offset: 0xc,
                    bytes: 4
                },
            ]
        );
        assert_eq!(
            padding_units(0x6, 0xc, 4),
            vec![
                Padding {
                    offset: 0x6,
                    bytes: 2
                },
                Padding {
                    offset: 0x8,
                    bytes: 4
                },
            ]
        );
    }
}
