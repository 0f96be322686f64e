// Licensed under the Apache-2.0 license

//! Register model: turns a validated field set into a word layout.

use crate::error::SpecResult;
use crate::layout::{CompiledField, RegisterLayout};
use crate::profile::{Profile, WordSize};
use crate::types::RegisterSpec;

/// Compute the word layout of a register accessed with `word`, and place its
/// fields onto those words.
pub(super) fn compile_register(
    spec: &RegisterSpec,
    word: WordSize,
) -> SpecResult<(RegisterLayout, Vec<CompiledField>)> {
    spec.validate()?;

    let words = Profile::register_words(word, spec.end_bit());
    let layout = RegisterLayout::new(word, words);
    let word_bits = word.bits();

    let fields = spec
        .fields
        .iter()
        .map(|f| {
            let word_bit_offset = f.bit_offset % word_bits;
            CompiledField {
                name: f.name.clone(),
                bit_offset: f.bit_offset,
                bit_width: f.bit_width,
                bit_mask: f.bit_mask(),
                value_mask: f.value_mask(),
                word_index: f.bit_offset / word_bits,
                word_bit_offset,
                words: (word_bit_offset + f.bit_width).div_ceil(word_bits),
                desc: f.desc.clone(),
            }
        })
        .collect();

    Ok((layout, fields))
}
