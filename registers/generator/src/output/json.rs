// Licensed under the Apache-2.0 license

use super::Emitter;
use crate::export::AccessorMetadata;
use anyhow::Result;

/// Emits the accessor metadata as pretty-printed JSON.
#[derive(Clone, Copy, Debug, Default)]
pub struct Json;

impl Emitter for Json {
    fn emit(&self, metadata: &AccessorMetadata) -> Result<String> {
        let mut out = serde_json::to_string_pretty(metadata)?;
        out.push('\n');
        Ok(out)
    }
}
