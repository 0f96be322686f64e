// Licensed under the Apache-2.0 license

//! Back ends rendering [`AccessorMetadata`] as source text.
//!
//! ```text
//! AccessorMetadata → Emitter → String
//!                    ├── CHeader        # #define constants + typedef structs
//!                    ├── CppBitfields   # constexpr BitfieldDef descriptors
//!                    ├── TockRegisters  # register_bitfields! / register_structs!
//!                    └── Json           # the metadata itself
//! ```
//!
//! Emitters only format; every offset, width and mask comes from the
//! metadata.

mod c_header;
mod cpp;
mod json;
mod tock;

pub use c_header::CHeader;
pub use cpp::CppBitfields;
pub use json::Json;
pub use tock::TockRegisters;

use crate::export::AccessorMetadata;
use anyhow::Result;
use std::fmt;
use std::str::FromStr;

/// Renders accessor metadata for one target language.
pub trait Emitter {
    fn emit(&self, metadata: &AccessorMetadata) -> Result<String>;
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    CHeader,
    Cpp,
    Tock,
    Json,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::CHeader, Format::Cpp, Format::Tock, Format::Json];

    pub fn name(self) -> &'static str {
        match self {
            Format::CHeader => "c-header",
            Format::Cpp => "cpp",
            Format::Tock => "tock",
            Format::Json => "json",
        }
    }

    /// Conventional file extension of the output.
    pub fn extension(self) -> &'static str {
        match self {
            Format::CHeader => "h",
            Format::Cpp => "hpp",
            Format::Tock => "rs",
            Format::Json => "json",
        }
    }

    pub fn emitter(self) -> Box<dyn Emitter> {
        match self {
            Format::CHeader => Box::new(CHeader),
            Format::Cpp => Box::new(CppBitfields::default()),
            Format::Tock => Box::new(TockRegisters::default()),
            Format::Json => Box::new(Json),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| {
                let names: Vec<_> = Format::ALL.iter().map(|f| f.name()).collect();
                format!("unknown format {s:?}, expected one of {}", names.join(", "))
            })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// C type of a reserved unit of `bytes` bytes, and its array length if any.
fn c_storage(bytes: u32) -> (&'static str, Option<u32>) {
    match bytes {
        1 => ("uint8_t", None),
        2 => ("uint16_t", None),
        4 => ("uint32_t", None),
        n => ("uint8_t", Some(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        for format in Format::ALL {
            assert_eq!(format.name().parse::<Format>(), Ok(format));
        }
        assert!("rust".parse::<Format>().is_err());
        assert_eq!(Format::CHeader.extension(), "h");
        assert_eq!(Format::Tock.to_string(), "tock");
    }

    #[test]
    fn test_c_storage() {
        assert_eq!(c_storage(4), ("uint32_t", None));
        assert_eq!(c_storage(2), ("uint16_t", None));
        assert_eq!(c_storage(3), ("uint8_t", Some(3)));
    }
}
