// Licensed under the Apache-2.0 license

//! Register map compiler for memory-mapped control/status registers.
//!
//! A bus-width independent [`DeviceSpec`] (blocks of registers of bit
//! fields) is compiled for one bus-width [`Profile`] into a
//! [`CompiledLayout`] with absolute offsets and explicit reserved padding,
//! then exported as [`AccessorMetadata`] that the back ends in [`output`]
//! turn into C, C++, Rust or JSON.
//!
//! ## Usage
//!
//! ```
//! use lwdo_registers_generator::{
//!     compile, export, BlockSpec, DeviceSpec, ExportConfig, Profile, RegisterSpec,
//! };
//!
//! let device = DeviceSpec::new("lwdo_regs").block(
//!     BlockSpec::new("tdc", 0x40, 0x20)
//!         .register(RegisterSpec::new("con").field("en", 0, 1))
//!         .register(RegisterSpec::new("pll").field("divr", 0, 4).field("divf", 4, 7))
//!         .register(RegisterSpec::new("div_gate").field("div_gate", 0, 32)),
//! );
//!
//! let layout = compile(&device, &Profile::bus16()).unwrap();
//! assert_eq!(layout.register("tdc", "div_gate").unwrap().absolute, 0x44);
//!
//! let metadata = export(&layout, &ExportConfig::new());
//! let div_gate = metadata.table.field("LWDO_REGS_TDC_DIV_GATE").unwrap();
//! assert_eq!(div_gate.byte_width, 4);
//! assert_eq!(div_gate.words, 2);
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: the device description (input)
//! - [`profile`]: bus-width profiles
//! - [`layout`]: the compiled layout (output of [`compile`])
//! - [`export`]: accessor table and struct shape
//! - [`codec`]: split/merge of multi-word field values at runtime
//! - [`output`]: C header, C++, tock-registers and JSON back ends
//! - [`parse`]: TOML loaders
//! - [`config`]: export configuration ([`ExportConfig`], [`FilterConfig`])
//! - [`util`]: name conversion utilities

pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod output;
pub mod parse;
pub mod profile;
pub mod types;
pub mod util;

mod codegen;

// Re-export main public API
pub use codec::{read_field, write_field, BusError, MemoryBus, RegisterBus, WordSplit};
pub use codegen::{compile, generate, generate_from_file};
pub use config::{ExportConfig, FilterConfig};
pub use error::{SpecError, SpecResult};
pub use export::{export, AccessorMetadata, AccessorTable, Member, StructShape};
pub use layout::{CompiledBlock, CompiledField, CompiledLayout, CompiledRegister, RegisterLayout};
pub use output::{Emitter, Format};
pub use profile::{AlignmentOrigin, Profile, WordSize};
pub use types::{BlockSpec, DeviceSpec, FieldSpec, RegisterSpec};
