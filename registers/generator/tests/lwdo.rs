// Licensed under the Apache-2.0 license

//! End-to-end tests against the oscillator register map in `hw/`.

use log::LevelFilter;
use lwdo_registers_generator::output::{CppBitfields, Emitter, TockRegisters};
use lwdo_registers_generator::parse::{device_from_str, profile_from_str};
use lwdo_registers_generator::{
    compile, export, generate, read_field, write_field, CompiledLayout, DeviceSpec, ExportConfig,
    FilterConfig, Format, MemoryBus, Profile, RegisterBus, WordSize, WordSplit,
};
use simple_logger::SimpleLogger;

const DESCRIPTION: &str = include_str!("../../../hw/lwdo_regs.toml");
const BUS32: &str = include_str!("../../../hw/profiles/bus32.toml");
const BUS16: &str = include_str!("../../../hw/profiles/bus16.toml");
const GOLDEN_HEADER: &str = include_str!("../../../hw/generated/lwdo_regs.h");

fn init_logger() {
    // Tests share one process, only the first init succeeds.
    let _ = SimpleLogger::new().with_level(LevelFilter::Trace).init();
}

fn device() -> DeviceSpec {
    device_from_str(DESCRIPTION).unwrap()
}

fn layout(profile: &str) -> CompiledLayout {
    init_logger();
    let profile = profile_from_str(profile).unwrap();
    compile(&device(), &profile).unwrap()
}

#[test]
fn test_profile_files_match_builtins() {
    assert_eq!(profile_from_str(BUS32).unwrap(), Profile::bus32());
    assert_eq!(profile_from_str(BUS16).unwrap(), Profile::bus16());
}

#[test]
fn test_bus32_offsets() {
    let layout = layout(BUS32);
    let offsets: Vec<_> = layout
        .blocks()
        .flat_map(|b| b.registers().map(move |r| (b.name.as_str(), r.name.as_str(), r.absolute)))
        .collect();
    assert_eq!(
        offsets,
        vec![
            ("sys", "magic", 0x0),
            ("sys", "version", 0x4),
            ("sys", "con", 0x8),
            ("sys", "pll", 0xc),
            ("hwtime", "cnt", 0x20),
            ("tdc", "con", 0x40),
            ("tdc", "pll", 0x44),
            ("tdc", "div_gate", 0x48),
            ("tdc", "div_meas", 0x4c),
            ("adc", "con", 0x60),
            ("adc", "sample_rate_div", 0x64),
            ("adc", "ts_rate_div", 0x68),
            ("ftun", "vtune_set", 0x80),
            ("pps", "con", 0xa0),
            ("pps", "rate_div", 0xa4),
            ("pps", "pulse_width", 0xa8),
            ("io", "clkout", 0xc0),
            ("test", "rw", 0x3e0),
        ]
    );
    assert_eq!(layout.size, 0x400);
}

#[test]
fn test_bus16_offsets() {
    let layout = layout(BUS16);
    let tdc: Vec<_> = layout
        .block("tdc")
        .unwrap()
        .registers()
        .map(|r| (r.name.as_str(), r.absolute, r.byte_width()))
        .collect();
    assert_eq!(
        tdc,
        vec![
            ("con", 0x40, 2),
            ("pll", 0x42, 4),
            ("div_gate", 0x46, 4),
            ("div_meas", 0x4a, 4),
        ]
    );

    // Block bases do not depend on the profile.
    let bus32 = self::layout(BUS32);
    for (a, b) in layout.blocks().zip(bus32.blocks()) {
        assert_eq!((a.name.as_str(), a.base), (b.name.as_str(), b.base));
    }
    assert_eq!(layout.size, bus32.size);
}

#[test]
fn test_c_header_matches_golden() {
    init_logger();
    let header = generate(
        &device(),
        &Profile::bus32(),
        Format::CHeader,
        &ExportConfig::new(),
    )
    .unwrap();
    assert_eq!(header, GOLDEN_HEADER);
}

#[test]
fn test_accessor_table() {
    let metadata = export(&layout(BUS32), &ExportConfig::new().include_reserved(true));
    let table = &metadata.table;

    let divf = table.field("LWDO_REGS_SYS_PLL_DIVF").unwrap();
    assert_eq!(divf.byte_offset, 0xc);
    assert_eq!(divf.bit_offset, 4);
    assert_eq!(divf.bit_width, 7);
    assert_eq!(divf.bit_mask, 0x7f0);
    assert_eq!(divf.value_mask, 0x7f);
    assert_eq!(divf.word_masks, vec![0x7f0]);
    assert_eq!(divf.byte_width, 4);

    // A field named like its register shares the register's symbol.
    let magic = table.field("LWDO_REGS_SYS_MAGIC").unwrap();
    assert_eq!(magic.name, "magic");
    assert!(table.field("LWDO_REGS_SYS_MAGIC_MAGIC").is_none());
    assert!(table.field("LWDO_REGS_TEST_RW_VAL").is_some());

    let mode = table.field("LWDO_REGS_IO_CLKOUT_MODE").unwrap();
    assert_eq!(mode.bit_mask, 0x8000_0000);

    let blocks: Vec<_> = table.blocks.iter().map(|b| (b.byte_offset, b.byte_size)).collect();
    assert_eq!(blocks.len(), 8);
    assert!(blocks.iter().all(|(_, size)| *size == 0x20));

    // 256 words minus 18 registers
    assert_eq!(table.reserved.len(), 238);
    assert!(metadata.shape.is_exhaustive());
}

#[test]
fn test_bus16_multi_word_fields() {
    let metadata = export(&layout(BUS16), &ExportConfig::new().with_prefix("lwdo"));
    let table = &metadata.table;

    let div_gate = table.field("LWDO_TDC_DIV_GATE").unwrap();
    assert_eq!(div_gate.byte_offset, 0x46);
    assert_eq!(div_gate.words, 2);
    assert_eq!(div_gate.word_bytes, 2);
    assert_eq!(div_gate.byte_width, 4);

    let dac_high = table.field("LWDO_FTUN_VTUNE_SET_DAC_HIGH").unwrap();
    assert_eq!(dac_high.byte_offset, 0x80);
    assert_eq!(dac_high.bit_offset, 8);
    assert_eq!(dac_high.bit_mask, 0xff00);
    assert_eq!(dac_high.word_masks, vec![0xff00, 0x00ff]);
    assert_eq!(div_gate.word_masks, vec![0xffff, 0xffff]);
    assert_eq!(dac_high.words, 2);

    let minor = table.field("LWDO_SYS_VERSION_MINOR").unwrap();
    assert_eq!(minor.byte_offset, 0x6);
    assert_eq!(minor.bit_offset, 0);
    assert_eq!(minor.register_bit_offset, 16);
    assert_eq!(minor.words, 1);

    let cnt = table.register("LWDO_HWTIME_CNT").unwrap();
    assert_eq!((cnt.word_bytes, cnt.words, cnt.byte_width), (4, 1, 4));
}

#[test]
fn test_filter_keeps_struct_shape() {
    let layout = layout(BUS32);
    let config = ExportConfig::new().with_filter(FilterConfig::new().exclude_name("test"));
    let metadata = export(&layout, &config);
    assert!(metadata.table.registers_of("test").next().is_none());
    assert!(metadata.table.field("LWDO_REGS_TEST_RW_VAL").is_none());
    assert!(metadata.shape.blocks().any(|b| b.name == "test"));
    assert_eq!(metadata.shape.size, 0x400);
}

#[test]
fn test_codec_round_trip_through_bus() {
    let layout = layout(BUS16);
    let mut bus = MemoryBus::new(layout.size);

    let tdc = layout.block("tdc").unwrap();
    let div_gate = tdc.register("div_gate").unwrap();
    let split = WordSplit::for_field(div_gate, div_gate.field("div_gate").unwrap());
    split.write(&mut bus, 0x0012_d687).unwrap();
    assert_eq!(bus.read_word(0x46, WordSize::Half).unwrap(), 0xd687);
    assert_eq!(bus.read_word(0x48, WordSize::Half).unwrap(), 0x0012);
    assert_eq!(split.read(&mut bus).unwrap(), 0x0012_d687);

    // Neighbouring fields survive a straddling write.
    let vtune = layout.register("ftun", "vtune_set").unwrap();
    let low = vtune.field("dac_low").unwrap();
    let high = vtune.field("dac_high").unwrap();
    write_field(&mut bus, vtune, low, 0x5a).unwrap();
    write_field(&mut bus, vtune, high, 0xbeef).unwrap();
    assert_eq!(read_field(&mut bus, vtune, low).unwrap(), 0x5a);
    assert_eq!(read_field(&mut bus, vtune, high).unwrap(), 0xbeef);
    assert_eq!(&bus.bytes()[0x80..0x84], &[0x5a, 0xef, 0xbe, 0x00]);

    // The 32-bit override is a single access.
    let cnt = layout.register("hwtime", "cnt").unwrap();
    let split = WordSplit::for_field(cnt, cnt.field("cnt").unwrap());
    assert!(!split.is_multi_word());
    assert_eq!(split.word, WordSize::Word);
}

#[test]
fn test_cpp_output() {
    let metadata = export(&layout(BUS32), &ExportConfig::new());
    let code = CppBitfields::default().emit(&metadata).unwrap();
    assert!(code.starts_with("// WARNING: auto-generated file, do not edit!\n"));
    assert!(code.contains("#ifndef H_LWDO_REGS_HPP__\n"));
    assert!(code.contains("struct LWDO_REGS {\n"));
    assert!(code.contains("  using BF = lwdo::regs::BitfieldDef<RA, RW, BO, BW>;\n"));
    assert!(code.contains("  // SYS_PLL @ 0x000c\n"));
    assert!(code.contains("  static constexpr BF<0x000c, 4, 4, 7> SYS_PLL_DIVF{};\n"));
    assert!(code.contains("  static constexpr BF<0x0000, 4, 0, 32> SYS_MAGIC{};\n"));
    assert!(code.contains("  static constexpr BF<0x03e0, 4, 0, 32> TEST_RW_VAL{};\n"));
    assert!(code.ends_with("#endif  // H_LWDO_REGS_HPP__\n"));

    let code = CppBitfields::default()
        .with_bitfield_class("hal::Bitfield")
        .emit(&metadata)
        .unwrap();
    assert!(code.contains("  using BF = hal::Bitfield<RA, RW, BO, BW>;\n"));
}

#[test]
fn test_tock_output() {
    let metadata = export(&layout(BUS16), &ExportConfig::new());
    let code = TockRegisters::default().emit(&metadata).unwrap();
    assert!(code.contains("pub const LWDO_REGS_TDC_OFFSET: u32 = 0x40;\n"));
    assert!(code.contains("pub const LWDO_REGS_SIZE: usize = 0x400;\n"));
    assert!(code.contains("        pub TdcCon [\n"));
    assert!(code.contains("            GateFinc OFFSET(3) NUMBITS(1) [],\n"));
    assert!(code.contains(
        "            (0x0 => pub magic: [tock_registers::registers::ReadWrite<u16>; 2]),\n"
    ));
    assert!(code.contains(
        "            (0x0 => pub cnt: tock_registers::registers::ReadWrite<u32>),\n"
    ));
    assert!(code.contains("            (0xe => _reserved0),\n"));
    assert!(code.contains("            (0x3e0 => pub test: Test),\n"));
    assert!(code.contains("            (0xe0 => _reserved0),\n"));
    assert!(code.contains("            (0x400 => @END),\n"));
    assert!(!code.contains("pub SysMagic"));

    let code = TockRegisters::default()
        .with_crate_prefix("crate::lwdo::")
        .emit(&metadata)
        .unwrap();
    assert!(code.contains(
        "ReadWrite<u16, crate::lwdo::bits::TdcCon::Register>"
    ));
}

#[test]
fn test_json_output() {
    let json = generate(
        &device(),
        &Profile::bus16(),
        Format::Json,
        &ExportConfig::new(),
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["table"]["profile"], "bus16");
    assert_eq!(value["table"]["word_bytes"], 2);
    assert_eq!(value["shape"]["size"], 0x400);
    assert_eq!(value["shape"]["members"][0]["kind"], "block");
    assert_eq!(value["shape"]["members"][0]["members"][0]["kind"], "register");
}
