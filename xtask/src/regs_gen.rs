// Licensed under the Apache-2.0 license

//! Register map generation and checks.

use anyhow::{bail, Context, Result};
use lwdo_registers_generator::parse::{load_device, resolve_profile};
use lwdo_registers_generator::{
    compile, export, generate as generate_code, generate_from_file, ExportConfig, FilterConfig,
};
use std::path::Path;

pub use lwdo_registers_generator::Format;

/// Generate accessors from a device description for one profile.
pub fn generate(
    desc: &Path,
    profile: &str,
    format: Format,
    prefix: Option<&str>,
    reserved: bool,
    exclude: &[String],
    output: Option<&Path>,
) -> Result<()> {
    println!("Generating registers from: {}", desc.display());
    let profile = resolve_profile(profile)?;
    println!("Profile: {} ({} native word), format: {format}", profile.name, profile.word);

    let mut filter = FilterConfig::new();
    for name in exclude {
        filter = filter.exclude_name(name);
    }
    let mut config = ExportConfig::new()
        .include_reserved(reserved)
        .with_filter(filter);
    if let Some(prefix) = prefix {
        config = config.with_prefix(prefix);
    }

    let code = generate_from_file(desc, &profile, format, &config)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, &code)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        println!("Output written to: {}", output_path.display());
    } else {
        println!("\n--- Generated Code ---\n");
        print!("{}", code);
    }

    Ok(())
}

/// Compile a description for every profile and compare the C header of the
/// first profile with the checked-in one.
pub fn check(desc: &Path, profiles: &[String], header: &Path) -> Result<()> {
    let device = load_device(desc)?;
    let mut first = None;

    for name in profiles {
        let profile = resolve_profile(name)?;
        let layout = compile(&device, &profile)
            .with_context(|| format!("{} ({})", desc.display(), profile.name))?;
        let metadata = export(&layout, &ExportConfig::new());
        println!(
            "{}: {} blocks, {} registers, {} fields, 0x{:x} bytes",
            profile.name,
            metadata.table.blocks.len(),
            metadata.table.registers.len(),
            metadata.table.fields.len(),
            layout.size
        );
        if first.is_none() {
            first = Some(profile);
        }
    }

    let Some(profile) = first else {
        bail!("no profile to check");
    };
    let expected = generate_code(&device, &profile, Format::CHeader, &ExportConfig::new())?;
    let actual = std::fs::read_to_string(header)
        .with_context(|| format!("failed to read {}", header.display()))?;
    if actual != expected {
        bail!(
            "{} is out of date, regenerate it with: cargo xtask regs-gen --profile {} --output {}",
            header.display(),
            profile.name,
            header.display()
        );
    }
    println!("{} is up to date", header.display());
    Ok(())
}
