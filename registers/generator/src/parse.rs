// Licensed under the Apache-2.0 license

//! Loading device descriptions and profiles from TOML.
//!
//! A description file looks like:
//!
//! ```toml
//! name = "lwdo_regs"
//!
//! [[blocks]]
//! name = "sys"
//! base = 0x0
//! stride = 0x20
//!
//! [[blocks.registers]]
//! name = "con"
//! fields = [{ name = "sys_rst", offset = 0, width = 1 }]
//! ```
//!
//! and a profile file like:
//!
//! ```toml
//! name = "bus16"
//! word = 2
//! align = "device"
//!
//! [overrides]
//! "hwtime.cnt" = 4
//! ```

use crate::profile::Profile;
use crate::types::DeviceSpec;
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// Parse a device description.
pub fn device_from_str(s: &str) -> Result<DeviceSpec> {
    toml::from_str(s).context("invalid device description")
}

/// Load a device description from a TOML file.
pub fn load_device(path: &Path) -> Result<DeviceSpec> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let device = device_from_str(&text).with_context(|| format!("in {}", path.display()))?;
    debug!(
        "loaded device {} ({} blocks) from {}",
        device.name,
        device.blocks.len(),
        path.display()
    );
    Ok(device)
}

/// Parse a bus-width profile.
pub fn profile_from_str(s: &str) -> Result<Profile> {
    toml::from_str(s).context("invalid profile")
}

/// Load a bus-width profile from a TOML file.
pub fn load_profile(path: &Path) -> Result<Profile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    profile_from_str(&text).with_context(|| format!("in {}", path.display()))
}

/// Resolve a profile argument: a built-in profile name or a TOML file.
pub fn resolve_profile(arg: &str) -> Result<Profile> {
    if let Some(profile) = Profile::builtin(arg) {
        debug!("using built-in profile {arg}");
        return Ok(profile);
    }
    load_profile(Path::new(arg))
        .with_context(|| format!("{arg:?} is neither a built-in profile nor a profile file"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{AlignmentOrigin, WordSize};

    #[test]
    fn test_device_from_str() {
        let device = device_from_str(
            r#"
            name = "dev"

            [[blocks]]
            name = "sys"
            base = 0x0
            stride = 0x20

            [[blocks.registers]]
            name = "pll"
            desc = "PLL configuration"
            fields = [
                { name = "divr", offset = 0, width = 4 },
                { name = "divf", offset = 4, width = 7 },
            ]
            "#,
        )
        .unwrap();
        assert_eq!(device.name, "dev");
        let sys = device.find_block("sys").unwrap();
        assert_eq!(sys.stride, 0x20);
        assert_eq!(sys.registers[0].fields[1].bit_offset, 4);
        assert_eq!(sys.registers[0].desc.as_deref(), Some("PLL configuration"));
    }

    #[test]
    fn test_device_rejects_unknown_keys() {
        let err = device_from_str(
            r#"
            name = "dev"
            [[blocks]]
            name = "sys"
            base = 0
            stride = 0x20
            size = 4
            "#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_profile_from_str() {
        let profile = profile_from_str(
            r#"
            name = "bus16"
            word = 2

            [overrides]
            "hwtime.cnt" = 4
            "#,
        )
        .unwrap();
        assert_eq!(profile, Profile::bus16());
        assert_eq!(profile.align, AlignmentOrigin::Device);

        let profile = profile_from_str("name = \"b\"\nword = 4\nalign = \"block\"\n").unwrap();
        assert_eq!(profile.word, WordSize::Word);
        assert_eq!(profile.align, AlignmentOrigin::Block);

        assert!(profile_from_str("name = \"b\"\nword = 8\n").is_err());
    }

    #[test]
    fn test_resolve_builtin_profile() {
        assert_eq!(resolve_profile("bus32").unwrap(), Profile::bus32());
        assert!(resolve_profile("no/such/profile.toml").is_err());
    }
}
