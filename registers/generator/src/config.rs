// Licensed under the Apache-2.0 license

//! Configuration of the accessor metadata export.
//!
//! [`ExportConfig`] controls how symbols are named and whether reserved
//! padding is listed in the accessor table. [`FilterConfig`] limits which
//! blocks and registers end up in the table; the struct shape is never
//! filtered, it always covers the whole device.

/// Configuration for the accessor metadata exporter.
///
/// # Example
///
/// ```
/// use lwdo_registers_generator::config::{ExportConfig, FilterConfig};
///
/// let config = ExportConfig::new()
///     .with_prefix("lwdo")
///     .include_reserved(true)
///     .with_filter(FilterConfig::new().exclude_name("test"));
/// assert_eq!(config.symbol_prefix("lwdo_regs"), "LWDO");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ExportConfig {
    /// Prefix of every exported symbol. Defaults to the device name.
    pub prefix: Option<String>,

    /// List reserved padding units in the accessor table.
    pub include_reserved: bool,

    /// Which blocks and registers are exported in the accessor table.
    pub filter: FilterConfig,
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `prefix` instead of the device name for symbols.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn include_reserved(mut self, include: bool) -> Self {
        self.include_reserved = include;
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Upper-case symbol prefix for a device.
    pub fn symbol_prefix(&self, device: &str) -> String {
        crate::util::upper_snake_case(self.prefix.as_deref().unwrap_or(device))
    }
}

/// Configuration for filtering which registers and blocks are exported.
///
/// Names are matched case-insensitively against either a block name
/// (`"test"`) or a qualified register name (`"tdc.div_gate"`). Offsets are
/// absolute byte offsets.
///
/// # Example
///
/// ```
/// use lwdo_registers_generator::config::FilterConfig;
///
/// let config = FilterConfig::new()
///     .include_offset_range(0x0, 0xff)
///     .exclude_name("sys.magic");
/// assert!(config.should_include(0x4, "sys.version"));
/// assert!(!config.should_include(0x0, "sys.magic"));
/// assert!(!config.should_include(0x3e0, "test.rw"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterConfig {
    /// Only include entries whose offsets fall within these ranges (inclusive).
    /// If empty, all offsets are included (subject to exclude_offset_ranges).
    pub include_offset_ranges: Vec<(u32, u32)>,

    /// Exclude entries whose offsets fall within these ranges (inclusive).
    pub exclude_offset_ranges: Vec<(u32, u32)>,

    /// Excluded block or qualified register names, lower case.
    pub exclude_names: Vec<String>,
}

impl FilterConfig {
    /// Create a new FilterConfig with no filtering (everything included).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_offset_range(mut self, start: u32, end: u32) -> Self {
        self.include_offset_ranges.push((start, end));
        self
    }

    pub fn exclude_offset_range(mut self, start: u32, end: u32) -> Self {
        self.exclude_offset_ranges.push((start, end));
        self
    }

    pub fn exclude_name(mut self, name: &str) -> Self {
        self.exclude_names.push(name.to_lowercase());
        self
    }

    /// Returns true if this filter has no constraints (everything passes).
    pub fn is_empty(&self) -> bool {
        self.include_offset_ranges.is_empty()
            && self.exclude_offset_ranges.is_empty()
            && self.exclude_names.is_empty()
    }

    /// Whether an entry at `offset` named `name` is exported.
    ///
    /// A qualified name `block.register` is also excluded when its block is.
    pub fn should_include(&self, offset: u32, name: &str) -> bool {
        let name = name.to_lowercase();
        let block = name.split('.').next().unwrap_or_default();
        if self
            .exclude_names
            .iter()
            .any(|n| *n == name || *n == block)
        {
            return false;
        }

        let within = |ranges: &[(u32, u32)]| {
            ranges
                .iter()
                .any(|(start, end)| offset >= *start && offset <= *end)
        };

        if within(&self.exclude_offset_ranges) {
            return false;
        }

        self.include_offset_ranges.is_empty() || within(&self.include_offset_ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_prefix() {
        assert_eq!(ExportConfig::new().symbol_prefix("lwdo_regs"), "LWDO_REGS");
        assert_eq!(
            ExportConfig::new().with_prefix("Lwdo").symbol_prefix("lwdo_regs"),
            "LWDO"
        );
    }

    #[test]
    fn test_filter_config_empty() {
        let config = FilterConfig::new();
        assert!(config.is_empty());
        assert!(config.should_include(0x0, "sys"));
        assert!(config.should_include(0xffff_ffff, "test.rw"));
    }

    #[test]
    fn test_filter_config_offset_ranges() {
        let config = FilterConfig::new()
            .include_offset_range(0x40, 0x5f)
            .exclude_offset_range(0x48, 0x4b);
        assert!(!config.should_include(0x3c, "hwtime.cnt"));
        assert!(config.should_include(0x40, "tdc.con"));
        assert!(!config.should_include(0x48, "tdc.div_gate"));
        assert!(config.should_include(0x4c, "tdc.div_meas"));
        assert!(!config.should_include(0x60, "adc.con"));
    }

    #[test]
    fn test_filter_config_exclude_name() {
        let config = FilterConfig::new()
            .exclude_name("TEST")
            .exclude_name("sys.magic");
        assert!(!config.should_include(0x3e0, "test"));
        assert!(!config.should_include(0x3e0, "test.rw"));
        assert!(!config.should_include(0x0, "SYS.MAGIC"));
        assert!(config.should_include(0x4, "sys.version"));
        assert!(config.should_include(0x0, "sys"));
    }
}
