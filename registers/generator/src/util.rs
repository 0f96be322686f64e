// Licensed under the Apache-2.0 license

//! Name conversion and number formatting for the back ends.

/// Converts a name to snake_case.
///
/// - Leading digits get underscore prefix
/// - Punctuation and whitespace become underscores
/// - CamelCase transitions get underscore separators
///
/// # Examples
/// ```
/// use lwdo_registers_generator::util::snake_case;
/// assert_eq!(snake_case("SampleRateDiv"), "sample_rate_div");
/// assert_eq!(snake_case("tdc.div-gate"), "tdc_div_gate");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut result = String::new();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        result.push('_');
    }
    let mut prev = None;
    for c in name.chars() {
        if c.is_ascii_whitespace() || c.is_ascii_punctuation() {
            if prev != Some('_') {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(prev) = prev {
            if (prev.is_ascii_lowercase() || prev.is_ascii_digit()) && c.is_ascii_uppercase() {
                result.push('_');
            }
        }
        prev = Some(c);
        result.push(c.to_ascii_lowercase());
    }
    result.trim_end_matches('_').to_string()
}

/// Converts a name to UPPER_SNAKE_CASE, as used by C preprocessor symbols.
pub fn upper_snake_case(name: &str) -> String {
    snake_case(name).to_ascii_uppercase()
}

/// Converts a name to CamelCase, escaping Rust keywords.
///
/// # Examples
/// ```
/// use lwdo_registers_generator::util::camel_case;
/// assert_eq!(camel_case("sys_pll"), "SysPll");
/// assert_eq!(camel_case("TDC_CON"), "TdcCon");
/// ```
pub fn camel_case(name: &str) -> String {
    let mut result = String::new();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        result.push('_');
    }
    let mut upper_next = true;
    for c in name.chars() {
        if c.is_ascii_punctuation() || c.is_ascii_whitespace() {
            upper_next = true;
        } else {
            result.push(if upper_next {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            });
            upper_next = false;
        }
    }
    tweak_keywords(&result).to_string()
}

/// snake_case identifier safe to use as a Rust field name.
pub fn rust_ident(name: &str) -> String {
    tweak_keywords(&snake_case(name)).to_string()
}

/// Appends underscore suffix to Rust keywords to avoid conflicts.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "as" => "as_",
        "break" => "break_",
        "const" => "const_",
        "continue" => "continue_",
        "crate" => "crate_",
        "else" => "else_",
        "enum" => "enum_",
        "fn" => "fn_",
        "for" => "for_",
        "if" => "if_",
        "impl" => "impl_",
        "in" => "in_",
        "let" => "let_",
        "loop" => "loop_",
        "match" => "match_",
        "mod" => "mod_",
        "move" => "move_",
        "mut" => "mut_",
        "pub" => "pub_",
        "ref" => "ref_",
        "return" => "return_",
        "self" => "self_",
        "Self" => "Self_",
        "static" => "static_",
        "struct" => "struct_",
        "super" => "super_",
        "trait" => "trait_",
        "type" => "type_",
        "unsafe" => "unsafe_",
        "use" => "use_",
        "where" => "where_",
        "while" => "while_",
        "async" => "async_",
        "await" => "await_",
        "dyn" => "dyn_",
        s => s,
    }
}

/// Formats an integer as a hex constant with underscores for readability.
///
/// Values <= 9 are formatted as decimal; larger values use hex with
/// underscore separators every 4 digits.
///
/// # Examples
/// ```
/// use lwdo_registers_generator::util::hex_const;
/// assert_eq!(hex_const(5), "5");
/// assert_eq!(hex_const(0x3e0), "0x3e0");
/// assert_eq!(hex_const(0xffff_ffff), "0xffff_ffff");
/// ```
pub fn hex_const(val: u64) -> String {
    if val > 9 {
        let mut x = String::new();
        for (i, c) in format!("{val:x}").chars().rev().enumerate() {
            if i % 4 == 0 && i != 0 {
                x.push('_');
            }
            x.push(c);
        }
        "0x".to_string() + &x.chars().rev().collect::<String>()
    } else {
        format!("{val}")
    }
}
