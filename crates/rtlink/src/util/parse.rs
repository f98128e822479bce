//! Token parsing helpers shared by command front ends.

/// Error produced when a keyword's value token does not parse.
#[derive(Debug, thiserror::Error)]
#[error("invalid \"{keyword}\" value: {value}")]
pub struct InvalidValue {
    /// The keyword whose argument was rejected.
    pub keyword: &'static str,
    /// The offending token.
    pub value: String,
}

/// Parse a non-negative integer token, accepting decimal or 0x-hex.
pub fn parse_u32(value: &str, keyword: &'static str) -> Result<u32, InvalidValue> {
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        value.parse()
    };

    parsed.map_err(|_| InvalidValue {
        keyword,
        value: value.to_string(),
    })
}
