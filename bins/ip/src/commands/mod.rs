//! Command implementations.

pub mod link;

/// Listing output options shared by commands.
pub struct OutputOptions {
    /// Emit JSON instead of text.
    pub json: bool,
    /// Pretty print JSON.
    pub pretty: bool,
}
