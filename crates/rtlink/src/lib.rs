//! Netlink and ioctl plumbing for Linux link configuration.
//!
//! This crate provides the two kernel interfaces a link-configuration tool
//! needs: a minimal RTNetlink transport (socket, message codec, synchronous
//! request/acknowledgement exchange) and the legacy `SIOC*` ioctl surface
//! (flags, MTU, queue length, rename, hardware addresses) carried over a
//! short-lived control socket.
//!
//! # Example
//!
//! ```ignore
//! use rtlink::Connection;
//!
//! #[tokio::main]
//! async fn main() -> rtlink::Result<()> {
//!     let conn = Connection::new()?;
//!     for link in conn.get_links().await? {
//!         println!("{}: {}", link.ifindex(), link.name_or("?"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod ioctl;
pub mod netlink;
pub mod util;

// Re-export common types at crate root for convenience
pub use netlink::{Connection, Error, Result};
