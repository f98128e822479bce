//! Minimal RTNetlink implementation.
//!
//! Speaks just enough of the route protocol for link configuration:
//! building `RTM_SETLINK` requests, exchanging them for an acknowledgement,
//! and dumping `RTM_GETLINK` replies for listing.
//!
//! # Quick Start
//!
//! ```ignore
//! use rtlink::netlink::{Connection, NlMsgType, ack_request};
//!
//! let conn = Connection::new()?;
//! let mut builder = ack_request(NlMsgType::RTM_SETLINK);
//! // ... append ifinfomsg + attributes ...
//! conn.request_ack(builder).await?;
//! ```

pub mod attr;
mod builder;
pub mod connection;
mod error;
pub mod link;
pub mod message;
mod socket;

pub use attr::{AttrIter, NlAttr};
pub use builder::MessageBuilder;
pub use connection::{Connection, ack_request, dump_request};
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::NetlinkSocket;
