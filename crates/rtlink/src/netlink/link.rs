//! Link message types and parsing.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::attr::{AttrIter, get};
use super::error::{Error, Result};

/// Interface info message (struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    /// Address family (usually AF_UNSPEC).
    pub ifi_family: u8,
    /// Padding.
    pub __ifi_pad: u8,
    /// Device type (ARPHRD_*).
    pub ifi_type: u16,
    /// Interface index.
    pub ifi_index: i32,
    /// Device flags (IFF_*).
    pub ifi_flags: u32,
    /// Change mask.
    pub ifi_change: u32,
}

impl IfInfoMsg {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Create a new interface info message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interface index.
    pub fn with_index(mut self, index: i32) -> Self {
        self.ifi_index = index;
        self
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }
}

/// Interface link attribute ids (IFLA_*), the subset this crate touches.
pub mod ifla {
    pub const ADDRESS: u16 = 1;
    pub const BROADCAST: u16 = 2;
    pub const IFNAME: u16 = 3;
    pub const MTU: u16 = 4;
    pub const QDISC: u16 = 6;
    pub const MASTER: u16 = 10;
    pub const TXQLEN: u16 = 13;
    pub const OPERSTATE: u16 = 16;
    /// VRF id slot understood by VRF-patched vendor kernels. Mainline
    /// assigns this number to a netns id attribute instead, so unpatched
    /// kernels reject the request.
    pub const VRF: u16 = 45;
}

/// Interface flags (IFF_*).
pub mod iff {
    pub const UP: u32 = 1 << 0;
    pub const BROADCAST: u32 = 1 << 1;
    pub const DEBUG: u32 = 1 << 2;
    pub const LOOPBACK: u32 = 1 << 3;
    pub const POINTOPOINT: u32 = 1 << 4;
    pub const RUNNING: u32 = 1 << 6;
    pub const NOARP: u32 = 1 << 7;
    pub const PROMISC: u32 = 1 << 8;
    pub const ALLMULTI: u32 = 1 << 9;
    pub const MASTER: u32 = 1 << 10;
    pub const SLAVE: u32 = 1 << 11;
    pub const MULTICAST: u32 = 1 << 12;
    pub const LOWER_UP: u32 = 1 << 16;
    pub const DORMANT: u32 = 1 << 17;

    /// Format a flag word the way iproute2 prints it, e.g.
    /// `BROADCAST,MULTICAST,UP,LOWER_UP`.
    pub fn format(flags: u32) -> String {
        const NAMES: &[(u32, &str)] = &[
            (LOOPBACK, "LOOPBACK"),
            (BROADCAST, "BROADCAST"),
            (POINTOPOINT, "POINTOPOINT"),
            (MULTICAST, "MULTICAST"),
            (NOARP, "NOARP"),
            (ALLMULTI, "ALLMULTI"),
            (PROMISC, "PROMISC"),
            (MASTER, "MASTER"),
            (SLAVE, "SLAVE"),
            (DEBUG, "DEBUG"),
            (DORMANT, "DORMANT"),
            (UP, "UP"),
            (LOWER_UP, "LOWER_UP"),
            (RUNNING, "RUNNING"),
        ];

        let mut out = Vec::new();
        for &(bit, name) in NAMES {
            if flags & bit != 0 {
                out.push(name);
            }
        }
        out.join(",")
    }
}

/// Operational state (IF_OPER_*).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OperState {
    Unknown = 0,
    NotPresent = 1,
    Down = 2,
    LowerLayerDown = 3,
    Testing = 4,
    Dormant = 5,
    Up = 6,
}

impl From<u8> for OperState {
    fn from(val: u8) -> Self {
        match val {
            1 => Self::NotPresent,
            2 => Self::Down,
            3 => Self::LowerLayerDown,
            4 => Self::Testing,
            5 => Self::Dormant,
            6 => Self::Up,
            _ => Self::Unknown,
        }
    }
}

impl OperState {
    /// Get the name of this state.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::NotPresent => "NOT_PRESENT",
            Self::Down => "DOWN",
            Self::LowerLayerDown => "LOWERLAYERDOWN",
            Self::Testing => "TESTING",
            Self::Dormant => "DORMANT",
            Self::Up => "UP",
        }
    }
}

/// A link parsed from an RTM_NEWLINK reply.
#[derive(Debug, Clone, Default)]
pub struct Link {
    /// Fixed-size header.
    pub header: IfInfoMsg,
    /// Interface name (IFLA_IFNAME).
    pub name: Option<String>,
    /// Hardware address (IFLA_ADDRESS).
    pub address: Option<Vec<u8>>,
    /// Broadcast address (IFLA_BROADCAST).
    pub broadcast: Option<Vec<u8>>,
    /// MTU (IFLA_MTU).
    pub mtu: Option<u32>,
    /// Qdisc name (IFLA_QDISC).
    pub qdisc: Option<String>,
    /// Master device index (IFLA_MASTER).
    pub master: Option<u32>,
    /// Transmit queue length (IFLA_TXQLEN).
    pub txqlen: Option<u32>,
    /// Operational state (IFLA_OPERSTATE).
    pub operstate: Option<OperState>,
}

impl Link {
    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifi_index as u32
    }

    /// Get the device flags.
    pub fn flags(&self) -> u32 {
        self.header.ifi_flags
    }

    /// Get the interface name, or a fallback.
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    /// Parse a link from an RTM_NEWLINK payload (ifinfomsg + attributes).
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let (header, attrs) =
            IfInfoMsg::ref_from_prefix(payload).map_err(|_| Error::Truncated {
                expected: IfInfoMsg::SIZE,
                actual: payload.len(),
            })?;

        let mut link = Link {
            header: *header,
            ..Default::default()
        };

        for (kind, value) in AttrIter::new(attrs) {
            match kind {
                ifla::IFNAME => link.name = Some(get::string(value)?.to_string()),
                ifla::ADDRESS => link.address = Some(value.to_vec()),
                ifla::BROADCAST => link.broadcast = Some(value.to_vec()),
                ifla::MTU => link.mtu = Some(get::u32_ne(value)?),
                ifla::QDISC => link.qdisc = Some(get::string(value)?.to_string()),
                ifla::MASTER => link.master = Some(get::u32_ne(value)?),
                ifla::TXQLEN => link.txqlen = Some(get::u32_ne(value)?),
                ifla::OPERSTATE => link.operstate = Some(OperState::from(get::u8(value)?)),
                _ => {}
            }
        }

        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::message::{NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgType};
    use crate::netlink::MessageBuilder;

    fn sample_newlink() -> Vec<u8> {
        let mut builder = MessageBuilder::new(NlMsgType::RTM_NEWLINK, NLM_F_REQUEST);
        let mut ifinfo = IfInfoMsg::new().with_index(2);
        ifinfo.ifi_type = 1; // ARPHRD_ETHER
        ifinfo.ifi_flags = iff::UP | iff::BROADCAST | iff::MULTICAST | iff::LOWER_UP;
        builder.append_bytes(ifinfo.as_bytes());
        builder.append_attr_str(ifla::IFNAME, "eth0");
        builder.append_attr_u32(ifla::MTU, 1500);
        builder.append_attr(ifla::ADDRESS, &[0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22]);
        builder.append_attr_u32(ifla::TXQLEN, 1000);
        builder.append_attr(ifla::OPERSTATE, &[6]);
        builder.finish()
    }

    #[test]
    fn test_parse_newlink_payload() {
        let msg = sample_newlink();
        let link = Link::from_payload(&msg[NLMSG_HDRLEN..]).unwrap();

        assert_eq!(link.ifindex(), 2);
        assert_eq!(link.name_or("?"), "eth0");
        assert_eq!(link.mtu, Some(1500));
        assert_eq!(link.txqlen, Some(1000));
        assert_eq!(
            link.address.as_deref(),
            Some(&[0xaa, 0xbb, 0xcc, 0x00, 0x11, 0x22][..])
        );
        assert_eq!(link.operstate, Some(OperState::Up));
        assert!(link.flags() & iff::UP != 0);
    }

    #[test]
    fn test_parse_rejects_short_payload() {
        assert!(Link::from_payload(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_format_flags() {
        let flags = iff::UP | iff::BROADCAST | iff::MULTICAST | iff::LOWER_UP;
        assert_eq!(iff::format(flags), "BROADCAST,MULTICAST,UP,LOWER_UP");
        assert_eq!(iff::format(0), "");
    }
}
