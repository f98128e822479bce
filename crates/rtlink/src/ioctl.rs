//! Legacy SIOC* interface configuration.
//!
//! Everything here runs over a short-lived control socket: a datagram
//! socket opened immediately before the request and closed right after.
//! The socket's address family is irrelevant to the requests it carries,
//! so [`ControlSocket::open`] walks a family fallback list to stay usable
//! on kernels built without IPv4 or IPv6.

use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use crate::netlink::{Error, Result};
use crate::util::lladdr;

/// Maximum interface name length (including null terminator).
pub const IFNAMSIZ: usize = libc::IFNAMSIZ;

// Request numbers from linux/sockios.h. libc does not export the whole
// set (SIOCSIFNAME, SIOCSIFHWBROADCAST), so all of them are pinned here.
const SIOCGIFFLAGS: libc::c_ulong = 0x8913;
const SIOCSIFFLAGS: libc::c_ulong = 0x8914;
const SIOCSIFMTU: libc::c_ulong = 0x8922;
const SIOCSIFNAME: libc::c_ulong = 0x8923;
const SIOCSIFHWADDR: libc::c_ulong = 0x8924;
const SIOCGIFINDEX: libc::c_ulong = 0x8933;
const SIOCSIFHWBROADCAST: libc::c_ulong = 0x8937;
const SIOCSIFTXQLEN: libc::c_ulong = 0x8943;

/// Mirror of struct ifreq.
///
/// The libc crate's ifreq union omits the ivalue slot the txqlen request
/// reads, so the kernel layout is pinned here and size-checked in tests.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IfReq {
    name: [u8; IFNAMSIZ],
    data: IfReqData,
}

#[repr(C)]
#[derive(Clone, Copy)]
union IfReqData {
    addr: libc::sockaddr,
    flags: libc::c_short,
    ivalue: libc::c_int,
    ifindex: libc::c_int,
    mtu: libc::c_int,
    newname: [u8; IFNAMSIZ],
}

impl IfReq {
    /// Create a zeroed request targeting `dev`.
    pub fn new(dev: &str) -> Result<Self> {
        let mut ifr: Self = unsafe { mem::zeroed() };
        copy_name(&mut ifr.name, dev)?;
        Ok(ifr)
    }

    fn flags(&self) -> u32 {
        // i16 -> u16 first so the high half is not sign-extended
        unsafe { self.data.flags as u16 as u32 }
    }

    fn set_flags(&mut self, flags: u32) {
        self.data.flags = flags as libc::c_short;
    }

    fn ifindex(&self) -> i32 {
        unsafe { self.data.ifindex }
    }

    fn set_mtu(&mut self, mtu: u32) {
        self.data.mtu = mtu as libc::c_int;
    }

    fn set_ivalue(&mut self, value: u32) {
        self.data.ivalue = value as libc::c_int;
    }

    fn set_newname(&mut self, name: &str) -> Result<()> {
        let mut buf = [0u8; IFNAMSIZ];
        copy_name(&mut buf, name)?;
        self.data.newname = buf;
        Ok(())
    }

    fn set_hwaddr(&mut self, family: u16, bytes: &[u8]) {
        let mut sa: libc::sockaddr = unsafe { mem::zeroed() };
        sa.sa_family = family;
        for (dst, src) in sa.sa_data.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }
        self.data.addr = sa;
    }
}

/// Copy a device name into a fixed-size, null-terminated name field.
fn copy_name(buf: &mut [u8; IFNAMSIZ], name: &str) -> Result<()> {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() >= IFNAMSIZ {
        return Err(Error::InvalidMessage(format!(
            "invalid interface name: {:?}",
            name
        )));
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

/// Datagram socket used only to carry SIOC* requests.
pub struct ControlSocket {
    fd: OwnedFd,
}

impl ControlSocket {
    /// Open a control socket, trying AF_INET, then AF_PACKET, then
    /// AF_INET6. Interface requests work on any of them; the fallback
    /// keeps the tool usable on kernels with a family compiled out.
    pub fn open() -> Result<Self> {
        for family in [libc::AF_INET, libc::AF_PACKET, libc::AF_INET6] {
            let fd = unsafe { libc::socket(family, libc::SOCK_DGRAM, 0) };
            if fd >= 0 {
                return Ok(Self {
                    fd: unsafe { OwnedFd::from_raw_fd(fd) },
                });
            }
        }
        Err(Error::last_ioctl("socket"))
    }

    fn ioctl(&self, name: &'static str, request: libc::c_ulong, ifr: &mut IfReq) -> Result<()> {
        ioctl_on(self.fd.as_raw_fd(), name, request, ifr)
    }
}

fn ioctl_on(
    fd: libc::c_int,
    name: &'static str,
    request: libc::c_ulong,
    ifr: &mut IfReq,
) -> Result<()> {
    let ret = unsafe { libc::ioctl(fd, request, ifr as *mut IfReq) };
    if ret < 0 {
        return Err(Error::last_ioctl(name));
    }
    Ok(())
}

/// Compute the flag word to write back, or None when the masked diff is
/// already satisfied. Untouched bits keep their current value.
fn merge_flags(current: u32, flags: u32, mask: u32) -> Option<u32> {
    if (current ^ flags) & mask == 0 {
        return None;
    }
    Some((current & !mask) | (flags & mask))
}

/// Read the device's flag word and rewrite the masked bits.
///
/// Re-applying an already-applied state is a read-only no-op.
pub fn update_flags(dev: &str, flags: u32, mask: u32) -> Result<()> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    sock.ioctl("SIOCGIFFLAGS", SIOCGIFFLAGS, &mut ifr)?;

    if let Some(merged) = merge_flags(ifr.flags(), flags, mask) {
        ifr.set_flags(merged);
        sock.ioctl("SIOCSIFFLAGS", SIOCSIFFLAGS, &mut ifr)?;
        tracing::debug!(dev, flags = merged, "flags updated");
    }
    Ok(())
}

/// Rename a device.
pub fn change_name(dev: &str, newname: &str) -> Result<()> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    ifr.set_newname(newname)?;
    sock.ioctl("SIOCSIFNAME", SIOCSIFNAME, &mut ifr)?;
    tracing::debug!(dev, newname, "renamed");
    Ok(())
}

/// Set the device MTU. The value is handed to the kernel unchecked; it
/// is the authority on the valid range.
pub fn set_mtu(dev: &str, mtu: u32) -> Result<()> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    ifr.set_mtu(mtu);
    sock.ioctl("SIOCSIFMTU", SIOCSIFMTU, &mut ifr)?;
    tracing::debug!(dev, mtu, "mtu set");
    Ok(())
}

/// Set the transmit queue length.
pub fn set_txqlen(dev: &str, qlen: u32) -> Result<()> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    ifr.set_ivalue(qlen);
    sock.ioctl("SIOCSIFTXQLEN", SIOCSIFTXQLEN, &mut ifr)?;
    tracing::debug!(dev, qlen, "txqlen set");
    Ok(())
}

/// Resolve a device name to its kernel interface index.
pub fn ifindex(dev: &str) -> Result<i32> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    sock.ioctl("SIOCGIFINDEX", SIOCGIFINDEX, &mut ifr)?;
    Ok(ifr.ifindex())
}

/// Hardware address type and byte length a device expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareInfo {
    /// ARPHRD_* type code.
    pub hatype: u16,
    /// Address length in bytes.
    pub halen: usize,
}

/// Learn a device's hardware address type and length.
///
/// There is no request that answers this directly. Binding a packet
/// socket to the device with a loopback protocol and reading the bound
/// address back is the portable way to make the kernel say.
pub fn hardware_info(dev: &str) -> Result<HardwareInfo> {
    let fd = unsafe { libc::socket(libc::AF_PACKET, libc::SOCK_DGRAM, 0) };
    if fd < 0 {
        return Err(Error::last_ioctl("socket(AF_PACKET)"));
    }
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };

    let mut ifr = IfReq::new(dev)?;
    ioctl_on(fd.as_raw_fd(), "SIOCGIFINDEX", SIOCGIFINDEX, &mut ifr)?;

    let mut me: libc::sockaddr_ll = unsafe { mem::zeroed() };
    me.sll_family = libc::AF_PACKET as u16;
    me.sll_ifindex = ifr.ifindex();
    me.sll_protocol = (libc::ETH_P_LOOP as u16).to_be();

    let ret = unsafe {
        libc::bind(
            fd.as_raw_fd(),
            &me as *const libc::sockaddr_ll as *const libc::sockaddr,
            mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t,
        )
    };
    if ret < 0 {
        return Err(Error::last_ioctl("bind"));
    }

    let mut alen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;
    let ret = unsafe {
        libc::getsockname(
            fd.as_raw_fd(),
            &mut me as *mut libc::sockaddr_ll as *mut libc::sockaddr,
            &mut alen,
        )
    };
    if ret < 0 {
        return Err(Error::last_ioctl("getsockname"));
    }

    Ok(HardwareInfo {
        hatype: me.sll_hatype,
        halen: me.sll_halen as usize,
    })
}

/// A hardware address validated against the type and length the target
/// device reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSpec {
    /// ARPHRD_* family from discovery.
    pub family: u16,
    /// Raw address bytes, exactly `halen` of them.
    pub bytes: Vec<u8>,
}

impl AddressSpec {
    /// Parse a textual link-layer address and check it against the
    /// device's discovered address length.
    pub fn parse(text: &str, info: HardwareInfo) -> Result<Self> {
        let bytes = lladdr::parse(text).map_err(|e| Error::InvalidMessage(e.to_string()))?;
        if bytes.len() != info.halen {
            return Err(Error::InvalidMessage(format!(
                "wrong address ({}) length: expected {} bytes",
                text, info.halen
            )));
        }
        Ok(Self {
            family: info.hatype,
            bytes,
        })
    }
}

/// Write a device's hardware or broadcast hardware address.
pub fn set_hardware_address(dev: &str, addr: &AddressSpec, broadcast: bool) -> Result<()> {
    let sock = ControlSocket::open()?;
    let mut ifr = IfReq::new(dev)?;
    ifr.set_hwaddr(addr.family, &addr.bytes);
    if broadcast {
        sock.ioctl("SIOCSIFHWBROADCAST", SIOCSIFHWBROADCAST, &mut ifr)?;
    } else {
        sock.ioctl("SIOCSIFHWADDR", SIOCSIFHWADDR, &mut ifr)?;
    }
    tracing::debug!(dev, broadcast, "hardware address set");
    Ok(())
}
