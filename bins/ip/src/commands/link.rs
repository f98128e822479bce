//! ip link command: attribute mutation over ioctl + netlink, and listing.
//!
//! `link set` keeps iproute2's keyword grammar, so the scan below is a
//! hand-rolled token loop rather than a clap surface: keywords consume
//! their value token in place, `multicast`/`arp` additionally consume a
//! mandatory `on`/`off`, and a bare word is the device name.

use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use rtlink::ioctl::{self, AddressSpec};
use rtlink::netlink::link::{IfInfoMsg, Link, ifla, iff};
use rtlink::netlink::{Connection, MessageBuilder, NlMsgType, ack_request};
use rtlink::util::{ifname, parse};

use super::OutputOptions;

/// One `link set` invocation, accumulated by the token scan.
///
/// `mask` says which flag bits the request touches; `flags` carries the
/// desired value for exactly those bits.
#[derive(Debug, Default, PartialEq)]
struct LinkSetRequest {
    dev: String,
    newname: Option<String>,
    flags: u32,
    mask: u32,
    mtu: Option<u32>,
    txqlen: Option<u32>,
    vrf: Option<u32>,
    addr: Option<String>,
    brd: Option<String>,
}

/// Route a `link` invocation. The returned code becomes the process
/// exit status.
pub async fn run(args: &[String], opts: &OutputOptions) -> Result<i32> {
    match args.first().map(String::as_str) {
        None => {
            show(&[], opts).await?;
            Ok(0)
        }
        Some("set") => {
            let request = parse_set_args(&args[1..])?;
            apply(request).await
        }
        Some("show" | "lst" | "list") => {
            show(&args[1..], opts).await?;
            Ok(0)
        }
        Some(other) => bail!("invalid argument \"{}\" to \"link\"", other),
    }
}

fn next_value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    keyword: &str,
) -> Result<&'a String> {
    iter.next()
        .with_context(|| format!("command line is not complete: \"{}\" requires a value", keyword))
}

/// Scan the `set` token sequence left to right into a request.
///
/// All argument validation happens here, before any kernel call.
fn parse_set_args(args: &[String]) -> Result<LinkSetRequest> {
    let mut req = LinkSetRequest::default();
    let mut dev: Option<String> = None;

    let mut iter = args.iter();
    while let Some(token) = iter.next() {
        match token.as_str() {
            "up" => {
                req.mask |= iff::UP;
                req.flags |= iff::UP;
            }
            "down" => {
                req.mask |= iff::UP;
                req.flags &= !iff::UP;
            }
            "name" => {
                let name = next_value(&mut iter, "name")?;
                ifname::validate(name)?;
                req.newname = Some(name.clone());
            }
            "mtu" => {
                let value = next_value(&mut iter, "mtu")?;
                if req.mtu.is_some() {
                    bail!("duplicate \"mtu\": {}", value);
                }
                req.mtu = Some(parse::parse_u32(value, "mtu")?);
            }
            "qlen" | "txqueuelen" => {
                let value = next_value(&mut iter, "qlen")?;
                if req.txqlen.is_some() {
                    bail!("duplicate \"qlen\": {}", value);
                }
                req.txqlen = Some(parse::parse_u32(value, "qlen")?);
            }
            "vrf" => {
                let value = next_value(&mut iter, "vrf")?;
                if req.vrf.is_some() {
                    bail!("duplicate \"vrf\": {}", value);
                }
                req.vrf = Some(parse::parse_u32(value, "vrf")?);
            }
            "multicast" => {
                req.mask |= iff::MULTICAST;
                match next_value(&mut iter, "multicast")?.as_str() {
                    "on" => req.flags |= iff::MULTICAST,
                    "off" => req.flags &= !iff::MULTICAST,
                    _ => bail!("argument of \"multicast\" must be \"on\" or \"off\""),
                }
            }
            "arp" => {
                // The flag is inverted: IFF_NOARP set means arp off
                req.mask |= iff::NOARP;
                match next_value(&mut iter, "arp")?.as_str() {
                    "on" => req.flags &= !iff::NOARP,
                    "off" => req.flags |= iff::NOARP,
                    _ => bail!("argument of \"arp\" must be \"on\" or \"off\""),
                }
            }
            "addr" => {
                req.addr = Some(next_value(&mut iter, "addr")?.clone());
            }
            "brd" => {
                req.brd = Some(next_value(&mut iter, "brd")?.clone());
            }
            other => {
                let name = if other == "dev" {
                    next_value(&mut iter, "dev")?
                } else {
                    token
                };
                if dev.is_some() {
                    bail!("duplicate \"dev\": {}", name);
                }
                ifname::validate(name)?;
                dev = Some(name.clone());
            }
        }
    }

    req.dev = dev.context("command line is not complete, \"dev\" argument is required")?;
    Ok(req)
}

/// Apply a parsed request in fixed order: address discovery and parsing,
/// rename, queue length, MTU, VRF, broadcast, address, flags.
///
/// Every ioctl failure is fatal and bubbles up as an error; a VRF failure
/// is reported as exit code 2 and skips the steps behind it.
async fn apply(req: LinkSetRequest) -> Result<i32> {
    let mut dev = req.dev;

    // Both addresses are validated against the device before anything
    // is written, so a malformed address never follows a partial apply.
    let mut addr = None;
    let mut brd = None;
    if req.addr.is_some() || req.brd.is_some() {
        let info = ioctl::hardware_info(&dev)?;
        if let Some(text) = &req.addr {
            addr = Some(AddressSpec::parse(text, info)?);
        }
        if let Some(text) = &req.brd {
            brd = Some(AddressSpec::parse(text, info)?);
        }
    }

    if let Some(newname) = &req.newname
        && *newname != dev
    {
        ioctl::change_name(&dev, newname)?;
        dev = newname.clone();
    }

    if let Some(qlen) = req.txqlen {
        ioctl::set_txqlen(&dev, qlen)?;
    }

    if let Some(mtu) = req.mtu {
        ioctl::set_mtu(&dev, mtu)?;
    }

    if let Some(vrf) = req.vrf {
        if let Err(e) = assign_vrf(&dev, vrf).await {
            tracing::warn!(dev = %dev, vrf, error = %e, "vrf assignment failed");
            return Ok(2);
        }
    }

    if let Some(spec) = &brd {
        ioctl::set_hardware_address(&dev, spec, true)?;
    }
    if let Some(spec) = &addr {
        ioctl::set_hardware_address(&dev, spec, false)?;
    }

    if req.mask != 0 {
        ioctl::update_flags(&dev, req.flags, req.mask)?;
    }

    Ok(0)
}

/// Build the RTM_SETLINK request that moves an interface into a VRF.
fn vrf_request(ifindex: i32, vrf: u32) -> MessageBuilder {
    let mut builder = ack_request(NlMsgType::RTM_SETLINK);
    builder.append_bytes(IfInfoMsg::new().with_index(ifindex).as_bytes());
    builder.append_attr_u32(ifla::VRF, vrf);
    builder
}

async fn assign_vrf(dev: &str, vrf: u32) -> rtlink::Result<()> {
    let ifindex = ioctl::ifindex(dev)?;
    let conn = Connection::new()?;
    conn.request_ack(vrf_request(ifindex, vrf)).await
}

async fn show(args: &[String], opts: &OutputOptions) -> Result<()> {
    let filter = match args {
        [] => None,
        [name] => Some(name.as_str()),
        [kw, name] if kw == "dev" => Some(name.as_str()),
        _ => bail!("invalid arguments to \"link show\""),
    };

    let conn = Connection::new()?;
    let links: Vec<Link> = conn
        .get_links()
        .await?
        .into_iter()
        .filter(|link| filter.is_none_or(|name| link.name.as_deref() == Some(name)))
        .collect();

    if let Some(name) = filter
        && links.is_empty()
    {
        bail!("device \"{}\" does not exist", name);
    }

    let mut stdout = io::stdout().lock();

    if opts.json {
        let json: Vec<_> = links.iter().map(link_to_json).collect();
        if opts.pretty {
            serde_json::to_writer_pretty(&mut stdout, &json)?;
        } else {
            serde_json::to_writer(&mut stdout, &json)?;
        }
        writeln!(stdout)?;
    } else {
        for link in &links {
            print_link_text(&mut stdout, link)?;
        }
    }

    Ok(())
}

/// Convert a link to JSON.
fn link_to_json(link: &Link) -> serde_json::Value {
    let mut obj = serde_json::json!({
        "ifindex": link.ifindex(),
        "ifname": link.name_or(""),
        "flags": iff::format(link.flags()),
        "mtu": link.mtu.unwrap_or(0),
        "qdisc": link.qdisc.as_deref().unwrap_or(""),
        "operstate": link.operstate.map(|s| s.name()).unwrap_or("UNKNOWN"),
        "link_type": link_type_name(link.header.ifi_type),
    });

    if let Some(ref addr) = link.address {
        obj["address"] = serde_json::json!(rtlink::util::lladdr::format(addr));
    }
    if let Some(ref brd) = link.broadcast {
        obj["broadcast"] = serde_json::json!(rtlink::util::lladdr::format(brd));
    }
    if let Some(qlen) = link.txqlen {
        obj["txqlen"] = serde_json::json!(qlen);
    }
    if let Some(master) = link.master {
        obj["master"] = serde_json::json!(master);
    }

    obj
}

fn link_type_name(ifi_type: u16) -> &'static str {
    match ifi_type {
        1 => "ether",      // ARPHRD_ETHER
        772 => "loopback", // ARPHRD_LOOPBACK
        776 => "sit",      // ARPHRD_SIT
        778 => "gre",      // ARPHRD_IPGRE
        823 => "ip6gre",   // ARPHRD_IP6GRE
        65534 => "none",   // ARPHRD_NONE
        _ => "unknown",
    }
}

/// Print a link in text format.
fn print_link_text<W: Write>(w: &mut W, link: &Link) -> io::Result<()> {
    let qdisc = link.qdisc.as_deref().unwrap_or("noqueue");
    let operstate = link.operstate.map(|s| s.name()).unwrap_or("UNKNOWN");

    write!(
        w,
        "{}: {}: <{}> mtu {} qdisc {} state {}",
        link.ifindex(),
        link.name_or("?"),
        iff::format(link.flags()),
        link.mtu.unwrap_or(0),
        qdisc,
        operstate
    )?;

    if let Some(qlen) = link.txqlen {
        write!(w, " qlen {}", qlen)?;
    }

    if let Some(master) = link.master {
        match ifname::index_to_name(master) {
            Ok(name) => write!(w, " master {}", name)?,
            Err(_) => write!(w, " master {}", master)?,
        }
    }

    writeln!(w)?;

    write!(w, "    link/{}", link_type_name(link.header.ifi_type))?;
    if let Some(ref addr) = link.address {
        write!(w, " {}", rtlink::util::lladdr::format(addr))?;
    }
    if let Some(ref brd) = link.broadcast {
        write!(w, " brd {}", rtlink::util::lladdr::format(brd))?;
    }
    writeln!(w)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlink::netlink::{NLMSG_HDRLEN, NlMsgHdr};

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_up_and_mtu() {
        let req = parse_set_args(&args(&["eth0", "up", "mtu", "1400"])).unwrap();
        assert_eq!(req.dev, "eth0");
        assert_eq!(req.mask, iff::UP);
        assert_eq!(req.flags, iff::UP);
        assert_eq!(req.mtu, Some(1400));
        assert_eq!(req.vrf, None);
    }

    #[test]
    fn test_parse_down_clears_flag_value() {
        let req = parse_set_args(&args(&["down", "eth0"])).unwrap();
        assert_eq!(req.mask, iff::UP);
        assert_eq!(req.flags & iff::UP, 0);
    }

    #[test]
    fn test_parse_dev_keyword_and_bareword_agree() {
        let with_kw = parse_set_args(&args(&["dev", "eth0", "up"])).unwrap();
        let bare = parse_set_args(&args(&["eth0", "up"])).unwrap();
        assert_eq!(with_kw, bare);
    }

    #[test]
    fn test_parse_rejects_duplicate_device() {
        let err = parse_set_args(&args(&["eth0", "dev", "eth1"])).unwrap_err();
        assert!(err.to_string().contains("duplicate \"dev\""));
    }

    #[test]
    fn test_parse_rejects_duplicate_mtu_and_vrf() {
        let err = parse_set_args(&args(&["eth0", "mtu", "1400", "mtu", "1500"])).unwrap_err();
        assert!(err.to_string().contains("duplicate \"mtu\": 1500"));

        let err = parse_set_args(&args(&["eth0", "vrf", "1", "vrf", "2"])).unwrap_err();
        assert!(err.to_string().contains("duplicate \"vrf\": 2"));
    }

    #[test]
    fn test_parse_requires_device() {
        let err = parse_set_args(&args(&["up", "mtu", "1400"])).unwrap_err();
        assert!(err.to_string().contains("\"dev\""));
    }

    #[test]
    fn test_parse_multicast_takes_on_off() {
        let req = parse_set_args(&args(&["eth0", "multicast", "on"])).unwrap();
        assert_eq!(req.mask, iff::MULTICAST);
        assert_eq!(req.flags, iff::MULTICAST);

        let req = parse_set_args(&args(&["eth0", "multicast", "off"])).unwrap();
        assert_eq!(req.mask, iff::MULTICAST);
        assert_eq!(req.flags, 0);

        let err = parse_set_args(&args(&["eth0", "multicast", "maybe"])).unwrap_err();
        assert!(err.to_string().contains("\"on\" or \"off\""));
    }

    #[test]
    fn test_parse_arp_is_inverted() {
        // arp off sets IFF_NOARP, arp on clears it
        let req = parse_set_args(&args(&["eth0", "arp", "off"])).unwrap();
        assert_eq!(req.mask, iff::NOARP);
        assert_eq!(req.flags, iff::NOARP);

        let req = parse_set_args(&args(&["eth0", "arp", "on"])).unwrap();
        assert_eq!(req.mask, iff::NOARP);
        assert_eq!(req.flags, 0);
    }

    #[test]
    fn test_parse_name_addr_brd_and_qlen() {
        let req = parse_set_args(&args(&[
            "eth0", "name", "lan0", "addr", "00:11:22:33:44:55", "brd",
            "ff:ff:ff:ff:ff:ff", "qlen", "1000",
        ]))
        .unwrap();
        assert_eq!(req.newname.as_deref(), Some("lan0"));
        assert_eq!(req.addr.as_deref(), Some("00:11:22:33:44:55"));
        assert_eq!(req.brd.as_deref(), Some("ff:ff:ff:ff:ff:ff"));
        assert_eq!(req.txqlen, Some(1000));
    }

    #[test]
    fn test_parse_rejects_trailing_keyword() {
        let err = parse_set_args(&args(&["eth0", "mtu"])).unwrap_err();
        assert!(err.to_string().contains("requires a value"));
    }

    #[test]
    fn test_vrf_request_layout() {
        use rtlink::netlink::attr::NLA_HDRLEN;
        use rtlink::netlink::message::{NLM_F_ACK, NLM_F_REQUEST};

        let msg = vrf_request(7, 10).finish();
        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_type, NlMsgType::RTM_SETLINK);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(header.nlmsg_len as usize, msg.len());

        // ifinfomsg: AF_UNSPEC family, our index
        let payload = &msg[NLMSG_HDRLEN..];
        assert_eq!(payload[0], 0);
        assert_eq!(
            i32::from_ne_bytes(payload[4..8].try_into().unwrap()),
            7
        );

        // one 4-byte attribute carrying the vrf id
        let attr = &payload[IfInfoMsg::SIZE..];
        assert_eq!(
            u16::from_ne_bytes(attr[0..2].try_into().unwrap()) as usize,
            NLA_HDRLEN + 4
        );
        assert_eq!(u16::from_ne_bytes(attr[2..4].try_into().unwrap()), ifla::VRF);
        assert_eq!(
            u32::from_ne_bytes(attr[4..8].try_into().unwrap()),
            10
        );
        assert_eq!(attr.len(), NLA_HDRLEN + 4);
    }
}
