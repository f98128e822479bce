//! High-level netlink connection with request/response handling.

use super::builder::MessageBuilder;
use super::error::{Error, Result};
use super::link::{IfInfoMsg, Link};
use super::message::{
    MessageIter, NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgError, NlMsgHdr,
    NlMsgType,
};
use super::socket::NetlinkSocket;

/// High-level NETLINK_ROUTE connection.
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    /// Create a new route connection.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::route()?,
        })
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    /// Send a request that expects an ACK only (no data response).
    pub async fn request_ack(&self, mut builder: MessageBuilder) -> Result<()> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());

        let msg = builder.finish();
        tracing::debug!(seq, len = msg.len(), "sending netlink request");
        self.socket.send(&msg).await?;

        // Receive ACK
        let response = self.socket.recv_msg().await?;
        self.process_ack(&response, seq)?;

        Ok(())
    }

    /// Send a dump request and collect all responses.
    pub async fn dump(&self, mut builder: MessageBuilder) -> Result<Vec<Vec<u8>>> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());

        let msg = builder.finish();
        self.socket.send(&msg).await?;

        let mut responses = Vec::new();

        loop {
            let data = self.socket.recv_msg().await?;
            let mut done = false;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                // Check sequence number
                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                }

                if header.is_done() {
                    done = true;
                    break;
                }

                // Collect the full message (header + payload)
                let msg_len = header.nlmsg_len as usize;
                let msg_start = payload.as_ptr() as usize - data.as_ptr() as usize - NLMSG_HDRLEN;
                if msg_start + msg_len <= data.len() {
                    responses.push(data[msg_start..msg_start + msg_len].to_vec());
                }
            }

            if done {
                break;
            }
        }

        Ok(responses)
    }

    /// Process an ACK response.
    fn process_ack(&self, data: &[u8], expected_seq: u32) -> Result<()> {
        for result in MessageIter::new(data) {
            let (header, payload) = result?;

            if header.nlmsg_seq != expected_seq {
                continue;
            }

            if header.is_error() {
                let err = NlMsgError::from_bytes(payload)?;
                if !err.is_ack() {
                    return Err(Error::from_errno(err.error));
                }
                return Ok(());
            }
        }

        Err(Error::InvalidMessage("expected ACK message".into()))
    }

    /// Get all network interfaces.
    pub async fn get_links(&self) -> Result<Vec<Link>> {
        let mut builder = dump_request(NlMsgType::RTM_GETLINK);
        builder.append_bytes(IfInfoMsg::new().as_bytes());

        let responses = self.dump(builder).await?;

        let mut links = Vec::with_capacity(responses.len());
        for response in responses {
            if response.len() < NLMSG_HDRLEN {
                continue;
            }
            let header = NlMsgHdr::from_bytes(&response)?;
            if header.nlmsg_type != NlMsgType::RTM_NEWLINK {
                continue;
            }
            links.push(Link::from_payload(&response[NLMSG_HDRLEN..])?);
        }

        Ok(links)
    }
}

/// Helper to build a dump request.
pub fn dump_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_DUMP)
}

/// Helper to build a request expecting ACK.
pub fn ack_request(msg_type: u16) -> MessageBuilder {
    MessageBuilder::new(msg_type, NLM_F_REQUEST | NLM_F_ACK)
}
