//! UDP 覆盖网络
//!
//! 报文直接作为 UDP 数据报发往首跳；收到的数据报前面补上发送方地址，
//! 组成与 dispatcher 相同的帧格式。

use std::net::{ToSocketAddrs, UdpSocket};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, trace};

use super::{OverlayError, OverlaySend, encode_frame};
use crate::addr::FirstHop;

const MAX_DATAGRAM: usize = 65_535;

pub struct UdpOverlay {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpOverlay {
    /// 绑定本地 UDP 地址
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, OverlayError> {
        let socket = UdpSocket::bind(addr)?;
        debug!(local = ?socket.local_addr().ok(), "UDP 覆盖网络已绑定");
        Ok(Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
        })
    }

    /// 本端的首跳地址，对端回复时以此为目标
    pub fn local_addr(&self) -> Result<FirstHop, OverlayError> {
        Ok(FirstHop(self.socket.local_addr()?))
    }

    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<(), OverlayError> {
        Ok(self.socket.set_read_timeout(timeout)?)
    }

    /// 接收一个数据报，返回带发送方首跳前缀的帧。
    pub fn recv_frame(&mut self) -> Result<Bytes, OverlayError> {
        let (n, from) = self.socket.recv_from(&mut self.buf)?;
        trace!(bytes = n, from = %from, "收到数据报");
        Ok(encode_frame(&FirstHop(from), &self.buf[..n]))
    }
}

impl OverlaySend for UdpOverlay {
    fn send(&mut self, packet: &[u8], next_hop: &FirstHop) -> Result<usize, OverlayError> {
        let sent = self.socket.send_to(packet, next_hop.socket_addr())?;
        if sent != packet.len() {
            return Err(OverlayError::ShortSend {
                to: *next_hop,
                sent,
                len: packet.len(),
            });
        }
        trace!(bytes = sent, to = %next_hop, "数据报已发送");
        Ok(sent)
    }
}

impl From<UdpSocket> for UdpOverlay {
    fn from(socket: UdpSocket) -> Self {
        Self {
            socket,
            buf: vec![0; MAX_DATAGRAM],
        }
    }
}

impl std::fmt::Debug for UdpOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpOverlay")
            .field("local", &self.socket.local_addr().ok())
            .finish()
    }
}
