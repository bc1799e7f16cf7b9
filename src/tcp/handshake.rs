//! 三次握手
//!
//! 主动端 `connect` 发送 SYN；被动端对监听端口上的 SYN 沿回程路径回复 SYN-ACK；
//! 主动端收到 SYN-ACK 后回复 ACK 并进入 Established，被动端收到 ACK 后同样进入
//! Established。入口段先校验伪首部校验和，出口段在交给网络层前填好校验和。

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info};

use super::header::{ACK, FLAGS_MASK, SYN, TCP_HLEN, TcpHeader};
use crate::addr::{FirstHop, ScionAddr};
use crate::checksum::{checksum_field, pseudo_checksum, verify_pseudo_checksum};
use crate::ip::{
    IP_PROTO_TCP, IpError, IpPcb, NetifId, PathState, ScionFlags, ScionOutput, SocketOptions,
    TcpInput,
};
use crate::overlay::{OverlaySend, SimPort};
use crate::packet::Path;

const ISS_STEP: u32 = 64_000;

/// 连接标识：(对端地址, 对端端口, 本端端口)
pub type ConnKey = (ScionAddr, u16, u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    SynSent,
    SynReceived,
    Established,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub pcb: IpPcb,
    pub local_port: u16,
    pub remote_port: u16,
    pub state: ConnState,
    /// 初始发送序号
    pub iss: u32,
    pub rcv_nxt: u32,
}

/// 一次 `tcp_input` 的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeEvent {
    /// 收到 SYN，已回复 SYN-ACK
    SynReceived { remote: ScionAddr, port: u16 },
    /// 握手完成
    Established { remote: ScionAddr, port: u16 },
    /// 段被丢弃
    Discarded { reason: &'static str },
}

/// 只做握手的 TCP 引擎，出口通过注入的 [`ScionOutput`] 发送。
#[derive(Debug)]
pub struct Handshaker<O> {
    local: ScionAddr,
    output: ScionOutput<O>,
    listeners: HashMap<u16, IpPcb>,
    conns: HashMap<ConnKey, Connection>,
    next_iss: u32,
}

fn send_control<O: OverlaySend>(
    output: &mut ScionOutput<O>,
    conn: &Connection,
    flags: u8,
    seq: u32,
    ack: u32,
) -> Result<usize, IpError> {
    let pcb = &conn.pcb;
    let mut hdr = TcpHeader::new(conn.local_port, conn.remote_port, seq, ack, flags);
    let unsummed = hdr.to_bytes();
    let sum = pseudo_checksum(
        [&unsummed[..]],
        &pcb.local,
        &pcb.remote,
        IP_PROTO_TCP,
        TCP_HLEN as u16,
    );
    hdr.checksum = checksum_field(sum, &pcb.local, &pcb.remote);
    output.send_segment(
        BytesMut::from(&hdr.to_bytes()[..]),
        &pcb.local,
        &pcb.remote,
        &pcb.path,
        &pcb.extensions,
        IP_PROTO_TCP,
        pcb.scion_flags,
    )
}

impl<O: OverlaySend> Handshaker<O> {
    /// 以本端地址和出口适配器创建引擎
    pub fn new(local: ScionAddr, output: ScionOutput<O>) -> Self {
        Self {
            local,
            output,
            listeners: HashMap::new(),
            conns: HashMap::new(),
            next_iss: 1,
        }
    }

    pub fn local(&self) -> &ScionAddr {
        &self.local
    }

    pub fn output(&self) -> &ScionOutput<O> {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut ScionOutput<O> {
        &mut self.output
    }

    fn next_iss(&mut self) -> u32 {
        let iss = self.next_iss;
        self.next_iss = self.next_iss.wrapping_add(ISS_STEP);
        iss
    }

    /// 在 `port` 上监听。派生的连接继承 `options` 中可继承的部分和 `flags`。
    pub fn listen(&mut self, port: u16, options: SocketOptions, flags: ScionFlags) {
        let unspecified = FirstHop(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)));
        let mut pcb = IpPcb::new(self.local, self.local, Path::empty(unspecified));
        pcb.so_options = options;
        pcb.set_option(SocketOptions::ACCEPTCONN);
        pcb.scion_flags = flags;
        debug!(port, ?options, ?flags, "开始监听");
        self.listeners.insert(port, pcb);
    }

    /// 主动打开：沿 `path` 发送 SYN，返回交给覆盖网络的字节数。
    pub fn connect(
        &mut self,
        remote: ScionAddr,
        local_port: u16,
        remote_port: u16,
        path: Path,
        flags: ScionFlags,
    ) -> Result<usize, IpError> {
        let mut pcb = IpPcb::new(self.local, remote, path);
        pcb.scion_flags = flags;
        let iss = self.next_iss();
        let conn = Connection {
            pcb,
            local_port,
            remote_port,
            state: ConnState::SynSent,
            iss,
            rcv_nxt: 0,
        };
        let sent = send_control(&mut self.output, &conn, SYN, iss, 0)?;
        info!(%remote, local_port, remote_port, sent, "📤 发送 SYN");
        self.conns.insert((remote, remote_port, local_port), conn);
        Ok(sent)
    }

    /// 按 (对端地址, 对端端口, 本端端口) 查找连接
    pub fn connection(
        &self,
        remote: &ScionAddr,
        remote_port: u16,
        local_port: u16,
    ) -> Option<&Connection> {
        self.conns.get(&(*remote, remote_port, local_port))
    }

    /// 所有已知连接（含半开连接）
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.conns.values()
    }

    fn on_syn(
        &mut self,
        hdr: &TcpHeader,
        state: &PathState,
    ) -> Result<HandshakeEvent, IpError> {
        let Some(listener) = self.listeners.get(&hdr.dst_port) else {
            return Ok(HandshakeEvent::Discarded {
                reason: "no listener",
            });
        };
        let remote = *state.current_src();
        let mut pcb = IpPcb::new(*state.current_dest(), remote, state.path().clone());
        pcb.inherit_from(listener);
        let iss = self.next_iss();
        let conn = Connection {
            pcb,
            local_port: hdr.dst_port,
            remote_port: hdr.src_port,
            state: ConnState::SynReceived,
            iss,
            rcv_nxt: hdr.seq.wrapping_add(1),
        };
        send_control(&mut self.output, &conn, SYN | ACK, iss, conn.rcv_nxt)?;
        debug!(%remote, port = hdr.dst_port, "收到 SYN，回复 SYN-ACK");
        self.conns.insert((remote, hdr.src_port, hdr.dst_port), conn);
        Ok(HandshakeEvent::SynReceived {
            remote,
            port: hdr.dst_port,
        })
    }
}

impl<O: OverlaySend> TcpInput for Handshaker<O> {
    type Outcome = Result<HandshakeEvent, IpError>;

    #[tracing::instrument(skip(self, segment, state), fields(seg_len = segment.len(), src = %state.current_src()))]
    fn tcp_input(&mut self, segment: Bytes, inp: NetifId, state: &PathState) -> Self::Outcome {
        let Ok(len) = u16::try_from(segment.len()) else {
            return Ok(HandshakeEvent::Discarded {
                reason: "oversized segment",
            });
        };
        if !verify_pseudo_checksum(
            [&segment[..]],
            state.current_src(),
            state.current_dest(),
            IP_PROTO_TCP,
            len,
        ) {
            debug!("伪首部校验和错误，丢弃");
            return Ok(HandshakeEvent::Discarded {
                reason: "bad checksum",
            });
        }
        let Some(hdr) = TcpHeader::parse(&segment) else {
            return Ok(HandshakeEvent::Discarded {
                reason: "malformed header",
            });
        };

        if hdr.is_syn_only() {
            return self.on_syn(&hdr, state);
        }

        let remote = *state.current_src();
        let Some(conn) = self.conns.get_mut(&(remote, hdr.src_port, hdr.dst_port)) else {
            return Ok(HandshakeEvent::Discarded {
                reason: "no connection",
            });
        };
        let flags = hdr.flags & FLAGS_MASK;
        let acks_syn = hdr.has(ACK) && hdr.ack == conn.iss.wrapping_add(1);
        match conn.state {
            ConnState::SynSent if flags == SYN | ACK && acks_syn => {
                // ACK 发送成功前连接保持 SynSent，重传的 SYN-ACK 仍可完成握手
                let mut next = conn.clone();
                next.rcv_nxt = hdr.seq.wrapping_add(1);
                if state.has_path() {
                    next.pcb.adopt_path(state);
                }
                send_control(
                    &mut self.output,
                    &next,
                    ACK,
                    next.iss.wrapping_add(1),
                    next.rcv_nxt,
                )?;
                next.state = ConnState::Established;
                *conn = next;
                info!(%remote, port = conn.local_port, "🤝 连接建立（主动端）");
                Ok(HandshakeEvent::Established {
                    remote,
                    port: conn.local_port,
                })
            }
            ConnState::SynReceived if flags == ACK && acks_syn => {
                conn.state = ConnState::Established;
                info!(%remote, port = conn.local_port, "🤝 连接建立（被动端）");
                Ok(HandshakeEvent::Established {
                    remote,
                    port: conn.local_port,
                })
            }
            _ => Ok(HandshakeEvent::Discarded {
                reason: "unexpected segment",
            }),
        }
    }
}

impl AsMut<SimPort> for Handshaker<SimPort> {
    fn as_mut(&mut self) -> &mut SimPort {
        self.output.overlay_mut()
    }
}
