//! 最小 TCP 引擎
//!
//! 只实现三次握手：足以驱动网络层适配器的入口和出口（含 SYN 上的单跳路径扩展、
//! 伪首部校验和的计算与校验）。

mod handshake;
mod header;

pub use handshake::{ConnKey, ConnState, Connection, HandshakeEvent, Handshaker};
pub use header::{
    ACK, CHECKSUM_OFFSET, FIN, FLAGS_MASK, PSH, RST, SYN, TCP_HLEN, TcpHeader, URG, is_syn_only,
};
