//! 网络层错误类型

use std::collections::TryReserveError;

use crate::overlay::OverlayError;
use crate::packet::PacketError;

/// 网络层适配错误
#[derive(Debug, thiserror::Error)]
pub enum IpError {
    /// 入口帧无法解析，帧被丢弃
    #[error("malformed frame: {0}")]
    Parse(PacketError),

    #[error("transport segment of {len} bytes is shorter than {min}")]
    TruncatedSegment { len: usize, min: usize },

    /// 出口报文无法构造或序列化，未发送
    #[error("cannot serialize packet: {0}")]
    Serialize(PacketError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),

    #[error("cannot allocate packet buffer: {0}")]
    Allocation(#[from] TryReserveError),
}
