//! 覆盖网络传输
//!
//! 覆盖网络只负责把不透明的字节帧送到下一跳：
//! - `frame`：带首跳前缀的帧格式（dispatcher 交给上层的形式）
//! - `udp`：基于 `UdpSocket` 的真实传输
//! - `sim`：确定性的内存仿真传输（事件队列驱动）

mod frame;
mod sim;
mod udp;

use std::io;

use crate::addr::FirstHop;

pub use frame::{encode_frame, split_frame};
pub use sim::{Delivery, InFlight, SimHost, SimOverlay, SimPort, SimStats, SimTime};
pub use udp::UdpOverlay;

/// 覆盖网络发送错误
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("overlay I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("short send to {to}: {sent} of {len} bytes")]
    ShortSend { to: FirstHop, sent: usize, len: usize },

    #[error("no overlay host at {0}")]
    Unroutable(FirstHop),
}

/// 覆盖网络发送接口：把一个完整的 SCION 报文交给 `next_hop`。
///
/// 返回交给覆盖网络的字节数。
pub trait OverlaySend {
    fn send(&mut self, packet: &[u8], next_hop: &FirstHop) -> Result<usize, OverlayError>;
}

impl<F> OverlaySend for F
where
    F: FnMut(&[u8], &FirstHop) -> Result<usize, OverlayError>,
{
    fn send(&mut self, packet: &[u8], next_hop: &FirstHop) -> Result<usize, OverlayError> {
        self(packet, next_hop)
    }
}
