//! 主机侧发件箱

use tracing::trace;

use crate::addr::FirstHop;
use crate::overlay::{OverlayError, OverlaySend};

/// 仿真主机的发送端口：报文先放进发件箱，由 [`super::SimOverlay`] 取走调度。
#[derive(Debug)]
pub struct SimPort {
    local: FirstHop,
    outbox: Vec<(Vec<u8>, FirstHop)>,
}

impl SimPort {
    /// 以本端首跳地址创建空发件箱
    pub fn new(local: FirstHop) -> Self {
        Self {
            local,
            outbox: Vec::new(),
        }
    }

    pub fn local(&self) -> &FirstHop {
        &self.local
    }

    /// 尚未被仿真取走的报文
    pub fn pending(&self) -> &[(Vec<u8>, FirstHop)] {
        &self.outbox
    }

    /// 取走发件箱中的全部报文及其下一跳
    pub fn take_outbox(&mut self) -> Vec<(Vec<u8>, FirstHop)> {
        std::mem::take(&mut self.outbox)
    }
}

impl OverlaySend for SimPort {
    fn send(&mut self, packet: &[u8], next_hop: &FirstHop) -> Result<usize, OverlayError> {
        trace!(from = %self.local, to = %next_hop, bytes = packet.len(), "报文进入发件箱");
        self.outbox.push((packet.to_vec(), *next_hop));
        Ok(packet.len())
    }
}
