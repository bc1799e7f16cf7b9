//! 传输层载荷

use bytes::Bytes;

/// 首部之后携带的传输层段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct L4Payload {
    /// 协议号，例如 TCP 为 6
    pub proto: u8,
    pub payload: Bytes,
}

impl L4Payload {
    /// 按协议号包装传输层段
    pub fn new(proto: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            proto,
            payload: payload.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
