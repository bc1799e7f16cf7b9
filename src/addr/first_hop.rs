//! 首跳：下一个物理中继的覆盖网络地址
//!
//! 分发器交上来的帧以发送方覆盖地址开头，固定 19 字节：
//!
//! ```text
//! | family (1) | address (16, IPv4 left-aligned) | port (2, BE) |
//! ```

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::AddrError;

/// 首跳前缀的线上长度
pub const FIRST_HOP_LEN: usize = 19;

const FAMILY_V4: u8 = 1;
const FAMILY_V6: u8 = 2;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FirstHop(pub SocketAddr);

impl FirstHop {
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    /// 编码为 19 字节前缀
    pub fn encode(&self) -> [u8; FIRST_HOP_LEN] {
        let mut out = [0u8; FIRST_HOP_LEN];
        match self.0.ip() {
            IpAddr::V4(v4) => {
                out[0] = FAMILY_V4;
                out[1..5].copy_from_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                out[0] = FAMILY_V6;
                out[1..17].copy_from_slice(&v6.octets());
            }
        }
        out[17..19].copy_from_slice(&self.0.port().to_be_bytes());
        out
    }

    /// 从 `bytes` 开头解码前缀，忽略其后的字节。
    pub fn decode(bytes: &[u8]) -> Result<Self, AddrError> {
        let Some(raw) = bytes.get(..FIRST_HOP_LEN) else {
            return Err(AddrError::FirstHopTooShort(bytes.len()));
        };
        let port = u16::from_be_bytes([raw[17], raw[18]]);
        let ip = match raw[0] {
            FAMILY_V4 => IpAddr::V4(Ipv4Addr::new(raw[1], raw[2], raw[3], raw[4])),
            FAMILY_V6 => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&raw[1..17]);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            other => return Err(AddrError::FirstHopFamily(other)),
        };
        Ok(Self(SocketAddr::new(ip, port)))
    }
}

impl From<SocketAddr> for FirstHop {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for FirstHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for FirstHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FirstHop({})", self.0)
    }
}
