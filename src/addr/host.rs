//! SCION 地址的主机部分

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::AddrError;

/// 最长的主机地址（IPv6）
pub const MAX_HOST_ADDR_LEN: usize = 16;

/// 主机地址类型，线上长度只由类型决定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HostAddrType {
    None = 0,
    Ipv4 = 1,
    Ipv6 = 2,
    Svc = 3,
}

impl HostAddrType {
    /// 该类型主机地址的字节数
    pub const fn len(self) -> usize {
        match self {
            HostAddrType::None => 0,
            HostAddrType::Ipv4 => 4,
            HostAddrType::Ipv6 => 16,
            HostAddrType::Svc => 2,
        }
    }
}

impl TryFrom<u8> for HostAddrType {
    type Error = AddrError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(HostAddrType::None),
            1 => Ok(HostAddrType::Ipv4),
            2 => Ok(HostAddrType::Ipv6),
            3 => Ok(HostAddrType::Svc),
            other => Err(AddrError::UnknownHostType(other)),
        }
    }
}

impl From<HostAddrType> for u8 {
    fn from(ty: HostAddrType) -> u8 {
        ty as u8
    }
}

/// 定长缓冲区中的主机地址，只有前 `ty.len()` 字节有意义。
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostAddr {
    ty: HostAddrType,
    raw: [u8; MAX_HOST_ADDR_LEN],
}

impl HostAddr {
    pub const NONE: HostAddr = HostAddr {
        ty: HostAddrType::None,
        raw: [0; MAX_HOST_ADDR_LEN],
    };

    pub fn ipv4(ip: Ipv4Addr) -> Self {
        let mut raw = [0; MAX_HOST_ADDR_LEN];
        raw[..4].copy_from_slice(&ip.octets());
        Self {
            ty: HostAddrType::Ipv4,
            raw,
        }
    }

    pub fn ipv6(ip: Ipv6Addr) -> Self {
        Self {
            ty: HostAddrType::Ipv6,
            raw: ip.octets(),
        }
    }

    /// SVC 地址（2 字节）
    pub fn svc(svc: u16) -> Self {
        let mut raw = [0; MAX_HOST_ADDR_LEN];
        raw[..2].copy_from_slice(&svc.to_be_bytes());
        Self {
            ty: HostAddrType::Svc,
            raw,
        }
    }

    /// 从恰好 `ty.len()` 字节解码 `ty` 类型的主机地址
    pub fn from_bytes(ty: HostAddrType, bytes: &[u8]) -> Result<Self, AddrError> {
        if bytes.len() != ty.len() {
            return Err(AddrError::HostLength {
                ty,
                expected: ty.len(),
                actual: bytes.len(),
            });
        }
        let mut raw = [0; MAX_HOST_ADDR_LEN];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { ty, raw })
    }

    pub fn addr_type(&self) -> HostAddrType {
        self.ty
    }

    pub fn len(&self) -> usize {
        self.ty.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 线上字节，长度由类型决定
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.ty.len()]
    }
}

impl From<Ipv4Addr> for HostAddr {
    fn from(ip: Ipv4Addr) -> Self {
        HostAddr::ipv4(ip)
    }
}

impl From<Ipv6Addr> for HostAddr {
    fn from(ip: Ipv6Addr) -> Self {
        HostAddr::ipv6(ip)
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            HostAddrType::None => f.write_str("none"),
            HostAddrType::Ipv4 => {
                let [a, b, c, d, ..] = self.raw;
                write!(f, "{}", Ipv4Addr::new(a, b, c, d))
            }
            HostAddrType::Ipv6 => write!(f, "{}", Ipv6Addr::from(self.raw)),
            HostAddrType::Svc => write!(f, "svc:{}", u16::from_be_bytes([self.raw[0], self.raw[1]])),
        }
    }
}

impl fmt::Debug for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostAddr({self})")
    }
}
