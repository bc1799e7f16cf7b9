//! 完整的 SCION 地址

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::{AddrError, HostAddr, HostAddrType, IsdAs};

/// 完整的 SCION 地址：ISD-AS + 主机
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScionAddr {
    pub isd_as: IsdAs,
    pub host: HostAddr,
}

impl ScionAddr {
    pub fn new(isd_as: IsdAs, host: impl Into<HostAddr>) -> Self {
        Self {
            isd_as,
            host: host.into(),
        }
    }

    pub fn host_type(&self) -> HostAddrType {
        self.host.addr_type()
    }
}

impl fmt::Display for ScionAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},[{}]", self.isd_as, self.host)
    }
}

impl fmt::Debug for ScionAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScionAddr({self})")
    }
}

impl FromStr for ScionAddr {
    type Err = AddrError;

    /// 支持 `"1-11,[10.0.0.1]"`、`"1-11,10.0.0.1"` 和 `"2-22,[fd00::2]"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ia, host) = s
            .split_once(',')
            .ok_or_else(|| AddrError::Syntax(s.to_string()))?;
        let isd_as: IsdAs = ia.parse()?;
        let host = host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host.parse().map_err(|_| AddrError::Syntax(s.to_string()))?;
        let host = match ip {
            IpAddr::V4(v4) => HostAddr::ipv4(v4),
            IpAddr::V6(v6) => HostAddr::ipv6(v6),
        };
        Ok(Self { isd_as, host })
    }
}
