//! ISD-AS 标识

use std::fmt;
use std::str::FromStr;

use super::AddrError;

/// ISD-AS 标识的线上长度
pub const ISD_AS_LEN: usize = 4;

const ISD_BITS: u32 = 12;
const AS_BITS: u32 = 20;
const AS_MASK: u32 = (1 << AS_BITS) - 1;

/// 隔离域 + 自治系统，按 `isd(12) | as(20)` 打包
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IsdAs(pub u32);

impl IsdAs {
    /// ISD 超过 12 位或 AS 超过 20 位时返回错误
    pub fn new(isd: u16, asn: u32) -> Result<Self, AddrError> {
        if u32::from(isd) >= 1 << ISD_BITS {
            return Err(AddrError::IsdOutOfRange(u32::from(isd)));
        }
        if asn > AS_MASK {
            return Err(AddrError::AsOutOfRange(u64::from(asn)));
        }
        Ok(Self((u32::from(isd) << AS_BITS) | asn))
    }

    pub fn isd(self) -> u16 {
        (self.0 >> AS_BITS) as u16
    }

    pub fn asn(self) -> u32 {
        self.0 & AS_MASK
    }

    /// 线上编码（大端）
    pub fn to_bytes(self) -> [u8; ISD_AS_LEN] {
        self.0.to_be_bytes()
    }

    pub fn from_bytes(raw: [u8; ISD_AS_LEN]) -> Self {
        Self(u32::from_be_bytes(raw))
    }
}

impl fmt::Display for IsdAs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.isd(), self.asn())
    }
}

impl FromStr for IsdAs {
    type Err = AddrError;

    /// 解析 `"<isd>-<as>"`，例如 `"1-11"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || AddrError::Syntax(s.to_string());
        let (isd, asn) = s.split_once('-').ok_or_else(syntax)?;
        let isd: u32 = isd.trim().parse().map_err(|_| syntax())?;
        let asn: u64 = asn.trim().parse().map_err(|_| syntax())?;
        let isd = u16::try_from(isd).map_err(|_| AddrError::IsdOutOfRange(isd))?;
        let asn = u32::try_from(asn).map_err(|_| AddrError::AsOutOfRange(asn))?;
        Self::new(isd, asn)
    }
}
