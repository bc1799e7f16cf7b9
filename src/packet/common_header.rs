//! SCION 公共首部（8 字节）
//!
//! ```text
//!  0               1               2               3
//! +-------+-----------+-----------+---------------+---------------+
//! |  ver  | dst type  | src type  |         total length          |
//! +-------+-----------+-----------+---------------+---------------+
//! |  header length  | current IOF | current HOF   |  next header  |
//! +---------------+---------------+---------------+---------------+
//! ```
//!
//! `header length`、`current IOF`、`current HOF` 以 8 字节行为单位，从报文开头计。

use super::PacketError;

/// 公共首部的线上长度
pub const COMMON_HEADER_LEN: usize = 8;

/// `header_len` 与 IOF/HOF 偏移的单位
pub const LINE_LEN: usize = 8;

/// 只支持版本 0
pub const SCION_VERSION: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommonHeader {
    pub version: u8,
    pub dst_type: u8,
    pub src_type: u8,
    pub total_len: u16,
    pub header_len: u8,
    pub current_iof: u8,
    pub current_hof: u8,
    pub next_header: u8,
}

impl CommonHeader {
    /// 首部字节数（公共 + 地址 + 路径）
    pub fn header_len_bytes(&self) -> usize {
        usize::from(self.header_len) * LINE_LEN
    }

    /// 从报文开头解码公共首部
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        let Some(raw) = bytes.get(..COMMON_HEADER_LEN) else {
            return Err(PacketError::BufferTooSmall {
                at: "common header",
                required: COMMON_HEADER_LEN,
                actual: bytes.len(),
            });
        };
        let types = u16::from_be_bytes([raw[0], raw[1]]);
        Ok(Self {
            version: (types >> 12) as u8,
            dst_type: ((types >> 6) & 0x3f) as u8,
            src_type: (types & 0x3f) as u8,
            total_len: u16::from_be_bytes([raw[2], raw[3]]),
            header_len: raw[4],
            current_iof: raw[5],
            current_hof: raw[6],
            next_header: raw[7],
        })
    }

    /// 编码为 8 字节
    pub fn encode(&self) -> [u8; COMMON_HEADER_LEN] {
        let types = (u16::from(self.version & 0x0f) << 12)
            | (u16::from(self.dst_type & 0x3f) << 6)
            | u16::from(self.src_type & 0x3f);
        let [t0, t1] = types.to_be_bytes();
        let [l0, l1] = self.total_len.to_be_bytes();
        [
            t0,
            t1,
            l0,
            l1,
            self.header_len,
            self.current_iof,
            self.current_hof,
            self.next_header,
        ]
    }
}
