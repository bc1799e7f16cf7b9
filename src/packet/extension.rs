//! 扩展首部
//!
//! 扩展通过 `next_header` 串联：公共首部（或前一个扩展）给出下一个扩展的类别，
//! 最后一个扩展给出 L4 协议号。线上格式为
//! `next_header | hdr_len | ext_type | payload`，长 `(hdr_len + 1) * 8` 字节，
//! 载荷补零到行边界。解析得到的载荷包含补齐的零字节。

use bytes::Bytes;

use super::PacketError;
use super::common_header::LINE_LEN;

/// 表示逐跳扩展的 `next_header` 值
pub const HOP_BY_HOP: u8 = 0;
/// 表示端到端扩展的 `next_header` 值
pub const END_TO_END: u8 = 222;

/// 每个扩展载荷前的子首部长度
pub const EXT_SUBHEADER_LEN: usize = 3;

/// 让路由器补全第一个跳字段的逐跳扩展类型
pub const ONE_HOP_PATH_TYPE: u8 = 2;
const ONE_HOP_PATH_PAYLOAD_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtClass {
    HopByHop,
    EndToEnd,
}

impl ExtClass {
    /// 该类别在 `next_header` 中的取值
    pub const fn header_number(self) -> u8 {
        match self {
            ExtClass::HopByHop => HOP_BY_HOP,
            ExtClass::EndToEnd => END_TO_END,
        }
    }

    /// `next_header` 值对应的类别，L4 协议号返回 `None`
    pub const fn from_header_number(n: u8) -> Option<Self> {
        match n {
            HOP_BY_HOP => Some(ExtClass::HopByHop),
            END_TO_END => Some(ExtClass::EndToEnd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub class: ExtClass,
    pub ext_type: u8,
    pub payload: Bytes,
}

impl Extension {
    pub fn new(class: ExtClass, ext_type: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            ext_type,
            payload: payload.into(),
        }
    }

    /// 单跳路径扩展：报文路径只有一个跳字段，由第一个边界路由器补全。
    pub fn one_hop_path() -> Self {
        Self::new(
            ExtClass::HopByHop,
            ONE_HOP_PATH_TYPE,
            Bytes::from_static(&[0; ONE_HOP_PATH_PAYLOAD_LEN]),
        )
    }

    /// 是否为单跳路径扩展
    pub fn is_one_hop_path(&self) -> bool {
        self.class == ExtClass::HopByHop && self.ext_type == ONE_HOP_PATH_TYPE
    }

    /// 线上长度，含子首部和填充
    pub fn wire_len(&self) -> usize {
        (EXT_SUBHEADER_LEN + self.payload.len()).div_ceil(LINE_LEN) * LINE_LEN
    }

    /// `hdr_len` 字节的值
    pub(crate) fn hdr_len(&self) -> Result<u8, PacketError> {
        u8::try_from(self.wire_len() / LINE_LEN - 1)
            .map_err(|_| PacketError::ExtensionTooLarge(self.payload.len()))
    }
}

/// 返回 `[one_hop_path, extensions...]`，不修改 `extensions`。
pub fn with_one_hop_path(extensions: &[Extension]) -> Vec<Extension> {
    let mut out = Vec::with_capacity(extensions.len() + 1);
    out.push(Extension::one_hop_path());
    out.extend_from_slice(extensions);
    out
}
