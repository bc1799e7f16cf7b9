//! 转发路径
//!
//! 原始路径由若干段组成，每段是一个信息字段加 `hops` 个跳字段，均为 8 字节：
//!
//! ```text
//! info:  | flags | timestamp (4) | ISD (2) | hops |
//! hop:   | flags | exp | ingress/egress (3) | MAC (3) |
//! ```

use super::PacketError;
use crate::addr::FirstHop;

pub const INFO_FIELD_LEN: usize = 8;
pub const HOP_FIELD_LEN: usize = 8;

/// 信息字段标志：逆构造方向经过该段
pub const INFO_UP: u8 = 0x01;
pub const INFO_SHORTCUT: u8 = 0x02;
pub const INFO_PEER: u8 = 0x04;

/// 跳字段标志：在此切换到下一段
pub const HOP_XOVER: u8 = 0x01;
/// 跳字段标志：只用于校验上一跳，路由器跳过
pub const HOP_VERIFY_ONLY: u8 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InfoField {
    pub flags: u8,
    pub timestamp: u32,
    pub isd: u16,
    pub hops: u8,
}

impl InfoField {
    pub fn encode(&self) -> [u8; INFO_FIELD_LEN] {
        let [t0, t1, t2, t3] = self.timestamp.to_be_bytes();
        let [i0, i1] = self.isd.to_be_bytes();
        [self.flags, t0, t1, t2, t3, i0, i1, self.hops]
    }

    pub fn decode(raw: &[u8; INFO_FIELD_LEN]) -> Self {
        Self {
            flags: raw[0],
            timestamp: u32::from_be_bytes([raw[1], raw[2], raw[3], raw[4]]),
            isd: u16::from_be_bytes([raw[5], raw[6]]),
            hops: raw[7],
        }
    }

    /// 该段是否逆构造方向经过
    pub fn is_up(&self) -> bool {
        self.flags & INFO_UP != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HopField {
    pub flags: u8,
    pub exp_time: u8,
    /// 12 位入接口
    pub ingress: u16,
    /// 12 位出接口
    pub egress: u16,
    pub mac: [u8; 3],
}

impl HopField {
    pub fn encode(&self) -> [u8; HOP_FIELD_LEN] {
        let ifs = (u32::from(self.ingress & 0x0fff) << 12) | u32::from(self.egress & 0x0fff);
        let [_, i0, i1, i2] = ifs.to_be_bytes();
        [
            self.flags,
            self.exp_time,
            i0,
            i1,
            i2,
            self.mac[0],
            self.mac[1],
            self.mac[2],
        ]
    }

    pub fn decode(raw: &[u8; HOP_FIELD_LEN]) -> Self {
        let ifs = u32::from_be_bytes([0, raw[2], raw[3], raw[4]]);
        Self {
            flags: raw[0],
            exp_time: raw[1],
            ingress: (ifs >> 12) as u16,
            egress: (ifs & 0x0fff) as u16,
            mac: [raw[5], raw[6], raw[7]],
        }
    }

    /// 路由器是否跳过该跳字段
    pub fn is_verify_only(&self) -> bool {
        self.flags & HOP_VERIFY_ONLY != 0
    }
}

/// 一个路径段：信息字段 + 跳字段
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathSegment {
    pub info: InfoField,
    pub hops: Vec<HopField>,
}

/// 原始转发路径 + 第一个中继的覆盖地址。
///
/// 空路径也有首跳：此时目的端直接在本地覆盖网络上可达。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: Vec<u8>,
    first_hop: FirstHop,
}

impl Path {
    /// 包装原始路径字节，结构在编码进报文时由编解码器检查。
    pub fn new(raw: impl Into<Vec<u8>>, first_hop: FirstHop) -> Self {
        Self {
            raw: raw.into(),
            first_hop,
        }
    }

    /// 无路径，目的端直接经首跳可达
    pub fn empty(first_hop: FirstHop) -> Self {
        Self {
            raw: Vec::new(),
            first_hop,
        }
    }

    /// 按顺序编码 `segments`，信息字段的跳数取自各段的跳字段列表。
    ///
    /// 某段没有跳字段或超过 255 个跳字段时返回错误，这样的段无法在信息字段中表示。
    pub fn from_segments(
        segments: &[PathSegment],
        first_hop: FirstHop,
    ) -> Result<Self, PacketError> {
        let len = segments
            .iter()
            .map(|s| INFO_FIELD_LEN + s.hops.len() * HOP_FIELD_LEN)
            .sum();
        let mut raw = Vec::with_capacity(len);
        for (index, seg) in segments.iter().enumerate() {
            let hops = match u8::try_from(seg.hops.len()) {
                Ok(0) | Err(_) => {
                    return Err(PacketError::InvalidHopCount {
                        segment: index,
                        hops: seg.hops.len(),
                    });
                }
                Ok(n) => n,
            };
            let info = InfoField { hops, ..seg.info };
            raw.extend_from_slice(&info.encode());
            for hop in &seg.hops {
                raw.extend_from_slice(&hop.encode());
            }
        }
        Ok(Self { raw, first_hop })
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn first_hop(&self) -> &FirstHop {
        &self.first_hop
    }

    /// 反向走同一条路由，首跳不变
    pub fn reversed(&self) -> Result<Path, PacketError> {
        Ok(Path {
            raw: reverse_path(&self.raw)?,
            first_hop: self.first_hop,
        })
    }

    /// 把 `other` 复制进来，容量够时复用已有分配。
    pub fn copy_from(&mut self, other: &Path) {
        self.raw.clear();
        self.raw.extend_from_slice(&other.raw);
        self.first_hop = other.first_hop;
    }

    /// 按段解析原始路径
    pub fn segments(&self) -> Result<Vec<PathSegment>, PacketError> {
        Ok(segment_bounds(&self.raw)?
            .into_iter()
            .map(|(start, hops)| read_segment(&self.raw, start, hops))
            .collect())
    }
}

/// 把原始路径切成每段的 `(偏移, 跳数)`，并检查各段恰好铺满路径。
pub(crate) fn segment_bounds(raw: &[u8]) -> Result<Vec<(usize, usize)>, PacketError> {
    if raw.len() % INFO_FIELD_LEN != 0 {
        return Err(PacketError::UnalignedPath(raw.len()));
    }
    let mut bounds = Vec::new();
    let mut offset = 0;
    while offset < raw.len() {
        let hops = usize::from(raw[offset + INFO_FIELD_LEN - 1]);
        if hops == 0 {
            return Err(PacketError::EmptySegment { offset });
        }
        let required = INFO_FIELD_LEN + hops * HOP_FIELD_LEN;
        if offset + required > raw.len() {
            return Err(PacketError::SegmentOverrun {
                offset,
                required,
                actual: raw.len(),
            });
        }
        bounds.push((offset, hops));
        offset += required;
    }
    Ok(bounds)
}

fn read_segment(raw: &[u8], start: usize, hops: usize) -> PathSegment {
    let mut info = [0u8; INFO_FIELD_LEN];
    info.copy_from_slice(&raw[start..start + INFO_FIELD_LEN]);
    let hops = (0..hops)
        .map(|i| {
            let at = start + INFO_FIELD_LEN + i * HOP_FIELD_LEN;
            let mut hop = [0u8; HOP_FIELD_LEN];
            hop.copy_from_slice(&raw[at..at + HOP_FIELD_LEN]);
            HopField::decode(&hop)
        })
        .collect();
    PathSegment {
        info: InfoField::decode(&info),
        hops,
    }
}

/// 反转原始路径：段顺序反转，各信息字段的 `UP` 标志取反，段内跳字段反转。
/// 连续反转两次得到原字节。
pub fn reverse_path(raw: &[u8]) -> Result<Vec<u8>, PacketError> {
    let bounds = segment_bounds(raw)?;
    let mut out = Vec::with_capacity(raw.len());
    for &(start, hops) in bounds.iter().rev() {
        let mut info = [0u8; INFO_FIELD_LEN];
        info.copy_from_slice(&raw[start..start + INFO_FIELD_LEN]);
        info[0] ^= INFO_UP;
        out.extend_from_slice(&info);
        for i in (0..hops).rev() {
            let at = start + INFO_FIELD_LEN + i * HOP_FIELD_LEN;
            out.extend_from_slice(&raw[at..at + HOP_FIELD_LEN]);
        }
    }
    Ok(out)
}

/// 第一个信息字段和路由器应处理的第一个跳字段相对 `raw` 开头的字节偏移，
/// 空路径返回 `None`。
pub(crate) fn first_forwarding_fields(raw: &[u8]) -> Result<Option<(usize, usize)>, PacketError> {
    let bounds = segment_bounds(raw)?;
    let Some(&(start, hops)) = bounds.first() else {
        return Ok(None);
    };
    let first_hop_field = start + INFO_FIELD_LEN;
    let hof = (0..hops)
        .map(|i| first_hop_field + i * HOP_FIELD_LEN)
        .find(|&at| raw[at] & HOP_VERIFY_ONLY == 0)
        .unwrap_or(first_hop_field);
    Ok(Some((start, hof)))
}
