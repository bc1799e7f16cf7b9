//! TCP 首部（不含选项，20 字节）

/// TCP 最短首部长度
pub const TCP_HLEN: usize = 20;
/// 校验和字段在首部中的偏移
pub const CHECKSUM_OFFSET: usize = 16;

pub const FIN: u8 = 0x01;
pub const SYN: u8 = 0x02;
pub const RST: u8 = 0x04;
pub const PSH: u8 = 0x08;
pub const ACK: u8 = 0x10;
pub const URG: u8 = 0x20;
/// 参与判断的标志位（不含 ECE/CWR）
pub const FLAGS_MASK: u8 = 0x3f;

const FLAGS_OFFSET: usize = 13;
const DEFAULT_WINDOW: u16 = 0xffff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: u8,
    pub window: u16,
    pub checksum: u16,
}

impl TcpHeader {
    /// 窗口取最大值，校验和置零
    pub fn new(src_port: u16, dst_port: u16, seq: u32, ack: u32, flags: u8) -> Self {
        Self {
            src_port,
            dst_port,
            seq,
            ack,
            flags,
            window: DEFAULT_WINDOW,
            checksum: 0,
        }
    }

    /// 解析段首部；段过短或数据偏移非法时返回 `None`。
    pub fn parse(segment: &[u8]) -> Option<Self> {
        let raw = segment.get(..TCP_HLEN)?;
        let data_offset = usize::from(raw[12] >> 4) * 4;
        if data_offset < TCP_HLEN || data_offset > segment.len() {
            return None;
        }
        Some(Self {
            src_port: u16::from_be_bytes([raw[0], raw[1]]),
            dst_port: u16::from_be_bytes([raw[2], raw[3]]),
            seq: u32::from_be_bytes([raw[4], raw[5], raw[6], raw[7]]),
            ack: u32::from_be_bytes([raw[8], raw[9], raw[10], raw[11]]),
            flags: raw[FLAGS_OFFSET],
            window: u16::from_be_bytes([raw[14], raw[15]]),
            checksum: u16::from_be_bytes([raw[16], raw[17]]),
        })
    }

    /// 编码为 20 字节首部（数据偏移固定为 5）
    pub fn to_bytes(&self) -> [u8; TCP_HLEN] {
        let mut out = [0u8; TCP_HLEN];
        out[0..2].copy_from_slice(&self.src_port.to_be_bytes());
        out[2..4].copy_from_slice(&self.dst_port.to_be_bytes());
        out[4..8].copy_from_slice(&self.seq.to_be_bytes());
        out[8..12].copy_from_slice(&self.ack.to_be_bytes());
        out[12] = ((TCP_HLEN / 4) as u8) << 4;
        out[FLAGS_OFFSET] = self.flags;
        out[14..16].copy_from_slice(&self.window.to_be_bytes());
        out[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&self.checksum.to_be_bytes());
        out
    }

    /// 是否带有 `flag` 中的全部标志
    pub fn has(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }

    /// 只有 SYN（忽略 ECN 位）
    pub fn is_syn_only(&self) -> bool {
        self.flags & FLAGS_MASK == SYN
    }
}

/// 段的标志位是否恰好为 SYN。段短于标志字节时返回 false。
pub fn is_syn_only(segment: &[u8]) -> bool {
    segment
        .get(FLAGS_OFFSET)
        .is_some_and(|f| f & FLAGS_MASK == SYN)
}
