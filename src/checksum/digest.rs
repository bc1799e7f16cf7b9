//! 增量 Internet 校验和（RFC 1071）

/// 可分片累加的反码和。
///
/// 分片可以在任意（包括奇数）偏移处切开：奇数分片的最后一个字节会与下一个分片的
/// 第一个字节拼成一个 16 位字，结果与对拼接后的连续缓冲区求和完全一致。
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumDigest {
    sum: u64,
    odd: Option<u8>,
}

impl ChecksumDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// 累加一段字节，可在任意偏移处分片
    pub fn add_slice(&mut self, mut data: &[u8]) -> &mut Self {
        if data.is_empty() {
            return self;
        }
        if let Some(hi) = self.odd.take() {
            self.sum += u64::from(u16::from_be_bytes([hi, data[0]]));
            data = &data[1..];
        }
        let mut words = data.chunks_exact(2);
        for w in &mut words {
            self.sum += u64::from(u16::from_be_bytes([w[0], w[1]]));
        }
        if let [last] = words.remainder() {
            self.odd = Some(*last);
        }
        self
    }

    pub fn add_u8(&mut self, v: u8) -> &mut Self {
        self.add_slice(&[v])
    }

    /// 以网络字节序累加
    pub fn add_u16(&mut self, v: u16) -> &mut Self {
        self.add_slice(&v.to_be_bytes())
    }

    /// 折叠到 16 位的反码和（未取反）。末尾悬空的奇数字节按低位补零处理。
    pub fn sum(&self) -> u16 {
        let mut sum = self.sum;
        if let Some(hi) = self.odd {
            sum += u64::from(hi) << 8;
        }
        while sum > 0xffff {
            sum = (sum & 0xffff) + (sum >> 16);
        }
        sum as u16
    }

    /// 取反后的校验和（主机字节序）
    pub fn checksum(&self) -> u16 {
        !self.sum()
    }
}
