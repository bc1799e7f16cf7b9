//! 报文模型与线上编解码

use bytes::Bytes;
use tracing::trace;

use super::common_header::{COMMON_HEADER_LEN, CommonHeader, LINE_LEN, SCION_VERSION};
use super::extension::{EXT_SUBHEADER_LEN, ExtClass, Extension};
use super::path::{Path, first_forwarding_fields, reverse_path, segment_bounds};
use super::{L4Payload, PacketError};
use crate::addr::{HostAddr, HostAddrType, ISD_AS_LEN, IsdAs, ScionAddr};

/// SCION 报文。引用的缓冲区都由自身持有（或通过 `Bytes` 共享），
/// drop 即释放全部内存。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: CommonHeader,
    pub dst: ScionAddr,
    pub src: ScionAddr,
    /// 原始路径字节，无路径时为空
    pub path: Bytes,
    pub extensions: Vec<Extension>,
    pub l4: L4Payload,
}

impl Packet {
    /// 是否带有转发路径
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// 由各部分算出的序列化长度，一致的报文等于 `header.total_len`。
    pub fn wire_len(&self) -> usize {
        COMMON_HEADER_LEN
            + address_header_len(self.dst.host_type(), self.src.host_type())
            + self.path.len()
            + self.extensions.iter().map(Extension::wire_len).sum::<usize>()
            + self.l4.len()
    }
}

/// 适配器使用的报文库接口。
///
/// 释放即所有权：解析或构造出的报文在 drop 时释放内存。
pub trait Codec {
    /// 解析一个完整的序列化报文
    fn parse(&self, bytes: Bytes) -> Result<Packet, PacketError>;

    /// 由各部分构造报文，目的地址在前。
    fn build(
        &self,
        dst: &ScionAddr,
        src: &ScionAddr,
        path: &Path,
        extensions: &[Extension],
        l4: L4Payload,
    ) -> Result<Packet, PacketError>;

    /// 把 `packet` 写到 `out` 开头，返回写入字节数（恒等于首部声明的总长度）。
    fn serialize(&self, packet: &Packet, out: &mut [u8]) -> Result<usize, PacketError>;

    fn reverse_path(&self, raw: &[u8]) -> Result<Vec<u8>, PacketError>;

    /// 让已完成报文的 IOF/HOF 指向第一个信息字段和路由器要处理的第一个跳字段。
    fn recompute_offsets(&self, packet: &mut [u8]) -> Result<(), PacketError>;
}

/// SCION 线上格式
#[derive(Debug, Clone, Copy, Default)]
pub struct ScionCodec;

fn address_header_len(dst: HostAddrType, src: HostAddrType) -> usize {
    (2 * ISD_AS_LEN + dst.len() + src.len()).div_ceil(LINE_LEN) * LINE_LEN
}

/// 返回 `(地址首部结束, 首部结束)`，两者都已对照缓冲区检查。
fn header_bounds(header: &CommonHeader, buf_len: usize) -> Result<(usize, usize), PacketError> {
    let dst_type = HostAddrType::try_from(header.dst_type)?;
    let src_type = HostAddrType::try_from(header.src_type)?;
    let addr_end = COMMON_HEADER_LEN + address_header_len(dst_type, src_type);
    let header_end = header.header_len_bytes();
    if header_end < addr_end {
        return Err(PacketError::InvalidHeaderLength {
            advertised: header_end,
            minimum: addr_end,
        });
    }
    if header_end > buf_len {
        return Err(PacketError::BufferTooSmall {
            at: "path",
            required: header_end,
            actual: buf_len,
        });
    }
    Ok((addr_end, header_end))
}

fn read_isd_as(buf: &[u8], at: usize) -> IsdAs {
    IsdAs::from_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn put(out: &mut [u8], at: &mut usize, bytes: &[u8]) {
    out[*at..*at + bytes.len()].copy_from_slice(bytes);
    *at += bytes.len();
}

impl Codec for ScionCodec {
    fn parse(&self, bytes: Bytes) -> Result<Packet, PacketError> {
        let header = CommonHeader::decode(&bytes)?;
        if header.version != SCION_VERSION {
            return Err(PacketError::UnsupportedVersion(header.version));
        }
        let declared = usize::from(header.total_len);
        if declared != bytes.len() {
            return Err(PacketError::LengthMismatch {
                declared,
                actual: bytes.len(),
            });
        }
        let (addr_end, header_end) = header_bounds(&header, bytes.len())?;

        let dst_type = HostAddrType::try_from(header.dst_type)?;
        let src_type = HostAddrType::try_from(header.src_type)?;
        let mut at = COMMON_HEADER_LEN;
        let dst_ia = read_isd_as(&bytes, at);
        let src_ia = read_isd_as(&bytes, at + ISD_AS_LEN);
        at += 2 * ISD_AS_LEN;
        let dst_host = HostAddr::from_bytes(dst_type, &bytes[at..at + dst_type.len()])?;
        at += dst_type.len();
        let src_host = HostAddr::from_bytes(src_type, &bytes[at..at + src_type.len()])?;

        let path = bytes.slice(addr_end..header_end);
        segment_bounds(&path)?;

        let mut extensions = Vec::new();
        let mut next = header.next_header;
        let mut offset = header_end;
        while let Some(class) = ExtClass::from_header_number(next) {
            let remaining = bytes.len() - offset;
            if remaining < EXT_SUBHEADER_LEN {
                return Err(PacketError::TruncatedExtension {
                    offset,
                    required: EXT_SUBHEADER_LEN,
                    actual: remaining,
                });
            }
            let len = (usize::from(bytes[offset + 1]) + 1) * LINE_LEN;
            if len > remaining {
                return Err(PacketError::TruncatedExtension {
                    offset,
                    required: len,
                    actual: remaining,
                });
            }
            extensions.push(Extension {
                class,
                ext_type: bytes[offset + 2],
                payload: bytes.slice(offset + EXT_SUBHEADER_LEN..offset + len),
            });
            next = bytes[offset];
            offset += len;
        }

        trace!(
            total_len = declared,
            path_len = path.len(),
            exts = extensions.len(),
            l4_proto = next,
            "报文解析完成"
        );

        Ok(Packet {
            header,
            dst: ScionAddr {
                isd_as: dst_ia,
                host: dst_host,
            },
            src: ScionAddr {
                isd_as: src_ia,
                host: src_host,
            },
            path,
            extensions,
            l4: L4Payload {
                proto: next,
                payload: bytes.slice(offset..),
            },
        })
    }

    fn build(
        &self,
        dst: &ScionAddr,
        src: &ScionAddr,
        path: &Path,
        extensions: &[Extension],
        l4: L4Payload,
    ) -> Result<Packet, PacketError> {
        segment_bounds(path.raw())?;
        let header_len_bytes =
            COMMON_HEADER_LEN + address_header_len(dst.host_type(), src.host_type()) + path.len();
        let header_len = u8::try_from(header_len_bytes / LINE_LEN)
            .map_err(|_| PacketError::TooLarge(header_len_bytes))?;

        let mut ext_len = 0;
        for ext in extensions {
            ext.hdr_len()?;
            ext_len += ext.wire_len();
        }
        let total = header_len_bytes + ext_len + l4.len();
        let total_len = u16::try_from(total).map_err(|_| PacketError::TooLarge(total))?;
        let next_header = extensions
            .first()
            .map_or(l4.proto, |ext| ext.class.header_number());

        Ok(Packet {
            header: CommonHeader {
                version: SCION_VERSION,
                dst_type: dst.host_type().into(),
                src_type: src.host_type().into(),
                total_len,
                header_len,
                current_iof: 0,
                current_hof: 0,
                next_header,
            },
            dst: *dst,
            src: *src,
            path: Bytes::copy_from_slice(path.raw()),
            extensions: extensions.to_vec(),
            l4,
        })
    }

    fn serialize(&self, packet: &Packet, out: &mut [u8]) -> Result<usize, PacketError> {
        let declared = usize::from(packet.header.total_len);
        let actual = packet.wire_len();
        if declared != actual {
            return Err(PacketError::LengthMismatch { declared, actual });
        }
        if out.len() < declared {
            return Err(PacketError::BufferTooSmall {
                at: "output",
                required: declared,
                actual: out.len(),
            });
        }
        let addr_end =
            COMMON_HEADER_LEN + address_header_len(packet.dst.host_type(), packet.src.host_type());
        let header_end = addr_end + packet.path.len();
        if packet.header.header_len_bytes() != header_end {
            return Err(PacketError::InvalidHeaderLength {
                advertised: packet.header.header_len_bytes(),
                minimum: header_end,
            });
        }

        let out = &mut out[..declared];
        let header = CommonHeader {
            dst_type: packet.dst.host_type().into(),
            src_type: packet.src.host_type().into(),
            next_header: packet
                .extensions
                .first()
                .map_or(packet.l4.proto, |ext| ext.class.header_number()),
            ..packet.header
        };
        let mut at = 0;
        put(out, &mut at, &header.encode());
        put(out, &mut at, &packet.dst.isd_as.to_bytes());
        put(out, &mut at, &packet.src.isd_as.to_bytes());
        put(out, &mut at, packet.dst.host.as_bytes());
        put(out, &mut at, packet.src.host.as_bytes());
        out[at..addr_end].fill(0);
        at = addr_end;
        put(out, &mut at, &packet.path);

        for (i, ext) in packet.extensions.iter().enumerate() {
            let next = packet
                .extensions
                .get(i + 1)
                .map_or(packet.l4.proto, |n| n.class.header_number());
            let end = at + ext.wire_len();
            put(out, &mut at, &[next, ext.hdr_len()?, ext.ext_type]);
            put(out, &mut at, &ext.payload);
            out[at..end].fill(0);
            at = end;
        }
        put(out, &mut at, &packet.l4.payload);
        debug_assert_eq!(at, declared);
        Ok(declared)
    }

    fn reverse_path(&self, raw: &[u8]) -> Result<Vec<u8>, PacketError> {
        reverse_path(raw)
    }

    fn recompute_offsets(&self, packet: &mut [u8]) -> Result<(), PacketError> {
        let header = CommonHeader::decode(packet)?;
        let (addr_end, header_end) = header_bounds(&header, packet.len())?;
        let (iof, hof) = match first_forwarding_fields(&packet[addr_end..header_end])? {
            Some((iof, hof)) => ((addr_end + iof) / LINE_LEN, (addr_end + hof) / LINE_LEN),
            None => (0, 0),
        };
        // 两个偏移都在首部内，而首部行数放得进 u8
        packet[5] = iof as u8;
        packet[6] = hof as u8;
        Ok(())
    }
}
