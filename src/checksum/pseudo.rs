//! 伪首部与 TCP 段的校验和计算

use super::ChecksumDigest;
use crate::addr::{ISD_AS_LEN, ScionAddr};

/// 伪首部字节数。ISD-AS 与主机地址长度都是偶数，再加 1 字节协议号和 2 字节长度，
/// 结果总是奇数。
pub fn pseudo_header_len(src: &ScionAddr, dst: &ScionAddr) -> usize {
    2 * ISD_AS_LEN + dst.host.len() + src.host.len() + 3
}

/// 把 [`pseudo_checksum`] 的结果换算成校验和字段的取值（写入时用 `to_be_bytes()`）。
///
/// 伪首部长度为奇数时，段内偶数偏移处的字段（TCP 16、UDP 6）在连续求和中落在
/// 奇数位置，两个字节的权重互换，因此要交换字节序，[`verify_pseudo_checksum`]
/// 才会得到全 1。
pub fn checksum_field(checksum: u16, src: &ScionAddr, dst: &ScionAddr) -> u16 {
    if pseudo_header_len(src, dst) % 2 == 1 {
        checksum.swap_bytes()
    } else {
        checksum
    }
}

/// 按顺序累加伪首部：目的 ISD-AS、源 ISD-AS、目的主机、源主机、协议号、
/// 协议长度（网络字节序）。各块之间不做填充。
fn add_pseudo_header(
    digest: &mut ChecksumDigest,
    src: &ScionAddr,
    dst: &ScionAddr,
    proto: u8,
    proto_len: u16,
) {
    digest
        .add_slice(&dst.isd_as.to_bytes())
        .add_slice(&src.isd_as.to_bytes())
        .add_slice(dst.host.as_bytes())
        .add_slice(src.host.as_bytes())
        .add_u8(proto)
        .add_u16(proto_len);
}

/// 计算 TCP 段的伪首部校验和。
///
/// `fragments` 是段的各个分片（如链式缓冲区），按顺序视为一段连续数据，
/// 紧接在伪首部之后。返回值为主机字节序，写入段前先经 [`checksum_field`] 换算。
pub fn pseudo_checksum<'a, I>(
    fragments: I,
    src: &ScionAddr,
    dst: &ScionAddr,
    proto: u8,
    proto_len: u16,
) -> u16
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut digest = ChecksumDigest::new();
    add_pseudo_header(&mut digest, src, dst, proto, proto_len);
    for frag in fragments {
        digest.add_slice(frag);
    }
    digest.checksum()
}

/// 部分校验和：伪首部总是参与计算，载荷只累加前 `limit` 个字节。
/// `limit` 不小于载荷长度时与 [`pseudo_checksum`] 相同。
pub fn pseudo_checksum_partial<'a, I>(
    fragments: I,
    src: &ScionAddr,
    dst: &ScionAddr,
    proto: u8,
    proto_len: u16,
    limit: u16,
) -> u16
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut digest = ChecksumDigest::new();
    add_pseudo_header(&mut digest, src, dst, proto, proto_len);
    let mut left = usize::from(limit);
    for frag in fragments {
        if left == 0 {
            break;
        }
        let take = frag.len().min(left);
        digest.add_slice(&frag[..take]);
        left -= take;
    }
    digest.checksum()
}

/// 校验接收到的段（校验和字段保留原值）：伪首部加整段的反码和应为全 1。
/// 字段由 [`checksum_field`] 写入时成立。
pub fn verify_pseudo_checksum<'a, I>(
    fragments: I,
    src: &ScionAddr,
    dst: &ScionAddr,
    proto: u8,
    proto_len: u16,
) -> bool
where
    I: IntoIterator<Item = &'a [u8]>,
{
    pseudo_checksum(fragments, src, dst, proto, proto_len) == 0
}
