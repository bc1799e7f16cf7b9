//! 伪首部校验和
//!
//! SCION 版本的 TCP 伪首部校验和：地址长度随主机地址类型变化（IPv4 4 字节、
//! IPv6 16 字节、SVC 2 字节），不再是 IP 的固定 4 字节。

mod digest;
mod pseudo;

pub use digest::ChecksumDigest;
pub use pseudo::{
    checksum_field, pseudo_checksum, pseudo_checksum_partial, pseudo_header_len,
    verify_pseudo_checksum,
};
