//! SCION 地址
//!
//! ISD-AS 标识、变长主机地址，以及分发器交上来的每个帧前面的首跳覆盖地址。

mod first_hop;
mod host;
mod isd_as;
mod scion_addr;

pub use first_hop::{FIRST_HOP_LEN, FirstHop};
pub use host::{HostAddr, HostAddrType, MAX_HOST_ADDR_LEN};
pub use isd_as::{ISD_AS_LEN, IsdAs};
pub use scion_addr::ScionAddr;

/// 地址解码或解析错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
    #[error("ISD {0} does not fit in 12 bits")]
    IsdOutOfRange(u32),

    #[error("AS {0} does not fit in 20 bits")]
    AsOutOfRange(u64),

    #[error("unknown host address type: {0}")]
    UnknownHostType(u8),

    #[error("host address of type {ty:?} needs {expected} bytes, got {actual}")]
    HostLength {
        ty: HostAddrType,
        expected: usize,
        actual: usize,
    },

    #[error("first hop needs {FIRST_HOP_LEN} bytes, got {0}")]
    FirstHopTooShort(usize),

    #[error("unknown first hop address family: {0}")]
    FirstHopFamily(u8),

    #[error("cannot parse address {0:?}")]
    Syntax(String),
}
