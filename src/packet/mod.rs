//! SCION 报文
//!
//! 报文模型、线上编解码、路径与扩展首部。

mod codec;
mod common_header;
mod error;
mod extension;
mod l4;
mod path;

pub use codec::{Codec, Packet, ScionCodec};
pub use common_header::{COMMON_HEADER_LEN, CommonHeader, LINE_LEN, SCION_VERSION};
pub use error::PacketError;
pub use extension::{
    END_TO_END, EXT_SUBHEADER_LEN, ExtClass, Extension, HOP_BY_HOP, ONE_HOP_PATH_TYPE,
    with_one_hop_path,
};
pub use l4::L4Payload;
pub use path::{
    HOP_FIELD_LEN, HOP_VERIFY_ONLY, HOP_XOVER, HopField, INFO_FIELD_LEN, INFO_PEER, INFO_SHORTCUT,
    INFO_UP, InfoField, Path, PathSegment, reverse_path,
};
