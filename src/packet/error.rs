//! 报文层错误类型

use crate::addr::AddrError;

/// 报文编解码错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    #[error("buffer too small at {at}: required {required}, actual {actual}")]
    BufferTooSmall {
        at: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("unsupported SCION version: {0}")]
    UnsupportedVersion(u8),

    #[error("total length mismatch: header declares {declared}, packet has {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("invalid header length: advertised {advertised}, minimum {minimum}")]
    InvalidHeaderLength { advertised: usize, minimum: usize },

    #[error("path length {0} is not a multiple of 8")]
    UnalignedPath(usize),

    #[error("path segment at offset {offset} has no hop fields")]
    EmptySegment { offset: usize },

    #[error("path segment {segment} has {hops} hop fields, expected 1 to 255")]
    InvalidHopCount { segment: usize, hops: usize },

    #[error("path segment at offset {offset} needs {required} bytes, path has {actual}")]
    SegmentOverrun {
        offset: usize,
        required: usize,
        actual: usize,
    },

    #[error("extension at offset {offset} needs {required} bytes, packet has {actual}")]
    TruncatedExtension {
        offset: usize,
        required: usize,
        actual: usize,
    },

    #[error("extension payload of {0} bytes is too large")]
    ExtensionTooLarge(usize),

    #[error("packet of {0} bytes exceeds the maximum SCION packet size")]
    TooLarge(usize),

    #[error(transparent)]
    Addr(#[from] AddrError),
}
