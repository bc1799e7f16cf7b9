//! 覆盖网络帧：首跳前缀 + SCION 报文

use bytes::{BufMut, Bytes, BytesMut};

use crate::addr::{FIRST_HOP_LEN, FirstHop};
use crate::packet::PacketError;

/// 组帧：`首跳前缀 | SCION 报文`。
pub fn encode_frame(first_hop: &FirstHop, packet: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(FIRST_HOP_LEN + packet.len());
    frame.put_slice(&first_hop.encode());
    frame.put_slice(packet);
    frame.freeze()
}

/// 拆帧：返回首跳地址和报文部分（零拷贝切片）。
pub fn split_frame(frame: Bytes) -> Result<(FirstHop, Bytes), PacketError> {
    let first_hop = FirstHop::decode(&frame)?;
    Ok((first_hop, frame.slice(FIRST_HOP_LEN..)))
}
