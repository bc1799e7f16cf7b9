//! 路由查找

use tracing::trace;

use super::NetifId;
use crate::addr::ScionAddr;

/// 路由查询。SCION 的转发由报文携带的路径决定，本地没有路由表，总是返回 `None`。
pub fn route(dst: &ScionAddr) -> Option<NetifId> {
    trace!(%dst, "路由查询（无本地路由）");
    None
}
