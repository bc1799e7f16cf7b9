//! 网络层配置

use serde::{Deserialize, Serialize};

use super::SCION_DEFAULT_MTU;
use crate::tcp::TCP_HLEN;

/// 网络层配置（JSON）
///
/// ```json
/// { "mtu": 1472, "min_segment_len": 20 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpConfig {
    /// 超过该长度的出口报文会记录告警（仍然发送）
    pub mtu: usize,
    /// 入口交给 TCP 引擎的最短段长
    pub min_segment_len: usize,
}

impl Default for IpConfig {
    fn default() -> Self {
        Self {
            mtu: SCION_DEFAULT_MTU,
            min_segment_len: TCP_HLEN,
        }
    }
}

impl IpConfig {
    /// 从 JSON 文本加载，缺省字段取默认值
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
