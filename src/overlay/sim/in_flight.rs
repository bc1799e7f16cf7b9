//! 在途帧（事件队列元素）

use std::cmp::Ordering;

use bytes::Bytes;

use super::SimTime;
use crate::addr::FirstHop;

/// 在途帧：到达时间、序列号、目标首跳和完整帧（含发送方前缀）。
#[derive(Debug, Clone)]
pub struct InFlight {
    pub at: SimTime,
    pub seq: u64,
    pub to: FirstHop,
    pub frame: Bytes,
}

// BinaryHeap 是 max-heap；需要最早到达优先，因此反向比较。
impl Ord for InFlight {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for InFlight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for InFlight {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for InFlight {}
