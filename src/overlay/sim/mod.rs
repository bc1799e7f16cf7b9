//! 仿真覆盖网络
//!
//! 确定性的内存传输：发送的帧带着到达时间进入事件队列，
//! 按 (时间, 序列号) 的顺序交付给目标主机的入口适配器。

mod in_flight;
mod port;
mod time;
mod world;

pub use in_flight::InFlight;
pub use port::SimPort;
pub use time::SimTime;
pub use world::{Delivery, SimHost, SimOverlay, SimStats};
