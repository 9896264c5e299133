#![cfg_attr(not(feature = "simulator"), no_std)]

pub mod hal;
pub mod probe;
pub mod protocol;
pub mod utils;

// 重新导出核心模块
pub use hal::{Hardware, RadioTransport};
pub use probe::{LatencyProbe, ProbeReport, ProbeStats};
pub use protocol::{LinkEvent, NodeId, SendStatus};
pub use utils::{calculate_checksum, AlignedBuffer};
