pub mod sequence;
pub mod stats;

pub use sequence::{run_sequence, SequenceNotice, INTER_SEND_DELAY_MS, PROBE_SEQUENCE};
pub use stats::ProbeStats;

use crate::protocol::MAX_DATAGRAM_LEN;
use crate::utils::fill_test_pattern;

/// 探测错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    /// 载荷长度超出 (0, 250] 区间
    InvalidLength,
}

/// 单次发送的状态：Sent等待链路层确认，Confirmed已确认。
/// 没有Lost状态：从未被确认的发送会留下过期时间戳，
/// 下一轮计算得到错误的延迟数字，这是已知缺陷而不是特性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Sent,
    Confirmed,
}

/// 一次探测的时间戳三元组（单槽，后写覆盖，不保留历史）
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeSample {
    pub send_initiated_us: u64,
    pub send_confirmed_us: u64,
    pub receipt_confirmed_us: u64,
}

/// 往返延迟报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// 链路层发送确认延迟（微秒）
    pub send_latency_us: u64,
    /// 发起发送到收到回包的往返延迟（微秒）
    pub round_trip_us: u64,
    /// 收到的数据报长度，不一定等于刚发出去的长度
    pub payload_len: usize,
}

/// 延迟探测器：固定模式的测试载荷加一组时间戳。
/// 假设发送严格串行、不重叠，时间戳按最近一次发送归因
pub struct LatencyProbe {
    payload: [u8; MAX_DATAGRAM_LEN],
    sample: ProbeSample,
    state: SendState,
}

impl LatencyProbe {
    /// 创建探测器并填充确定性测试载荷，之后载荷不再修改
    pub fn new() -> Self {
        let mut payload = [0u8; MAX_DATAGRAM_LEN];
        fill_test_pattern(&mut payload);
        Self {
            payload,
            sample: ProbeSample::default(),
            state: SendState::Idle,
        }
    }

    /// 取长度为len的载荷前缀，要求 0 < len <= 250
    pub fn payload(&self, len: usize) -> Result<&[u8], ProbeError> {
        if len == 0 || len > MAX_DATAGRAM_LEN {
            return Err(ProbeError::InvalidLength);
        }
        Ok(&self.payload[..len])
    }

    /// 记录发送发起时刻，必须在把数据报交给传输层之前调用
    pub fn begin_send(&mut self, now_us: u64) {
        self.sample.send_initiated_us = now_us;
        self.state = SendState::Sent;
    }

    /// 链路层发送完成：记录时刻。无论链路层报告成败都记录
    pub fn record_send_confirmed(&mut self, now_us: u64) {
        self.sample.send_confirmed_us = now_us;
        self.state = SendState::Confirmed;
    }

    /// 收包：记录时刻并计算两项延迟。
    /// 发送与回包之间没有关联标识，回包按最近一次发送归因；
    /// 本轮没有发送过、或确认丢失留下过期时间戳时，
    /// 算出的是无意义的数字——链路丢包或乱序时延迟会被
    /// 归到错误的发送上，这里不引入序号方案
    pub fn record_receipt(&mut self, now_us: u64, payload_len: usize) -> ProbeReport {
        self.sample.receipt_confirmed_us = now_us;
        ProbeReport {
            send_latency_us: self
                .sample
                .send_confirmed_us
                .wrapping_sub(self.sample.send_initiated_us),
            round_trip_us: now_us.wrapping_sub(self.sample.send_initiated_us),
            payload_len,
        }
    }

    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn sample(&self) -> &ProbeSample {
        &self.sample
    }
}
