use crate::hal::{Hardware, RadioTransport};
use crate::probe::stats::ProbeStats;
use crate::probe::{LatencyProbe, ProbeReport};
use crate::protocol::{LinkEvent, NodeId};
use crate::utils::{calculate_checksum, verify_test_pattern};

/// 固定探测序列：各次发送的载荷长度
pub const PROBE_SEQUENCE: [usize; 5] = [16, 16, 32, 64, 128];

/// 相邻两次发送之间的间隔窗口（毫秒），
/// 同时是等待本次发送异步事件的超时窗口。
/// 这只是经验余量，不构成时序保证
pub const INTER_SEND_DELAY_MS: u32 = 10;

/// 序列执行过程中上报给调用方的通知
#[derive(Debug, Clone, Copy)]
pub enum SequenceNotice {
    /// 载荷长度不合法，本次探测被跳过
    SubmitRejected { len: usize },
    /// 传输层拒绝了发送请求，记录后继续下一次探测
    SubmitFailed { len: usize },
    /// 收到回包，产出一份延迟报告
    RoundTrip {
        report: ProbeReport,
        /// 回包内容是否仍是确定性测试模式
        pattern_ok: bool,
        /// 回包载荷的CRC-16摘要，便于两端日志比对
        checksum: u16,
    },
}

/// 执行固定探测序列。
/// 每次发送后在间隔窗口内带超时地消费链路事件，
/// 窗口走完就开始下一次发送，不等待迟到的确认；
/// 固定发出序列里的每一包，与确认是否按时到达无关
pub fn run_sequence<H: Hardware>(
    hardware: &mut H,
    probe: &mut LatencyProbe,
    stats: &mut ProbeStats,
    mut notify: impl FnMut(SequenceNotice),
) {
    for &len in PROBE_SEQUENCE.iter() {
        let send_initiated = hardware.get_timestamp_us().unwrap_or(0);
        probe.begin_send(send_initiated);

        match probe.payload(len) {
            Ok(payload) => match hardware.get_radio().send_datagram(NodeId::BROADCAST, payload) {
                Ok(()) => stats.record_sent(),
                Err(_) => {
                    // 即发即忘：提交失败不重试，记录后继续
                    stats.record_submit_failure();
                    notify(SequenceNotice::SubmitFailed { len });
                }
            },
            Err(_) => notify(SequenceNotice::SubmitRejected { len }),
        }

        // 在间隔窗口内消费异步事件，窗口本身就是发送间隔
        let window_end = send_initiated + u64::from(INTER_SEND_DELAY_MS) * 1_000;
        loop {
            let now = hardware.get_timestamp_us().unwrap_or(window_end);
            if now >= window_end {
                break;
            }
            let wait_ms = ((window_end - now + 999) / 1_000) as u32;

            let event = match hardware.get_radio().wait_event(wait_ms) {
                Some(event) => event,
                None => break,
            };
            let stamp = hardware.get_timestamp_us().unwrap_or(now);

            match event {
                LinkEvent::SendComplete { status, .. } => {
                    probe.record_send_confirmed(stamp);
                    stats.record_confirmed(status);
                }
                LinkEvent::Received { data, .. } => {
                    let report = probe.record_receipt(stamp, data.len());
                    stats.record_round_trip(&report);
                    notify(SequenceNotice::RoundTrip {
                        report,
                        pattern_ok: verify_test_pattern(&data),
                        checksum: calculate_checksum(&data),
                    });
                }
            }
        }
    }
}
