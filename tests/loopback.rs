use std::thread;
use std::time::Instant;

use common::hal::simulator::{SimChannel, SimHardware, SimulatorError};
use common::hal::{Hardware, RadioTransport};
use common::probe::{
    run_sequence, LatencyProbe, ProbeStats, SequenceNotice, INTER_SEND_DELAY_MS, PROBE_SEQUENCE,
};
use common::protocol::{LinkEvent, NodeId};

fn sim_node(air: &SimChannel, id: [u8; 6]) -> SimHardware {
    SimHardware::new(NodeId::new(id), air.clone())
}

#[test]
fn test_initialize_twice_is_an_explicit_error() {
    let air = SimChannel::new();
    let mut node = sim_node(&air, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);

    let radio = node.get_radio();
    assert!(radio.initialize().is_ok());
    assert_eq!(radio.initialize(), Err(SimulatorError::AlreadyInitialized));
}

#[test]
fn test_sequence_issues_five_sends_with_spacing_even_without_replies() {
    let air = SimChannel::new();
    let mut sender = sim_node(&air, [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6]);
    // 旁观节点只收不回
    let mut observer = sim_node(&air, [0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6]);

    observer.get_radio().initialize().unwrap();
    let radio = sender.get_radio();
    radio.initialize().unwrap();
    radio.add_broadcast_peer(NodeId::BROADCAST).unwrap();

    let mut probe = LatencyProbe::new();
    let mut stats = ProbeStats::new();
    let started = Instant::now();
    run_sequence(&mut sender, &mut probe, &mut stats, |_| {});
    let elapsed = started.elapsed();

    // 没有回包也照发整个序列
    assert_eq!(stats.sent(), 5);
    assert_eq!(stats.confirmed(), 5);
    assert_eq!(stats.replies(), 0);

    // 每次发送之间有一个完整的间隔窗口
    let expected_ms = u128::from(INTER_SEND_DELAY_MS) * PROBE_SEQUENCE.len() as u128;
    assert!(
        elapsed.as_millis() >= expected_ms - 5,
        "序列耗时 {}ms，应不少于 {}ms",
        elapsed.as_millis(),
        expected_ms
    );

    // 旁观节点按顺序收到的正好是整个序列
    let mut received = Vec::new();
    while let Some(event) = observer.get_radio().poll_event() {
        if let LinkEvent::Received { data, .. } = event {
            received.push(data.len());
        }
    }
    assert_eq!(received, PROBE_SEQUENCE.to_vec());
}

#[test]
fn test_loopback_round_trip_reports() {
    let air = SimChannel::new();
    let mut sender = sim_node(&air, [0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0xA6]);
    let mut echo = sim_node(&air, [0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6]);

    {
        let radio = echo.get_radio();
        radio.initialize().unwrap();
        radio.add_broadcast_peer(NodeId::BROADCAST).unwrap();
    }

    // 回显对端：收到什么播回什么，一段时间没有新包就退出
    let handle = thread::spawn(move || loop {
        match echo.get_radio().wait_event(200) {
            Some(LinkEvent::Received { data, .. }) => {
                let _ = echo.get_radio().send_datagram(NodeId::BROADCAST, &data);
            }
            Some(_) => {}
            None => break,
        }
    });

    {
        let radio = sender.get_radio();
        radio.initialize().unwrap();
        radio.add_broadcast_peer(NodeId::BROADCAST).unwrap();
    }

    let mut probe = LatencyProbe::new();
    let mut stats = ProbeStats::new();
    let mut reports = Vec::new();
    run_sequence(&mut sender, &mut probe, &mut stats, |notice| {
        if let SequenceNotice::RoundTrip {
            report,
            pattern_ok,
            ..
        } = notice
        {
            // 回显载荷必须原样保持测试模式
            assert!(pattern_ok);
            reports.push(report);
        }
    });
    handle.join().unwrap();

    assert_eq!(stats.sent(), 5);
    assert!(stats.replies() >= 1, "至少应观察到一次完整往返");
    assert_eq!(stats.replies() as usize, reports.len());

    for report in &reports {
        assert!(report.round_trip_us >= report.send_latency_us);
        assert!(PROBE_SEQUENCE.contains(&report.payload_len));
    }
    assert!(stats.min_rtt_us() <= stats.avg_rtt_us());
    assert!(stats.avg_rtt_us() <= stats.max_rtt_us());
}

#[test]
fn test_send_preconditions_over_simulator() {
    let air = SimChannel::new();
    let mut node = sim_node(&air, [0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F]);

    let radio = node.get_radio();
    assert_eq!(
        radio.send_datagram(NodeId::BROADCAST, &[0u8; 4]),
        Err(SimulatorError::NotInitialized)
    );

    radio.initialize().unwrap();
    assert_eq!(
        radio.send_datagram(NodeId::BROADCAST, &[0u8; 4]),
        Err(SimulatorError::PeerNotRegistered)
    );

    radio.add_broadcast_peer(NodeId::BROADCAST).unwrap();
    assert!(radio.send_datagram(NodeId::BROADCAST, &[0u8; 4]).is_ok());
}
