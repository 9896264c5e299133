use aether_probe::{LatencyProbe, ProbeError, SendState, MAX_DATAGRAM_LEN, PROBE_SEQUENCE};

#[test]
fn test_fixed_timestamps_give_exact_latencies() {
    let mut probe = LatencyProbe::new();

    probe.begin_send(1_000);
    probe.record_send_confirmed(1_500);
    let report = probe.record_receipt(2_200, 16);

    assert_eq!(report.send_latency_us, 500);
    assert_eq!(report.round_trip_us, 1_200);
    assert_eq!(report.payload_len, 16);
}

#[test]
fn test_payload_prefix_matches_pattern_for_all_valid_lengths() {
    let probe = LatencyProbe::new();

    for len in 1..=MAX_DATAGRAM_LEN {
        let payload = probe.payload(len).unwrap();
        assert_eq!(payload.len(), len);
        for (i, byte) in payload.iter().enumerate() {
            assert_eq!(*byte, (i % 256) as u8);
        }
    }
}

#[test]
fn test_payload_length_preconditions() {
    let probe = LatencyProbe::new();

    assert_eq!(probe.payload(0), Err(ProbeError::InvalidLength));
    assert_eq!(
        probe.payload(MAX_DATAGRAM_LEN + 1),
        Err(ProbeError::InvalidLength)
    );
}

#[test]
fn test_ordered_callbacks_give_consistent_intervals() {
    let mut probe = LatencyProbe::new();

    probe.begin_send(42_000);
    assert_eq!(probe.state(), SendState::Sent);

    probe.record_send_confirmed(42_350);
    assert_eq!(probe.state(), SendState::Confirmed);

    let report = probe.record_receipt(43_100, 32);
    assert!(report.round_trip_us >= report.send_latency_us);
}

#[test]
fn test_probe_sequence_constant() {
    // 探测序列是编译期固定的
    assert_eq!(PROBE_SEQUENCE, [16, 16, 32, 64, 128]);
    assert!(PROBE_SEQUENCE.iter().all(|len| *len <= MAX_DATAGRAM_LEN));
}
