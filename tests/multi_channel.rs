//! Orchestrator tests with several channels running side by side

use crossbeam_channel::Receiver;
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use lan_video_streamer::{
    channels::{ChannelEvent, ChannelRole, StreamOrchestrator},
    codec::compress_jpeg,
    config::{DisplayConfig, NetworkConfig, ReceivePolicy, ReceiverChannelConfig},
    video::FrameBoard,
};

fn display() -> DisplayConfig {
    DisplayConfig {
        placeholder_width: 32,
        placeholder_height: 24,
        display_delay_ms: 0,
        ..Default::default()
    }
}

fn receiver(name: &str, port: u16) -> ReceiverChannelConfig {
    ReceiverChannelConfig {
        window_name: name.into(),
        port,
        overlay_clock: false,
        policy: ReceivePolicy::Blocking,
    }
}

fn collect_events(events: &Receiver<ChannelEvent>, count: usize) -> Vec<ChannelEvent> {
    (0..count)
        .map(|_| events.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect()
}

#[test]
fn test_port_collision_fails_only_one_channel() {
    // Hold a port so the first receiver cannot bind it.
    let squatter = UdpSocket::bind("0.0.0.0:0").unwrap();
    let taken = squatter.local_addr().unwrap().port();

    let board = FrameBoard::new();
    let mut orchestrator = StreamOrchestrator::new(NetworkConfig::default(), display());
    let events = orchestrator.events();
    orchestrator
        .start_receivers(&[receiver("blocked", taken), receiver("open", 0)], &board)
        .unwrap();
    assert_eq!(orchestrator.channel_count(), 2);

    let mut open_addr = None;
    let mut failed = Vec::new();
    for event in collect_events(&events, 2) {
        match event {
            ChannelEvent::Started { name, local_addr, .. } => {
                assert_eq!(name, "open");
                open_addr = local_addr;
            }
            ChannelEvent::BindFailed { name, role, .. } => {
                assert_eq!(role, ChannelRole::Receive);
                failed.push(name);
            }
            ChannelEvent::Stopped { .. } => panic!("nothing should have stopped yet"),
        }
    }
    assert_eq!(failed, vec!["blocked".to_string()]);

    let port = open_addr.unwrap().port();
    let jpeg = compress_jpeg(&image::RgbImage::new(48, 36), 60).unwrap();
    let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
    sender.send_to(&jpeg, SocketAddr::from(([127, 0, 0, 1], port))).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while board.updates("open") == 0 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert_eq!(board.latest("open").unwrap().dimensions(), Some((48, 36)));
    assert_eq!(board.updates("blocked"), 0);

    orchestrator.stop_all();
    orchestrator.join_all();
    assert_eq!(
        collect_events(&events, 1),
        vec![ChannelEvent::Stopped { name: "open".into(), role: ChannelRole::Receive }]
    );
}

#[test]
fn test_stop_all_ends_every_channel() {
    let board = FrameBoard::new();
    let mut orchestrator = StreamOrchestrator::new(NetworkConfig::default(), display());
    let events = orchestrator.events();

    let mut configs = vec![receiver("a", 0), receiver("b", 0)];
    configs.push(ReceiverChannelConfig {
        policy: ReceivePolicy::TimeoutWithFallback { timeout_ms: 50 },
        ..receiver("c", 0)
    });
    orchestrator.start_receivers(&configs, &board).unwrap();

    let started = collect_events(&events, 3);
    assert!(started.iter().all(|e| matches!(e, ChannelEvent::Started { .. })));

    orchestrator.stop_all();
    orchestrator.join_all();

    let stopped = collect_events(&events, 3);
    assert!(stopped.iter().all(|e| matches!(e, ChannelEvent::Stopped { .. })));
    assert!(!orchestrator.is_running());
}
