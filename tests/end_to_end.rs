//! Loopback tests of a full send channel feeding a receive channel

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;

use lan_video_streamer::{
    channels::{ReceiveChannel, SendChannel, Shown},
    config::{CaptureSource, DisplayConfig, NetworkConfig, ReceivePolicy, ReceiverChannelConfig, SenderChannelConfig},
    video::{Frame, FrameSink, FrameSource, TestPatternSource, UnavailableSource},
};

/// Remembers the size of everything shown, in order
#[derive(Clone, Default)]
struct Recorder {
    shown: Arc<Mutex<Vec<Option<(u32, u32)>>>>,
}

impl Recorder {
    fn sizes(&self) -> Vec<Option<(u32, u32)>> {
        self.shown.lock().clone()
    }
}

impl FrameSink for Recorder {
    fn show(&mut self, _window: &str, frame: &Frame) {
        self.shown.lock().push(frame.dimensions());
    }
}

fn display() -> DisplayConfig {
    DisplayConfig {
        placeholder_width: 64,
        placeholder_height: 48,
        display_delay_ms: 0,
        ..Default::default()
    }
}

fn receive_channel(policy: ReceivePolicy, recorder: &Recorder) -> (ReceiveChannel, SocketAddr) {
    let config = ReceiverChannelConfig {
        window_name: "Streaming Video 0".into(),
        port: 0,
        overlay_clock: true,
        policy,
    };
    let mut channel =
        ReceiveChannel::new(config, &NetworkConfig::default(), &display(), Box::new(recorder.clone())).unwrap();
    channel.bind().unwrap();
    let port = channel.local_addr().unwrap().port();
    (channel, SocketAddr::from(([127, 0, 0, 1], port)))
}

fn send_channel(to: SocketAddr, source: Box<dyn FrameSource>) -> SendChannel {
    let config = SenderChannelConfig {
        name: "Camera 0".into(),
        destination: to.ip(),
        port: to.port(),
        camera_index: 0,
        scale: 0.6,
        quality: 60,
        overlay_clock: true,
        capture: CaptureSource::TestPattern { width: 640, height: 480, fps: 1000 },
        ..Default::default()
    };
    let mut channel = SendChannel::new(config, &NetworkConfig::default(), source, None).unwrap();
    channel.bind().unwrap();
    channel
}

fn camera() -> Box<dyn FrameSource> {
    Box::new(TestPatternSource::new(0, 640, 480, 1000).unwrap())
}

#[test]
fn test_vga_frame_arrives_downscaled() {
    let recorder = Recorder::default();
    let (mut receiver, addr) = receive_channel(ReceivePolicy::Blocking, &recorder);
    let mut sender = send_channel(addr, camera());

    let sent = sender.run_once().unwrap();
    assert!(sent > 0 && sent <= 65507);

    assert_eq!(receiver.run_once(), Shown::Frame);
    assert_eq!(recorder.sizes(), vec![Some((384, 288))]);
}

#[test]
fn test_silence_shows_placeholder_not_stale_frame() {
    let recorder = Recorder::default();
    let (mut receiver, addr) =
        receive_channel(ReceivePolicy::TimeoutWithFallback { timeout_ms: 200 }, &recorder);
    let mut sender = send_channel(addr, camera());

    sender.run_once().unwrap();
    assert_eq!(receiver.run_once(), Shown::Frame);
    assert_eq!(receiver.run_once(), Shown::Placeholder);

    assert_eq!(recorder.sizes(), vec![Some((384, 288)), Some((64, 48))]);
    assert_eq!(receiver.stats().timeouts, 1);
}

#[test]
fn test_missing_camera_shows_placeholder() {
    let recorder = Recorder::default();
    let (mut receiver, addr) =
        receive_channel(ReceivePolicy::TimeoutWithFallback { timeout_ms: 2000 }, &recorder);
    let mut sender = send_channel(addr, Box::new(UnavailableSource::new("camera 0 not found")));

    assert_eq!(sender.run_once().unwrap(), 0);
    assert_eq!(receiver.run_once(), Shown::Placeholder);
    assert_eq!(receiver.stats().absent_frames, 1);
    assert_eq!(receiver.stats().timeouts, 0);
}

#[test]
fn test_frames_shown_in_arrival_order() {
    let recorder = Recorder::default();
    let (mut receiver, addr) = receive_channel(ReceivePolicy::Blocking, &recorder);
    let mut sender = send_channel(addr, camera());
    let mut blank = send_channel(addr, Box::new(UnavailableSource::new("off")));

    sender.run_once().unwrap();
    blank.run_once().unwrap();
    sender.run_once().unwrap();

    assert_eq!(receiver.run_once(), Shown::Frame);
    assert_eq!(receiver.run_once(), Shown::Nothing);
    assert_eq!(receiver.run_once(), Shown::Frame);
    assert_eq!(recorder.sizes(), vec![Some((384, 288)), Some((384, 288))]);
}
