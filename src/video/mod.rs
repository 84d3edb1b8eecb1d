//! Video subsystem module

pub mod capture;
pub mod display;
pub mod frame;
pub mod overlay;

pub use capture::{open_device, FrameSource, StillImageSource, TestPatternSource, UnavailableSource};
pub use display::{load_placeholder, FrameBoard, FrameSink, NullSink, WindowSnapshot};
pub use frame::Frame;
pub use overlay::ClockOverlay;
