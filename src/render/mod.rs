//! Rendering - per-frame data handed to a renderer

mod frame;

pub use frame::FrameData;
