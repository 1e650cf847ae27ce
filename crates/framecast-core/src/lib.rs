//! Framecast Core - Foundation types for shared-texture frame broadcast
//!
//! This crate provides the fundamental types used throughout Framecast:
//! - Frame descriptors as handed over by the host per render call
//! - Pixel-format resolution (bit depth × channel layout → broadcast format)
//! - The unified error taxonomy for the render path

pub mod error;
pub mod format;
pub mod frame;

pub use error::{FramecastError, Result};
pub use format::{check_pair, resolve, BroadcastFormat, ResolvedFormat};
pub use frame::{
    BitDepth, ChannelLayout, ComputeStream, DeviceBuffer, FrameDesc, PixelDest, PixelSource,
    RenderWindow, TransferPath,
};
