//! Pixel-format resolution.
//!
//! Maps the host's (bit depth, channel layout) pair to the shared-texture
//! format the broadcast subsystem understands. Pure lookup, no side
//! effects; three-channel RGB has no shared-texture format and is rejected
//! rather than converted.

use serde::{Deserialize, Serialize};

use crate::error::{FramecastError, Result};
use crate::frame::{BitDepth, ChannelLayout, FrameDesc};

/// Shared-texture pixel formats the broadcast subsystem can advertise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BroadcastFormat {
    /// 8-bit unsigned, 4 channels
    Rgba8,
    /// 16-bit unsigned, 4 channels
    Rgba16,
    /// 16-bit float, 4 channels
    Rgba16F,
    /// 32-bit float, 4 channels
    Rgba32F,
    /// 8-bit unsigned, 1 channel
    R8,
    /// 16-bit unsigned, 1 channel
    R16,
    /// 16-bit float, 1 channel
    R16F,
    /// 32-bit float, 1 channel
    R32F,
}

impl BroadcastFormat {
    /// Bytes per pixel in the shared texture.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgba16 | Self::Rgba16F => 8,
            Self::Rgba32F => 16,
            Self::R8 => 1,
            Self::R16 | Self::R16F => 2,
            Self::R32F => 4,
        }
    }
}

/// A broadcast format together with its pixel footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFormat {
    pub format: BroadcastFormat,
    pub bytes_per_pixel: usize,
}

/// Resolve a clip image's depth and layout to a broadcast format.
///
/// Returns `UnsupportedFormat` for any RGB layout; all four bit depths
/// combined with RGBA or alpha-only are supported.
pub fn resolve(depth: BitDepth, layout: ChannelLayout) -> Result<ResolvedFormat> {
    use BroadcastFormat::*;

    let format = match (depth, layout) {
        (_, ChannelLayout::Rgb) => {
            return Err(FramecastError::UnsupportedFormat(
                "3-channel RGB has no shared-texture format".to_string(),
            ));
        }
        (BitDepth::U8, ChannelLayout::Rgba) => Rgba8,
        (BitDepth::U8, ChannelLayout::Alpha) => R8,
        (BitDepth::U16, ChannelLayout::Rgba) => Rgba16,
        (BitDepth::U16, ChannelLayout::Alpha) => R16,
        (BitDepth::F16, ChannelLayout::Rgba) => Rgba16F,
        (BitDepth::F16, ChannelLayout::Alpha) => R16F,
        (BitDepth::F32, ChannelLayout::Rgba) => Rgba32F,
        (BitDepth::F32, ChannelLayout::Alpha) => R32F,
    };

    Ok(ResolvedFormat {
        format,
        bytes_per_pixel: format.bytes_per_pixel(),
    })
}

/// Validate that source and destination descriptors agree in depth, layout,
/// and pixel dimensions.
///
/// Runs before any broadcast or transfer work; a mismatch aborts the render
/// without touching the subsystem.
pub fn check_pair(src: &FrameDesc, dst: &FrameDesc) -> Result<()> {
    if src.depth != dst.depth || src.layout != dst.layout {
        return Err(FramecastError::FormatMismatch(format!(
            "source {:?}/{:?} vs destination {:?}/{:?}",
            src.depth, src.layout, dst.depth, dst.layout
        )));
    }
    if src.width != dst.width || src.height != dst.height {
        return Err(FramecastError::FormatMismatch(format!(
            "source {}x{} vs destination {}x{}",
            src.width, src.height, dst.width, dst.height
        )));
    }
    Ok(())
}
