//! Frame descriptors handed across the host boundary.
//!
//! One `FrameDesc` is produced by the host for every render call and owned
//! by that call alone; nothing here is persisted between frames.

use serde::{Deserialize, Serialize};

/// Per-component bit depth of a clip image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitDepth {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 16-bit half float
    F16,
    /// 32-bit float
    F32,
}

impl BitDepth {
    /// Bytes per color component.
    pub fn bytes_per_component(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 | Self::F16 => 2,
            Self::F32 => 4,
        }
    }
}

/// Channel layout of a clip image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    Rgba,
    Rgb,
    Alpha,
}

impl ChannelLayout {
    /// Number of interleaved components per pixel.
    pub fn channel_count(self) -> usize {
        match self {
            Self::Rgba => 4,
            Self::Rgb => 3,
            Self::Alpha => 1,
        }
    }
}

/// Geometry and format of one clip image for one render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDesc {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Per-component bit depth
    pub depth: BitDepth,
    /// Interleaved channel layout
    pub layout: ChannelLayout,
    /// Bytes per row as laid out in the buffer (may include padding)
    pub row_stride: usize,
}

impl FrameDesc {
    /// Bytes per row without padding for this geometry.
    pub fn packed_row_bytes(&self) -> usize {
        self.width as usize * self.depth.bytes_per_component() * self.layout.channel_count()
    }
}

/// Integer pixel rectangle of the region to render, half-open on x2/y2.
///
/// Rows inside the window are disjoint between source and destination, so
/// the passthrough copy parallelizes over them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderWindow {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl RenderWindow {
    /// Window covering a full frame of the given dimensions.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x1: 0,
            y1: 0,
            x2: width,
            y2: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

/// Opaque handle naming device-resident pixel memory.
///
/// Only meaningful to the compute-interop implementation the instance was
/// built with; the core never dereferences it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceBuffer(pub u64);

/// Opaque handle to a host-supplied asynchronous compute queue.
///
/// Its presence on a render call selects the device transfer path. Ordering
/// of async copies issued against it relative to later host work on the
/// same queue is the host's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComputeStream(pub u64);

/// Which copy strategy moves pixels for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferPath {
    /// Frame lives in host memory; upload from CPU.
    Host,
    /// Frame lives in device memory; device-to-device copies only.
    Device,
}

/// Location-specific source pixel buffer for one render call.
pub enum PixelSource<'a> {
    Host(&'a [u8]),
    Device(DeviceBuffer),
}

impl PixelSource<'_> {
    pub fn path(&self) -> TransferPath {
        match self {
            Self::Host(_) => TransferPath::Host,
            Self::Device(_) => TransferPath::Device,
        }
    }
}

/// Location-specific destination pixel buffer for one render call.
pub enum PixelDest<'a> {
    Host(&'a mut [u8]),
    Device(DeviceBuffer),
}

impl PixelDest<'_> {
    pub fn path(&self) -> TransferPath {
        match self {
            Self::Host(_) => TransferPath::Host,
            Self::Device(_) => TransferPath::Device,
        }
    }
}
