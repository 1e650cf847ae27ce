//! Trait boundary to the shared-texture subsystem and the compute-interop
//! layer.
//!
//! These two traits are the entire surface the render path consumes; the
//! real broadcast library and device runtime live behind them. Any call
//! failure maps into the render-path error taxonomy (`TransferFailed`
//! unless a more specific variant applies).

use framecast_core::{BroadcastFormat, ComputeStream, DeviceBuffer, Result, TransferPath};

/// Handle to a staging texture created on the sender's device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to a compute-interop registration of a staging texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InteropId(pub u64);

/// How a staging texture will be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagingUsage {
    /// Host uploads pixels; write-only from CPU.
    HostWrite,
    /// Device-shareable; written through the compute-interop layer.
    DeviceShared,
}

impl StagingUsage {
    /// Usage implied by where the frame's pixels live.
    pub fn for_path(path: TransferPath) -> Self {
        match path {
            TransferPath::Host => Self::HostWrite,
            TransferPath::Device => Self::DeviceShared,
        }
    }
}

/// Geometry, format, and usage of a staging texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: BroadcastFormat,
    pub usage: StagingUsage,
}

/// One named shared-texture sender plus the device context behind it.
///
/// The advertised name is fixed at creation; renaming a broadcast means
/// dropping the sender and creating a new one.
pub trait SenderDevice {
    /// Open (or re-open) the device context. Idempotent; failure is the
    /// per-frame recoverable `DeviceOpenFailed` condition.
    fn open_device(&mut self) -> Result<()>;

    /// Close the device context. Safe to call when not open.
    fn close_device(&mut self);

    /// Declare the pixel format the shared texture will carry.
    fn set_format(&mut self, format: BroadcastFormat);

    /// Validate or (re)create the shared resource at the given geometry.
    /// Failure is `SenderCheckFailed`.
    fn check_sender(&mut self, width: u32, height: u32, format: BroadcastFormat) -> Result<()>;

    /// Try to take the cross-process frame mutex guarding the shared
    /// texture. `false` means a consumer is mid-read; the frame is skipped.
    fn try_texture_access(&mut self) -> bool;

    /// Release the frame mutex. Must follow a successful
    /// `try_texture_access`, copy or no copy.
    fn allow_texture_access(&mut self);

    /// Mark a new frame available to consumers. Called only while the
    /// frame mutex is held and only after a successful copy.
    fn signal_new_frame(&mut self);

    /// Unregister the sender name and release the shared resource.
    fn release_sender(&mut self);

    /// Create a staging texture on this sender's device.
    fn create_staging(&mut self, desc: &TextureDesc) -> Result<TextureId>;

    /// Destroy a staging texture. Ignores handles already destroyed.
    fn destroy_staging(&mut self, texture: TextureId);

    /// Update the shared texture's pixel subregion directly from a host
    /// buffer; `pitch` is the source buffer's row stride in bytes.
    fn update_shared_from_host(&mut self, pixels: &[u8], pitch: usize, height: u32) -> Result<()>;

    /// Device-side subregion copy from a staging texture into the shared
    /// texture.
    fn copy_shared_from_staging(&mut self, texture: TextureId) -> Result<()>;

    /// Flush the device command queue so the shared-texture update is
    /// visible to consumers on other contexts.
    fn flush(&mut self);
}

/// Compute-interop operations for the device-memory transfer path.
pub trait ComputeInterop {
    /// Register a device-shareable staging texture with the interop layer.
    /// One registration per texture allocation.
    fn register(&mut self, texture: TextureId) -> Result<InteropId>;

    /// Drop a registration. Must happen before the texture is destroyed.
    fn unregister(&mut self, interop: InteropId);

    /// Map the registered texture, copy `height` rows of `pitch` bytes from
    /// the source device buffer into its backing array, and unmap. Issued
    /// asynchronously on `stream` when one is given.
    fn upload_to_texture(
        &mut self,
        interop: InteropId,
        src: DeviceBuffer,
        pitch: usize,
        height: u32,
        stream: Option<ComputeStream>,
    ) -> Result<()>;

    /// Device-to-device copy of `height` rows of `pitch` bytes, used for
    /// the output passthrough when both clips are device-resident.
    fn copy_device(
        &mut self,
        dst: DeviceBuffer,
        src: DeviceBuffer,
        pitch: usize,
        height: u32,
        stream: Option<ComputeStream>,
    ) -> Result<()>;
}
