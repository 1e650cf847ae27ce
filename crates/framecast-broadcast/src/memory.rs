//! In-process reference implementation of the broadcast subsystem.
//!
//! Models the cross-process machinery inside one process: shared textures
//! live in a name-keyed registry, the frame mutex is an atomic access
//! flag, and device buffers are plain byte vectors. Used by the
//! integration tests and by local consumers that want to read frames
//! without a real shared-texture runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use framecast_core::{BroadcastFormat, ComputeStream, DeviceBuffer, FramecastError, Result};
use parking_lot::Mutex;

use crate::sender::{
    ComputeInterop, InteropId, SenderDevice, StagingUsage, TextureDesc, TextureId,
};
use crate::session::SenderFactory;

/// One shared texture advertised under a sender name.
pub struct SharedTexture {
    pixels: Mutex<Vec<u8>>,
    geometry: Mutex<Option<(u32, u32, BroadcastFormat)>>,
    access: AtomicBool,
    frame_count: AtomicU64,
}

impl SharedTexture {
    fn new() -> Self {
        Self {
            pixels: Mutex::new(Vec::new()),
            geometry: Mutex::new(None),
            access: AtomicBool::new(false),
            frame_count: AtomicU64::new(0),
        }
    }

    /// Take the frame mutex. Consumers call this before reading; the
    /// sender skips the frame when it fails.
    pub fn try_acquire(&self) -> bool {
        self.access
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Release the frame mutex.
    pub fn release_access(&self) {
        self.access.store(false, Ordering::Release);
    }

    /// Number of frames signaled so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Acquire)
    }

    /// Current geometry, if the sender has been checked at least once.
    pub fn geometry(&self) -> Option<(u32, u32, BroadcastFormat)> {
        *self.geometry.lock()
    }

    /// Copy of the current pixel contents.
    pub fn snapshot(&self) -> Vec<u8> {
        self.pixels.lock().clone()
    }
}

struct StagingSlot {
    desc: TextureDesc,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct DeviceInner {
    registry: Mutex<HashMap<String, Arc<SharedTexture>>>,
    staging: Mutex<HashMap<u64, StagingSlot>>,
    buffers: Mutex<HashMap<u64, Vec<u8>>>,
    next_id: AtomicU64,
}

/// Process-local stand-in for the GPU device and the cross-process name
/// registry. Cloning shares the underlying state, so a sender, an interop
/// handle, and a consumer built from the same device see each other.
#[derive(Clone, Default)]
pub struct MemoryDevice {
    inner: Arc<DeviceInner>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Consumer-side lookup of an advertised shared texture.
    pub fn lookup(&self, name: &str) -> Option<Arc<SharedTexture>> {
        self.inner.registry.lock().get(name).cloned()
    }

    /// Names currently advertised.
    pub fn sender_names(&self) -> Vec<String> {
        self.inner.registry.lock().keys().cloned().collect()
    }

    /// Allocate a device buffer holding `bytes`. Stands in for
    /// device-resident memory owned by the host.
    pub fn alloc_device_buffer(&self, bytes: Vec<u8>) -> DeviceBuffer {
        let id = self.next_id();
        self.inner.buffers.lock().insert(id, bytes);
        DeviceBuffer(id)
    }

    /// Read a device buffer back to the host.
    pub fn read_device_buffer(&self, buffer: DeviceBuffer) -> Option<Vec<u8>> {
        self.inner.buffers.lock().get(&buffer.0).cloned()
    }
}

/// In-process `SenderDevice`.
pub struct MemorySender {
    device: MemoryDevice,
    name: String,
    device_open: bool,
    format: Option<BroadcastFormat>,
    shared: Option<Arc<SharedTexture>>,
}

impl MemorySender {
    pub fn new(device: MemoryDevice, name: &str) -> Self {
        Self {
            device,
            name: name.to_string(),
            device_open: false,
            format: None,
            shared: None,
        }
    }

    fn shared(&self) -> Result<&Arc<SharedTexture>> {
        self.shared.as_ref().ok_or_else(|| {
            FramecastError::TransferFailed("no shared texture; check_sender not run".to_string())
        })
    }
}

impl SenderDevice for MemorySender {
    fn open_device(&mut self) -> Result<()> {
        self.device_open = true;
        Ok(())
    }

    fn close_device(&mut self) {
        self.device_open = false;
    }

    fn set_format(&mut self, format: BroadcastFormat) {
        self.format = Some(format);
    }

    fn check_sender(&mut self, width: u32, height: u32, format: BroadcastFormat) -> Result<()> {
        if !self.device_open {
            return Err(FramecastError::SenderCheckFailed(
                "device context not open".to_string(),
            ));
        }
        if let Some(declared) = self.format {
            if declared != format {
                return Err(FramecastError::SenderCheckFailed(format!(
                    "declared format {:?} does not match requested {:?}",
                    declared, format
                )));
            }
        }

        let shared = {
            let mut registry = self.device.inner.registry.lock();
            registry
                .entry(self.name.clone())
                .or_insert_with(|| Arc::new(SharedTexture::new()))
                .clone()
        };

        let wanted = Some((width, height, format));
        if shared.geometry() != wanted {
            *shared.geometry.lock() = wanted;
            let size = width as usize * height as usize * format.bytes_per_pixel();
            *shared.pixels.lock() = vec![0u8; size];
        }

        self.shared = Some(shared);
        Ok(())
    }

    fn try_texture_access(&mut self) -> bool {
        match &self.shared {
            Some(shared) => shared.try_acquire(),
            None => false,
        }
    }

    fn allow_texture_access(&mut self) {
        if let Some(shared) = &self.shared {
            shared.release_access();
        }
    }

    fn signal_new_frame(&mut self) {
        if let Some(shared) = &self.shared {
            shared.frame_count.fetch_add(1, Ordering::Release);
        }
    }

    fn release_sender(&mut self) {
        self.device.inner.registry.lock().remove(&self.name);
        self.shared = None;
    }

    fn create_staging(&mut self, desc: &TextureDesc) -> Result<TextureId> {
        let size = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel();
        let id = self.device.next_id();
        self.device.inner.staging.lock().insert(
            id,
            StagingSlot {
                desc: *desc,
                bytes: vec![0u8; size],
            },
        );
        Ok(TextureId(id))
    }

    fn destroy_staging(&mut self, texture: TextureId) {
        self.device.inner.staging.lock().remove(&texture.0);
    }

    fn update_shared_from_host(&mut self, pixels: &[u8], pitch: usize, height: u32) -> Result<()> {
        let shared = self.shared()?.clone();
        let mut dst = shared.pixels.lock();
        if height == 0 || dst.is_empty() {
            return Ok(());
        }
        // Shared rows are packed; the source pitch may carry padding.
        let row_bytes = dst.len() / height as usize;
        for y in 0..height as usize {
            let src_start = y * pitch;
            let dst_start = y * row_bytes;
            if src_start >= pixels.len() || dst_start >= dst.len() {
                break;
            }
            let n = row_bytes
                .min(pitch)
                .min(pixels.len() - src_start)
                .min(dst.len() - dst_start);
            dst[dst_start..dst_start + n].copy_from_slice(&pixels[src_start..src_start + n]);
        }
        Ok(())
    }

    fn copy_shared_from_staging(&mut self, texture: TextureId) -> Result<()> {
        let shared = self.shared()?.clone();
        let staging = self.device.inner.staging.lock();
        let slot = staging.get(&texture.0).ok_or_else(|| {
            FramecastError::TransferFailed(format!("unknown staging texture {:?}", texture))
        })?;
        let mut dst = shared.pixels.lock();
        let len = slot.bytes.len().min(dst.len());
        dst[..len].copy_from_slice(&slot.bytes[..len]);
        Ok(())
    }

    fn flush(&mut self) {}
}

/// In-process `ComputeInterop` over the same device state.
pub struct MemoryInterop {
    device: MemoryDevice,
    registrations: HashMap<u64, TextureId>,
}

impl MemoryInterop {
    pub fn new(device: MemoryDevice) -> Self {
        Self {
            device,
            registrations: HashMap::new(),
        }
    }
}

impl ComputeInterop for MemoryInterop {
    fn register(&mut self, texture: TextureId) -> Result<InteropId> {
        {
            let staging = self.device.inner.staging.lock();
            let slot = staging.get(&texture.0).ok_or_else(|| {
                FramecastError::TransferFailed(format!("unknown staging texture {:?}", texture))
            })?;
            if slot.desc.usage != StagingUsage::DeviceShared {
                return Err(FramecastError::TransferFailed(
                    "staging texture is not device-shareable".to_string(),
                ));
            }
        }
        let id = self.device.next_id();
        self.registrations.insert(id, texture);
        Ok(InteropId(id))
    }

    fn unregister(&mut self, interop: InteropId) {
        self.registrations.remove(&interop.0);
    }

    fn upload_to_texture(
        &mut self,
        interop: InteropId,
        src: DeviceBuffer,
        pitch: usize,
        height: u32,
        _stream: Option<ComputeStream>,
    ) -> Result<()> {
        let texture = *self.registrations.get(&interop.0).ok_or_else(|| {
            FramecastError::TransferFailed(format!("unknown interop registration {:?}", interop))
        })?;

        let buffers = self.device.inner.buffers.lock();
        let source = buffers.get(&src.0).ok_or_else(|| {
            FramecastError::TransferFailed(format!("unknown device buffer {:?}", src))
        })?;

        let mut staging = self.device.inner.staging.lock();
        let slot = staging.get_mut(&texture.0).ok_or_else(|| {
            FramecastError::TransferFailed(format!("unknown staging texture {:?}", texture))
        })?;

        let len = (pitch * height as usize)
            .min(source.len())
            .min(slot.bytes.len());
        slot.bytes[..len].copy_from_slice(&source[..len]);
        Ok(())
    }

    fn copy_device(
        &mut self,
        dst: DeviceBuffer,
        src: DeviceBuffer,
        pitch: usize,
        height: u32,
        _stream: Option<ComputeStream>,
    ) -> Result<()> {
        let mut buffers = self.device.inner.buffers.lock();
        let source = buffers
            .get(&src.0)
            .ok_or_else(|| {
                FramecastError::TransferFailed(format!("unknown device buffer {:?}", src))
            })?
            .clone();

        let target = buffers.get_mut(&dst.0).ok_or_else(|| {
            FramecastError::TransferFailed(format!("unknown device buffer {:?}", dst))
        })?;

        let len = (pitch * height as usize)
            .min(source.len())
            .min(target.len());
        target[..len].copy_from_slice(&source[..len]);
        Ok(())
    }
}

/// Factory binding `MemorySender`s to a shared `MemoryDevice`.
pub struct MemoryFactory {
    device: MemoryDevice,
}

impl MemoryFactory {
    pub fn new(device: MemoryDevice) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &MemoryDevice {
        &self.device
    }
}

impl SenderFactory for MemoryFactory {
    type Sender = MemorySender;

    fn create(&self, name: &str) -> MemorySender {
        MemorySender::new(self.device.clone(), name)
    }
}
