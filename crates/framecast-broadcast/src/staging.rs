//! Staging texture lifecycle.
//!
//! One staging texture is cached per plugin instance and superseded, never
//! accumulated. The cache key is the full `TextureDesc` — geometry, format,
//! and usage — so switching the transfer path in either direction
//! reallocates exactly once and then stays stable while the frames keep
//! arriving with the same shape.

use framecast_core::Result;
use tracing::debug;

use crate::sender::{ComputeInterop, InteropId, SenderDevice, StagingUsage, TextureDesc, TextureId};

/// The cached staging texture and its interop registration.
#[derive(Debug, Clone, Copy)]
pub struct StagingTexture {
    pub id: TextureId,
    pub desc: TextureDesc,
    /// Present exactly when usage is `DeviceShared`.
    pub interop: Option<InteropId>,
}

/// Cache of the instance's single staging texture.
#[derive(Default)]
pub struct StagingCache {
    current: Option<StagingTexture>,
    reallocations: u64,
}

impl StagingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times a staging texture has been (re)created. Stable while
    /// incoming frames keep the same geometry, format, and transfer path.
    pub fn reallocations(&self) -> u64 {
        self.reallocations
    }

    /// Make sure a staging texture matching `desc` exists, recreating it if
    /// the cached one differs in any respect.
    ///
    /// Recreation releases the old interop registration before destroying
    /// the old texture, and registers the new texture afterwards when the
    /// usage is device-shareable.
    pub fn ensure<S, I>(
        &mut self,
        sender: &mut S,
        interop: &mut I,
        desc: TextureDesc,
    ) -> Result<StagingTexture>
    where
        S: SenderDevice,
        I: ComputeInterop,
    {
        if let Some(current) = self.current {
            if current.desc == desc {
                return Ok(current);
            }
        }

        self.release(sender, interop);

        debug!(?desc, "allocating staging texture");
        let id = sender.create_staging(&desc)?;
        let registration = match desc.usage {
            StagingUsage::DeviceShared => Some(interop.register(id)?),
            StagingUsage::HostWrite => None,
        };

        let staged = StagingTexture {
            id,
            desc,
            interop: registration,
        };
        self.current = Some(staged);
        self.reallocations += 1;
        Ok(staged)
    }

    /// Drop the cached texture, unregistering interop first. Safe to call
    /// when nothing is cached.
    pub fn release<S, I>(&mut self, sender: &mut S, interop: &mut I)
    where
        S: SenderDevice,
        I: ComputeInterop,
    {
        if let Some(current) = self.current.take() {
            if let Some(registration) = current.interop {
                interop.unregister(registration);
            }
            sender.destroy_staging(current.id);
        }
    }
}
