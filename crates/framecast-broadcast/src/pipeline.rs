//! Per-frame transfer pipeline.
//!
//! Two copy strategies selected by where the incoming frame lives:
//!
//! - Host path: the shared texture's subregion is updated straight from
//!   the host buffer, the queue is flushed, and the input is mirrored to
//!   the output with a row-parallel CPU copy.
//! - Device path: pixels go device-to-device through the interop-mapped
//!   staging texture, then a device-side subregion copy lands them in the
//!   shared texture; the passthrough is an async device copy on the
//!   caller's stream.
//!
//! The frame-mutex discipline lives in the session; this component only
//! performs copies. Any failure here is fatal for the current render, and
//! no partial write becomes visible because new-frame is signaled only
//! after the copy succeeds.

use framecast_core::{
    ComputeStream, FrameDesc, FramecastError, PixelDest, PixelSource, RenderWindow,
    ResolvedFormat, Result,
};
use rayon::prelude::*;

use crate::sender::{ComputeInterop, SenderDevice, StagingUsage, TextureDesc};
use crate::staging::StagingCache;

/// Moves each frame into the shared texture and mirrors it to the output.
pub struct TransferPipeline<I: ComputeInterop> {
    interop: I,
    staging: StagingCache,
}

impl<I: ComputeInterop> TransferPipeline<I> {
    pub fn new(interop: I) -> Self {
        Self {
            interop,
            staging: StagingCache::new(),
        }
    }

    /// Staging reallocation count, for callers tracking churn.
    pub fn staging_reallocations(&self) -> u64 {
        self.staging.reallocations()
    }

    pub fn interop(&self) -> &I {
        &self.interop
    }

    pub fn interop_mut(&mut self) -> &mut I {
        &mut self.interop
    }

    /// Stage the source pixels and copy them into the shared texture.
    /// Runs while the session holds the frame mutex.
    pub fn stage_and_copy<S: SenderDevice>(
        &mut self,
        sender: &mut S,
        resolved: ResolvedFormat,
        desc: &FrameDesc,
        src: &PixelSource<'_>,
        stream: Option<ComputeStream>,
    ) -> Result<()> {
        let usage = StagingUsage::for_path(src.path());
        let staged = self.staging.ensure(
            sender,
            &mut self.interop,
            TextureDesc {
                width: desc.width,
                height: desc.height,
                format: resolved.format,
                usage,
            },
        )?;

        let packed = desc.width as usize * resolved.bytes_per_pixel;

        match src {
            PixelSource::Host(pixels) => {
                if desc.height > 0 {
                    let needed = desc.row_stride * (desc.height as usize - 1) + packed;
                    if pixels.len() < needed {
                        return Err(FramecastError::TransferFailed(format!(
                            "host buffer holds {} bytes, frame needs {}",
                            pixels.len(),
                            needed
                        )));
                    }
                }
                sender.update_shared_from_host(pixels, desc.row_stride, desc.height)?;
            }
            PixelSource::Device(buffer) => {
                let registration = staged.interop.ok_or_else(|| {
                    FramecastError::TransferFailed(
                        "device-shared staging texture has no interop registration".to_string(),
                    )
                })?;
                self.interop
                    .upload_to_texture(registration, *buffer, packed, desc.height, stream)?;
                sender.copy_shared_from_staging(staged.id)?;
            }
        }

        sender.flush();
        Ok(())
    }

    /// Mirror the input to the plugin's output so the host's compositing
    /// chain continues unaffected. Host-resident frames copy on the CPU,
    /// row-parallel over the render window; device-resident frames copy
    /// asynchronously on the caller's stream.
    pub fn mirror_to_output(
        &mut self,
        src_desc: &FrameDesc,
        dst_desc: &FrameDesc,
        resolved: ResolvedFormat,
        window: RenderWindow,
        src: &PixelSource<'_>,
        dst: &mut PixelDest<'_>,
        stream: Option<ComputeStream>,
    ) -> Result<()> {
        match (src, dst) {
            (PixelSource::Host(src_px), PixelDest::Host(dst_px)) => copy_rows(
                src_px,
                dst_px,
                src_desc.row_stride,
                dst_desc.row_stride,
                resolved.bytes_per_pixel,
                window,
            ),
            (PixelSource::Device(src_buf), PixelDest::Device(dst_buf)) => {
                let pitch = dst_desc.width as usize * resolved.bytes_per_pixel;
                self.interop
                    .copy_device(*dst_buf, *src_buf, pitch, dst_desc.height, stream)
            }
            (src, dst) => Err(FramecastError::TransferFailed(format!(
                "source ({:?}) and output ({:?}) clips reside in different memory domains",
                src.path(),
                dst.path()
            ))),
        }
    }

    /// Release the staging texture and its interop registration.
    pub fn release<S: SenderDevice>(&mut self, sender: &mut S) {
        self.staging.release(sender, &mut self.interop);
    }
}

/// Byte-for-byte copy of the window region, parallel over rows. Each row's
/// source and destination are disjoint, so rows split freely across
/// threads.
fn copy_rows(
    src: &[u8],
    dst: &mut [u8],
    src_stride: usize,
    dst_stride: usize,
    bytes_per_pixel: usize,
    window: RenderWindow,
) -> Result<()> {
    if window.width() == 0 || window.height() == 0 {
        return Ok(());
    }

    let x_offset = window.x1 as usize * bytes_per_pixel;
    let row_bytes = window.width() as usize * bytes_per_pixel;

    let src_needed = (window.y2 as usize - 1) * src_stride + x_offset + row_bytes;
    let dst_needed = (window.y2 as usize - 1) * dst_stride + x_offset + row_bytes;
    if src.len() < src_needed || dst.len() < dst_needed {
        return Err(FramecastError::TransferFailed(format!(
            "window {:?} exceeds pixel buffers ({} src / {} dst bytes)",
            window,
            src.len(),
            dst.len()
        )));
    }

    dst.par_chunks_mut(dst_stride)
        .skip(window.y1 as usize)
        .take(window.height() as usize)
        .zip(
            src.par_chunks(src_stride)
                .skip(window.y1 as usize)
                .take(window.height() as usize),
        )
        .for_each(|(dst_row, src_row)| {
            dst_row[x_offset..x_offset + row_bytes]
                .copy_from_slice(&src_row[x_offset..x_offset + row_bytes]);
        });

    Ok(())
}
