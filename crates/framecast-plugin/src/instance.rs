//! The long-lived plugin instance.
//!
//! One instance exists per clip placement in the host's timeline. It owns
//! the broadcast session and the transfer pipeline and is driven entirely
//! by host calls: `render` once per frame (serialized per instance by the
//! host), `changed_param` on edits, `close` on teardown. The broadcast
//! session is never constructed eagerly — the host may not have settled
//! parameter values at instance construction time — so all external
//! resources are acquired on the first frame that needs them.

use framecast_broadcast::{
    ComputeInterop, PublishOutcome, SenderFactory, SessionManager, TransferPipeline,
};
use framecast_core::{format, FramecastError, Result};
use tracing::warn;

use crate::descriptor::{DEFAULT_SENDER_NAME, PARAM_SENDER_NAME};
use crate::host::RenderArgs;

/// What one render call did, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Broadcast and passthrough both completed.
    Published,
    /// A consumer held the frame mutex; passthrough completed, broadcast
    /// skipped.
    SkippedBusy,
    /// The device context could not be opened; the frame was dropped
    /// without output. Possibly transient, retried naturally next frame.
    Dropped,
}

/// Plugin instance: owns a broadcast session and a staging pipeline.
pub struct SenderInstance<F: SenderFactory, I: ComputeInterop> {
    session: SessionManager<F>,
    pipeline: TransferPipeline<I>,
    sender_name: String,
}

impl<F: SenderFactory, I: ComputeInterop> SenderInstance<F, I> {
    pub fn new(factory: F, interop: I) -> Self {
        Self {
            session: SessionManager::new(factory),
            pipeline: TransferPipeline::new(interop),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
        }
    }

    /// Broadcast name currently configured on the parameter.
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Whether a broadcast session is live.
    pub fn session_open(&self) -> bool {
        self.session.is_open()
    }

    /// Staging reallocation count, stable across frames of constant shape.
    pub fn staging_reallocations(&self) -> u64 {
        self.pipeline.staging_reallocations()
    }

    /// Host identity query. Every frame must reach the broadcast, so the
    /// effect never declares itself a passthrough even though the output
    /// pixels equal the input.
    pub fn is_identity(&self) -> bool {
        false
    }

    /// Process one frame: validate, resolve the format, publish to the
    /// broadcast, and mirror the input to the output clip.
    pub fn render(&mut self, args: &mut RenderArgs<'_>) -> Result<RenderOutcome> {
        let RenderArgs {
            window,
            stream,
            src,
            dst,
            ..
        } = args;

        let src = src
            .as_ref()
            .ok_or_else(|| FramecastError::BadHandle("source clip".to_string()))?;
        let dst = dst
            .as_mut()
            .ok_or_else(|| FramecastError::BadHandle("output clip".to_string()))?;

        // Both checks run before any broadcast or transfer work.
        format::check_pair(&src.desc, &dst.desc)?;
        let resolved = format::resolve(src.desc.depth, src.desc.layout)?;

        let pipeline = &mut self.pipeline;
        let published = self.session.publish(
            &self.sender_name,
            resolved.format,
            src.desc.width,
            src.desc.height,
            |sender| pipeline.stage_and_copy(sender, resolved, &src.desc, &src.pixels, *stream),
        );

        let outcome = match published {
            Ok(PublishOutcome::Published) => RenderOutcome::Published,
            Ok(PublishOutcome::SkippedBusy) => RenderOutcome::SkippedBusy,
            Err(FramecastError::DeviceOpenFailed(reason)) => {
                warn!(%reason, "device context unavailable, dropping frame");
                return Ok(RenderOutcome::Dropped);
            }
            Err(other) => return Err(other),
        };

        self.pipeline.mirror_to_output(
            &src.desc,
            &dst.desc,
            resolved,
            *window,
            &src.pixels,
            &mut dst.pixels,
            *stream,
        )?;

        Ok(outcome)
    }

    /// Host notification that a parameter value changed.
    ///
    /// Only the sender name matters here; an actual name change rebinds
    /// the session (the advertised name is fixed at creation), an
    /// unchanged value leaves the live session alone.
    pub fn changed_param(&mut self, name: &str, value: &str) {
        if name != PARAM_SENDER_NAME || value == self.sender_name {
            return;
        }
        self.sender_name = value.to_string();
        self.session.rename(&self.sender_name);
    }

    /// Explicit teardown: release the staging texture, then the session.
    /// Idempotent; also run from `Drop` as a best effort, though a host
    /// that never destroys the instance leaves the broadcast advertised —
    /// an accepted residual leak at process exit.
    pub fn close(&mut self) {
        if let Some(sender) = self.session.sender_mut() {
            self.pipeline.release(sender);
        }
        self.session.close();
    }
}

impl<F: SenderFactory, I: ComputeInterop> Drop for SenderInstance<F, I> {
    fn drop(&mut self) {
        self.close();
    }
}
