//! Broadcast session lifecycle.
//!
//! A session binds one sender object to one advertised name. Creation is
//! lazy: the host may notify parameter values after constructing the
//! plugin instance, so nothing external is acquired until the first frame
//! actually needs it. The name is immutable for the life of a session;
//! renaming tears the session down and opens a fresh one.

use framecast_core::{BroadcastFormat, FramecastError, Result};
use tracing::{debug, info};

use crate::sender::SenderDevice;

/// Creates sender objects bound to a name.
///
/// The factory itself performs no external work; the sender it returns
/// acquires its device context on first `open_device`.
pub trait SenderFactory {
    type Sender: SenderDevice;

    fn create(&self, name: &str) -> Self::Sender;
}

/// Outcome of one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The frame was copied into the shared texture and signaled.
    Published,
    /// A consumer held the frame mutex; the frame was skipped without
    /// error.
    SkippedBusy,
}

struct ActiveSession<S> {
    name: String,
    sender: S,
}

/// Owns the lifecycle of the connection to the shared-texture subsystem.
///
/// State machine: Unopened → (`ensure_open`) → Open(name) →
/// (`rename` with a different name, or `close`) → Unopened. All
/// transitions happen synchronously inside a render or parameter-change
/// call; the host serializes those per instance.
pub struct SessionManager<F: SenderFactory> {
    factory: F,
    session: Option<ActiveSession<F::Sender>>,
}

impl<F: SenderFactory> SessionManager<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            session: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Name the current session is bound to, if any.
    pub fn name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.name.as_str())
    }

    /// Construct the session if none exists. Idempotent; an existing
    /// session is kept even if it is bound to a different name — renaming
    /// is an explicit, separate operation.
    pub fn ensure_open(&mut self, name: &str) -> &mut F::Sender {
        let factory = &self.factory;
        let session = self.session.get_or_insert_with(|| {
            info!(name, "opening broadcast session");
            ActiveSession {
                name: name.to_string(),
                sender: factory.create(name),
            }
        });
        &mut session.sender
    }

    /// Mutable access to the live sender, for teardown of resources that
    /// live on its device.
    pub fn sender_mut(&mut self) -> Option<&mut F::Sender> {
        self.session.as_mut().map(|s| &mut s.sender)
    }

    /// Rebind the session to `name`, tearing the old one down first.
    ///
    /// A no-op when the session is already bound to `name`: the underlying
    /// mechanism fixes its advertised name at creation, so only an actual
    /// name change warrants the teardown/recreate cycle.
    pub fn rename(&mut self, name: &str) {
        if self.name() == Some(name) {
            debug!(name, "rename to current name, keeping session");
            return;
        }
        if self.is_open() {
            info!(name, "renaming broadcast session");
        }
        self.close();
        self.ensure_open(name);
    }

    /// Tear the session down: release the sender registration, close the
    /// device context, drop the sender. Safe to call when already closed.
    pub fn close(&mut self) {
        if let Some(mut active) = self.session.take() {
            info!(name = %active.name, "closing broadcast session");
            active.sender.release_sender();
            active.sender.close_device();
        }
    }

    /// Publish one frame under the session's synchronization discipline.
    ///
    /// Opens the device context, validates the shared resource at the
    /// requested geometry, and runs `transfer` between acquiring and
    /// releasing the frame mutex. New-frame is signaled only after the
    /// transfer succeeds; the mutex is released unconditionally. A busy
    /// mutex skips the frame silently — that is the accepted behavior when
    /// a consumer is mid-read.
    pub fn publish<T>(
        &mut self,
        name: &str,
        format: BroadcastFormat,
        width: u32,
        height: u32,
        transfer: T,
    ) -> Result<PublishOutcome>
    where
        T: FnOnce(&mut F::Sender) -> Result<()>,
    {
        let sender = self.ensure_open(name);

        sender
            .open_device()
            .map_err(|e| FramecastError::DeviceOpenFailed(e.to_string()))?;

        sender.set_format(format);
        sender.check_sender(width, height, format)?;

        if !sender.try_texture_access() {
            debug!("shared texture busy, skipping frame");
            return Ok(PublishOutcome::SkippedBusy);
        }

        let copied = transfer(sender);
        if copied.is_ok() {
            sender.signal_new_frame();
        }
        sender.allow_texture_access();
        copied?;

        Ok(PublishOutcome::Published)
    }
}
