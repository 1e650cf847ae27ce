//! Framecast Plugin — the host-facing layer.
//!
//! Capability declaration, render-call argument types, and the long-lived
//! plugin instance that forwards each frame to a shared-texture broadcast
//! while passing it through to the host's output clip.

pub mod descriptor;
pub mod host;
pub mod instance;

pub use descriptor::{
    descriptor, ClipDescriptor, InstanceFlags, ParamDescriptor, PluginContext, PluginDescriptor,
    DEFAULT_SENDER_NAME, PARAM_SENDER_NAME,
};
pub use host::{ClipImage, ClipImageMut, RenderArgs};
pub use instance::{RenderOutcome, SenderInstance};
