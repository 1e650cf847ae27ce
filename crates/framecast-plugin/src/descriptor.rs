//! Plugin capability declaration.
//!
//! The descriptor is built once at process start and handed to the host's
//! registration callback; nothing here mutates afterwards. The declared
//! capability restricts the host to 32-bit-float RGBA for both clips —
//! the resolver's wider format table exists for robustness should the
//! declaration ever widen.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use framecast_core::{BitDepth, ChannelLayout};

/// Name of the broadcast-name parameter.
pub const PARAM_SENDER_NAME: &str = "sender_name";

/// Default broadcast name.
pub const DEFAULT_SENDER_NAME: &str = "Davinci Spout";

/// Host contexts the plugin can be instantiated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PluginContext {
    Filter,
    General,
}

/// Descriptor for a single free-text parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub label: String,
    pub default: String,
    pub animates: bool,
}

/// Declared capabilities of one clip attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDescriptor {
    pub name: String,
    pub components: Vec<ChannelLayout>,
    pub temporal_access: bool,
    pub supports_tiles: bool,
    pub is_mask: bool,
}

/// Instance-level behavior flags declared to the host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InstanceFlags {
    pub single_instance: bool,
    pub host_frame_threading: bool,
    pub supports_multi_resolution: bool,
    pub supports_tiles: bool,
    pub temporal_clip_access: bool,
    pub render_twice_always: bool,
    pub supports_multiple_clip_pars: bool,
    pub no_spatial_awareness: bool,
    pub supports_device_render: bool,
    pub supports_device_stream: bool,
}

/// Everything the host learns about the plugin during the describe
/// handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub identifier: String,
    pub label: String,
    pub grouping: String,
    pub description: String,
    pub version_major: u32,
    pub version_minor: u32,
    pub contexts: Vec<PluginContext>,
    pub supported_depths: Vec<BitDepth>,
    pub flags: InstanceFlags,
    pub clips: Vec<ClipDescriptor>,
    pub params: Vec<ParamDescriptor>,
}

impl PluginDescriptor {
    /// Build the framecast sender declaration.
    pub fn framecast() -> Self {
        #[cfg(debug_assertions)]
        let (identifier, label) = ("cast.frame.FramecastSender_dev", "Framecast Sender (dev)");
        #[cfg(not(debug_assertions))]
        let (identifier, label) = ("cast.frame.FramecastSender", "Framecast Sender");

        Self {
            identifier: identifier.to_string(),
            label: label.to_string(),
            grouping: "Filter".to_string(),
            description: "Broadcasts the current clip over a shared texture".to_string(),
            version_major: 1,
            version_minor: 1,
            contexts: vec![PluginContext::Filter, PluginContext::General],
            // Declared capability: float-32 only. The half/int depths crash
            // some hosts' device-copy path and stay undeclared until
            // verified.
            supported_depths: vec![BitDepth::F32],
            flags: InstanceFlags {
                single_instance: false,
                host_frame_threading: false,
                supports_multi_resolution: false,
                supports_tiles: false,
                temporal_clip_access: false,
                render_twice_always: false,
                supports_multiple_clip_pars: false,
                no_spatial_awareness: true,
                supports_device_render: true,
                supports_device_stream: true,
            },
            clips: vec![
                ClipDescriptor {
                    name: "Source".to_string(),
                    components: vec![ChannelLayout::Rgba],
                    temporal_access: false,
                    supports_tiles: false,
                    is_mask: false,
                },
                ClipDescriptor {
                    name: "Output".to_string(),
                    components: vec![ChannelLayout::Rgba, ChannelLayout::Alpha],
                    temporal_access: false,
                    supports_tiles: false,
                    is_mask: false,
                },
            ],
            params: vec![ParamDescriptor {
                name: PARAM_SENDER_NAME.to_string(),
                label: "Sender Name".to_string(),
                default: DEFAULT_SENDER_NAME.to_string(),
                animates: false,
            }],
        }
    }
}

/// Process-wide singleton descriptor handed to the host's registration
/// callback.
pub fn descriptor() -> &'static PluginDescriptor {
    static DESCRIPTOR: OnceLock<PluginDescriptor> = OnceLock::new();
    DESCRIPTOR.get_or_init(PluginDescriptor::framecast)
}
