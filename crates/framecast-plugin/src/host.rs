//! Render-call argument types handed over by the host.
//!
//! The host fetches one image per clip for the frame time and passes both
//! to `render`. Clip slots are optional because a misbehaving host can
//! hand out invalid clip references; the instance surfaces that as
//! `BadHandle` before doing anything else.

use framecast_core::{ComputeStream, FrameDesc, PixelDest, PixelSource, RenderWindow};

/// A fetched source clip image: descriptor plus its pixel buffer.
pub struct ClipImage<'a> {
    pub desc: FrameDesc,
    pub pixels: PixelSource<'a>,
}

/// A fetched output clip image the render writes into.
pub struct ClipImageMut<'a> {
    pub desc: FrameDesc,
    pub pixels: PixelDest<'a>,
}

/// Arguments for one render call.
///
/// `stream` present means the host rendered this frame on the device and
/// the device transfer path applies.
pub struct RenderArgs<'a> {
    /// Frame time in the host's timeline.
    pub time: f64,
    /// Region to render; rows outside it are left untouched.
    pub window: RenderWindow,
    /// Host-supplied compute queue for async device copies.
    pub stream: Option<ComputeStream>,
    /// Source clip image, `None` when the clip handle was invalid.
    pub src: Option<ClipImage<'a>>,
    /// Output clip image, `None` when the clip handle was invalid.
    pub dst: Option<ClipImageMut<'a>>,
}
