//! End-to-end scenarios over the in-process memory broadcast.

use framecast_broadcast::{MemoryDevice, MemoryFactory, MemoryInterop};
use framecast_core::{
    BitDepth, ChannelLayout, ComputeStream, FrameDesc, FramecastError, PixelDest, PixelSource,
    RenderWindow,
};
use framecast_plugin::{
    ClipImage, ClipImageMut, RenderArgs, RenderOutcome, SenderInstance, DEFAULT_SENDER_NAME,
    PARAM_SENDER_NAME,
};

type Instance = SenderInstance<MemoryFactory, MemoryInterop>;

fn instance() -> (Instance, MemoryDevice) {
    let device = MemoryDevice::new();
    (
        SenderInstance::new(
            MemoryFactory::new(device.clone()),
            MemoryInterop::new(device.clone()),
        ),
        device,
    )
}

fn f32_rgba(width: u32, height: u32) -> FrameDesc {
    FrameDesc {
        width,
        height,
        depth: BitDepth::F32,
        layout: ChannelLayout::Rgba,
        row_stride: width as usize * 16,
    }
}

fn render_host(inst: &mut Instance, frame: FrameDesc, src: &[u8], dst: &mut [u8]) -> RenderOutcome {
    let mut args = RenderArgs {
        time: 0.0,
        window: RenderWindow::full(frame.width, frame.height),
        stream: None,
        src: Some(ClipImage {
            desc: frame,
            pixels: PixelSource::Host(src),
        }),
        dst: Some(ClipImageMut {
            desc: frame,
            pixels: PixelDest::Host(dst),
        }),
    };
    inst.render(&mut args).unwrap()
}

#[test]
fn three_frame_scenario() {
    crate::init_logs();
    let (mut inst, device) = instance();
    let frame = f32_rgba(1920, 1080);
    let frame_bytes = frame.row_stride * 1080;

    // Frame 1: 32-bit-float RGBA, host-resident.
    let src: Vec<u8> = (0..frame_bytes).map(|i| (i % 251) as u8).collect();
    let mut dst = vec![0u8; frame_bytes];
    let outcome = render_host(&mut inst, frame, &src, &mut dst);
    assert_eq!(outcome, RenderOutcome::Published);
    assert_eq!(dst, src, "output receives a byte-identical copy");

    let shared = device.lookup(DEFAULT_SENDER_NAME).unwrap();
    assert_eq!(shared.frame_count(), 1);
    assert_eq!(shared.snapshot(), src);
    assert_eq!(inst.staging_reallocations(), 1);

    // Frame 2: identical parameters, no staging reallocation.
    let mut dst2 = vec![0u8; frame_bytes];
    render_host(&mut inst, frame, &src, &mut dst2);
    assert_eq!(shared.frame_count(), 2);
    assert_eq!(inst.staging_reallocations(), 1);

    // Frame 3: 16-bit-int RGB is rejected before the broadcast is touched.
    let rgb = FrameDesc {
        width: 1920,
        height: 1080,
        depth: BitDepth::U16,
        layout: ChannelLayout::Rgb,
        row_stride: 1920 * 6,
    };
    let rgb_src = vec![0u8; rgb.row_stride * 1080];
    let mut rgb_dst = vec![0u8; rgb.row_stride * 1080];
    let mut args = RenderArgs {
        time: 0.0,
        window: RenderWindow::full(1920, 1080),
        stream: None,
        src: Some(ClipImage {
            desc: rgb,
            pixels: PixelSource::Host(&rgb_src),
        }),
        dst: Some(ClipImageMut {
            desc: rgb,
            pixels: PixelDest::Host(&mut rgb_dst),
        }),
    };
    let result = inst.render(&mut args);
    assert!(matches!(result, Err(FramecastError::UnsupportedFormat(_))));
    assert_eq!(shared.frame_count(), 2);
    assert_eq!(inst.staging_reallocations(), 1);
}

#[test]
fn rename_rebinds_broadcast_and_withdraws_old_name() {
    let (mut inst, device) = instance();
    let frame = f32_rgba(64, 32);
    let src = vec![9u8; frame.row_stride * 32];
    let mut dst = vec![0u8; frame.row_stride * 32];

    render_host(&mut inst, frame, &src, &mut dst);
    assert!(device.lookup("Davinci Spout").is_some());

    inst.changed_param(PARAM_SENDER_NAME, "MySender");
    assert!(
        device.lookup("Davinci Spout").is_none(),
        "old session released before the new one opens"
    );

    let mut dst2 = vec![0u8; frame.row_stride * 32];
    render_host(&mut inst, frame, &src, &mut dst2);

    let shared = device.lookup("MySender").unwrap();
    assert_eq!(shared.frame_count(), 1);
    assert_eq!(shared.snapshot(), src);
}

#[test]
fn rename_notification_with_unchanged_value_keeps_session() {
    let (mut inst, device) = instance();
    let frame = f32_rgba(16, 16);
    let src = vec![1u8; frame.row_stride * 16];
    let mut dst = vec![0u8; frame.row_stride * 16];
    render_host(&mut inst, frame, &src, &mut dst);

    let shared = device.lookup(DEFAULT_SENDER_NAME).unwrap();
    inst.changed_param(PARAM_SENDER_NAME, DEFAULT_SENDER_NAME);

    // Same Arc is still registered: no teardown/recreate happened.
    let after = device.lookup(DEFAULT_SENDER_NAME).unwrap();
    assert!(std::sync::Arc::ptr_eq(&shared, &after));
}

#[test]
fn busy_reader_skips_broadcast_but_mirrors_output() {
    let (mut inst, device) = instance();
    let frame = f32_rgba(32, 16);
    let src = vec![5u8; frame.row_stride * 16];
    let mut dst = vec![0u8; frame.row_stride * 16];

    render_host(&mut inst, frame, &src, &mut dst);
    let shared = device.lookup(DEFAULT_SENDER_NAME).unwrap();
    assert_eq!(shared.frame_count(), 1);

    // A consumer is mid-read.
    assert!(shared.try_acquire());

    let src2 = vec![6u8; frame.row_stride * 16];
    let mut dst2 = vec![0u8; frame.row_stride * 16];
    let outcome = render_host(&mut inst, frame, &src2, &mut dst2);

    assert_eq!(outcome, RenderOutcome::SkippedBusy);
    assert_eq!(shared.frame_count(), 1, "no new frame while contended");
    assert_eq!(dst2, src2, "passthrough still runs on a skipped frame");

    shared.release_access();
}

#[test]
fn device_path_publishes_and_mirrors_device_to_device() {
    let (mut inst, device) = instance();
    let frame = f32_rgba(8, 4);
    let frame_bytes = frame.row_stride * 4;

    let pattern: Vec<u8> = (0..frame_bytes).map(|i| (i * 3 % 255) as u8).collect();
    let src_buf = device.alloc_device_buffer(pattern.clone());
    let dst_buf = device.alloc_device_buffer(vec![0u8; frame_bytes]);

    let mut args = RenderArgs {
        time: 0.0,
        window: RenderWindow::full(8, 4),
        stream: Some(ComputeStream(42)),
        src: Some(ClipImage {
            desc: frame,
            pixels: PixelSource::Device(src_buf),
        }),
        dst: Some(ClipImageMut {
            desc: frame,
            pixels: PixelDest::Device(dst_buf),
        }),
    };
    let outcome = inst.render(&mut args).unwrap();
    assert_eq!(outcome, RenderOutcome::Published);

    let shared = device.lookup(DEFAULT_SENDER_NAME).unwrap();
    assert_eq!(shared.snapshot(), pattern);
    assert_eq!(device.read_device_buffer(dst_buf).unwrap(), pattern);
}
