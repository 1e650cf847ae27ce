//! Session lifecycle and publish-discipline tests against the recording
//! mock.

use framecast_broadcast::{PublishOutcome, SenderDevice, SessionManager};
use framecast_core::{BroadcastFormat, FramecastError};

use crate::mock::{Call, Recorder, RecordingFactory};

fn manager(rec: &Recorder) -> SessionManager<RecordingFactory> {
    SessionManager::new(RecordingFactory::new(rec.clone()))
}

#[test]
fn publish_wraps_copy_in_exactly_one_access_pair() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);

    let outcome = mgr
        .publish("A", BroadcastFormat::Rgba32F, 64, 32, |sender| {
            sender.update_shared_from_host(&[0u8; 4], 4, 1)
        })
        .unwrap();
    assert_eq!(outcome, PublishOutcome::Published);

    assert_eq!(rec.count(|c| matches!(c, Call::TryAccess)), 1);
    assert_eq!(rec.count(|c| matches!(c, Call::AllowAccess)), 1);

    let acquire = rec.position(|c| matches!(c, Call::TryAccess)).unwrap();
    let copy = rec
        .position(|c| matches!(c, Call::UpdateSharedFromHost { .. }))
        .unwrap();
    let signal = rec.position(|c| matches!(c, Call::SignalNewFrame)).unwrap();
    let release = rec.position(|c| matches!(c, Call::AllowAccess)).unwrap();

    assert!(acquire < copy, "copy must happen after acquiring the mutex");
    assert!(copy < signal, "new-frame only after the copy");
    assert!(signal < release, "mutex released last");
}

#[test]
fn busy_texture_skips_without_copy_or_signal() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);
    rec.set_texture_busy(true);

    let mut ran = false;
    let outcome = mgr
        .publish("A", BroadcastFormat::Rgba32F, 64, 32, |_| {
            ran = true;
            Ok(())
        })
        .unwrap();

    assert_eq!(outcome, PublishOutcome::SkippedBusy);
    assert!(!ran, "transfer must not run when the mutex is contended");
    assert_eq!(rec.count(|c| matches!(c, Call::SignalNewFrame)), 0);
    assert_eq!(rec.count(|c| matches!(c, Call::AllowAccess)), 0);
}

#[test]
fn failed_copy_releases_mutex_without_signaling() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);

    let result = mgr.publish("A", BroadcastFormat::Rgba32F, 64, 32, |_| {
        Err(FramecastError::TransferFailed("mock copy".to_string()))
    });

    assert!(matches!(result, Err(FramecastError::TransferFailed(_))));
    assert_eq!(rec.count(|c| matches!(c, Call::SignalNewFrame)), 0);
    assert_eq!(
        rec.count(|c| matches!(c, Call::AllowAccess)),
        1,
        "mutex is released unconditionally once acquired"
    );
}

#[test]
fn device_open_failure_stops_before_sender_check() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);
    rec.set_fail_open(true);

    let result = mgr.publish("A", BroadcastFormat::Rgba32F, 64, 32, |_| Ok(()));
    assert!(matches!(result, Err(FramecastError::DeviceOpenFailed(_))));
    assert_eq!(rec.count(|c| matches!(c, Call::CheckSender(..))), 0);
    assert_eq!(rec.count(|c| matches!(c, Call::TryAccess)), 0);
}

#[test]
fn sender_check_failure_stops_before_mutex() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);
    rec.set_fail_check(true);

    let result = mgr.publish("A", BroadcastFormat::Rgba32F, 64, 32, |_| Ok(()));
    assert!(matches!(result, Err(FramecastError::SenderCheckFailed(_))));
    assert_eq!(rec.count(|c| matches!(c, Call::TryAccess)), 0);
}

#[test]
fn rename_to_same_name_keeps_session() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);

    mgr.ensure_open("A");
    rec.clear();

    mgr.rename("A");
    mgr.rename("A");

    assert!(rec.calls().is_empty(), "no teardown/recreate on same name");
    assert_eq!(mgr.name(), Some("A"));
}

#[test]
fn rename_releases_old_sender_before_creating_new() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);

    mgr.ensure_open("Davinci Spout");
    rec.clear();

    mgr.rename("MySender");

    let release = rec.position(|c| matches!(c, Call::ReleaseSender)).unwrap();
    let close = rec.position(|c| matches!(c, Call::CloseDevice)).unwrap();
    let create = rec
        .position(|c| matches!(c, Call::Create(n) if n == "MySender"))
        .unwrap();
    assert!(release < close);
    assert!(close < create);
    assert_eq!(mgr.name(), Some("MySender"));
}

#[test]
fn close_releases_and_is_idempotent() {
    let rec = Recorder::new();
    let mut mgr = manager(&rec);

    mgr.ensure_open("A");
    mgr.close();
    mgr.close();

    assert_eq!(rec.count(|c| matches!(c, Call::ReleaseSender)), 1);
    assert_eq!(rec.count(|c| matches!(c, Call::CloseDevice)), 1);
}
