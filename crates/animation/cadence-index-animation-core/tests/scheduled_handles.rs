use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use cadence_index_animation_core::{
    parse_index_animation_json, IndexAnimation, IndexAnimationCfg, IndexAnimationHandle,
};
use cadence_scheduler_core::{TimeDomain, UpdateScheduler};
use cadence_test_fixtures::animations;

fn scheduler() -> Arc<UpdateScheduler> {
    Arc::new(UpdateScheduler::default())
}

#[test]
fn spawn_registers_and_ticks_advance_index() {
    let sched = scheduler();
    let handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(4, 0.5), &sched);
    assert!(sched.is_pending_add(handle.shared()));

    handle.play();
    sched.tick(0.5, 0.0);
    assert!(sched.is_active(handle.shared()));
    assert_eq!(handle.index(), 1);
    sched.tick(0.5, 0.0);
    assert_eq!(handle.index(), 2);
}

#[test]
fn unscaled_animation_reads_unscaled_delta() {
    let sched = scheduler();
    let handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(3, 1.0).unscaled(), &sched);
    handle.play();
    sched.tick(0.0, 0.5);
    assert_eq!(handle.index(), 1);
    sched.tick(5.0, 0.25);
    assert_eq!(handle.index(), 1);
    assert_eq!(sched.active_len(TimeDomain::Unscaled), 1);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 0);
}

#[test]
fn static_animation_is_never_registered() {
    let sched = scheduler();
    let handle = IndexAnimationHandle::spawn(IndexAnimationCfg::new(vec![0.3]), &sched);
    assert!(!sched.is_pending_add(handle.shared()));
    handle.play();
    sched.tick(1.0, 1.0);
    assert_eq!(handle.index(), 0);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 0);
}

#[test]
fn dispose_unregisters_once() {
    let sched = scheduler();
    let mut handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(3, 1.0), &sched);
    handle.play();
    sched.tick(1.0, 1.0);
    assert_eq!(handle.index(), 1);

    assert!(handle.dispose());
    assert!(!handle.dispose());
    assert!(handle.is_disposed());
    let stats = sched.tick(1.0, 1.0);
    assert_eq!(stats.removed, 1);
    assert_eq!(handle.index(), 1);

    drop(handle);
    let stats = sched.tick(1.0, 1.0);
    assert_eq!(stats.removed, 0);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 0);
}

#[test]
fn dropping_handle_unregisters() {
    let sched = scheduler();
    let handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(3, 1.0), &sched);
    sched.tick(0.0, 0.0);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 1);

    drop(handle);
    assert_eq!(sched.pending_len(TimeDomain::Scaled), 1);
    let stats = sched.tick(0.0, 0.0);
    assert_eq!(stats.removed, 1);
    assert_eq!(sched.active_len(TimeDomain::Scaled), 0);
}

#[test]
fn handle_outlives_scheduler() {
    let sched = scheduler();
    let mut handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(3, 1.0), &sched);
    drop(sched);
    assert!(handle.dispose());
    assert_eq!(handle.index(), 0);
}

#[test]
fn spawn_and_drop_inside_listener_tick() {
    let sched = scheduler();
    let spawned = Arc::new(parking_lot::Mutex::new(Vec::<IndexAnimationHandle>::new()));

    let driver = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(2, 1.0), &sched);
    let weak_sched = Arc::downgrade(&sched);
    let store = Arc::clone(&spawned);
    let fired = AtomicBool::new(false);
    driver.on_index_changed(move |_, _| {
        if fired.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sched) = weak_sched.upgrade() {
            let child = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(2, 1.0), &sched);
            child.play();
            store.lock().push(child);
        }
    });
    driver.play();

    let stats = sched.tick(1.0, 1.0);
    assert_eq!(stats.scaled_updated, 1);
    assert_eq!(spawned.lock().len(), 1);
    assert_eq!(sched.pending_len(TimeDomain::Scaled), 1);

    let stats = sched.tick(1.0, 1.0);
    assert_eq!(stats.added, 1);
    assert_eq!(stats.scaled_updated, 2);

    spawned.lock().clear();
    let stats = sched.tick(1.0, 1.0);
    assert_eq!(stats.removed, 1);
}

#[test]
fn listeners_fire_from_scheduler_ticks() {
    let sched = scheduler();
    let handle = IndexAnimationHandle::spawn(IndexAnimationCfg::uniform(5, 1.0), &sched);
    let hits = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&hits);
    handle.on_index_changed(move |anim: &IndexAnimation, index| {
        assert_eq!(anim.index(), index);
        sink.fetch_add(1, Ordering::SeqCst);
    });
    handle.play();
    sched.tick(3.0, 0.0);
    assert_eq!(handle.index(), 3);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn fixture_configs_load_and_run() {
    let sched = scheduler();
    let cfg = parse_index_animation_json(&animations::json("coin-spin-twice").unwrap()).unwrap();
    assert_eq!(cfg.loop_count, 2);
    let handle = IndexAnimationHandle::spawn(cfg, &sched);
    handle.play();
    for _ in 0..10 {
        sched.tick(0.5, 0.5);
    }
    assert!(!handle.is_playing());
    assert_eq!(handle.index(), 1);
}

#[test]
fn every_fixture_parses_except_bad_delay() {
    for key in animations::keys() {
        let json = animations::json(&key).unwrap();
        let parsed = parse_index_animation_json(&json);
        if key == "bad-delay" {
            assert!(parsed.is_err(), "{key} should be rejected");
        } else {
            assert!(parsed.is_ok(), "{key}: {parsed:?}");
        }
    }
}

#[test]
fn lenient_construction_from_bad_fixture_is_static() {
    let cfg: IndexAnimationCfg = animations::load("bad-delay").unwrap();
    let anim = IndexAnimation::new(cfg);
    assert!(anim.is_static());
    assert_eq!(anim.frames_count(), 1);
}

#[test]
fn walk_cycle_fixture_file_drives_a_full_lap() {
    let path = animations::path("walk-cycle").unwrap();
    let json = std::fs::read_to_string(path).unwrap();
    let cfg = parse_index_animation_json(&json).unwrap();
    assert_eq!(cfg.delays.len(), 6);

    let mut anim = IndexAnimation::new(cfg);
    anim.play();
    let mut visited = vec![anim.index()];
    for _ in 0..20 {
        anim.update(0.05);
        visited.push(anim.index());
    }
    for frame in 0..6 {
        assert!(visited.contains(&frame), "frame {frame} never shown");
    }
    assert!(anim.is_playing());
}
