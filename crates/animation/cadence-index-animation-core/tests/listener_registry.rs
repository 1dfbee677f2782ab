use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cadence_index_animation_core::{
    IndexAnimation, IndexAnimationCfg, IndexListener, ListenerId, Subscription,
};
use parking_lot::Mutex;

fn counter() -> (Arc<AtomicUsize>, Arc<IndexListener>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&hits);
    let listener: Arc<IndexListener> = Arc::new(move |_: &IndexAnimation, _: usize| {
        sink.fetch_add(1, Ordering::SeqCst);
    });
    (hits, listener)
}

fn two_frames() -> IndexAnimation {
    let mut anim = IndexAnimation::new(IndexAnimationCfg::new(vec![1.0, 1.0]));
    anim.play();
    anim
}

#[test]
fn duplicate_subscription_is_reported_and_fires_once() {
    let mut anim = two_frames();
    let (hits, listener) = counter();

    let first = anim.subscribe(Arc::clone(&listener));
    let second = anim.subscribe(Arc::clone(&listener));
    assert!(first.is_added());
    assert_eq!(second, Subscription::Duplicate(first.id()));
    assert_eq!(anim.listeners().len(), 1);

    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn strong_and_weak_forms_of_one_callback_are_duplicates() {
    let mut anim = two_frames();
    let (_hits, listener) = counter();
    let weak = anim.subscribe_weak(&listener);
    let strong = anim.subscribe(Arc::clone(&listener));
    assert_eq!(strong, Subscription::Duplicate(weak.id()));
}

#[test]
fn listeners_fire_in_subscription_order() {
    let mut anim = two_frames();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["a", "b", "c"] {
        let sink = Arc::clone(&order);
        anim.on_index_changed(move |_, _| sink.lock().push(tag));
    }
    anim.update(1.0);
    assert_eq!(*order.lock(), vec!["a", "b", "c"]);
}

#[test]
fn listener_sees_updated_animation() {
    let mut anim = two_frames();
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    anim.on_index_changed(move |a, index| *sink.lock() = Some((a.index(), index, a.is_playing())));
    anim.update(1.0);
    assert_eq!(*observed.lock(), Some((1, 1, true)));
}

#[test]
fn unsubscribe_by_token_and_by_callback() {
    let mut anim = two_frames();
    let (hits_a, a) = counter();
    let (hits_b, b) = counter();
    let id_a = anim.subscribe(Arc::clone(&a)).id();
    anim.subscribe(Arc::clone(&b));

    assert!(anim.unsubscribe(id_a));
    assert!(!anim.unsubscribe(id_a));
    assert!(anim.unsubscribe_callback(&b));
    assert!(!anim.unsubscribe_callback(&b));

    anim.update(1.0);
    assert_eq!(hits_a.load(Ordering::SeqCst), 0);
    assert_eq!(hits_b.load(Ordering::SeqCst), 0);
}

#[test]
fn unknown_token_is_a_no_op() {
    let mut anim = two_frames();
    let (hits, listener) = counter();
    anim.subscribe(listener);
    assert!(!anim.unsubscribe(ListenerId(999)));
    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn weak_listener_lapses_when_owner_drops() {
    let mut anim = two_frames();
    let (hits, listener) = counter();
    let id = anim.subscribe_weak(&listener).id();

    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    drop(listener);
    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(!anim.listeners().contains(id));
    assert!(anim.listeners().is_empty());
}

#[test]
fn lapsed_listener_unsubscribe_is_tolerated() {
    let mut anim = two_frames();
    let (_hits, listener) = counter();
    let id = anim.subscribe_weak(&listener).id();
    drop(listener);
    // Either removed directly or already purged; never a fault.
    anim.unsubscribe(id);
    assert!(anim.listeners().is_empty());
}

#[test]
fn strong_subscription_keeps_callback_alive() {
    let mut anim = two_frames();
    let (hits, listener) = counter();
    anim.subscribe(listener);
    anim.update(1.0);
    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn stop_and_rewind_do_not_notify() {
    let mut anim = two_frames();
    let (hits, listener) = counter();
    anim.subscribe(listener);
    anim.update(1.0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    anim.stop();
    anim.update(5.0);
    anim.rewind();
    assert_eq!(anim.index(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
