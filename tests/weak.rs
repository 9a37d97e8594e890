use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};

use counted_rs::{Shared, Weak};

struct DropTally<'c>(&'c AtomicUsize);

impl Drop for DropTally<'_> {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn expiry_follows_last_strong_release() {
    let mut sp1 = Shared::new(42);
    assert_eq!(sp1.use_count(), 1);
    let sp2 = sp1.clone();
    assert_eq!(sp1.use_count(), 2);
    assert_eq!(sp2.use_count(), 2);
    drop(sp2);
    assert_eq!(sp1.use_count(), 1);

    let wp = sp1.downgrade();
    assert_eq!(wp.use_count(), 1);
    assert!(!wp.expired());

    sp1.reset();
    assert!(wp.expired());
    assert!(wp.upgrade().is_null());
}

#[test]
fn upgrade_bumps_count_by_one() {
    let sp = Shared::new(9);
    let wp = sp.downgrade();
    assert_eq!(wp.use_count(), 1);
    let locked = wp.upgrade();
    assert!(!locked.is_null());
    assert_eq!(sp.use_count(), 2);
    assert_eq!(locked.use_count(), 2);
    assert_eq!(*locked.as_ref().unwrap(), 9);
}

#[test]
fn upgrade_after_expiry_is_empty() {
    let drops = AtomicUsize::new(0);
    let sp = Shared::new(DropTally(&drops));
    let wp = Weak::from_strong(&sp);
    drop(sp);
    assert_eq!(drops.load(Ordering::Relaxed), 1);
    assert!(wp.expired());
    let locked = wp.upgrade();
    assert!(locked.is_null());
    assert_eq!(locked.use_count(), 0);
}

#[test]
fn observers_never_keep_the_object_alive() {
    let drops = AtomicUsize::new(0);
    let sp = Shared::new(DropTally(&drops));
    let w1 = sp.downgrade();
    let w2 = w1.clone();
    let w3 = w2.clone();
    drop(sp);
    assert_eq!(drops.load(Ordering::Relaxed), 1);
    assert!(w1.expired());
    assert!(w2.expired());
    assert!(w3.expired());
}

#[test]
fn from_empty_strong_is_empty() {
    let sp = Shared::<i32>::null();
    let wp = Weak::from_strong(&sp);
    assert!(wp.is_null());
    assert_eq!(wp.use_count(), 0);
    assert!(wp.expired());
    assert!(wp.upgrade().is_null());
}

#[test]
fn default_is_empty() {
    let wp = Weak::<i32>::null();
    assert!(wp.is_null());
    assert!(wp.expired());
    assert!(wp.upgrade().is_null());
}

#[test]
fn move_leaves_source_empty() {
    let sp = Shared::new(1);
    let mut w1 = sp.downgrade();
    let w2 = mem::take(&mut w1);
    assert!(w1.is_null());
    assert_eq!(w1.use_count(), 0);
    assert_eq!(w2.use_count(), 1);
    assert!(!w2.expired());
}

#[test]
fn reset_clears_observation() {
    let sp = Shared::new(5);
    let mut wp = sp.downgrade();
    wp.reset();
    assert!(wp.is_null());
    assert_eq!(wp.use_count(), 0);
    assert!(wp.expired());
    assert_eq!(sp.use_count(), 1);
}

#[test]
fn reassignment_switches_block() {
    let a = Shared::new(1);
    let b = Shared::new(2);
    let mut wp = a.downgrade();
    assert!(!wp.expired());
    wp = b.downgrade();
    assert_eq!(wp.upgrade().as_ref().copied(), Some(2));
    assert_eq!(a.use_count(), 1);
}

#[test]
fn expired_observer_sees_fresh_objects_not_at_all() {
    let drops = AtomicUsize::new(0);
    let mut sp = Shared::new(DropTally(&drops));
    let wp = sp.downgrade();
    // Re-pointing the strong handle expires the old block's observers.
    unsafe { sp.reset_raw(Box::into_raw(Box::new(DropTally(&drops)))) };
    assert_eq!(drops.load(Ordering::Relaxed), 1);
    assert!(wp.expired());
    assert!(wp.upgrade().is_null());
    drop(sp);
    assert_eq!(drops.load(Ordering::Relaxed), 2);
}
