use std::rc::Rc;

use super::*;
use crate::events::event::{make_delay, make_event};
use crate::timing::ManualClock;

fn queue() -> (ManualClock, TimerEventQueue) {
    let clock = ManualClock::new();
    let timer = ElapsedTime::new(Rc::new(clock.clone()));
    (clock, TimerEventQueue::new(timer))
}

#[test]
fn process_fires_in_activation_order() {
    let (clock, mut q) = queue();
    for t in [5u64, 1, 3] {
        q.push(make_delay(EventAction::Marker(t), t as f64));
    }
    clock.set(10.0);
    assert_eq!(
        q.process(),
        vec![
            EventAction::Marker(1),
            EventAction::Marker(3),
            EventAction::Marker(5)
        ]
    );
    assert!(q.is_empty());
}

#[test]
fn process_respects_the_time_gate() {
    let (clock, mut q) = queue();
    q.push(make_delay(EventAction::Marker(100), 100.0));
    clock.set(50.0);
    assert!(q.process().is_empty());
    assert!(!q.is_empty());

    assert_eq!(q.force_empty(), vec![EventAction::Marker(100)]);
    assert!(q.is_empty());
}

#[test]
fn simultaneous_events_fire_in_insertion_order() {
    let (clock, mut q) = queue();
    for id in 0..16u64 {
        q.push(make_delay(EventAction::Marker(id), 2.0));
    }
    clock.set(2.0);
    let fired = q.process();
    let expected: Vec<_> = (0..16u64).map(EventAction::Marker).collect();
    assert_eq!(fired, expected);
}

#[test]
fn uncharged_events_are_dropped() {
    let (_clock, mut q) = queue();
    let disposed = make_event(EventAction::Marker(1));
    disposed.dispose();
    q.push(disposed);
    q.push(make_event(EventAction::Marker(2)));
    assert_eq!(q.process(), vec![EventAction::Marker(2)]);
    assert!(q.is_empty());
}

#[test]
fn null_event_is_rejected() {
    let (_clock, mut q) = queue();
    assert!(!q.add_event(None));
    assert!(q.is_empty());
}

#[test]
fn next_timeout_tracks_the_earliest_event() {
    let (clock, mut q) = queue();
    assert_eq!(q.next_timeout(), f64::MAX);
    q.push(make_delay(EventAction::Marker(1), 5.0));
    q.push(make_delay(EventAction::Marker(2), 3.0));
    clock.set(1.0);
    assert!((q.next_timeout() - 2.0).abs() < 1e-9);
}

#[test]
fn clear_drops_without_firing() {
    let (clock, mut q) = queue();
    let ev = make_event(EventAction::Marker(1));
    q.push(ev.clone());
    q.clear();
    clock.set(1.0);
    assert!(q.process().is_empty());
    assert!(ev.is_charged());
}

#[test]
fn pop_due_hands_out_one_event_at_a_time() {
    let (clock, mut q) = queue();
    q.push(make_delay(EventAction::Marker(1), 1.0));
    q.push(make_delay(EventAction::Marker(2), 2.0));
    clock.set(1.5);
    let now = q.timer().elapsed();
    let first = q.pop_due(now, false).map(|e| e.fire());
    assert_eq!(first, Some(Some(EventAction::Marker(1))));
    assert!(q.pop_due(now, false).is_none());
    assert!(q.pop_due(now, true).is_some());
}
