use std::rc::Rc;

use kurbo::Vec2;

use super::*;
use crate::activities::{Activity, ActivityParamSet, ContinuousActivity, DiscreteActivity};
use crate::animation::animations::PropertyAnimation;
use crate::animation::element::AnimatedElement;
use crate::animation::property::AnimatedProperty;
use crate::events::{EventAction, TimerEventQueue, make_event};
use crate::timing::{ElapsedTime, ManualClock};

fn setup() -> (ManualClock, TimerEventQueue, ActivityParamSet) {
    let clock = ManualClock::new();
    let timer = ElapsedTime::new(Rc::new(clock.clone()));
    let mut params = ActivityParamSet::new(timer.clone(), Vec2::new(1000.0, 1000.0));
    params.min_duration = 1.0;
    (clock, TimerEventQueue::new(timer), params)
}

fn rotation_hooks(element: &ElementRef, values: &[f64]) -> ValueListHooks {
    ValueListHooks::new(
        values.iter().map(|v| AnimValue::Number(*v)).collect(),
        Box::new(PropertyAnimation::new(AnimatedProperty::Rotate, element.clone())),
        Some(Interpolator::Number),
        None,
        false,
    )
}

#[test]
fn linear_values_follow_key_times() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5, 1.0];
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let mut activity =
        ContinuousActivity::with_key_times(&params, rotation_hooks(&element, &[0.0, 90.0, 180.0]));
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();

    clock.set(0.25);
    activity.perform(&mut events);
    assert!((element.borrow().rotation() - 45.0).abs() < 1e-9);
    clock.set(0.75);
    activity.perform(&mut events);
    assert!((element.borrow().rotation() - 135.0).abs() < 1e-9);
}

#[test]
fn discrete_values_step_through_the_list() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 1.0 / 3.0, 2.0 / 3.0];
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let mut activity = DiscreteActivity::new(&params, rotation_hooks(&element, &[10.0, 20.0, 30.0]));
    activity.set_targets(element.clone());
    assert_eq!(element.borrow().rotation(), 10.0);
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();

    let mut seen = Vec::new();
    for t in [0.0, 0.34, 0.67] {
        clock.set(t);
        events.process();
        activity.perform(&mut events);
        seen.push(element.borrow().rotation());
    }
    assert_eq!(seen, vec![10.0, 20.0, 30.0]);
    assert!(!activity.is_active());
}

#[test]
fn perform_end_respects_auto_reverse() {
    let (_clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5];
    params.auto_reverse = true;
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let mut activity =
        ContinuousActivity::with_key_times(&params, rotation_hooks(&element, &[5.0, 50.0]));
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.end(&mut events);
    assert_eq!(element.borrow().rotation(), 5.0);
}
