use std::rc::Rc;

use kurbo::Vec2;

use super::*;
use crate::animation::animations::PropertyAnimation;
use crate::animation::element::AnimatedElement;
use crate::animation::property::AnimatedProperty;
use crate::events::{EventAction, make_event};
use crate::timing::{ElapsedTime, ManualClock};

fn setup() -> (TimerEventQueue, ActivityParamSet) {
    let timer = ElapsedTime::new(Rc::new(ManualClock::new()));
    let mut params = ActivityParamSet::new(timer.clone(), Vec2::new(1920.0, 1080.0));
    params.end_event = Some(make_event(EventAction::Marker(9)));
    (TimerEventQueue::new(timer), params)
}

#[test]
fn set_applies_once_then_goes_inactive() {
    let (mut events, params) = setup();
    let element = AnimatedElement::new("s1", 1920.0, 1080.0).into_ref();
    let animation = PropertyAnimation::new(AnimatedProperty::Rotate, element.clone());
    let mut set = SetActivity::new(&params, Some(Box::new(animation)), AnimValue::Number(42.0));
    set.set_targets(element.clone());

    assert!(set.is_active());
    assert!(!set.perform(&mut events));
    assert_eq!(element.borrow().rotation(), 42.0);
    assert!(!set.is_active());
    assert_eq!(element.borrow().running_animations(), 0);
    assert_eq!(events.len(), 1);

    element.borrow_mut().set_rotation(7.0);
    assert!(!set.perform(&mut events));
    assert_eq!(element.borrow().rotation(), 7.0);
    assert_eq!(events.len(), 1);
    assert_eq!(events.force_empty(), vec![EventAction::Marker(9)]);
}

#[test]
fn set_without_target_is_a_contract_violation() {
    let (mut events, params) = setup();
    let element = AnimatedElement::new("s1", 1920.0, 1080.0).into_ref();
    let animation = PropertyAnimation::new(AnimatedProperty::Opacity, element);
    let mut set = SetActivity::new(&params, Some(Box::new(animation)), AnimValue::Number(0.0));
    let err = set.apply(&mut events).unwrap_err();
    assert!(err.is_invalid_state());
    assert!(!set.is_active());
}

#[test]
fn end_performs_the_set() {
    let (mut events, params) = setup();
    let element = AnimatedElement::new("s1", 1920.0, 1080.0).into_ref();
    let animation = PropertyAnimation::new(AnimatedProperty::Visibility, element.clone());
    let mut set = SetActivity::new(
        &params,
        Some(Box::new(animation)),
        AnimValue::Enum("visible".into()),
    );
    set.set_targets(element.clone());
    set.end(&mut events);
    assert!(element.borrow().is_visible());
    assert_eq!(set.calc_time_lag(), 0.0);
}
