use std::rc::Rc;

use kurbo::Vec2;

use super::*;
use crate::activities::{Activity, ActivityParamSet, ContinuousActivity, DiscreteActivity};
use crate::animation::animations::PropertyAnimation;
use crate::animation::element::AnimatedElement;
use crate::animation::property::AnimatedProperty;
use crate::events::{EventAction, TimerEventQueue, make_event};
use crate::expression::{ExprEnv, Expression};
use crate::timing::{ElapsedTime, ManualClock};

fn setup() -> (ManualClock, TimerEventQueue, ActivityParamSet) {
    let clock = ManualClock::new();
    let timer = ElapsedTime::new(Rc::new(clock.clone()));
    let mut params = ActivityParamSet::new(timer.clone(), Vec2::new(1000.0, 1000.0));
    params.min_duration = 1.0;
    (clock, TimerEventQueue::new(timer), params)
}

fn opacity_hooks(
    element: &ElementRef,
    values: FromToByValues,
    formula: Option<Formula>,
    cumulative: bool,
) -> FromToByHooks {
    FromToByHooks::new(
        values,
        Box::new(PropertyAnimation::new(AnimatedProperty::Opacity, element.clone())),
        Some(Interpolator::Number),
        formula,
        cumulative,
    )
}

fn num(v: f64) -> Option<AnimValue> {
    Some(AnimValue::Number(v))
}

#[test]
fn from_to_interpolates_and_ends_on_to() {
    let (clock, mut events, params) = setup();
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let values = FromToByValues {
        from: num(0.2),
        to: num(0.6),
        by: None,
    };
    let mut activity = ContinuousActivity::new(&params, opacity_hooks(&element, values, None, false));
    activity.set_targets(element.clone());
    assert!((element.borrow().opacity() - 0.2).abs() < 1e-12);

    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    clock.set(0.5);
    activity.perform(&mut events);
    assert!((element.borrow().opacity() - 0.4).abs() < 1e-12);
    assert_eq!(element.borrow().running_animations(), 1);

    activity.end(&mut events);
    assert!((element.borrow().opacity() - 0.6).abs() < 1e-12);
    assert_eq!(element.borrow().running_animations(), 0);
}

#[test]
fn by_adds_to_the_underlying_value() {
    let (clock, mut events, params) = setup();
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    element.borrow_mut().set_opacity(0.5);
    let values = FromToByValues {
        from: None,
        to: None,
        by: num(-0.25),
    };
    let mut activity = ContinuousActivity::new(&params, opacity_hooks(&element, values, None, false));
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    assert_eq!(activity.hooks().end_value(), num(0.25).as_ref());
    clock.set(1.0);
    activity.perform(&mut events);
    assert!((element.borrow().opacity() - 0.25).abs() < 1e-12);
}

#[test]
fn formula_is_applied_to_every_value() {
    let (clock, mut events, params) = setup();
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let formula = Formula::new(Expression::parse("$*0.5").unwrap(), ExprEnv::default());
    let values = FromToByValues {
        from: num(0.0),
        to: num(1.0),
        by: None,
    };
    let mut activity =
        ContinuousActivity::new(&params, opacity_hooks(&element, values, Some(formula), false));
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    clock.set(1.0);
    activity.perform(&mut events);
    assert!((element.borrow().opacity() - 0.5).abs() < 1e-12);
}

#[test]
fn cumulative_repeats_add_the_end_value() {
    let (clock, mut events, mut params) = setup();
    params.repeat_count = Some(3.0);
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let hooks = FromToByHooks::new(
        FromToByValues {
            from: num(0.0),
            to: num(10.0),
            by: None,
        },
        Box::new(PropertyAnimation::new(AnimatedProperty::Rotate, element.clone())),
        Some(Interpolator::Number),
        None,
        true,
    );
    let mut activity = ContinuousActivity::new(&params, hooks);
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    clock.set(1.5);
    activity.perform(&mut events);
    assert!((element.borrow().rotation() - 15.0).abs() < 1e-9);
}

#[test]
fn discrete_mode_switches_from_start_to_end() {
    let (clock, mut events, mut params) = setup();
    params.discrete_times = vec![0.0, 0.5];
    let element = AnimatedElement::new("e", 1000.0, 1000.0).into_ref();
    let hooks = FromToByHooks::new(
        FromToByValues {
            from: Some(AnimValue::Enum("hidden".into())),
            to: Some(AnimValue::Enum("visible".into())),
            by: None,
        },
        Box::new(PropertyAnimation::new(AnimatedProperty::Visibility, element.clone())),
        None,
        None,
        false,
    );
    let mut activity = DiscreteActivity::new(&params, hooks);
    activity.set_targets(element.clone());
    activity.activate(make_event(EventAction::Marker(1)));
    activity.calc_time_lag();
    activity.perform(&mut events);
    assert!(!element.borrow().is_visible());
    clock.set(0.5);
    events.process();
    activity.perform(&mut events);
    assert!(element.borrow().is_visible());
}
