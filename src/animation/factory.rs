//! Builds the activity that plays an animation node.

use std::rc::Rc;

use crate::activities::{
    Activity, ActivityParamSet, ContinuousActivity, Direction, DiscreteActivity, Formula,
    FromToByHooks, FromToByValues, SetActivity, ValueListHooks, simple_activity,
};
use crate::animation::animations::{Animation, ClippingAnimation, PathAnimation, PropertyAnimation};
use crate::animation::element::ElementRef;
use crate::animation::node_info::{AnimationNodeInfo, CalcMode, NodeKind, TransitionMode};
use crate::animation::property::AnimatedProperty;
use crate::animation::value::{AnimValue, ColorSpace, Interpolator, ValueType};
use crate::events::WakeupEvent;
use crate::expression::{ExprEnv, Expression};
use crate::transitions::info::{TransitionClass, transition_info};
use crate::transitions::types::{TransitionSubType, TransitionType};

/// Activity for a leaf node, `None` when the node describes nothing playable.
///
/// `property` is the attribute the node targets, already resolved from `attributeName` or the
/// transform type.
pub fn create_activity(
    kind: NodeKind,
    info: &AnimationNodeInfo,
    property: Option<AnimatedProperty>,
    element: &ElementRef,
    params: ActivityParamSet,
) -> Option<Box<dyn Activity>> {
    match kind {
        NodeKind::Set => {
            let property = require_property(info, property)?;
            create_set_activity(info, property, element, &params)
        }
        NodeKind::Animate | NodeKind::AnimateTransform => {
            let property = require_property(info, property)?;
            let interpolator = Interpolator::for_type(property.value_type(), ColorSpace::Rgb, false);
            let animation = Box::new(PropertyAnimation::new(property, element.clone()));
            create_property_activity(info, property.value_type(), animation, interpolator, element, params)
        }
        NodeKind::AnimateColor => {
            let property = require_property(info, property)?;
            let interpolator = color_interpolator(info, property.value_type());
            let animation = Box::new(PropertyAnimation::new(property, element.clone()));
            create_property_activity(info, property.value_type(), animation, interpolator, element, params)
        }
        NodeKind::AnimateMotion => {
            let path = info.path.as_deref()?;
            match PathAnimation::new(path, element.clone()) {
                Ok(animation) => Some(Box::new(simple_activity(
                    &params,
                    Box::new(animation),
                    Direction::Forward,
                ))),
                Err(e) => {
                    tracing::warn!(error = %e, "motion path rejected");
                    None
                }
            }
        }
        NodeKind::TransitionFilter => create_shape_transition(info, element, &params),
        other => {
            tracing::warn!(kind = ?other, "node kind has no activity");
            None
        }
    }
}

fn require_property(
    info: &AnimationNodeInfo,
    property: Option<AnimatedProperty>,
) -> Option<AnimatedProperty> {
    if property.is_none() {
        tracing::warn!(
            attribute = info.attribute_name.as_deref().unwrap_or_default(),
            "unknown animated attribute"
        );
    }
    property
}

fn color_interpolator(info: &AnimationNodeInfo, value_type: ValueType) -> Option<Interpolator> {
    let space = match info.color_interpolation.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("hsl") => ColorSpace::Hsl,
        _ => ColorSpace::Rgb,
    };
    let counter_clockwise = info
        .color_interpolation_direction
        .as_deref()
        .is_some_and(|d| d.replace('-', "").eq_ignore_ascii_case("counterclockwise"));
    Interpolator::for_type(value_type, space, counter_clockwise)
}

fn value_env(element: &ElementRef, params: &ActivityParamSet) -> ExprEnv {
    Formula::env_for(element.borrow().base_bbox(), params.slide_size)
}

fn create_set_activity(
    info: &AnimationNodeInfo,
    property: AnimatedProperty,
    element: &ElementRef,
    params: &ActivityParamSet,
) -> Option<Box<dyn Activity>> {
    let Some(to) = info.to.as_deref() else {
        tracing::warn!(attribute = property.name(), "set node without a to value");
        return None;
    };
    let Some(value) = AnimValue::parse(property.value_type(), to, &value_env(element, params))
    else {
        tracing::warn!(attribute = property.name(), to, "set value not understood");
        return None;
    };
    let animation: Box<dyn Animation> = Box::new(PropertyAnimation::new(property, element.clone()));
    Some(Box::new(SetActivity::new(params, Some(animation), value)))
}

fn create_property_activity(
    info: &AnimationNodeInfo,
    value_type: ValueType,
    animation: Box<dyn Animation>,
    interpolator: Option<Interpolator>,
    element: &ElementRef,
    mut params: ActivityParamSet,
) -> Option<Box<dyn Activity>> {
    let calc_mode = match info.calc_mode.as_deref() {
        Some(mode) => CalcMode::parse(mode).unwrap_or_else(|| {
            tracing::warn!(mode, "unexpected calculation mode, using linear");
            CalcMode::Linear
        }),
        None => CalcMode::default(),
    };
    // values that cannot be interpolated step from one to the next
    let discrete = calc_mode == CalcMode::Discrete || interpolator.is_none();
    let cumulative = info.accumulate.as_deref() == Some("sum")
        && !matches!(value_type, ValueType::Bool | ValueType::String | ValueType::Enum);

    let env = value_env(element, &params);
    params.formula = info.formula.as_deref().and_then(|source| match Expression::parse(source) {
        Ok(expression) => Some(Formula::new(expression, env)),
        Err(e) => {
            tracing::warn!(formula = source, error = %e, "formula ignored");
            None
        }
    });
    params.discrete_times = parse_key_times(info.key_times.as_deref());
    if discrete {
        params.wakeup_event = Some(Rc::new(WakeupEvent::new(&params.timer)));
    }
    let formula = params.formula.clone();

    let value_list: Vec<&str> = info
        .values
        .as_deref()
        .map(|v| v.split(';').collect())
        .unwrap_or_default();
    if !value_list.is_empty() {
        let values = value_list
            .iter()
            .map(|s| parse_value(value_type, s, &env))
            .collect::<Option<Vec<_>>>()?;
        if params.discrete_times.len() != values.len() {
            if !params.discrete_times.is_empty() {
                tracing::warn!(
                    key_times = params.discrete_times.len(),
                    values = values.len(),
                    "key times do not match values, using even spacing"
                );
            }
            let n = values.len() as f64;
            params.discrete_times = (0..values.len()).map(|i| i as f64 / n).collect();
        }
        tracing::trace!(?values, "value list activity");
        let hooks = ValueListHooks::new(values, animation, interpolator, formula, cumulative);
        return Some(if discrete {
            Box::new(DiscreteActivity::new(&params, hooks))
        } else {
            Box::new(ContinuousActivity::with_key_times(&params, hooks))
        });
    }

    let values = FromToByValues {
        from: parse_optional(value_type, info.from.as_deref(), &env)?,
        to: parse_optional(value_type, info.to.as_deref(), &env)?,
        by: parse_optional(value_type, info.by.as_deref(), &env)?,
    };
    tracing::trace!(?values, "from-to-by activity");
    let hooks = FromToByHooks::new(values, animation, interpolator, formula, cumulative);
    if discrete {
        if params.discrete_times.is_empty() {
            params.discrete_times = vec![0.0, 0.5];
        }
        Some(Box::new(DiscreteActivity::new(&params, hooks)))
    } else {
        Some(Box::new(ContinuousActivity::new(&params, hooks)))
    }
}

fn parse_value(value_type: ValueType, s: &str, env: &ExprEnv) -> Option<AnimValue> {
    let value = AnimValue::parse(value_type, s, env);
    if value.is_none() {
        tracing::warn!(value = s, ?value_type, "attribute value not understood");
    }
    value
}

/// `Some(None)` for an absent attribute, `None` for one that fails to parse.
fn parse_optional(
    value_type: ValueType,
    s: Option<&str>,
    env: &ExprEnv,
) -> Option<Option<AnimValue>> {
    match s {
        Some(s) => parse_value(value_type, s, env).map(Some),
        None => Some(None),
    }
}

/// `keyTimes` list; an entry that is not a number drops the whole list.
fn parse_key_times(attr: Option<&str>) -> Vec<f64> {
    let Some(attr) = attr else {
        return Vec::new();
    };
    let compact: String = attr.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Vec::new();
    }
    match compact.split(';').map(str::parse::<f64>).collect() {
        Ok(times) => times,
        Err(_) => {
            tracing::warn!(key_times = attr, "keyTimes ignored");
            Vec::new()
        }
    }
}

fn create_shape_transition(
    info: &AnimationNodeInfo,
    element: &ElementRef,
    params: &ActivityParamSet,
) -> Option<Box<dyn Activity>> {
    let type_name = info.transition_type.as_deref().unwrap_or_default();
    let Some(transition_type) = TransitionType::parse(type_name) else {
        tracing::warn!(transition = type_name, "unknown shape transition type");
        return None;
    };
    let subtype = info
        .subtype
        .as_deref()
        .and_then(TransitionSubType::parse)
        .unwrap_or(TransitionSubType::Default);
    let mode = TransitionMode::parse(info.mode.as_deref());
    let forward = info.direction.as_deref() != Some("reverse");

    let class = transition_info(transition_type, subtype).map(|i| i.class);
    match class {
        Some(TransitionClass::ClipPolygon) => {
            let description = format!(
                "{transition_type}/{subtype} {} {}",
                if mode == TransitionMode::In { "in" } else { "out" },
                if forward { "forward" } else { "reverse" },
            );
            let animation = Box::new(ClippingAnimation::new(description));
            Some(Box::new(simple_activity(params, animation, Direction::Forward)))
        }
        Some(TransitionClass::Special) if transition_type == TransitionType::Fade => {
            let animation = Box::new(PropertyAnimation::new(AnimatedProperty::Opacity, element.clone()));
            let direction = match mode {
                TransitionMode::In => Direction::Forward,
                TransitionMode::Out => Direction::Backward,
            };
            Some(Box::new(simple_activity(params, animation, direction)))
        }
        Some(TransitionClass::Special) => {
            tracing::warn!(%transition_type, %subtype, "special shape transition not supported");
            None
        }
        Some(TransitionClass::Invalid) | None => {
            tracing::warn!(%transition_type, %subtype, "invalid shape transition");
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/factory.rs"]
mod tests;
