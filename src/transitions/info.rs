use std::f64::consts::SQRT_2;

use crate::transitions::types::{TransitionSubType as S, TransitionType as T};

/// How a transition is realised when applied to a single shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionClass {
    Invalid,
    ClipPolygon,
    Special,
}

/// How the clip polygon of a reversed transition is derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReverseMethod {
    Ignore,
    SubtractAndInvert,
    Rotate180,
    FlipX,
    FlipY,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionInfo {
    pub class: TransitionClass,
    pub rotation_angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub reverse_method: ReverseMethod,
    pub out_inverts_sweep: bool,
    pub scale_isotropically: bool,
}

const fn clip(rotation_angle: f64, reverse_method: ReverseMethod, out_inverts_sweep: bool) -> TransitionInfo {
    TransitionInfo {
        class: TransitionClass::ClipPolygon,
        rotation_angle,
        scale_x: 1.0,
        scale_y: 1.0,
        reverse_method,
        out_inverts_sweep,
        scale_isotropically: false,
    }
}

const fn isotropic(info: TransitionInfo) -> TransitionInfo {
    TransitionInfo {
        scale_isotropically: true,
        ..info
    }
}

const SPECIAL: TransitionInfo = TransitionInfo {
    class: TransitionClass::Special,
    rotation_angle: 0.0,
    scale_x: 1.0,
    scale_y: 1.0,
    reverse_method: ReverseMethod::Ignore,
    out_inverts_sweep: true,
    scale_isotropically: false,
};

/// Shape transition parameters, `None` for unsupported combinations.
pub fn transition_info(ty: T, subtype: S) -> Option<TransitionInfo> {
    use ReverseMethod::*;
    let info = match (ty, subtype) {
        (T::BarnDoorWipe, S::Vertical) => clip(0.0, SubtractAndInvert, true),
        (T::BarnDoorWipe, S::Horizontal) => clip(90.0, SubtractAndInvert, true),
        (T::BarWipe, S::LeftToRight) => clip(0.0, FlipX, false),
        (T::BarWipe, S::TopToBottom) => clip(90.0, FlipY, false),
        (T::BlindsWipe, S::Horizontal) => clip(90.0, FlipX, true),
        (T::BlindsWipe, S::Vertical) => clip(0.0, FlipY, true),
        (T::CheckerboardWipe, S::Down) => clip(90.0, FlipY, true),
        (T::CheckerboardWipe, S::Across) => clip(0.0, FlipX, true),
        (T::Dissolve, S::Default) => isotropic(clip(0.0, Ignore, true)),
        (T::EllipseWipe, S::Circle) => isotropic(clip(0.0, SubtractAndInvert, true)),
        (T::EllipseWipe, S::Horizontal) => clip(0.0, SubtractAndInvert, true),
        (T::EllipseWipe, S::Vertical) => isotropic(clip(90.0, SubtractAndInvert, true)),
        (T::Fade, S::CrossFade | S::FadeOverColor) => SPECIAL,
        (T::FanWipe, S::CenterTop) => clip(0.0, FlipY, true),
        (T::FourBoxWipe, S::CornersIn | S::CornersOut) => clip(0.0, SubtractAndInvert, true),
        (T::IrisWipe, S::Rectangle) => clip(0.0, SubtractAndInvert, true),
        (T::IrisWipe, S::Diamond) => TransitionInfo {
            scale_x: SQRT_2,
            scale_y: SQRT_2,
            ..clip(45.0, SubtractAndInvert, true)
        },
        (
            T::PinWheelWipe,
            S::OneBlade | S::TwoBladeVertical | S::ThreeBlade | S::FourBlade | S::EightBlade,
        ) => isotropic(clip(0.0, FlipX, true)),
        (T::RandomBarWipe, S::Horizontal) => clip(90.0, Ignore, true),
        (T::RandomBarWipe, S::Vertical) => clip(0.0, Ignore, true),
        (T::SlideWipe, S::FromLeft | S::FromTop | S::FromRight | S::FromBottom) => SPECIAL,
        (T::WaterfallWipe, S::HorizontalLeft) => clip(-90.0, Rotate180, true),
        (T::WaterfallWipe, S::HorizontalRight) => clip(90.0, Rotate180, true),
        _ => return None,
    };
    Some(info)
}
