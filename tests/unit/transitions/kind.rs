use super::*;

fn resolve(ty: T, subtype: S) -> ResolvedTransition {
    TransitionKind::resolve(ty, subtype).unwrap()
}

#[test]
fn document_kinds_map_onto_2d_transitions() {
    assert_eq!(resolve(T::Fade, S::CrossFade).kind, TransitionKind::Fade);
    assert_eq!(resolve(T::BarWipe, S::TopToBottom).kind, TransitionKind::Wipe);
    assert_eq!(resolve(T::IrisWipe, S::Diamond).kind, TransitionKind::Diamond);
    assert_eq!(resolve(T::IrisWipe, S::Rectangle).kind, TransitionKind::Box);
    assert_eq!(resolve(T::Dissolve, S::Default).kind, TransitionKind::SimpleDissolve);
    assert_eq!(resolve(T::ClockWipe, S::Default).subtype, S::TopCenter);
    assert!(resolve(T::PushWipe, S::FromRight).push);
    assert!(!resolve(T::SlideWipe, S::FromRight).push);
}

#[test]
fn misc_shape_wipes_select_3d_transitions() {
    let cases = [
        (S::LeftToRight, TransitionKind::Fall),
        (S::TopToBottom, TransitionKind::TurnAround),
        (S::CornersIn, TransitionKind::Cube),
        (S::FanOutHorizontal, TransitionKind::Helix),
        (S::TopCenter, TransitionKind::Venetian3d),
        (S::BottomCenter, TransitionKind::Dissolve),
        (S::TopRight, TransitionKind::FlipTiles),
        (S::Heart, TransitionKind::Cube),
    ];
    for (subtype, kind) in cases {
        let resolved = resolve(T::MiscShapeWipe, subtype);
        assert_eq!(resolved.kind, kind, "{subtype}");
        assert!(resolved.kind.is_3d());
    }
    assert_eq!(resolve(T::Zoom, S::RotateIn).kind, TransitionKind::NewsFlash);
    assert!(TransitionKind::resolve(T::Zoom, S::RotateOut).is_none());
}

#[test]
fn unknown_subtypes_fall_back_to_default() {
    let wheel = resolve(T::PinWheelWipe, S::Heart);
    assert_eq!(wheel.kind, TransitionKind::Wheel);
    assert_eq!(wheel.subtype, S::OneBlade);
    assert_eq!(resolve(T::BarWipe, S::Circle).subtype, S::LeftToRight);
    assert_eq!(resolve(T::Fade, S::Default).subtype, S::CrossFade);
}

#[test]
fn invalid_type_has_no_transition() {
    assert!(TransitionKind::resolve(T::Invalid, S::Default).is_none());
}

#[test]
fn mipmaps_follow_the_document_subtype() {
    assert!(resolve(T::MiscShapeWipe, S::LeftToRight).mipmaps);
    assert!(resolve(T::MiscShapeWipe, S::Heart).mipmaps);
    assert!(!resolve(T::MiscShapeWipe, S::TopRight).mipmaps);
    assert!(!resolve(T::BarWipe, S::LeftToRight).mipmaps);
}

#[test]
fn kind_names_round_trip() {
    for kind in TransitionKind::ALL {
        assert_eq!(TransitionKind::from_name(kind.name()), Some(kind));
        assert!(kind.supports(kind.default_subtype()), "{kind}");
    }
    assert_eq!(TransitionKind::from_name("Flip_Tiles"), Some(TransitionKind::FlipTiles));
}
