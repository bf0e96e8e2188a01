use super::*;

fn info(hidden: &[bool]) -> PresentationInfo {
    PresentationInfo {
        slides: hidden
            .iter()
            .enumerate()
            .map(|(index, &hidden)| SlideInfo {
                hash: format!("h{index}"),
                index,
                hidden,
                ..SlideInfo::default()
            })
            .collect(),
        width: 800,
        height: 600,
    }
}

#[test]
fn slide_info_reads_camel_case_json() {
    let json = r##"{
        "width": 1280, "height": 720,
        "slides": [{
            "hash": "abc", "index": 0,
            "transitionType": "Fade", "transitionSubtype": "FadeOverColor",
            "transitionFadeColor": "#ff0000",
            "transitionDuration": 1500, "nextSlideDuration": 3000,
            "shapes": {"s1": {"bounds": {"x": 1, "y": 2, "width": 3, "height": 4}, "initVisible": true}}
        }]
    }"##;
    let presentation = PresentationInfo::from_json(json).unwrap();
    let slide = &presentation.slides[0];
    assert_eq!(slide.transition_seconds(0.5), 1.5);
    assert_eq!(slide.auto_advance_seconds(), Some(3.0));
    assert_eq!(slide.fade_color(), RgbColor::new(1.0, 0.0, 0.0));
    assert!(slide.transition().is_some());
    assert!(slide.shapes["s1"].init_visible);
    assert_eq!(presentation.slide_hash(0), Some("abc"));
}

#[test]
fn zero_sized_presentations_are_rejected() {
    assert!(PresentationInfo::from_json(r#"{"width": 0, "height": 10}"#).is_err());
    assert!(MetaPresentation::new(info(&[]), &EngineConfig::default()).is_err());
}

#[test]
fn missing_durations_fall_back() {
    let slide = SlideInfo {
        transition_duration: Some(0.0),
        next_slide_duration: Some(0.0),
        ..SlideInfo::default()
    };
    assert_eq!(slide.transition_seconds(0.25), 0.25);
    assert_eq!(slide.auto_advance_seconds(), None);
    assert!(slide.transition().is_none());
}

#[test]
fn navigation_skips_hidden_slides() {
    let mut presentation =
        MetaPresentation::new(info(&[true, false, true, false, true]), &EngineConfig::default())
            .unwrap();
    assert_eq!(presentation.current(), None);
    assert_eq!(presentation.next_slide(), Some(1));
    assert_eq!(presentation.go_to(1).unwrap(), None);
    assert_eq!(presentation.next_slide(), Some(3));
    assert_eq!(presentation.previous_slide(), None);
    assert_eq!(presentation.go_to(3).unwrap(), Some(1));
    assert_eq!(presentation.previous_slide(), Some(1));
    assert!(presentation.is_last_slide(3));
    assert!(!presentation.is_last_slide(1));
    assert!(presentation.go_to(5).is_err());
    assert_eq!(presentation.current(), Some(3));
}

#[test]
fn slides_without_animations_are_static() {
    let presentation = MetaPresentation::new(info(&[false]), &EngineConfig::default()).unwrap();
    assert_eq!(presentation.slide_size(), Vec2::new(800.0, 600.0));
    assert!(!presentation.slide(0).unwrap().is_animated());
}
