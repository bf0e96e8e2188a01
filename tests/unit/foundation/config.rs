use super::*;

#[test]
fn defaults_validate() {
    let cfg = EngineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.maximum_frame_count, 60);
    assert!((cfg.preferred_frame_duration() - 0.02).abs() < 1e-12);
}

#[test]
fn inverted_timeouts_are_rejected() {
    let cfg = EngineConfig {
        minimum_timeout: 2.0,
        maximum_timeout: 1.0,
        ..EngineConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("maximumTimeout"));
}

#[test]
fn json_uses_camel_case_and_rejects_unknown_fields() {
    let cfg: EngineConfig = serde_json::from_str(r#"{ "maximumTimeout": 2.5 }"#).unwrap();
    assert_eq!(cfg.maximum_timeout, 2.5);
    assert_eq!(cfg.minimum_frames_per_second, 10);
    assert!(serde_json::from_str::<EngineConfig>(r#"{ "bogus": 1 }"#).is_err());
}

#[test]
fn min_frame_count_scales_with_duration() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.min_frame_count(Some(0.5)), 5.0);
    assert_eq!(cfg.min_frame_count(Some(0.01)), 1.0);
    assert_eq!(cfg.min_frame_count(Some(30.0)), 10.0);
    assert_eq!(cfg.min_frame_count(None), 10.0);
}

#[test]
fn timeouts_clamp_into_window() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.clamp_timeout(100.0), 4.0);
    assert_eq!(cfg.clamp_timeout(0.0), 1.0 / 60.0);
}
