use super::*;

#[test]
fn clock_value_formats() {
    assert_eq!(parse_clock_value(""), Some(0.0));
    assert_eq!(parse_clock_value("1:02:03"), Some(3723.0));
    assert_eq!(parse_clock_value("02:03.5"), Some(123.5));
    assert_eq!(parse_clock_value("2.5"), Some(2.5));
    assert_eq!(parse_clock_value("250ms"), Some(0.25));
    assert_eq!(parse_clock_value("2min"), Some(120.0));
    assert_eq!(parse_clock_value("1h"), Some(3600.0));
    assert_eq!(parse_clock_value("3s"), Some(3.0));
    assert_eq!(parse_clock_value("0.0004s"), Some(0.0));
    assert_eq!(parse_clock_value("61:00"), None);
    assert_eq!(parse_clock_value("abc"), None);
}

#[test]
fn offset_timings() {
    assert_eq!(Timing::parse(""), Timing::offset(0.0));
    assert_eq!(Timing::parse("0.5s"), Timing::offset(0.5));
    assert_eq!(Timing::parse("-1"), Timing::offset(-1.0));
    assert_eq!(Timing::parse("indefinite").timing_type, TimingType::Indefinite);
}

#[test]
fn event_and_syncbase_timings() {
    let click = Timing::parse("shape7.click");
    assert_eq!(click.timing_type, TimingType::Event);
    assert_eq!(click.event_type, EventTrigger::OnClick);
    assert_eq!(click.event_base_element.as_deref(), Some("shape7"));

    let next = Timing::parse("next");
    assert_eq!(next.timing_type, TimingType::Event);
    assert_eq!(next.event_type, EventTrigger::OnNext);
    assert!(next.event_base_element.is_none());

    let after = Timing::parse("id3.end+0.5");
    assert_eq!(after.timing_type, TimingType::Syncbase);
    assert_eq!(after.event_type, EventTrigger::EndEvent);
    assert_eq!(after.offset, 0.5);

    let before = Timing::parse("id3.begin-2s");
    assert_eq!(before.offset, -2.0);
}

#[test]
fn malformed_timings_are_unknown() {
    assert_eq!(Timing::parse("id.hover").timing_type, TimingType::Unknown);
    assert_eq!(Timing::parse("id.begin+zz").timing_type, TimingType::Unknown);
}

#[test]
fn durations() {
    assert_eq!(Duration::parse(None), Duration::Unset);
    assert!(!Duration::parse(Some("")).is_set());
    assert!(Duration::parse(Some("indefinite")).is_indefinite());
    assert_eq!(Duration::parse(Some("media")), Duration::Media);
    assert_eq!(Duration::parse(Some("0s")).value(), Some(0.001));
    assert_eq!(Duration::parse(Some("1.5s")).value(), Some(1.5));
    let bad = Duration::parse(Some("soon"));
    assert!(bad.is_set());
    assert_eq!(bad.value(), None);
}
