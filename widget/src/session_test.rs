use super::*;

#[test]
fn from_parts_concatenates_digits() {
    let id = SessionId::from_parts(1_700_000_000_123, 42);
    assert_eq!(id.as_str(), "170000000012342");
    assert_eq!(id.to_string(), "170000000012342");
}

#[test]
fn suffix_is_bounded() {
    let id = SessionId::from_parts(1_700_000_000_123, 123_456);
    assert_eq!(id.as_str(), "17000000001233456");
}

#[test]
fn session_id_is_long_and_numeric() {
    let id = SessionId::from_parts(now_ms(), 7);
    assert!(id.as_str().len() > 10);
    assert!(id.as_str().bytes().all(|b| b.is_ascii_digit()));
}

#[test]
fn negative_clock_clamps_to_zero() {
    assert_eq!(SessionId::from_parts(-5, 9).as_str(), "09");
}
