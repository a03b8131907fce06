use super::*;

fn small_config() -> RateLimitConfig {
    RateLimitConfig {
        per_session_limit: 3,
        per_session_window: Duration::from_secs(60),
        global_limit: 5,
        global_window: Duration::from_secs(60),
    }
}

#[test]
fn per_session_allows_up_to_limit() {
    let rl = RateLimiter::with_config(small_config());
    let now = Instant::now();

    for i in 0..3 {
        assert!(rl.check_and_record_at("s1", now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at("s1", now),
        Err(RateLimitError::PerSessionExceeded { limit: 3, window_secs: 60 })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = RateLimiter::with_config(small_config());
    let now = Instant::now();

    // Distinct sessions so the per-session limit is never hit first.
    for i in 0..5 {
        assert!(rl.check_and_record_at(&format!("s{i}"), now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at("fresh", now),
        Err(RateLimitError::GlobalExceeded { limit: 5, .. })
    ));
}

#[test]
fn rejected_request_is_not_recorded() {
    let rl = RateLimiter::with_config(small_config());
    let now = Instant::now();
    for _ in 0..3 {
        rl.check_and_record_at("s1", now).unwrap();
    }
    assert!(rl.check_and_record_at("s1", now).is_err());
    // Only the three accepted requests count toward the global window.
    assert!(rl.check_and_record_at("s2", now).is_ok());
    assert!(rl.check_and_record_at("s3", now).is_ok());
    assert!(rl.check_and_record_at("s4", now).is_err());
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = RateLimiter::with_config(small_config());
    let start = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("s1", start).unwrap();
    }
    assert!(rl.check_and_record_at("s1", start).is_err());

    let after_window = start + Duration::from_secs(60) + Duration::from_millis(1);
    assert!(rl.check_and_record_at("s1", after_window).is_ok());
}

#[test]
fn distinct_sessions_do_not_interfere() {
    let rl = RateLimiter::with_config(small_config());
    let now = Instant::now();

    for _ in 0..3 {
        rl.check_and_record_at("a", now).unwrap();
    }
    assert!(rl.check_and_record_at("a", now).is_err());
    assert!(rl.check_and_record_at("b", now).is_ok());
}
