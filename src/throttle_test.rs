use super::*;

const INTERVAL: Duration = Duration::from_millis(DEFAULT_MIN_INTERVAL_MS);

#[test]
fn first_submit_is_always_accepted() {
    let throttle = SubmitThrottle::default();
    assert!(throttle.check_at(Instant::now()).is_ok());
}

#[test]
fn submit_inside_interval_is_rejected() {
    let mut throttle = SubmitThrottle::default();
    let start = Instant::now();
    throttle.record_at(start);

    let err = throttle
        .check_at(start + Duration::from_millis(400))
        .expect_err("second submit should be throttled");
    assert_eq!(err, ThrottleError::TooSoon { retry_in: Duration::from_millis(600) });
}

#[test]
fn submit_at_exact_interval_is_accepted() {
    let mut throttle = SubmitThrottle::default();
    let start = Instant::now();
    throttle.record_at(start);
    assert!(throttle.check_at(start + INTERVAL).is_ok());
}

#[test]
fn rejection_does_not_move_the_window() {
    let mut throttle = SubmitThrottle::default();
    let start = Instant::now();
    throttle.record_at(start);

    // Rejected checks are never recorded, so hammering never extends the window.
    for ms in [100, 500, 900, 999] {
        assert!(throttle.check_at(start + Duration::from_millis(ms)).is_err());
    }
    assert!(throttle.check_at(start + INTERVAL).is_ok());
}

#[test]
fn check_without_record_leaves_state_untouched() {
    let mut throttle = SubmitThrottle::default();
    let start = Instant::now();
    assert!(throttle.check_at(start).is_ok());
    assert!(throttle.check_at(start).is_ok());

    throttle.record_at(start);
    assert!(throttle.check_at(start + Duration::from_millis(1)).is_err());
}

#[test]
fn record_moves_the_window_forward() {
    let mut throttle = SubmitThrottle::default();
    let start = Instant::now();
    throttle.record_at(start);
    throttle.record_at(start + INTERVAL);

    assert!(throttle.check_at(start + INTERVAL + Duration::from_millis(999)).is_err());
    assert!(throttle.check_at(start + INTERVAL * 2).is_ok());
}

#[test]
fn custom_interval_is_respected() {
    let mut throttle = SubmitThrottle::new(Duration::from_millis(50));
    let start = Instant::now();
    throttle.record_at(start);
    assert!(throttle.check_at(start + Duration::from_millis(49)).is_err());
    assert!(throttle.check_at(start + Duration::from_millis(50)).is_ok());
    assert_eq!(throttle.min_interval(), Duration::from_millis(50));
}
