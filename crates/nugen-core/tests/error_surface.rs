use nugen_core::errors::{ErrorInfo, EventFailure, FailureKind, NugenError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("channel", "QES")
        .with_context("energy", 1.0)
}

#[test]
fn config_error_is_fatal() {
    let err = NugenError::Config(sample_info("missing-sub-algorithm", "no xsec model"));
    assert!(!err.is_recoverable());
    assert_eq!(err.info().map(|info| info.code.as_str()), Some("missing-sub-algorithm"));
    assert!(err.failure().is_none());
}

#[test]
fn event_failure_is_recoverable_and_classified() {
    let err: NugenError = EventFailure::no_phase_space("rejected every candidate")
        .with_attempts(1000)
        .into();
    assert!(err.is_recoverable());
    assert!(err.info().is_none());
    let failure = err.failure().expect("event failure");
    assert_eq!(failure.kind, FailureKind::NoAvailablePhaseSpace);
    assert_eq!(failure.attempts, Some(1000));
    assert!(failure.fast_forward);
}

#[test]
fn display_includes_context_and_hint() {
    let err = NugenError::Exhausted(
        sample_info("attempt-budget", "gave up").with_hint("raise max_event_attempts"),
    );
    let text = err.to_string();
    assert!(text.contains("attempt-budget"));
    assert!(text.contains("channel=QES"));
    assert!(text.contains("raise max_event_attempts"));
}

#[test]
fn error_round_trips_through_json() {
    let err = NugenError::Event(EventFailure::cascade("no permitted fate").with_attempts(20));
    let json = serde_json::to_string(&err).expect("serialize");
    let decoded: NugenError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
