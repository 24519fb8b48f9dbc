//! Tests for error messages and helpers

use weaver_domain::{Error, PassPhase};

#[test]
fn test_no_candidate_names_rejected_candidates() {
    let error = Error::NoCandidate {
        service: "router".to_string(),
        position: 1,
        argument: "logger".to_string(),
        capability: "Logger".to_string(),
        rejected: vec!["base_logger (abstract)".to_string()],
    };

    let message = error.to_string();
    assert!(message.contains("#1 ($logger)"));
    assert!(message.contains("'router'"));
    assert!(message.contains("base_logger (abstract)"));
}

#[test]
fn test_ambiguous_candidate_lists_every_candidate() {
    let error = Error::AmbiguousCandidate {
        service: "mailer".to_string(),
        position: 0,
        argument: "transport".to_string(),
        capability: "Transport".to_string(),
        candidates: vec!["sendmail".to_string(), "smtp".to_string()],
        rejected: vec!["mailer (self-reference)".to_string()],
    };

    let message = error.to_string();
    assert!(message.contains("sendmail, smtp"));
    assert!(message.contains("rejected candidates: mailer (self-reference)"));
}

#[test]
fn test_cycle_message_joins_identifiers() {
    let error = Error::CyclicServiceGraph {
        cycle: vec!["a".to_string(), "b".to_string(), "a".to_string()],
    };

    assert_eq!(error.to_string(), "Circular service reference: a -> b -> a");
}

#[test]
fn test_in_pass_fills_missing_location_only() {
    let error = Error::invalid_definition("router", "argument #0 is not set")
        .in_pass(PassPhase::BeforeRemoving, "check_definitions");

    match &error {
        Error::Compilation {
            phase,
            pass,
            service,
            ..
        } => {
            assert_eq!(*phase, Some(PassPhase::BeforeRemoving));
            assert_eq!(pass.as_deref(), Some("check_definitions"));
            assert_eq!(service.as_deref(), Some("router"));
        }
        other => panic!("expected compilation error, got {other:?}"),
    }
    assert!(error.to_string().contains("BEFORE_REMOVING"));

    let untouched = Error::access("secret").in_pass(PassPhase::Optimize, "autowire");
    assert!(matches!(untouched, Error::Access { .. }));
}

#[test]
fn test_compile_time_classification() {
    assert!(Error::compilation("boom").is_compile_time());
    assert!(Error::unresolved_reference("a", "b").is_compile_time());
    assert!(!Error::access("a").is_compile_time());
    assert!(!Error::not_found("a").is_compile_time());
}

#[test]
fn test_container_and_environment_errors_are_not_compile_time() {
    assert!(!Error::unknown_factory("mailer", "Mailer").is_compile_time());
    assert!(!Error::construction("mailer", "boom").is_compile_time());
    assert!(!Error::configuration("bad config").is_compile_time());
    assert!(!Error::io("disk full").is_compile_time());
    let json = serde_json::from_str::<u8>("nope").unwrap_err();
    assert!(!Error::from(json).is_compile_time());

    assert!(Error::CyclicServiceGraph { cycle: vec![] }.is_compile_time());
    assert!(Error::CircularParameter { chain: vec![] }.is_compile_time());
    assert!(Error::unresolved_parameter("locale", None).is_compile_time());
}
