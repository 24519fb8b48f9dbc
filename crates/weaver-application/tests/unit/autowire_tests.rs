//! Tests for capability-based autowiring

use weaver_application::resolvers::AutowireResolver;
use weaver_domain::{
    Argument, DefinitionRegistry, Error, Literal, ParameterSlot, ServiceDefinition,
};

fn mailer(slot: ParameterSlot) -> ServiceDefinition {
    ServiceDefinition::new("mailer")
        .autowired()
        .with_parameter(slot)
}

fn resolve(registry: &DefinitionRegistry, id: &str) -> Result<Argument, Error> {
    let definition = registry.get(id).unwrap();
    AutowireResolver::new(registry).resolve_slot(definition, 0, &definition.signature[0])
}

#[test]
fn test_single_candidate_is_bound() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("transport", "Transport")));
    registry.add(ServiceDefinition::new("smtp").with_capability("Transport"));

    assert_eq!(resolve(&registry, "mailer").unwrap(), Argument::service("smtp"));
}

#[test]
fn test_class_name_counts_as_capability() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("transport", "SmtpTransport")));
    registry.add(ServiceDefinition::new("transport.smtp").with_class("SmtpTransport"));

    assert_eq!(
        resolve(&registry, "mailer").unwrap(),
        Argument::service("transport.smtp")
    );
}

#[test]
fn test_no_candidate_reports_position_and_rejected() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("transport", "Transport")));
    registry.add(
        ServiceDefinition::new("base_transport")
            .with_capability("Transport")
            .abstract_template(),
    );

    match resolve(&registry, "mailer").unwrap_err() {
        Error::NoCandidate {
            service,
            position,
            argument,
            capability,
            rejected,
        } => {
            assert_eq!(service, "mailer");
            assert_eq!(position, 0);
            assert_eq!(argument, "transport");
            assert_eq!(capability, "Transport");
            assert_eq!(rejected, vec!["base_transport (abstract)"]);
        }
        other => panic!("expected no candidate, got {other:?}"),
    }
}

#[test]
fn test_self_is_never_a_candidate() {
    let mut registry = DefinitionRegistry::new();
    registry.add(
        mailer(ParameterSlot::typed("next", "Transport")).with_capability("Transport"),
    );

    match resolve(&registry, "mailer").unwrap_err() {
        Error::NoCandidate { rejected, .. } => {
            assert_eq!(rejected, vec!["mailer (self-reference)"]);
        }
        other => panic!("expected no candidate, got {other:?}"),
    }
}

#[test]
fn test_nullable_and_default_fallbacks() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("logger", "Logger").nullable()));
    assert_eq!(resolve(&registry, "mailer").unwrap(), Argument::null());

    registry.add(mailer(
        ParameterSlot::typed("retries", "RetryPolicy").with_default(3_i64),
    ));
    assert_eq!(
        resolve(&registry, "mailer").unwrap(),
        Argument::Literal(Literal::Int(3))
    );
}

#[test]
fn test_ambiguous_candidates_are_all_listed() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("transport", "Transport")));
    registry.add(ServiceDefinition::new("smtp").with_capability("Transport"));
    registry.add(ServiceDefinition::new("sendmail").with_capability("Transport"));

    match resolve(&registry, "mailer").unwrap_err() {
        Error::AmbiguousCandidate {
            candidates,
            position,
            ..
        } => {
            assert_eq!(candidates, vec!["sendmail", "smtp"]);
            assert_eq!(position, 0);
        }
        other => panic!("expected ambiguous candidate, got {other:?}"),
    }
}

#[test]
fn test_ambiguous_candidates_name_rejected_ones() {
    let mut registry = DefinitionRegistry::new();
    registry.add(
        mailer(ParameterSlot::typed("transport", "Transport")).with_capability("Transport"),
    );
    registry.add(ServiceDefinition::new("smtp").with_capability("Transport"));
    registry.add(ServiceDefinition::new("sendmail").with_capability("Transport"));
    registry.add(
        ServiceDefinition::new("base_transport")
            .with_capability("Transport")
            .abstract_template(),
    );

    let error = resolve(&registry, "mailer").unwrap_err();

    match &error {
        Error::AmbiguousCandidate {
            candidates,
            rejected,
            ..
        } => {
            assert_eq!(*candidates, vec!["sendmail", "smtp"]);
            assert_eq!(
                *rejected,
                vec!["base_transport (abstract)", "mailer (self-reference)"]
            );
        }
        other => panic!("expected ambiguous candidate, got {other:?}"),
    }
    assert!(error.to_string().contains("base_transport (abstract)"));
}

#[test]
fn test_default_marker_disambiguates() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::typed("transport", "Transport")));
    registry.add(ServiceDefinition::new("smtp").default_for("Transport"));
    registry.add(ServiceDefinition::new("sendmail").with_capability("Transport"));

    assert_eq!(resolve(&registry, "mailer").unwrap(), Argument::service("smtp"));
}

#[test]
fn test_named_slot_bypasses_the_search() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(
        ParameterSlot::typed("transport", "Transport").named("sendmail"),
    ));
    registry.add(ServiceDefinition::new("smtp").default_for("Transport"));

    assert_eq!(
        resolve(&registry, "mailer").unwrap(),
        Argument::service("sendmail")
    );
}

#[test]
fn test_untyped_slot_without_default_is_a_compilation_error() {
    let mut registry = DefinitionRegistry::new();
    registry.add(mailer(ParameterSlot::new("options")));

    assert!(matches!(
        resolve(&registry, "mailer"),
        Err(Error::Compilation { service: Some(ref id), .. }) if id == "mailer"
    ));
}

#[test]
fn test_autowire_fills_only_unset_positions() {
    let mut registry = DefinitionRegistry::new();
    registry.add(
        ServiceDefinition::new("router")
            .autowired()
            .with_parameter(ParameterSlot::typed("matcher", "UrlMatcher"))
            .with_parameter(ParameterSlot::typed("logger", "Logger"))
            .with_argument_at(1, Argument::service("custom_logger")),
    );
    registry.add(ServiceDefinition::new("matcher").with_capability("UrlMatcher"));

    let definition = registry.get("router").unwrap();
    let wired = AutowireResolver::new(&registry).autowire(definition).unwrap();

    assert_eq!(wired.len(), 1);
    assert_eq!(wired.get(&0), Some(&Argument::service("matcher")));
}
