//! Tests for definition value objects

use weaver_domain::{
    Argument, AttributeValue, Literal, ParameterSlot, Reference, ServiceDefinition, Sharing, Tag,
    Visibility,
};

// ============================================================================
// ServiceDefinition
// ============================================================================

#[test]
fn test_new_definition_is_private_shared_and_autoconfigured() {
    let definition = ServiceDefinition::new("mailer");

    assert_eq!(definition.visibility, Visibility::Private);
    assert_eq!(definition.sharing, Sharing::Shared);
    assert!(definition.autoconfigure);
    assert!(!definition.autowire);
    assert!(!definition.is_abstract);
    assert_eq!(definition.class_name(), "mailer");
}

#[test]
fn test_with_argument_appends_after_highest_position() {
    let definition = ServiceDefinition::new("matcher")
        .with_argument_at(2, Argument::literal("exclude_paths"))
        .with_argument(Argument::service("config_factory"));

    assert_eq!(definition.next_position(), 4);
    assert_eq!(
        definition.arguments.get(&3),
        Some(&Argument::service("config_factory"))
    );
    assert_eq!(definition.unset_positions(), vec![0, 1]);
}

#[test]
fn test_arity_covers_signature_and_explicit_arguments() {
    let definition = ServiceDefinition::new("router")
        .with_parameter(ParameterSlot::typed("matcher", "UrlMatcher"))
        .with_parameter(ParameterSlot::typed("logger", "Logger").nullable());

    assert_eq!(definition.arity(), 2);
    assert_eq!(definition.unset_positions(), vec![0, 1]);

    let definition = definition.with_argument_at(4, Argument::null());
    assert_eq!(definition.arity(), 5);
    assert_eq!(definition.unset_positions(), vec![0, 1, 2, 3]);
}

#[test]
fn test_default_for_also_declares_capability() {
    let definition = ServiceDefinition::new("smtp").default_for("Transport");

    assert!(definition.capabilities.contains("Transport"));
    assert!(definition.default_for.contains("Transport"));
}

#[test]
fn test_same_tag_name_may_repeat() {
    let definition = ServiceDefinition::new("listener")
        .with_tag(Tag::new("event_subscriber").with_attribute("event", "kernel.request"))
        .with_tag(Tag::new("event_subscriber").with_attribute("event", "kernel.response"));

    assert_eq!(definition.tags_named("event_subscriber").count(), 2);
    assert!(definition.has_tag("event_subscriber"));
    assert!(!definition.has_tag("console.command"));
}

#[test]
fn test_definition_json_defaults() {
    let definition: ServiceDefinition =
        serde_json::from_str(r#"{"id": "cache", "class": "FileCache"}"#).unwrap();

    assert_eq!(definition.id, "cache");
    assert_eq!(definition.class_name(), "FileCache");
    assert!(definition.autoconfigure);
    assert_eq!(definition.visibility, Visibility::Private);
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn test_reference_visitor_descends_into_collections_and_inline_definitions() {
    let inline = ServiceDefinition::new("inner").with_argument(Argument::service("deep"));
    let argument = Argument::Collection(vec![
        Argument::service("a"),
        Argument::literal(3_i64),
        Argument::Inline(Box::new(inline)),
    ]);

    let mut seen = Vec::new();
    argument.for_each_reference(&mut |reference| seen.push(reference.id.clone()));

    assert_eq!(seen, vec!["a", "deep"]);
}

#[test]
fn test_reference_flags() {
    let reference = Reference::new("logger").optional().lazy();

    assert!(reference.optional);
    assert!(reference.lazy);
    assert_eq!(
        Argument::optional_service("logger"),
        Argument::Service(Reference::new("logger").optional())
    );
}

#[test]
fn test_literal_interpolation_text() {
    assert_eq!(Literal::Null.to_interpolated(), "");
    assert_eq!(Literal::from(8080_i64).to_interpolated(), "8080");
    assert_eq!(Literal::from(true).to_interpolated(), "true");
    assert_eq!(Literal::from("prod").to_interpolated(), "prod");
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tag_priority_defaults_to_zero_and_parses_strings() {
    assert!((Tag::new("t").priority() - 0.0).abs() < f64::EPSILON);
    assert!((Tag::new("t").with_priority(10).priority() - 10.0).abs() < f64::EPSILON);
    assert!((Tag::new("t").with_attribute("priority", "-5").priority() + 5.0).abs() < f64::EPSILON);
}

#[test]
fn test_merge_missing_keeps_explicit_attributes() {
    let mut explicit = Tag::new("kernel.listener").with_attribute("event", "explicit");
    let inferred = Tag::new("kernel.listener")
        .with_attribute("event", "inferred")
        .with_priority(7);

    explicit.merge_missing(&inferred.attributes);

    assert_eq!(
        explicit.attributes.get("event"),
        Some(&AttributeValue::from("explicit"))
    );
    assert_eq!(explicit.attributes.get("priority"), Some(&AttributeValue::Int(7)));
}
