//! Service provider registration and discovery tests

use std::sync::Arc;
use weaver_application::compiler::ContainerBuilder;
use weaver_application::ports::registry::{
    discover_service_providers, list_service_providers, resolve_service_provider,
    ServiceProviderEntry, SERVICE_PROVIDERS,
};
use weaver_application::ports::{pass_fn, RegistrationContext, ServiceProvider};
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Alias, Argument, PassPhase, ServiceDefinition, Tag};

struct RoutingProvider;

impl ServiceProvider for RoutingProvider {
    fn name(&self) -> &str {
        "test_routing"
    }

    fn register(&self, context: &mut RegistrationContext<'_>) -> Result<()> {
        context.set_parameter("router.strict", true)?;
        context.add(
            ServiceDefinition::new("router")
                .public()
                .with_argument(Argument::parameter("router.strict"))
                .with_argument(Argument::tagged("route_filter")),
        );
        context.set_alias("router.default", Alias::new("router"))?;
        context.register_for_autoconfiguration("RouteFilter", Tag::new("route_filter"));
        Ok(())
    }
}

/// Tags every filter registered by any provider with a priority
struct FilterPriorityProvider;

impl ServiceProvider for FilterPriorityProvider {
    fn name(&self) -> &str {
        "test_filter_priority"
    }

    fn register(&self, context: &mut RegistrationContext<'_>) -> Result<()> {
        context.add_compiler_pass(
            pass_fn("add_fallback_filter", |registry| {
                registry.add(ServiceDefinition::new("fallback_filter").with_capability("RouteFilter"));
                Ok(())
            }),
            PassPhase::BeforeOptimization,
            500,
        );
        Ok(())
    }

    fn alter(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let filters: Vec<String> = registry
            .definitions()
            .filter(|definition| definition.capabilities.contains("RouteFilter"))
            .map(|definition| definition.id.clone())
            .collect();
        for id in filters {
            registry
                .get_mut(&id)?
                .tags
                .push(Tag::new("route_filter").with_priority(100));
        }
        Ok(())
    }
}

struct FilterProvider;

impl ServiceProvider for FilterProvider {
    fn name(&self) -> &str {
        "test_filters"
    }

    fn register(&self, context: &mut RegistrationContext<'_>) -> Result<()> {
        context.add(ServiceDefinition::new("method_filter").with_capability("RouteFilter"));
        context.add(ServiceDefinition::new("content_type_filter").with_capability("RouteFilter"));
        Ok(())
    }
}

#[linkme::distributed_slice(SERVICE_PROVIDERS)]
static TEST_ROUTING: ServiceProviderEntry = ServiceProviderEntry {
    name: "test_routing",
    description: "Router with tagged filters",
    factory: || Arc::new(RoutingProvider),
};

#[linkme::distributed_slice(SERVICE_PROVIDERS)]
static TEST_FILTERS: ServiceProviderEntry = ServiceProviderEntry {
    name: "test_filters",
    description: "Route filters",
    factory: || Arc::new(FilterProvider),
};

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_list_service_providers_includes_registered_entries() {
    let providers = list_service_providers();

    assert!(providers.contains(&("test_routing", "Router with tagged filters")));
    assert!(providers.contains(&("test_filters", "Route filters")));
}

#[test]
fn test_resolve_service_provider_by_name() {
    let provider = resolve_service_provider("test_filters").unwrap();

    assert_eq!(provider.name(), "test_filters");
}

#[test]
fn test_resolve_unknown_provider_lists_available_ones() {
    let error = resolve_service_provider("does_not_exist")
        .err()
        .expect("unknown provider must fail");

    assert!(matches!(error, Error::NotFound { .. }));
    let message = error.to_string();
    assert!(message.contains("does_not_exist"));
    assert!(message.contains("test_routing"));
}

#[test]
fn test_discover_skips_disabled_providers_and_sorts_by_name() {
    let names: Vec<String> = discover_service_providers(&["test_routing".to_string()])
        .iter()
        .map(|provider| provider.name().to_string())
        .collect();

    assert!(names.contains(&"test_filters".to_string()));
    assert!(!names.contains(&"test_routing".to_string()));
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

// ============================================================================
// Compilation with providers
// ============================================================================

#[test]
fn test_providers_contribute_definitions_parameters_and_aliases() {
    let mut builder = ContainerBuilder::new();
    builder
        .add_provider(Arc::new(RoutingProvider))
        .add_provider(Arc::new(FilterProvider));

    let compiled = builder.compile().unwrap();

    let router = compiled.lookup("router.default").unwrap();
    assert_eq!(router.id, "router");
    assert_eq!(router.arguments.len(), 2);
    assert_eq!(
        router.arguments[0],
        weaver_application::compiler::CompiledArgument::Value(true.into())
    );
}

#[test]
fn test_alter_sees_definitions_of_later_providers() {
    let mut builder = ContainerBuilder::new();
    builder
        .add_provider(Arc::new(RoutingProvider))
        .add_provider(Arc::new(FilterPriorityProvider))
        .add_provider(Arc::new(FilterProvider));

    let compiled = builder.compile().unwrap();

    let registry = compiled.registry();
    for id in ["method_filter", "content_type_filter"] {
        let definition = registry.get(id).unwrap();
        assert!(
            definition
                .tags_named("route_filter")
                .any(|tag| tag.priority() == 100.0),
            "{id} should carry the altered priority"
        );
    }
}

#[test]
fn test_provider_passes_run_after_alter() {
    let mut builder = ContainerBuilder::new();
    builder
        .add_provider(Arc::new(RoutingProvider))
        .add_provider(Arc::new(FilterPriorityProvider))
        .add_provider(Arc::new(FilterProvider));

    let compiled = builder.compile().unwrap();

    let fallback = compiled.registry().get("fallback_filter").unwrap();
    assert!(
        fallback
            .tags_named("route_filter")
            .all(|tag| tag.priority() == 0.0),
        "the pass adds its definition after alter ran"
    );
    match &compiled.lookup("router").unwrap().arguments[1] {
        weaver_application::compiler::CompiledArgument::Collection(items) => {
            assert_eq!(items.len(), 3);
        }
        other => panic!("expected a collection, got {other:?}"),
    }
}

#[test]
fn test_failing_provider_aborts_compilation() {
    struct Broken;
    impl ServiceProvider for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn register(&self, _context: &mut RegistrationContext<'_>) -> Result<()> {
            Err(Error::configuration("missing routing table"))
        }
    }

    let mut builder = ContainerBuilder::new();
    builder.add_provider(Arc::new(Broken));

    let error = builder.compile().unwrap_err();

    assert!(matches!(error, Error::Configuration { .. }));
}
