//! End-to-end compilation tests

use weaver_application::compiler::{
    CompiledArgument, CompiledContainer, CompilerOptions, ContainerBuilder,
};
use weaver_application::ports::pass_fn;
use weaver_domain::{
    Alias, Argument, Error, Literal, ParameterSlot, PassPhase, ServiceDefinition, Tag,
};

fn compile(definitions: Vec<ServiceDefinition>) -> Result<CompiledContainer, Error> {
    compile_with(definitions, CompilerOptions::default())
}

fn compile_with(
    definitions: Vec<ServiceDefinition>,
    options: CompilerOptions,
) -> Result<CompiledContainer, Error> {
    let mut builder = ContainerBuilder::new().with_options(options);
    for definition in definitions {
        builder.register(definition);
    }
    builder.compile()
}

fn without_inlining() -> CompilerOptions {
    CompilerOptions {
        inline_private_services: false,
        ..CompilerOptions::default()
    }
}

// ============================================================================
// Visibility and lookup
// ============================================================================

#[test]
fn test_private_services_are_not_retrievable() {
    let compiled = compile_with(
        vec![
            ServiceDefinition::new("logger"),
            ServiceDefinition::new("mailer")
                .public()
                .with_argument(Argument::service("logger")),
        ],
        without_inlining(),
    )
    .unwrap();

    assert!(compiled.has("mailer"));
    assert!(!compiled.has("logger"));
    assert!(compiled.lookup("mailer").is_ok());
    assert!(matches!(compiled.lookup("logger"), Err(Error::Access { .. })));
    assert!(matches!(compiled.lookup("nope"), Err(Error::NotFound { .. })));
}

#[test]
fn test_removed_private_identifiers_stay_private() {
    let mut builder = ContainerBuilder::new();
    builder
        .register(ServiceDefinition::new("secret"))
        .register(ServiceDefinition::new("orphan"))
        .register(
            ServiceDefinition::new("app")
                .public()
                .with_argument(Argument::service("secret")),
        )
        .register(ServiceDefinition::new("b").public());
    builder.set_alias("a", Alias::private("b")).unwrap();

    let compiled = builder.compile().unwrap();

    assert!(compiled.service("secret").is_none(), "secret is inlined");
    assert!(compiled.service("orphan").is_none(), "orphan is pruned");
    assert!(compiled.aliases().get("a").is_none());
    for id in ["secret", "orphan", "a"] {
        assert!(
            matches!(compiled.lookup(id), Err(Error::Access { .. })),
            "{id} must be private"
        );
    }
    assert!(matches!(compiled.lookup("nope"), Err(Error::NotFound { .. })));
}

#[test]
fn test_private_identifiers_survive_json_round_trip() {
    let compiled = compile(vec![
        ServiceDefinition::new("orphan"),
        ServiceDefinition::new("app").public(),
    ])
    .unwrap();

    let restored: CompiledContainer =
        serde_json::from_str(&serde_json::to_string(&compiled).unwrap()).unwrap();

    assert!(matches!(restored.lookup("orphan"), Err(Error::Access { .. })));
}

#[test]
fn test_public_alias_resolves_to_its_target() {
    let mut builder = ContainerBuilder::new();
    builder.register(ServiceDefinition::new("monolog").public());
    builder.set_alias("logger", Alias::new("monolog")).unwrap();
    builder.set_alias("internal.logger", Alias::private("monolog")).unwrap();

    let compiled = builder.compile().unwrap();

    assert!(compiled.has("logger"));
    assert_eq!(compiled.lookup("logger").unwrap().id, "monolog");
    assert!(!compiled.has("internal.logger"));
    assert!(compiled.aliases().get("internal.logger").is_none());
}

#[test]
fn test_references_through_aliases_are_rewritten() {
    let mut builder = ContainerBuilder::new().with_options(without_inlining());
    builder.register(ServiceDefinition::new("monolog"));
    builder.register(
        ServiceDefinition::new("mailer")
            .public()
            .with_argument(Argument::service("logger")),
    );
    builder.set_alias("logger", Alias::private("monolog")).unwrap();

    let compiled = builder.compile().unwrap();

    assert_eq!(
        compiled.lookup("mailer").unwrap().arguments,
        vec![CompiledArgument::Service {
            id: "monolog".to_string(),
            deferred: false
        }]
    );
}

// ============================================================================
// References
// ============================================================================

#[test]
fn test_optional_missing_reference_resolves_to_null() {
    let compiled = compile(vec![ServiceDefinition::new("mailer")
        .public()
        .with_argument(Argument::optional_service("logger"))])
    .unwrap();

    assert_eq!(
        compiled.lookup("mailer").unwrap().arguments,
        vec![CompiledArgument::Value(Literal::Null)]
    );
}

#[test]
fn test_required_missing_reference_fails() {
    let error = compile(vec![ServiceDefinition::new("mailer")
        .public()
        .with_argument(Argument::service("logger"))])
    .unwrap_err();

    match error {
        Error::UnresolvedReference { id, referenced_by } => {
            assert_eq!(id, "logger");
            assert_eq!(referenced_by, "mailer");
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }
}

#[test]
fn test_reference_to_abstract_definition_fails() {
    let error = compile(vec![
        ServiceDefinition::new("base").abstract_template(),
        ServiceDefinition::new("consumer")
            .public()
            .with_argument(Argument::service("base")),
    ])
    .unwrap_err();

    match error {
        Error::Compilation {
            phase,
            service,
            pass,
            ..
        } => {
            assert_eq!(phase, Some(PassPhase::BeforeRemoving));
            assert_eq!(service.as_deref(), Some("consumer"));
            assert_eq!(pass.as_deref(), Some("check_references"));
        }
        other => panic!("expected compilation error, got {other:?}"),
    }
}

#[test]
fn test_eager_cycle_fails_naming_both_services() {
    let error = compile(vec![
        ServiceDefinition::new("a")
            .public()
            .with_argument(Argument::service("b")),
        ServiceDefinition::new("b")
            .public()
            .with_argument(Argument::service("a")),
    ])
    .unwrap_err();

    match error {
        Error::CyclicServiceGraph { cycle } => assert_eq!(cycle, vec!["a", "b", "a"]),
        other => panic!("expected cyclic graph, got {other:?}"),
    }
}

#[test]
fn test_lazy_cycle_compiles_with_deferred_edges() {
    let compiled = compile(vec![
        ServiceDefinition::new("a")
            .public()
            .with_argument(Argument::lazy_service("b")),
        ServiceDefinition::new("b")
            .public()
            .with_argument(Argument::lazy_service("a")),
    ])
    .unwrap();

    let a = compiled.lookup("a").unwrap();
    assert_eq!(
        a.arguments,
        vec![CompiledArgument::Service {
            id: "b".to_string(),
            deferred: true
        }]
    );
    assert_eq!(a.height, 0);
    assert_eq!(compiled.resolution_order("a"), vec!["a"]);
}

// ============================================================================
// Parameters and tagged collections
// ============================================================================

#[test]
fn test_parameters_are_resolved_into_arguments() {
    let mut builder = ContainerBuilder::new();
    builder.set_parameter("kernel.root", "/app").unwrap();
    builder.set_parameter("cache.ttl", 300_i64).unwrap();
    builder.register(
        ServiceDefinition::new("cache")
            .public()
            .with_argument(Argument::literal("%kernel.root%/var/cache"))
            .with_argument(Argument::parameter("cache.ttl"))
            .with_argument(Argument::literal("100%% hit rate")),
    );

    let compiled = builder.compile().unwrap();

    assert_eq!(
        compiled.lookup("cache").unwrap().arguments,
        vec![
            CompiledArgument::Value(Literal::from("/app/var/cache")),
            CompiledArgument::Value(Literal::Int(300)),
            CompiledArgument::Value(Literal::from("100% hit rate")),
        ]
    );
    assert_eq!(compiled.parameter("cache.ttl"), Some(&Literal::Int(300)));
    assert!(compiled.registry().parameters().is_frozen());
}

#[test]
fn test_undefined_parameter_fails() {
    let error = compile(vec![ServiceDefinition::new("cache")
        .public()
        .with_argument(Argument::parameter("missing"))])
    .unwrap_err();

    assert!(matches!(error, Error::UnresolvedParameter { ref name, .. } if name == "missing"));
}

#[test]
fn test_tagged_collection_is_baked_in_priority_order() {
    let tag = |priority: i64| Tag::new("route_enhancer").with_priority(priority);
    let compiled = compile(vec![
        ServiceDefinition::new("b").with_tag(tag(5)),
        ServiceDefinition::new("a").with_tag(tag(5)),
        ServiceDefinition::new("top").with_tag(tag(10)),
        ServiceDefinition::new("router")
            .public()
            .with_argument(Argument::tagged("route_enhancer")),
    ])
    .unwrap();

    let service = |id: &str| CompiledArgument::Service {
        id: id.to_string(),
        deferred: false,
    };
    assert_eq!(
        compiled.lookup("router").unwrap().arguments,
        vec![CompiledArgument::Collection(vec![
            service("top"),
            service("a"),
            service("b")
        ])]
    );
    assert!(compiled.service("a").is_some(), "tagged services are kept");
}

#[test]
fn test_autoconfigured_tags_feed_collections() {
    let mut builder = ContainerBuilder::new();
    builder.register_for_autoconfiguration("EventSubscriber", Tag::new("kernel.event_subscriber"));
    builder.register(ServiceDefinition::new("listener").with_capability("EventSubscriber"));
    builder.register(
        ServiceDefinition::new("dispatcher")
            .public()
            .with_argument(Argument::tagged("kernel.event_subscriber")),
    );

    let compiled = builder.compile().unwrap();

    assert_eq!(
        compiled.lookup("dispatcher").unwrap().arguments,
        vec![CompiledArgument::Collection(vec![CompiledArgument::Service {
            id: "listener".to_string(),
            deferred: false
        }])]
    );
}

// ============================================================================
// Autowiring
// ============================================================================

#[test]
fn test_autowiring_binds_capabilities() {
    let compiled = compile_with(
        vec![
            ServiceDefinition::new("smtp").with_capability("Transport"),
            ServiceDefinition::new("mailer")
                .public()
                .autowired()
                .with_parameter(ParameterSlot::typed("transport", "Transport"))
                .with_parameter(ParameterSlot::typed("logger", "Logger").nullable()),
        ],
        without_inlining(),
    )
    .unwrap();

    assert_eq!(
        compiled.lookup("mailer").unwrap().arguments,
        vec![
            CompiledArgument::Service {
                id: "smtp".to_string(),
                deferred: false
            },
            CompiledArgument::Value(Literal::Null),
        ]
    );
}

#[test]
fn test_unreachable_definitions_are_never_autowired() {
    let compiled = compile(vec![
        ServiceDefinition::new("orphan")
            .autowired()
            .with_parameter(ParameterSlot::typed("missing", "Nothing")),
        ServiceDefinition::new("app").public(),
    ])
    .unwrap();

    assert!(compiled.service("orphan").is_none());
}

#[test]
fn test_reachable_unsatisfiable_autowiring_fails() {
    let error = compile(vec![ServiceDefinition::new("app")
        .public()
        .autowired()
        .with_parameter(ParameterSlot::typed("missing", "Nothing"))])
    .unwrap_err();

    assert!(matches!(error, Error::NoCandidate { ref service, .. } if service == "app"));
}

#[test]
fn test_unset_argument_without_autowiring_fails() {
    let error = compile(vec![ServiceDefinition::new("app")
        .public()
        .with_parameter(ParameterSlot::typed("transport", "Transport"))])
    .unwrap_err();

    assert!(matches!(
        error,
        Error::Compilation { service: Some(ref id), .. } if id == "app"
    ));
    assert!(error.to_string().contains("argument #0 ($transport) is not set"));
}

// ============================================================================
// Parents and decoration
// ============================================================================

#[test]
fn test_child_inherits_from_abstract_parent() {
    let compiled = compile(vec![
        ServiceDefinition::new("base_repository")
            .with_class("Repository")
            .abstract_template()
            .with_argument(Argument::literal("default_connection"))
            .with_argument(Argument::literal("cache")),
        ServiceDefinition::new("user_repository")
            .public()
            .with_parent("base_repository")
            .with_argument_at(1, Argument::literal("no_cache")),
    ])
    .unwrap();

    let child = compiled.lookup("user_repository").unwrap();
    assert_eq!(child.class, "Repository");
    assert_eq!(
        child.arguments,
        vec![
            CompiledArgument::Value(Literal::from("default_connection")),
            CompiledArgument::Value(Literal::from("no_cache")),
        ]
    );
    assert!(compiled.service("base_repository").is_none());
}

#[test]
fn test_missing_parent_fails() {
    let error = compile(vec![ServiceDefinition::new("child")
        .public()
        .with_parent("ghost")])
    .unwrap_err();

    assert!(matches!(error, Error::UnresolvedReference { ref id, .. } if id == "ghost"));
}

#[test]
fn test_decorator_replaces_the_decorated_service() {
    let compiled = compile_with(
        vec![
            ServiceDefinition::new("mailer")
                .public()
                .with_capability("Mailer"),
            ServiceDefinition::new("logging_mailer")
                .with_capability("Mailer")
                .decorating("mailer")
                .autowired()
                .with_parameter(ParameterSlot::typed("inner", "Mailer")),
            ServiceDefinition::new("newsletter")
                .public()
                .autowired()
                .with_parameter(ParameterSlot::typed("mailer", "Mailer")),
        ],
        without_inlining(),
    )
    .unwrap();

    assert_eq!(compiled.lookup("mailer").unwrap().id, "logging_mailer");
    assert_eq!(
        compiled.service("logging_mailer").unwrap().arguments,
        vec![CompiledArgument::Service {
            id: "logging_mailer.inner".to_string(),
            deferred: false
        }]
    );
    assert_eq!(
        compiled.lookup("newsletter").unwrap().arguments,
        vec![CompiledArgument::Service {
            id: "logging_mailer".to_string(),
            deferred: false
        }]
    );
    assert!(!compiled.has("logging_mailer.inner"));
}

#[test]
fn test_decorators_stack_by_priority() {
    let mut builder = ContainerBuilder::new().with_options(without_inlining());
    builder.register(ServiceDefinition::new("handler").public());
    builder.register(
        ServiceDefinition::new("outer")
            .decorating_with("handler", None, 1)
            .with_argument(Argument::service("outer.inner")),
    );
    builder.register(
        ServiceDefinition::new("inner")
            .decorating_with("handler", None, 10)
            .with_argument(Argument::service("inner.inner")),
    );

    let compiled = builder.compile().unwrap();

    assert_eq!(compiled.lookup("handler").unwrap().id, "outer");
    assert_eq!(
        compiled.service("outer").unwrap().arguments,
        vec![CompiledArgument::Service {
            id: "inner".to_string(),
            deferred: false
        }]
    );
    assert_eq!(
        compiled.service("inner").unwrap().arguments,
        vec![CompiledArgument::Service {
            id: "inner.inner".to_string(),
            deferred: false
        }]
    );
}

#[test]
fn test_tagged_collection_receives_the_decorator() {
    let compiled = compile_with(
        vec![
            ServiceDefinition::new("handler").public().with_tag(Tag::new("h")),
            ServiceDefinition::new("wrapper")
                .decorating("handler")
                .with_argument(Argument::service("wrapper.inner")),
            ServiceDefinition::new("handlers")
                .public()
                .with_argument(Argument::tagged("h")),
        ],
        without_inlining(),
    )
    .unwrap();

    assert_eq!(
        compiled.lookup("handlers").unwrap().arguments,
        vec![CompiledArgument::Collection(vec![CompiledArgument::Service {
            id: "wrapper".to_string(),
            deferred: false
        }])]
    );
    assert!(compiled.registry().get("wrapper.inner").unwrap().tags.is_empty());
}

// ============================================================================
// Pruning and inlining
// ============================================================================

#[test]
fn test_unreachable_private_services_are_pruned() {
    let compiled = compile(vec![
        ServiceDefinition::new("unused"),
        ServiceDefinition::new("app").public(),
    ])
    .unwrap();

    assert!(compiled.service("unused").is_none());
    assert_eq!(compiled.len(), 1);
}

#[test]
fn test_pruning_can_be_disabled() {
    let compiled = compile_with(
        vec![ServiceDefinition::new("unused"), ServiceDefinition::new("app").public()],
        CompilerOptions {
            remove_unused_definitions: false,
            ..CompilerOptions::default()
        },
    )
    .unwrap();

    assert!(compiled.service("unused").is_some());
}

#[test]
fn test_single_use_private_service_is_inlined() {
    let compiled = compile(vec![
        ServiceDefinition::new("request_stack"),
        ServiceDefinition::new("route_match")
            .public()
            .with_argument(Argument::service("request_stack")),
    ])
    .unwrap();

    assert!(compiled.service("request_stack").is_none());
    let route_match = compiled.lookup("route_match").unwrap();
    match &route_match.arguments[0] {
        CompiledArgument::Inline(inline) => assert_eq!(inline.id, "request_stack"),
        other => panic!("expected inline argument, got {other:?}"),
    }
    assert_eq!(route_match.height, 1);
    assert_eq!(
        compiled.resolution_order("route_match"),
        vec!["request_stack", "route_match"]
    );
}

#[test]
fn test_shared_service_is_not_inlined_into_transient_consumer() {
    let compiled = compile(vec![
        ServiceDefinition::new("connection"),
        ServiceDefinition::new("query")
            .public()
            .transient()
            .with_argument(Argument::service("connection")),
    ])
    .unwrap();

    assert!(compiled.service("connection").is_some());
}

#[test]
fn test_service_used_twice_is_not_inlined() {
    let compiled = compile(vec![
        ServiceDefinition::new("config"),
        ServiceDefinition::new("a")
            .public()
            .with_argument(Argument::service("config")),
        ServiceDefinition::new("b")
            .public()
            .with_argument(Argument::service("config")),
    ])
    .unwrap();

    assert!(compiled.service("config").is_some());
}

#[test]
fn test_recompiling_the_pruned_graph_is_a_fixed_point() {
    let definitions = vec![
        ServiceDefinition::new("request_stack"),
        ServiceDefinition::new("current_route_match")
            .with_argument(Argument::service("request_stack")),
        ServiceDefinition::new("config_factory"),
        ServiceDefinition::new("path_matcher")
            .with_argument(Argument::service("config_factory"))
            .with_argument(Argument::service("current_route_match")),
        ServiceDefinition::new("matcher")
            .public()
            .with_argument(Argument::service("path_matcher"))
            .with_argument(Argument::service("config_factory"))
            .with_argument(Argument::literal("exclude_paths")),
        ServiceDefinition::new("dead_code"),
    ];
    let first = compile(definitions).unwrap();

    let second = ContainerBuilder::from_registry(first.registry().clone())
        .compile()
        .unwrap();

    assert_eq!(second.registry(), first.registry());
    assert_eq!(second, first);
}

// ============================================================================
// Compiler passes
// ============================================================================

#[test]
fn test_user_pass_can_rewrite_the_graph() {
    let mut builder = ContainerBuilder::new();
    builder.register(ServiceDefinition::new("app").public());
    builder.add_compiler_pass(
        pass_fn("add_debug_toolbar", |registry| {
            registry.add(ServiceDefinition::new("debug_toolbar").public());
            Ok(())
        }),
        PassPhase::BeforeOptimization,
        0,
    );

    let compiled = builder.compile().unwrap();

    assert!(compiled.has("debug_toolbar"));
}

#[test]
fn test_nan_literal_compiles() {
    let compiled = compile(vec![ServiceDefinition::new("sampler")
        .public()
        .with_argument(Argument::literal(f64::NAN))])
    .unwrap();

    match &compiled.lookup("sampler").unwrap().arguments[0] {
        CompiledArgument::Value(Literal::Float(value)) => assert!(value.is_nan()),
        other => panic!("expected float literal, got {other:?}"),
    }
}

#[test]
fn test_compiled_container_round_trips_through_json() {
    let compiled = compile(vec![
        ServiceDefinition::new("logger"),
        ServiceDefinition::new("mailer")
            .public()
            .with_argument(Argument::service("logger"))
            .with_argument(Argument::literal(25_i64)),
    ])
    .unwrap();

    let json = serde_json::to_string(&compiled).unwrap();
    let restored: CompiledContainer = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, compiled);
}

// ============================================================================
// Deep graphs
// ============================================================================

#[test]
fn test_long_dependency_chain_compiles() {
    const DEPTH: usize = 5000;
    let definitions = (0..DEPTH)
        .map(|index| {
            let definition = ServiceDefinition::new(format!("s{index}")).public();
            if index + 1 < DEPTH {
                definition.with_argument(Argument::service(format!("s{}", index + 1)))
            } else {
                definition
            }
        })
        .collect();

    let compiled = compile(definitions).unwrap();

    assert_eq!(compiled.lookup("s0").unwrap().height, DEPTH - 1);
    let order = compiled.resolution_order("s0");
    assert_eq!(order.len(), DEPTH);
    assert_eq!(order.first().map(String::as_str), Some("s4999"));
    assert_eq!(order.last().map(String::as_str), Some("s0"));
    assert_eq!(compiled.resolution_order("s4998"), vec!["s4999", "s4998"]);
}
