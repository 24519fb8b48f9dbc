//! Tests for the compiler pass pipeline

use std::sync::{Arc, Mutex};
use weaver_application::compiler::{CompilerOptions, PassConfig};
use weaver_application::ports::{pass_fn, CompilerPass};
use weaver_application::tags::AutoconfigureRules;
use weaver_domain::{
    Argument, DefinitionRegistry, Error, PassPhase, Result, ServiceDefinition, Tag,
};

struct Recording {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl CompilerPass for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn process(&self, _registry: &mut DefinitionRegistry) -> Result<()> {
        self.log.lock().unwrap().push(self.name.to_string());
        Ok(())
    }
}

fn recording(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Recording {
    Recording {
        name,
        log: Arc::clone(log),
    }
}

#[test]
fn test_phases_run_in_order_and_priorities_descend() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut config = PassConfig::new();
    config.add_pass(recording("after_removing", &log), PassPhase::AfterRemoving, 0);
    config.add_pass(recording("optimize_low", &log), PassPhase::Optimize, -10);
    config.add_pass(recording("optimize_high", &log), PassPhase::Optimize, 10);
    config.add_pass(recording("before_optimization", &log), PassPhase::BeforeOptimization, 0);
    config.add_pass(recording("remove", &log), PassPhase::Remove, 0);

    config.run(&mut DefinitionRegistry::new()).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "before_optimization",
            "optimize_high",
            "optimize_low",
            "remove",
            "after_removing"
        ]
    );
}

#[test]
fn test_equal_priorities_keep_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut config = PassConfig::new();
    for name in ["first", "second", "third"] {
        config.add_pass(recording(name, &log), PassPhase::Optimize, 0);
    }
    config.add_pass(recording("urgent", &log), PassPhase::Optimize, 1);

    config.run(&mut DefinitionRegistry::new()).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["urgent", "first", "second", "third"]);
    assert_eq!(
        config.pass_names(PassPhase::Optimize),
        vec!["urgent", "first", "second", "third"]
    );
}

#[test]
fn test_validation_pass_must_not_mutate() {
    let mut config = PassConfig::new();
    config.add_pass(
        pass_fn("sneaky_validator", |registry| {
            registry.add(ServiceDefinition::new("injected"));
            Ok(())
        }),
        PassPhase::BeforeRemoving,
        0,
    );

    let error = config.run(&mut DefinitionRegistry::new()).unwrap_err();

    match error {
        Error::Compilation { phase, pass, .. } => {
            assert_eq!(phase, Some(PassPhase::BeforeRemoving));
            assert_eq!(pass.as_deref(), Some("sneaky_validator"));
        }
        other => panic!("expected compilation error, got {other:?}"),
    }
}

#[test]
fn test_validation_accepts_unchanged_nan_literal() {
    let mut registry = DefinitionRegistry::new();
    registry.add(
        ServiceDefinition::new("sampler")
            .public()
            .with_argument(Argument::literal(f64::NAN)),
    );
    let mut config = PassConfig::new();
    config.add_pass(pass_fn("read_only", |_| Ok(())), PassPhase::BeforeRemoving, 0);

    config.run(&mut registry).unwrap();
}

#[test]
fn test_first_failure_aborts_the_run() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut config = PassConfig::new();
    config.add_pass(
        pass_fn("failing", |_| Err(Error::compilation("nope"))),
        PassPhase::Optimize,
        0,
    );
    config.add_pass(recording("never", &log), PassPhase::Remove, 0);

    let error = config.run(&mut DefinitionRegistry::new()).unwrap_err();

    assert!(error.to_string().contains("OPTIMIZE (failing)"));
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_builtin_pass_schedule() {
    let config = PassConfig::builtin(&CompilerOptions::default(), AutoconfigureRules::new());

    assert_eq!(
        config.pass_names(PassPhase::BeforeOptimization),
        vec!["resolve_parents", "autoconfigure"]
    );
    assert_eq!(
        config.pass_names(PassPhase::Optimize),
        vec![
            "resolve_parameters",
            "decorate_services",
            "autowire",
            "resolve_tagged_collections",
            "resolve_alias_references",
            "resolve_invalid_references"
        ]
    );
    assert_eq!(
        config.pass_names(PassPhase::BeforeRemoving),
        vec!["check_definitions", "check_references", "check_circular_references"]
    );
    assert_eq!(
        config.pass_names(PassPhase::Remove),
        vec![
            "remove_abstract_definitions",
            "remove_private_aliases",
            "remove_unused_definitions"
        ]
    );
    assert_eq!(
        config.pass_names(PassPhase::AfterRemoving),
        vec!["inline_service_definitions"]
    );
}

#[test]
fn test_disabled_options_drop_optional_passes() {
    let options = CompilerOptions {
        autoconfigure: false,
        remove_unused_definitions: false,
        inline_private_services: false,
        resolve_tagged_collections: false,
    };
    let mut rules = AutoconfigureRules::new();
    rules.register("Any", Tag::new("any"));

    let config = PassConfig::builtin(&options, rules);

    assert_eq!(config.pass_names(PassPhase::BeforeOptimization), vec!["resolve_parents"]);
    assert!(!config
        .pass_names(PassPhase::Optimize)
        .contains(&"resolve_tagged_collections".to_string()));
    assert_eq!(
        config.pass_names(PassPhase::Remove),
        vec!["remove_abstract_definitions", "remove_private_aliases"]
    );
    assert!(config.pass_names(PassPhase::AfterRemoving).is_empty());
}
