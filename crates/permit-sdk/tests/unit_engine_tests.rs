//! Unit tests for RuleEngine
//!
//! Tests rule checks against subjects, the deny-on-failure policy, the
//! compiled rule cache and configuration loading.

mod common;

use common::{date, subject_engine, TestSubject};
use permit_parser::FnLeafFactory;
use permit_sdk::{
    CacheConfig, Condition, EngineConfig, ParseError, RuleEngine, RuleEngineBuilder, SdkError,
    XmlElement,
};
use std::sync::Arc;

// =============================================================================
// Subject Conditions
// =============================================================================

#[test]
fn test_admin_or_named_user() {
    let engine = subject_engine();
    let rule = "group = admins or user = alice";

    assert!(engine.check(rule, &TestSubject::new("alice")));
    assert!(engine.check(rule, &TestSubject::new("bob").in_groups(&["admins"])));
    assert!(!engine.check(rule, &TestSubject::new("bob").in_groups(&["staff"])));
}

#[test]
fn test_office_network_during_contract() {
    let engine = subject_engine();
    let rule = "group = contractors and ip 10.20.0.0/255.255.0.0 and (date >= 2024-01-01 and date < 2025-01-01)";

    let contractor = TestSubject::new("carol")
        .in_groups(&["contractors"])
        .from_ip("10.20.3.4");

    assert!(engine.check(rule, &contractor));
    assert!(!engine.check(rule, &contractor.clone().from_ip("192.168.1.1")));
    assert!(!engine.check(rule, &contractor.clone().on(date(2025, 1, 1))));
    assert!(!engine.check(rule, &TestSubject::new("carol").in_groups(&["contractors"])));
}

#[test]
fn test_negated_group() {
    let engine = subject_engine();
    let rule = "not group = suspended and group != guests";

    assert!(engine.check(rule, &TestSubject::new("dave").in_groups(&["staff"])));
    assert!(!engine.check(rule, &TestSubject::new("dave").in_groups(&["suspended"])));
    assert!(!engine.check(rule, &TestSubject::new("dave").in_groups(&["guests"])));
}

#[test]
fn test_quoted_group_name() {
    let engine = subject_engine();
    let subject = TestSubject::new("erin").in_groups(&["field sales"]);

    assert!(engine.check(r#"group = "field sales""#, &subject));
}

#[test]
fn test_default_rule_permits() {
    let engine = subject_engine();
    let subject = TestSubject::new("anyone");

    assert!(engine.check("", &subject));
    assert!(engine.check("()", &subject));
}

// =============================================================================
// Deny On Failure
// =============================================================================

#[test]
fn test_unparseable_rule_denies() {
    let engine = subject_engine();
    let subject = TestSubject::new("alice");

    assert!(!engine.check("(user = alice", &subject));
    assert!(!engine.check("role = admin", &subject));
    assert!(!engine.check("user < alice", &subject));
}

#[test]
fn test_try_check_surfaces_errors() {
    let engine = subject_engine();
    let subject = TestSubject::new("alice");

    let err = engine.try_check("role = admin", &subject).unwrap_err();
    assert!(matches!(
        err,
        SdkError::ParseError(ParseError::UnrecognizedLeaf { ref token }) if token == "role = admin"
    ));

    let err = engine.try_check("date > tomorrow", &subject).unwrap_err();
    assert!(matches!(err, SdkError::ParseError(ref e) if e.is_syntax()));

    assert!(engine.try_check("user = alice", &subject).unwrap());
}

#[test]
fn test_negated_unparseable_rule_still_denies() {
    let engine = subject_engine();
    assert!(!engine.check("not (user = alice", &TestSubject::new("bob")));
}

// =============================================================================
// XML Rules
// =============================================================================

#[test]
fn test_check_xml() -> anyhow::Result<()> {
    let engine = subject_engine();
    let element = XmlElement::parse(
        r#"
        <boolean operator="and">
            <condition field="group" operator="=" value="admins"/>
            <boolean operator="not">
                <condition field="ip" operator="in" value="0.0.0.0/0"/>
            </boolean>
        </boolean>
        "#,
    )?;

    assert!(engine.check_xml(&element, &TestSubject::new("frank").in_groups(&["admins"])));
    assert!(!engine.check_xml(
        &element,
        &TestSubject::new("frank").in_groups(&["admins"]).from_ip("1.2.3.4")
    ));
    Ok(())
}

#[test]
fn test_check_xml_denies_on_failure() {
    let engine = subject_engine();
    let element = XmlElement::new("condition")
        .with_attribute("field", "date")
        .with_attribute("operator", ">=")
        .with_attribute("value", "someday");

    assert!(!engine.check_xml(&element, &TestSubject::new("alice")));
}

#[test]
fn test_text_rule_and_its_xml_agree() -> anyhow::Result<()> {
    let engine = subject_engine();
    let compiled = engine.compile("user = alice or (group = staff and not ip 10.0.0.0/8)")?;
    let element = XmlElement::parse(&compiled.to_xml().to_string())?;

    let subjects = [
        TestSubject::new("alice"),
        TestSubject::new("bob").in_groups(&["staff"]),
        TestSubject::new("bob").in_groups(&["staff"]).from_ip("10.1.1.1"),
        TestSubject::new("bob").from_ip("192.168.0.1"),
    ];
    for subject in &subjects {
        assert_eq!(
            engine.check_xml(&element, subject),
            compiled.evaluate(subject),
            "{:?}",
            subject
        );
    }
    Ok(())
}

// =============================================================================
// Cache
// =============================================================================

#[test]
fn test_same_rule_returns_same_tree() -> anyhow::Result<()> {
    let engine = subject_engine();
    let first = engine.compile("user = alice")?;
    let second = engine.compile("user = alice")?;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(engine.cached_rules(), 1);
    Ok(())
}

#[test]
fn test_preload_is_fail_fast() {
    let engine = subject_engine();
    let err = engine
        .preload(["user = alice", "(group = admins", "group = staff"])
        .unwrap_err();

    assert!(matches!(err, SdkError::ParseError(_)));
    assert_eq!(engine.cached_rules(), 1);
}

#[test]
fn test_preload_counts_rules() -> anyhow::Result<()> {
    let engine = subject_engine();
    let rules = vec!["user = alice".to_string(), "group = admins".to_string()];

    assert_eq!(engine.preload(&rules)?, 2);
    assert_eq!(engine.cached_rules(), 2);
    Ok(())
}

#[test]
fn test_cache_bound() {
    let engine = RuleEngineBuilder::<TestSubject>::new()
        .with_subject_conditions()
        .with_config(EngineConfig::new().with_cache(CacheConfig::default().with_max_entries(2)))
        .build()
        .unwrap();

    for user in ["a", "b", "c", "d"] {
        assert!(engine.check(&format!("user = {}", user), &TestSubject::new(user)));
    }
    assert_eq!(engine.cached_rules(), 2);
}

#[test]
fn test_engine_is_shared_across_threads() {
    let engine = Arc::new(subject_engine());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || {
                let subject = TestSubject::new(if i % 2 == 0 { "alice" } else { "bob" });
                engine.check("user = alice", &subject)
            })
        })
        .collect();

    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![true, false, true, false]);
    assert_eq!(engine.cached_rules(), 1);
}

// =============================================================================
// Configuration and Custom Factories
// =============================================================================

#[test]
fn test_engine_from_yaml_config() -> anyhow::Result<()> {
    let config = EngineConfig::from_yaml_str(
        r#"
limits:
  max_depth: 2
cache:
  enabled: false
"#,
    )?;
    let engine = RuleEngine::<TestSubject>::builder()
        .with_config(config)
        .with_subject_conditions()
        .build()?;

    let subject = TestSubject::new("alice");
    assert!(engine.check("user = alice", &subject));
    assert_eq!(engine.cached_rules(), 0);

    let err = engine.try_check("not not not user = alice", &subject).unwrap_err();
    assert!(matches!(err, SdkError::ParseError(ParseError::LimitExceeded(_))));
    Ok(())
}

#[test]
fn test_engine_config_from_file() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("permit-engine-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"limits": {"max_input_len": 16}}"#)?;

    let config = EngineConfig::from_file(&path);
    std::fs::remove_file(&path)?;
    let config = config?;

    assert_eq!(config.limits.max_input_len, 16);
    let engine = RuleEngine::<TestSubject>::builder()
        .with_config(config)
        .with_subject_conditions()
        .build()?;
    assert!(!engine.check("user = alice or user = bob", &TestSubject::new("alice")));
    Ok(())
}

#[test]
fn test_unsupported_config_extension() {
    let err = EngineConfig::from_file(std::env::temp_dir()).unwrap_err();
    // A directory cannot be read as a file
    assert!(matches!(err, SdkError::IoError(_)));

    let path = std::env::temp_dir().join(format!("permit-engine-{}.toml", std::process::id()));
    std::fs::write(&path, "limits = {}").unwrap();
    let err = EngineConfig::from_file(&path).unwrap_err();
    std::fs::remove_file(&path).unwrap();
    assert!(matches!(err, SdkError::ConfigError(_)));
}

#[test]
fn test_custom_factory_after_subject_conditions() {
    let engine = RuleEngine::<TestSubject>::builder()
        .with_subject_conditions()
        .add_leaf_factory(FnLeafFactory::new(
            |token: &str| -> permit_parser::Result<Option<Condition<TestSubject>>> {
                Ok(token
                    .eq_ignore_ascii_case("maintenance window")
                    .then_some(Condition::False))
            },
        ))
        .build()
        .unwrap();

    let rule = "user = alice and not maintenance window";
    assert!(engine.check(rule, &TestSubject::new("alice")));
    assert!(!engine.check(rule, &TestSubject::new("bob")));
}
