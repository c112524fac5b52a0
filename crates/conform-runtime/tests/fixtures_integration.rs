//! Validation of the shared resource fixtures

use std::sync::Arc;
use std::thread;

use conform_runtime::{ErrorKind, Kind, Schema, SchemaNode, Validate, ValidatorConfig, Value};
use conform_test_fixtures as fixtures;
use pretty_assertions::assert_eq;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_demo_schema_normalizes_payload() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let schema = fixtures::demo_schema()?;
    let out = schema.validate(&fixtures::demo_payload())?;

    let expected = Value::from(json!({
        "key1": "value1",
        "key2": 222,
        "key3": 333,
        "key4": 44,
        "key5": "value5",
        "key_none": null,
        "key_none2": "null"
    }));
    assert_eq!(out, expected);
    Ok(())
}

#[test]
fn test_demo_schema_failures() -> Result<(), Box<dyn std::error::Error>> {
    let schema = fixtures::demo_schema()?;

    let err = schema
        .validate(&Value::from(json!({"key1": "value1"})))
        .expect_err("keys are missing");
    assert_eq!(err.kind(), ErrorKind::MissingKeys);
    assert_eq!(err.message(), "missing keys: \"key2\", \"key3\", \"key4\"");

    // The wildcard entry absorbs the rejected value, leaving "key4" uncovered.
    let err = schema
        .validate(&Value::from(json!({
            "key1": "value1", "key2": 222, "key3": 333, "key4": 444
        })))
        .expect_err("key4 is out of range");
    assert_eq!(err.kind(), ErrorKind::MissingKeys);
    assert_eq!(err.message(), "missing keys: \"key4\"");
    Ok(())
}

#[test]
fn test_demo_schema_wildcard_keeps_present_value() -> Result<(), Box<dyn std::error::Error>> {
    let schema = fixtures::demo_schema()?;
    let out = schema.validate(&Value::from(json!({
        "key1": "value1", "key2": 222, "key3": 333, "key4": 44, "key5": 555
    })))?;
    assert_eq!(out.get("key5"), Some(&Value::Int(555)));
    Ok(())
}

#[test]
fn test_ip_config_gateway_default() -> Result<(), Box<dyn std::error::Error>> {
    let schema = fixtures::ip_config_schema()?;
    let out = schema.validate(&Value::from(json!({
        "ip": "192.168.1.10",
        "netmask": "255.255.255.0"
    })))?;
    assert_eq!(out.get("gateway"), Some(&Value::from("0.0.0.0")));

    let err = schema
        .validate(&Value::from(json!({"ip": "192.168.1", "netmask": "255.255.255.0"})))
        .expect_err("truncated address");
    assert_eq!(
        err.message(),
        "invalid value for key \"ip\"\nis_ipv4(\"192.168.1\") should evaluate to true"
    );
    Ok(())
}

#[test]
fn test_dns_servers_override_message() {
    let schema = fixtures::dns_servers_schema();
    assert!(schema
        .validate(&Value::from(json!({"servers": ["8.8.8.8", "1.1.1.1"]})))
        .is_ok());

    let err = schema
        .validate(&Value::from(json!({"servers": ["8.8.8.8", "dns.local"]})))
        .expect_err("hostname is not an address");
    assert_eq!(err.kind(), ErrorKind::Disjunction);
    assert_eq!(err.message(), "servers must be a list of IPv4 addresses");
}

#[test]
fn test_scsi_rescan_from_yaml() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let schema = fixtures::scsi_rescan_schema()?;
    let out = schema.validate(&fixtures::scsi_rescan_payload()?)?;

    let expected = Value::from(json!({
        "host": [0, 1],
        "channels": [],
        "targets": [],
        "luns": [3],
        "remove": true,
        "force_rescan": false,
        "force_remove": false
    }));
    assert_eq!(out, expected);
    Ok(())
}

#[test]
fn test_smart_config_injects_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let schema = fixtures::smart_config_schema()?;
    let empty = Value::from(json!({}));
    assert_eq!(schema.validate(&empty)?, empty);

    let partial = Value::from(json!({"offline_auto": false}));
    assert_eq!(schema.validate(&partial)?, partial);
    Ok(())
}

#[test]
fn test_smart_test_types() -> Result<(), Box<dyn std::error::Error>> {
    let schema = fixtures::smart_test_schema()?;
    for test_type in fixtures::SMART_TEST_TYPES {
        let data = Value::map([("test_type", test_type)]);
        assert_eq!(schema.validate(&data)?, data);
    }
    let err = schema
        .validate(&Value::map([("test_type", "full")]))
        .expect_err("full is not supported");
    assert_eq!(err.message(), "unsupported test_type");
    Ok(())
}

#[test]
fn test_shared_schema_across_threads() -> Result<(), Box<dyn std::error::Error>> {
    let schema = Arc::new(fixtures::demo_schema()?);
    let expected = schema.validate(&fixtures::demo_payload())?;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || schema.validate(&fixtures::demo_payload()))
        })
        .collect();

    for handle in handles {
        let out = handle.join().expect("validation thread panicked")?;
        assert_eq!(out, expected);
    }
    Ok(())
}

#[test]
fn test_depth_limit() {
    init_tracing();
    let mut node = SchemaNode::of(Kind::Int);
    let mut data = Value::Int(1);
    for _ in 0..80 {
        node = SchemaNode::list([node]);
        data = Value::list([data]);
    }

    let err = Schema::new(node.clone())
        .validate(&data)
        .expect_err("nesting exceeds the default limit");
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
    assert_eq!(err.message(), "maximum validation depth 64 exceeded");

    let deep = Schema::new(node)
        .with_config(ValidatorConfig::default().with_max_depth(128))
        .expect("128 is a valid depth");
    assert_eq!(deep.validate(&data).ok(), Some(data));
}

#[test]
fn test_depth_limit_spans_nested_schemas() {
    let mut node = SchemaNode::of(Kind::Int);
    let mut data = Value::Int(1);
    for _ in 0..6 {
        node = SchemaNode::from(Schema::new(SchemaNode::list([node])));
        data = Value::list([data]);
    }

    let schema = Schema::new(node)
        .with_config(ValidatorConfig::default().with_max_depth(8))
        .expect("8 is a valid depth");
    let err = schema.validate(&data).expect_err("embedded schemas share the limit");
    assert_eq!(err.kind(), ErrorKind::DepthExceeded);
}
